//! Runtime configuration for the client.

use std::time::Duration;

/// Refresh period of the kitchen and cashier screens.
pub const DEFAULT_POLL_SECS: u64 = 30;
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Fixed period between background snapshot fetches.
    pub poll_interval: Duration,
    /// Per-request timeout applied by the HTTP transport.
    pub request_timeout: Duration,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `COFFEE_BELL_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    pub(crate) fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secs) = lookup("COFFEE_BELL_POLL_SECS").and_then(|v| parse_secs(&v)) {
            self.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = lookup("COFFEE_BELL_TIMEOUT_SECS").and_then(|v| parse_secs(&v)) {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(level) = lookup("COFFEE_BELL_LOG") {
            let level = level.trim();
            if !level.is_empty() {
                self.log_level = level.to_ascii_lowercase();
            }
        }
    }
}

fn parse_secs(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|secs| *secs > 0)
}
