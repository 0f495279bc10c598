//! Background polling of the role-scoped snapshot.
//!
//! One periodic task per session. Each tick fetches `getSyncData` for the
//! session role, reconciles the reply into the store and redraws the active
//! view. A failed tick is logged and skipped; the timer keeps running.
//!
//! The period is fixed: no backoff and no jitter. Replies are applied in
//! arrival order, so a slow poll can land after a newer mutation-triggered
//! resync and briefly restore older data until the next tick.

use crate::error::{SyncError, SyncResult};
use crate::models::{Role, Snapshot};
use crate::store::{lock_store, reconcile, SharedStore};
use crate::transport::{check_envelope, Action, Payload, Transport};
use crate::views::Presenter;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Lower bound for the polling period; a zero period would spin.
pub const MIN_POLL_PERIOD: Duration = Duration::from_secs(1);

/// What a session asks the backend to include.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncScope {
    pub role: Role,
    /// Role as sent on the wire. Defaults to the canonical name; a logged-in
    /// session uses the spelling its login reply carried.
    pub role_name: String,
    /// Reporting period forwarded to `getSyncData` (admin statistics).
    pub period: Option<String>,
}

impl SyncScope {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            role_name: role.as_str().to_string(),
            period: None,
        }
    }

    pub fn with_period(role: Role, period: impl Into<String>) -> Self {
        Self {
            period: Some(period.into()),
            ..Self::new(role)
        }
    }

    /// Send `name` instead of the canonical role name. Blank names are ignored.
    pub fn named(mut self, name: &str) -> Self {
        let name = name.trim();
        if !name.is_empty() {
            self.role_name = name.to_string();
        }
        self
    }

    fn payload(&self) -> Payload {
        let mut payload = Payload::new();
        payload.insert("role".to_string(), Value::String(self.role_name.clone()));
        if let Some(period) = &self.period {
            payload.insert("period".to_string(), Value::String(period.clone()));
        }
        payload
    }
}

/// Handle to one running periodic task.
#[derive(Debug, Clone)]
pub struct SyncHandle {
    scope: SyncScope,
    cancelled: Arc<AtomicBool>,
    abort: AbortHandle,
    store: SharedStore,
}

impl SyncHandle {
    pub fn scope(&self) -> &SyncScope {
        &self.scope
    }

    pub fn is_stopped(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Cancel the task. Once this returns, no reply belonging to this task
    /// reaches the store, including requests already in flight.
    pub fn stop(&self) {
        {
            // Reconciles check the flag while holding the store lock.
            let _store = lock_store(&self.store);
            self.cancelled.store(true, Ordering::SeqCst);
        }
        self.abort.abort();
    }
}

struct SyncContext {
    transport: Arc<dyn Transport>,
    store: SharedStore,
    presenter: Arc<Presenter>,
    scope: SyncScope,
    cancelled: Arc<AtomicBool>,
}

impl SyncContext {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    async fn sync_once(&self) -> SyncResult<bool> {
        let value = self
            .transport
            .call(Action::GetSyncData, self.scope.payload(), Action::GetSyncData.method())
            .await?;

        let snapshot = Snapshot::from_reply(check_envelope(value)?)?;

        let mut store = lock_store(&self.store);
        if self.is_cancelled() {
            debug!(role = %self.scope.role, "Dropping reply for a stopped session");
            return Ok(false);
        }

        let changed = reconcile(&mut store, snapshot);
        if changed {
            self.presenter.refresh_active(&store);
        }
        Ok(changed)
    }
}

pub struct SyncScheduler {
    transport: Arc<dyn Transport>,
    store: SharedStore,
    presenter: Arc<Presenter>,
    period: Duration,
    current: Mutex<Option<SyncHandle>>,
}

impl SyncScheduler {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: SharedStore,
        presenter: Arc<Presenter>,
        period: Duration,
    ) -> Self {
        if period < MIN_POLL_PERIOD {
            warn!(
                requested_ms = period.as_millis() as u64,
                "Poll period too short, using the minimum"
            );
        }
        Self {
            transport,
            store,
            presenter,
            period: period.max(MIN_POLL_PERIOD),
            current: Mutex::new(None),
        }
    }

    fn current(&self) -> MutexGuard<'_, Option<SyncHandle>> {
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn context(&self, scope: SyncScope, cancelled: Arc<AtomicBool>) -> SyncContext {
        SyncContext {
            transport: self.transport.clone(),
            store: self.store.clone(),
            presenter: self.presenter.clone(),
            scope,
            cancelled,
        }
    }

    pub fn start(&self, role: Role) -> SyncHandle {
        self.start_scope(SyncScope::new(role))
    }

    /// Stop any running task, fetch immediately, then every `period`.
    /// Must be called from within a Tokio runtime.
    pub fn start_scope(&self, scope: SyncScope) -> SyncHandle {
        let mut current = self.current();
        if let Some(previous) = current.take() {
            previous.stop();
        }

        let cancelled = Arc::new(AtomicBool::new(false));
        let context = self.context(scope.clone(), cancelled.clone());
        let period = self.period;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                // The first tick completes immediately.
                ticker.tick().await;
                if context.is_cancelled() {
                    break;
                }

                match context.sync_once().await {
                    Ok(changed) => debug!(role = %context.scope.role, changed, "Sync tick applied"),
                    Err(e) => warn!(role = %context.scope.role, error = %e, "Sync tick skipped"),
                }
            }
        });

        info!(role = %scope.role, period_secs = period.as_secs(), "Sync scheduler started");

        let handle = SyncHandle {
            scope,
            cancelled,
            abort: task.abort_handle(),
            store: self.store.clone(),
        };
        *current = Some(handle.clone());
        handle
    }

    /// Safe to call when nothing is running.
    pub fn stop(&self) {
        if let Some(handle) = self.current().take() {
            handle.stop();
            info!(role = %handle.scope.role, "Sync scheduler stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.current().as_ref().is_some_and(|h| !h.is_stopped())
    }

    pub fn scope(&self) -> Option<SyncScope> {
        self.current().as_ref().map(|h| h.scope.clone())
    }

    /// One out-of-band fetch for the running session, outside the timer.
    /// Bound to the session's cancellation like a regular tick.
    pub async fn resync(&self) -> SyncResult<bool> {
        let (scope, cancelled) = match self.current().as_ref() {
            Some(handle) if !handle.is_stopped() => {
                (handle.scope.clone(), handle.cancelled.clone())
            }
            _ => return Err(SyncError::NoSession),
        };

        self.context(scope, cancelled).sync_once().await
    }
}
