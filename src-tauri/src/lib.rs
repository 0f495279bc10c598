//! Client-side sync engine for the Coffee Bell point of sale.
//!
//! The backend is a single remote endpoint. This crate keeps a role-scoped
//! local cache of it fresh by polling, renders views from that cache, and
//! routes every write through the backend followed by a resync.

pub mod cart;
pub mod client;
pub mod config;
pub mod db;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod models;
pub mod queries;
pub mod scheduler;
pub mod store;
pub mod transport;
pub mod views;

#[cfg(feature = "desktop")]
mod commands;


pub use client::{Launch, PosClient, Session, TableSelection};
pub use config::ClientConfig;
pub use db::Settings;
pub use error::{ErrorKind, SyncError, SyncResult};
pub use scheduler::{SyncHandle, SyncScheduler, SyncScope};
pub use store::{LocalStore, SharedStore};
pub use transport::{Action, HttpTransport, Method, Transport};
pub use views::{RenderSink, RenderedView, ViewId};

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use commands::{inventory, orders, products, reports, session, tables, ClientState, EventSink};
    use std::sync::Arc;
    use tauri::Manager;

    let config = ClientConfig::from_env();
    logging::init(&config.log_level);

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .setup(move |app| {
            let settings = Settings::new(app.handle())?;
            let sink = Arc::new(EventSink::new(app.handle().clone()));

            let client = match PosClient::bootstrap(&settings, &config, sink)? {
                Launch::Ready(client) => Some(client),
                Launch::NeedsSetup => {
                    tracing::info!("No backend endpoint configured, showing setup");
                    None
                }
            };

            app.manage(settings);
            app.manage(ClientState::new(client, config.clone()));
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Session
            session::needs_setup,
            session::save_api_url,
            session::login,
            session::browse_public,
            session::logout,
            session::get_session,
            session::show_view,
            session::get_active_view,
            // Orders
            orders::select_table,
            orders::get_cart,
            orders::add_to_cart,
            orders::remove_from_cart,
            orders::submit_order,
            orders::update_order_status,
            // Tables
            tables::get_tables_status,
            tables::add_table,
            tables::delete_table,
            // Products
            products::get_products,
            products::add_product,
            products::update_product_price,
            products::get_recipe,
            products::add_recipe_item,
            products::delete_recipe_item,
            // Inventory
            inventory::add_inventory_item,
            inventory::update_inventory,
            inventory::get_inventory_logs,
            // Reports
            reports::register_expense,
            reports::get_dashboard_stats,
            reports::get_advanced_stats,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
