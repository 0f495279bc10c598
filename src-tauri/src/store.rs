//! Local cache of the backend's collections and the reconciler that merges
//! snapshots into it.
//!
//! Collections are replaced whole: the backend always sends a collection in
//! full when it sends it at all, so there is no per-record merge. A snapshot
//! that omits a collection leaves the cached copy untouched.

use crate::models::{Expense, InventoryItem, Order, Product, Snapshot, Stats, Table};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};

/// Store shared between the scheduler, the dispatcher and the views.
pub type SharedStore = Arc<Mutex<LocalStore>>;

pub fn shared_store() -> SharedStore {
    Arc::new(Mutex::new(LocalStore::default()))
}

/// The store only holds plain data, so a panic while it was locked cannot
/// leave it half-updated in a way later readers care about.
pub fn lock_store(store: &SharedStore) -> MutexGuard<'_, LocalStore> {
    store.lock().unwrap_or_else(|e| e.into_inner())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalStore {
    tables: Vec<Table>,
    products: Vec<Product>,
    orders: Vec<Order>,
    inventory: Vec<InventoryItem>,
    expenses: Vec<Expense>,
    stats: Option<Stats>,
    server_timestamp: Option<Value>,
    last_sync_at: Option<DateTime<Utc>>,
    passes: u64,
}

impl LocalStore {
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn inventory(&self) -> &[InventoryItem] {
        &self.inventory
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn stats(&self) -> Option<&Stats> {
        self.stats.as_ref()
    }

    /// `timestamp` field of the last applied snapshot, as the server sent it.
    pub fn server_timestamp(&self) -> Option<&Value> {
        self.server_timestamp.as_ref()
    }

    pub fn last_sync_at(&self) -> Option<DateTime<Utc>> {
        self.last_sync_at
    }

    /// Number of reconcile passes applied since the store was created or
    /// last cleared.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn is_empty(&self) -> bool {
        self.passes == 0
    }

    /// Session teardown.
    pub(crate) fn clear(&mut self) {
        *self = LocalStore::default();
    }
}

/// Merge `snapshot` into `store`, stamping the sync time with the current
/// clock. Returns whether any collection changed.
pub fn reconcile(store: &mut LocalStore, snapshot: Snapshot) -> bool {
    reconcile_at(store, snapshot, Utc::now())
}

pub fn reconcile_at(store: &mut LocalStore, snapshot: Snapshot, now: DateTime<Utc>) -> bool {
    let Snapshot {
        tables,
        products,
        orders,
        inventory,
        expenses,
        stats,
        timestamp,
    } = snapshot;

    let mut changed = false;
    changed |= replace(&mut store.tables, tables);
    changed |= replace(&mut store.products, products);
    changed |= replace(&mut store.orders, orders);
    changed |= replace(&mut store.inventory, inventory);
    changed |= replace(&mut store.expenses, expenses);
    if let Some(stats) = stats {
        changed |= replace(&mut store.stats, Some(Some(stats)));
    }

    if timestamp.is_some() {
        store.server_timestamp = timestamp;
    }
    store.last_sync_at = Some(now);
    store.passes += 1;

    changed
}

fn replace<T: PartialEq>(slot: &mut T, incoming: Option<T>) -> bool {
    match incoming {
        Some(value) if *slot != value => {
            *slot = value;
            true
        }
        _ => false,
    }
}
