//! Per-view renderers and the dispatch that redraws only the active view.
//!
//! A renderer is a pure read of [`LocalStore`]: no I/O, and the same store
//! always renders to the same [`RenderedView`]. How a rendered view reaches
//! the screen is up to the [`RenderSink`].

use crate::models::{EntityId, Expense, OrderStatus, Product, Role, TableStatus};
use crate::store::LocalStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ViewId {
    Dashboard,
    Tables,
    Menu,
    Kitchen,
    Cashier,
    Inventory,
    Finance,
    Products,
}

impl ViewId {
    pub const ALL: [ViewId; 8] = [
        ViewId::Dashboard,
        ViewId::Tables,
        ViewId::Menu,
        ViewId::Kitchen,
        ViewId::Cashier,
        ViewId::Inventory,
        ViewId::Finance,
        ViewId::Products,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewId::Dashboard => "dashboard",
            ViewId::Tables => "tables",
            ViewId::Menu => "menu",
            ViewId::Kitchen => "kitchen",
            ViewId::Cashier => "cashier",
            ViewId::Inventory => "inventory",
            ViewId::Finance => "finance",
            ViewId::Products => "products",
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Navigation policy: which views a role may open.
pub fn views_for_role(role: Role) -> BTreeSet<ViewId> {
    match role {
        Role::Admin => ViewId::ALL.into_iter().collect(),
        Role::Waiter => [ViewId::Tables, ViewId::Menu].into_iter().collect(),
        Role::Kitchen => [ViewId::Kitchen].into_iter().collect(),
        Role::Cashier => [ViewId::Cashier].into_iter().collect(),
        Role::Public => [ViewId::Menu, ViewId::Tables].into_iter().collect(),
    }
}

/// Landing view after login.
pub fn default_view(role: Role) -> ViewId {
    match role {
        Role::Admin => ViewId::Dashboard,
        Role::Waiter => ViewId::Tables,
        Role::Kitchen => ViewId::Kitchen,
        Role::Cashier => ViewId::Cashier,
        Role::Public => ViewId::Menu,
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum RenderedView {
    Dashboard(DashboardView),
    Tables(TablesView),
    Menu(MenuView),
    Kitchen(KitchenView),
    Cashier(CashierView),
    Inventory(InventoryView),
    Finance(FinanceView),
    Products(ProductsView),
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DashboardView {
    pub total_sales: f64,
    pub order_count: usize,
    pub top_products: Vec<Value>,
    pub waiter_performance: Vec<Value>,
    pub period: Option<String>,
    pub last_sync_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TableTile {
    pub id: EntityId,
    pub label: String,
    pub status: TableStatus,
    pub current_order: Option<EntityId>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TablesView {
    pub tiles: Vec<TableTile>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MenuCategory {
    pub name: String,
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MenuView {
    pub categories: Vec<MenuCategory>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TicketLine {
    pub quantity: f64,
    pub name: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct KitchenTicket {
    pub order_id: EntityId,
    pub table_number: EntityId,
    pub lines: Vec<TicketLine>,
    pub status: OrderStatus,
    pub updated_at: Option<String>,
    pub can_mark_ready: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct KitchenView {
    pub tickets: Vec<KitchenTicket>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CashierRow {
    pub order_id: EntityId,
    pub short_id: String,
    pub table_number: EntityId,
    pub waiter_id: Option<EntityId>,
    pub total: f64,
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CashierView {
    pub rows: Vec<CashierRow>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct InventoryRow {
    pub id: EntityId,
    pub name: String,
    pub unit: String,
    pub current_stock: f64,
    pub min_stock: f64,
    pub low_stock: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct InventoryView {
    pub rows: Vec<InventoryRow>,
    pub low_stock_count: usize,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FinanceView {
    pub sales: f64,
    pub expenses_total: f64,
    pub profit: f64,
    /// Newest first.
    pub expenses: Vec<Expense>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ProductsView {
    pub rows: Vec<Product>,
}

fn paid_sales(store: &LocalStore) -> f64 {
    store
        .orders()
        .iter()
        .filter(|o| o.status == OrderStatus::Paid)
        .map(|o| o.total)
        .sum()
}

pub fn render_dashboard(store: &LocalStore) -> RenderedView {
    let stats = store.stats().cloned().unwrap_or_default();
    RenderedView::Dashboard(DashboardView {
        total_sales: paid_sales(store),
        order_count: store.orders().len(),
        top_products: stats.top_products,
        waiter_performance: stats.waiter_performance,
        period: stats.period,
        last_sync_at: store.last_sync_at(),
    })
}

pub fn render_tables(store: &LocalStore) -> RenderedView {
    let tiles = store
        .tables()
        .iter()
        .map(|t| TableTile {
            id: t.id.clone(),
            label: t.display_label(),
            status: t.status,
            current_order: t.orders.first().cloned(),
        })
        .collect();
    RenderedView::Tables(TablesView { tiles })
}

pub fn render_menu(store: &LocalStore) -> RenderedView {
    let mut categories: Vec<MenuCategory> = Vec::new();

    for product in store.products() {
        let name = if product.category.trim().is_empty() {
            "General"
        } else {
            product.category.as_str()
        };
        match categories.iter_mut().find(|c| c.name == name) {
            Some(category) => category.products.push(product.clone()),
            None => categories.push(MenuCategory {
                name: name.to_string(),
                products: vec![product.clone()],
            }),
        }
    }

    RenderedView::Menu(MenuView { categories })
}

pub fn render_kitchen(store: &LocalStore) -> RenderedView {
    let tickets = store
        .orders()
        .iter()
        .filter(|o| o.status != OrderStatus::Paid)
        .map(|o| KitchenTicket {
            order_id: o.id.clone(),
            table_number: o.table_number.clone(),
            lines: o
                .items
                .iter()
                .map(|i| TicketLine {
                    quantity: i.quantity,
                    name: i.display_name().to_string(),
                })
                .collect(),
            status: o.status,
            updated_at: o.updated_at.clone(),
            can_mark_ready: o.status != OrderStatus::Ready,
        })
        .collect();
    RenderedView::Kitchen(KitchenView { tickets })
}

pub fn render_cashier(store: &LocalStore) -> RenderedView {
    let rows = store
        .orders()
        .iter()
        .filter(|o| o.status != OrderStatus::Paid)
        .map(|o| CashierRow {
            order_id: o.id.clone(),
            short_id: short_id(&o.id),
            table_number: o.table_number.clone(),
            waiter_id: o.waiter_id.clone(),
            total: o.total,
            status: o.status,
        })
        .collect();
    RenderedView::Cashier(CashierView { rows })
}

fn short_id(id: &EntityId) -> String {
    let full = id.to_string();
    let count = full.chars().count();
    full.chars().skip(count.saturating_sub(4)).collect()
}

pub fn render_inventory(store: &LocalStore) -> RenderedView {
    let rows: Vec<InventoryRow> = store
        .inventory()
        .iter()
        .map(|item| InventoryRow {
            id: item.id.clone(),
            name: item.name.clone(),
            unit: item.unit.clone(),
            current_stock: item.current_stock,
            min_stock: item.min_stock,
            low_stock: item.is_low_stock(),
        })
        .collect();
    let low_stock_count = rows.iter().filter(|r| r.low_stock).count();
    RenderedView::Inventory(InventoryView {
        rows,
        low_stock_count,
    })
}

pub fn render_finance(store: &LocalStore) -> RenderedView {
    let sales = paid_sales(store);
    let expenses_total: f64 = store.expenses().iter().map(|e| e.amount).sum();
    // The backend appends expenses chronologically.
    let expenses = store.expenses().iter().rev().cloned().collect();
    RenderedView::Finance(FinanceView {
        sales,
        expenses_total,
        profit: sales - expenses_total,
        expenses,
    })
}

pub fn render_products(store: &LocalStore) -> RenderedView {
    RenderedView::Products(ProductsView {
        rows: store.products().to_vec(),
    })
}

pub type Renderer = fn(&LocalStore) -> RenderedView;

/// View id → renderer.
pub struct ViewRegistry {
    renderers: HashMap<ViewId, Renderer>,
}

impl ViewRegistry {
    pub fn empty() -> Self {
        Self {
            renderers: HashMap::new(),
        }
    }

    pub fn register(&mut self, view: ViewId, renderer: Renderer) {
        self.renderers.insert(view, renderer);
    }

    pub fn contains(&self, view: ViewId) -> bool {
        self.renderers.contains_key(&view)
    }

    pub fn render(&self, view: ViewId, store: &LocalStore) -> Option<RenderedView> {
        self.renderers.get(&view).map(|render| render(store))
    }
}

impl Default for ViewRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(ViewId::Dashboard, render_dashboard);
        registry.register(ViewId::Tables, render_tables);
        registry.register(ViewId::Menu, render_menu);
        registry.register(ViewId::Kitchen, render_kitchen);
        registry.register(ViewId::Cashier, render_cashier);
        registry.register(ViewId::Inventory, render_inventory);
        registry.register(ViewId::Finance, render_finance);
        registry.register(ViewId::Products, render_products);
        registry
    }
}

/// Receives rendered views for display.
pub trait RenderSink: Send + Sync {
    fn present(&self, view: ViewId, rendered: &RenderedView);
}

/// Tracks the active view and pushes its renders to the sink.
pub struct Presenter {
    registry: ViewRegistry,
    active: Mutex<Option<ViewId>>,
    sink: Arc<dyn RenderSink>,
}

impl Presenter {
    pub fn new(registry: ViewRegistry, sink: Arc<dyn RenderSink>) -> Self {
        Self {
            registry,
            active: Mutex::new(None),
            sink,
        }
    }

    pub fn active(&self) -> Option<ViewId> {
        *self.active.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make `view` active and draw it from whatever is cached right now.
    pub fn show(&self, view: ViewId, store: &LocalStore) -> Option<RenderedView> {
        *self.active.lock().unwrap_or_else(|e| e.into_inner()) = Some(view);
        self.draw(view, store)
    }

    /// Redraw the active view only.
    pub fn refresh_active(&self, store: &LocalStore) -> Option<RenderedView> {
        let view = self.active()?;
        self.draw(view, store)
    }

    pub fn reset(&self) {
        *self.active.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    fn draw(&self, view: ViewId, store: &LocalStore) -> Option<RenderedView> {
        let rendered = self.registry.render(view, store)?;
        self.sink.present(view, &rendered);
        Some(rendered)
    }
}
