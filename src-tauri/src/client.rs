//! Session-level facade over the sync engine.

use crate::cart::Cart;
use crate::config::ClientConfig;
use crate::db::Settings;
use crate::dispatcher::MutationDispatcher;
use crate::error::{SyncError, SyncResult};
use crate::models::{EntityId, LoginUser, MutationAck, Role, TableStatus};
use crate::queries::Queries;
use crate::scheduler::{SyncScheduler, SyncScope};
use crate::store::{lock_store, shared_store, LocalStore, SharedStore};
use crate::transport::{HttpTransport, Transport};
use crate::views::{default_view, views_for_role, Presenter, RenderSink, RenderedView, ViewId, ViewRegistry};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::info;
use url::Url;

/// Where the app goes on launch.
pub enum Launch {
    /// No endpoint stored yet; show the setup flow.
    NeedsSetup,
    Ready(PosClient),
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Session {
    /// `None` for anonymous (public) browsing.
    pub user: Option<LoginUser>,
    pub role: Role,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableSelection {
    /// Table already has an open order.
    Occupied {
        table_id: EntityId,
        order_id: Option<EntityId>,
    },
    /// Table is now the cart's target and the menu is showing.
    Selected { table_id: EntityId },
}

pub struct PosClient {
    store: SharedStore,
    presenter: Arc<Presenter>,
    scheduler: Arc<SyncScheduler>,
    dispatcher: MutationDispatcher,
    queries: Queries,
    session: Mutex<Option<Session>>,
    cart: tokio::sync::Mutex<Cart>,
}

impl PosClient {
    pub fn bootstrap(
        settings: &Settings,
        config: &ClientConfig,
        sink: Arc<dyn RenderSink>,
    ) -> SyncResult<Launch> {
        match settings.endpoint()? {
            Some(endpoint) => Ok(Launch::Ready(Self::connect(endpoint, config, sink)?)),
            None => Ok(Launch::NeedsSetup),
        }
    }

    pub fn connect(endpoint: Url, config: &ClientConfig, sink: Arc<dyn RenderSink>) -> SyncResult<Self> {
        info!(endpoint = %endpoint, "Connecting to backend");
        let transport = HttpTransport::new(endpoint, config.request_timeout)?;
        Ok(Self::with_transport(
            Arc::new(transport),
            config.poll_interval,
            sink,
        ))
    }

    pub fn with_transport(
        transport: Arc<dyn Transport>,
        poll_interval: Duration,
        sink: Arc<dyn RenderSink>,
    ) -> Self {
        let store = shared_store();
        let presenter = Arc::new(Presenter::new(ViewRegistry::default(), sink));
        let scheduler = Arc::new(SyncScheduler::new(
            transport.clone(),
            store.clone(),
            presenter.clone(),
            poll_interval,
        ));

        Self {
            dispatcher: MutationDispatcher::new(transport.clone(), scheduler.clone()),
            queries: Queries::new(transport),
            store,
            presenter,
            scheduler,
            session: Mutex::new(None),
            cart: tokio::sync::Mutex::new(Cart::new()),
        }
    }

    fn session_guard(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn session(&self) -> Option<Session> {
        self.session_guard().clone()
    }

    pub fn role(&self) -> Option<Role> {
        self.session_guard().as_ref().map(|s| s.role)
    }

    /// Id of the logged-in user.
    pub fn user_id(&self) -> SyncResult<EntityId> {
        self.session_guard()
            .as_ref()
            .and_then(|s| s.user.as_ref())
            .map(|u| u.id.clone())
            .ok_or(SyncError::NoSession)
    }

    pub async fn login(&self, username: &str, password: &str) -> SyncResult<LoginUser> {
        let user = self.queries.login(username, password).await?;
        info!(user = %user.id, role = %user.role, "Logged in");
        self.begin_session(Some(user.clone()), user.role).await;
        Ok(user)
    }

    /// Anonymous read-only session (menu and table board).
    pub async fn browse_public(&self) -> ViewId {
        self.begin_session(None, Role::Public).await
    }

    async fn begin_session(&self, user: Option<LoginUser>, role: Role) -> ViewId {
        let has_session = self.session_guard().is_some();
        if has_session {
            self.logout().await;
        }

        let mut scope = SyncScope::new(role);
        if let Some(name) = user.as_ref().and_then(|u| u.role_name.as_deref()) {
            scope = scope.named(name);
        }

        *self.session_guard() = Some(Session { user, role });
        self.scheduler.start_scope(scope);

        let view = default_view(role);
        self.presenter.show(view, &lock_store(&self.store));
        view
    }

    /// Stop polling and drop everything tied to the session.
    pub async fn logout(&self) {
        self.scheduler.stop();
        lock_store(&self.store).clear();
        self.presenter.reset();
        self.cart.lock().await.clear();
        if let Some(session) = self.session_guard().take() {
            info!(role = %session.role, "Session ended");
        }
    }

    /// Switch the active view and draw it from the cache immediately. The
    /// next sync refreshes it.
    pub fn show_view(&self, view: ViewId) -> SyncResult<RenderedView> {
        let role = self.role().ok_or(SyncError::NoSession)?;
        if !views_for_role(role).contains(&view) {
            return Err(SyncError::ViewNotPermitted { view, role });
        }

        self.presenter
            .show(view, &lock_store(&self.store))
            .ok_or_else(|| SyncError::Validation(format!("No renderer for view '{}'", view)))
    }

    pub fn active_view(&self) -> Option<ViewId> {
        self.presenter.active()
    }

    /// Read access to the cache.
    pub fn read_store<R>(&self, read: impl FnOnce(&LocalStore) -> R) -> R {
        read(&lock_store(&self.store))
    }

    pub async fn select_table(&self, table_id: &EntityId) -> SyncResult<TableSelection> {
        let occupied = self.read_store(|store| {
            store
                .tables()
                .iter()
                .find(|t| &t.id == table_id && t.status == TableStatus::Occupied)
                .map(|t| t.orders.first().cloned())
        });

        if let Some(order_id) = occupied {
            return Ok(TableSelection::Occupied {
                table_id: table_id.clone(),
                order_id,
            });
        }

        self.require_order_taker()?;
        self.cart.lock().await.set_table(table_id.clone());
        self.show_view(ViewId::Menu)?;
        Ok(TableSelection::Selected {
            table_id: table_id.clone(),
        })
    }

    fn require_order_taker(&self) -> SyncResult<Role> {
        let role = self.role().ok_or(SyncError::NoSession)?;
        if !role.can_take_orders() {
            return Err(SyncError::Validation(format!(
                "Role '{}' cannot take orders",
                role
            )));
        }
        Ok(role)
    }

    pub async fn cart(&self) -> Cart {
        self.cart.lock().await.clone()
    }

    pub async fn add_to_cart(&self, product_id: &EntityId) -> SyncResult<Cart> {
        self.require_order_taker()?;
        let product = self
            .read_store(|store| store.products().iter().find(|p| &p.id == product_id).cloned())
            .ok_or_else(|| SyncError::Validation(format!("Unknown product {}", product_id)))?;

        let mut cart = self.cart.lock().await;
        cart.add(&product);
        Ok(cart.clone())
    }

    pub async fn remove_from_cart(&self, product_id: &EntityId) -> SyncResult<Cart> {
        let mut cart = self.cart.lock().await;
        cart.decrement(product_id);
        Ok(cart.clone())
    }

    /// Submit the cart for `table`, or for the table picked earlier.
    pub async fn submit_order(&self, table: Option<EntityId>) -> SyncResult<MutationAck> {
        self.require_order_taker()?;
        let waiter_id = self.user_id()?;

        let mut cart = self.cart.lock().await;
        let table = table
            .or_else(|| cart.table().cloned())
            .ok_or_else(|| SyncError::Validation("Select a table first".to_string()))?;

        self.dispatcher
            .submit_order(&mut cart, &table, &waiter_id)
            .await
    }

    pub fn dispatcher(&self) -> &MutationDispatcher {
        &self.dispatcher
    }

    pub fn queries(&self) -> &Queries {
        &self.queries
    }

    pub fn scheduler(&self) -> &SyncScheduler {
        &self.scheduler
    }
}
