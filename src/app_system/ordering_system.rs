use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::actor_framework::{Entity, ResourceActor, ResourceClient};
use crate::clients::{CartStore, MenuClient, OrderClient, UserClient};
use crate::config::{Backend, Config};
use crate::domain::{next_timestamp_id, static_catalog, Cart, MenuItem, Order, RecordId, User};
use crate::error::SessionError;
use crate::http_store::HttpResourceActor;
use crate::session::SessionContext;
use crate::tracking::DeliveryTracker;

const CHANNEL_SIZE: usize = 32;

/// The running client: one actor per collection plus the handles that
/// talk to them.
pub struct OrderingSystem {
    pub session: SessionContext,
    pub users: UserClient,
    pub menu: MenuClient,
    pub cart: CartStore,
    pub orders: OrderClient,
    tracking_tick: Duration,
    handles: Vec<JoinHandle<()>>,
}

struct Collections {
    users: ResourceClient<User>,
    menu: ResourceClient<MenuItem>,
    carts: ResourceClient<Cart>,
    orders: ResourceClient<Order>,
}

impl OrderingSystem {
    pub fn start(config: &Config) -> Result<Self, SessionError> {
        let session = match &config.session_file {
            Some(path) => SessionContext::open(path)?,
            None => SessionContext::in_memory(),
        };
        let system = match config.backend {
            Backend::Memory => Self::in_memory(session, config.cart_id.clone(), config.tracking_tick),
            Backend::Http => Self::over_http(session, config),
        };
        Ok(system)
    }

    /// Offline mode: in-process collections seeded with the built-in menu
    /// and an empty shared cart.
    pub fn in_memory(session: SessionContext, cart_id: RecordId, tracking_tick: Duration) -> Self {
        info!("Starting in-memory collections");
        let mut handles = Vec::new();

        let users = spawn_memory::<User>(&mut handles, Vec::new());
        let menu = spawn_memory(&mut handles, static_catalog());
        let carts = spawn_memory(&mut handles, vec![Cart::empty(cart_id.clone())]);
        let orders = spawn_memory::<Order>(&mut handles, Vec::new());

        Self::wire(
            session,
            cart_id,
            tracking_tick,
            Collections {
                users,
                menu,
                carts,
                orders,
            },
            handles,
        )
    }

    pub fn over_http(session: SessionContext, config: &Config) -> Self {
        info!(api_base = %config.api_base, "Connecting to mock data server");
        let http = reqwest::Client::new();
        let mut handles = Vec::new();

        let users = spawn_http::<User>(&mut handles, &http, &config.api_base);
        let menu = spawn_http::<MenuItem>(&mut handles, &http, &config.api_base);
        let carts = spawn_http::<Cart>(&mut handles, &http, &config.api_base);
        let orders = spawn_http::<Order>(&mut handles, &http, &config.api_base);

        Self::wire(
            session,
            config.cart_id.clone(),
            config.tracking_tick,
            Collections {
                users,
                menu,
                carts,
                orders,
            },
            handles,
        )
    }

    fn wire(
        session: SessionContext,
        cart_id: RecordId,
        tracking_tick: Duration,
        collections: Collections,
        handles: Vec<JoinHandle<()>>,
    ) -> Self {
        let cart = CartStore::new(collections.carts, cart_id, session.clone());
        let orders = OrderClient::new(collections.orders, cart.clone(), session.clone());
        Self {
            users: UserClient::new(collections.users, session.clone()),
            menu: MenuClient::new(collections.menu),
            cart,
            orders,
            session,
            tracking_tick,
            handles,
        }
    }

    /// Starts the delivery timeline for an order. Drop the tracker to stop it.
    pub fn track(&self, order_id: RecordId) -> DeliveryTracker {
        DeliveryTracker::start(order_id, self.tracking_tick)
    }

    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");
        let Self {
            users,
            menu,
            cart,
            orders,
            handles,
            ..
        } = self;

        // Dropping every client closes the actor channels.
        drop(orders);
        drop(cart);
        drop(menu);
        drop(users);

        for handle in handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}

fn spawn_memory<T: Entity>(handles: &mut Vec<JoinHandle<()>>, seed: Vec<T>) -> ResourceClient<T> {
    let (actor, client) = ResourceActor::<T>::new(CHANNEL_SIZE, next_timestamp_id);
    handles.push(tokio::spawn(actor.seeded(seed).run()));
    client
}

fn spawn_http<T: Entity>(
    handles: &mut Vec<JoinHandle<()>>,
    http: &reqwest::Client,
    base_url: &str,
) -> ResourceClient<T> {
    let (actor, client) = HttpResourceActor::<T>::new(CHANNEL_SIZE, http.clone(), base_url);
    handles.push(tokio::spawn(actor.run()));
    client
}
