use chrono::{DateTime, Utc};
use tracing::{error, info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::clients::CartStore;
use crate::domain::{CartSnapshot, Order, PaymentMethod, RecordId, User};
use crate::error::{CheckoutError, OrderError};
use crate::history::OrderHistory;
use crate::session::SessionContext;

/// Shown above the placeholder when the real order cannot be loaded.
pub const DEMO_MODE_NOTICE: &str = "Failed to load order details";

/// Result of a successful checkout, handed to the tracking page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOrder {
    pub order: Order,
    /// Shows the order success popup on arrival.
    pub just_placed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackedOrder {
    pub order: Order,
    pub notice: Option<String>,
}

impl TrackedOrder {
    pub fn is_placeholder(&self) -> bool {
        self.notice.is_some()
    }
}

/// Checkout orchestration plus order reads.
///
/// Placing an order touches three places: the `orders` collection, the
/// shared cart and the session snapshot. They are written in that order
/// and nothing is rolled back if a later step fails.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    cart: CartStore,
    session: SessionContext,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>, cart: CartStore, session: SessionContext) -> Self {
        Self {
            inner,
            cart,
            session,
        }
    }

    #[instrument(skip(self, snapshot, user, notes), fields(lines = snapshot.items.len()))]
    pub async fn place_order(
        &self,
        snapshot: &CartSnapshot,
        user: Option<&User>,
        payment_method: Option<PaymentMethod>,
        notes: &str,
    ) -> Result<PlacedOrder, CheckoutError> {
        info!("Processing place_order request (Client Side)");

        // Step 1: Validate input
        let payment_method = payment_method.ok_or(CheckoutError::PaymentMethodMissing)?;
        if snapshot.is_empty() {
            warn!("Checkout attempted with an empty cart");
            return Err(CheckoutError::EmptyCart);
        }

        // Step 2: Create the order from the snapshot
        let mut order = Order::from_snapshot(snapshot, user, payment_method, notes, Utc::now());
        order.id = self.inner.create(order.clone()).await.map_err(|e| {
            error!(error = %e, "Order creation failed");
            e
        })?;
        info!(order_id = %order.id, total = order.total, "Order created");

        // Step 3: Empty the shared cart and the session snapshot
        self.cart.clear().await.map_err(|e| {
            error!(error = %e, order_id = %order.id, "Cart clear failed after order creation");
            e
        })?;
        self.session.store_cart_snapshot(&CartSnapshot::default())?;

        Ok(PlacedOrder {
            order,
            just_placed: true,
        })
    }

    /// Loads the order for the tracking page. Any failure yields the
    /// placeholder order together with a notice.
    #[instrument(skip(self))]
    pub async fn track_order(&self, id: RecordId) -> TrackedOrder {
        let failure = match self.inner.get(id.clone()).await {
            Ok(Some(order)) => return TrackedOrder { order, notice: None },
            Ok(None) => OrderError::NotFound(id.clone()),
            Err(e) => OrderError::Store(e),
        };
        warn!(error = %failure, "Showing placeholder order");
        TrackedOrder {
            order: Order::placeholder(id, Utc::now()),
            notice: Some(DEMO_MODE_NOTICE.to_string()),
        }
    }

    /// Every stored order, newest first.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, OrderError> {
        Ok(self.order_history(Utc::now()).await?.into_orders())
    }

    #[instrument(skip(self))]
    pub async fn order_history(&self, now: DateTime<Utc>) -> Result<OrderHistory, OrderError> {
        let orders = self.inner.list(None).await?;
        info!(count = orders.len(), "Orders loaded");
        Ok(OrderHistory::build(orders, now))
    }
}

impl_record_lookups!(OrderClient, Order, OrderError, order);
