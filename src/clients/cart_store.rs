use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{Cart, CartItem, CartSnapshot, MenuItem, RecordId};
use crate::error::CartError;
use crate::session::SessionContext;

/// Local mirror of the shared cart record.
///
/// Every mutation computes the next cart from the local copy, overwrites
/// the stored cart with it, and then adopts the computed cart. The store's
/// reply is not merged back, so concurrent writers are last-write-wins.
#[derive(Clone)]
pub struct CartStore {
    inner: ResourceClient<Cart>,
    cart_id: RecordId,
    session: SessionContext,
    current: Arc<watch::Sender<Cart>>,
}

impl CartStore {
    pub fn new(inner: ResourceClient<Cart>, cart_id: RecordId, session: SessionContext) -> Self {
        let (current, _) = watch::channel(Cart::empty(cart_id.clone()));
        Self {
            inner,
            cart_id,
            session,
            current: Arc::new(current),
        }
    }

    pub fn cart_id(&self) -> &RecordId {
        &self.cart_id
    }

    pub fn current(&self) -> Cart {
        self.current.borrow().clone()
    }

    /// Fires whenever the local cart changes, e.g. for an item-count badge.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.current.subscribe()
    }

    fn adopt(&self, cart: Cart) -> Cart {
        self.current.send_replace(cart.clone());
        cart
    }

    #[instrument(skip(self), fields(cart_id = %self.cart_id))]
    pub async fn fetch(&self) -> Result<Cart, CartError> {
        debug!("Sending request");
        let cart = self
            .inner
            .get(self.cart_id.clone())
            .await?
            .ok_or_else(|| CartError::NotFound(self.cart_id.clone()))?;
        Ok(self.adopt(cart))
    }

    /// Replaces the whole item list of the stored cart.
    #[instrument(skip(self, items), fields(cart_id = %self.cart_id, lines = items.len()))]
    pub async fn mutate(&self, items: Vec<CartItem>) -> Result<Cart, CartError> {
        let next = Cart {
            id: self.cart_id.clone(),
            items,
        };
        debug!("Sending request");
        self.inner.replace(self.cart_id.clone(), next.clone()).await?;
        Ok(self.adopt(next))
    }

    /// A zero quantity leaves the cart untouched.
    #[instrument(skip(self, name))]
    pub async fn add_item(
        &self,
        menu_id: RecordId,
        quantity: u32,
        name: &str,
        price: f64,
    ) -> Result<Cart, CartError> {
        let cart = self.current();
        if quantity == 0 {
            return Ok(cart);
        }
        let next = cart.with_added(&menu_id, quantity, name, price);
        let cart = self.mutate(next.items).await?;
        info!(%menu_id, quantity, "Item added to cart");
        Ok(cart)
    }

    /// Quantities below one are ignored; use [`CartStore::remove_item`].
    #[instrument(skip(self))]
    pub async fn update_quantity(&self, menu_id: RecordId, quantity: i64) -> Result<Cart, CartError> {
        let cart = self.current();
        match cart.with_quantity(&menu_id, quantity) {
            Some(next) => self.mutate(next.items).await,
            None => {
                debug!("Ignoring non-positive quantity");
                Ok(cart)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn remove_item(&self, menu_id: RecordId) -> Result<Cart, CartError> {
        let next = self.current().without(&menu_id);
        self.mutate(next.items).await
    }

    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<Cart, CartError> {
        self.mutate(Vec::new()).await
    }

    pub fn total(&self, catalog: &[MenuItem]) -> f64 {
        self.current().total(catalog)
    }

    /// Freezes the cart for the payment page and keeps it in the session
    /// under `cart`.
    pub fn checkout_snapshot(&self, catalog: &[MenuItem]) -> Result<CartSnapshot, CartError> {
        let snapshot = self.current().snapshot(catalog);
        self.session.store_cart_snapshot(&snapshot)?;
        info!(lines = snapshot.items.len(), total = snapshot.total, "Checkout snapshot stored");
        Ok(snapshot)
    }
}
