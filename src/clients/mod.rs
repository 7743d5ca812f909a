//! Client handles the rest of the app talks to. Each wraps one or more
//! collection clients and the shared session.

#[macro_use]
mod macros;

pub mod cart_store;
pub mod menu_client;
pub mod order_client;
pub mod user_client;

pub use cart_store::CartStore;
pub use menu_client::MenuClient;
pub use order_client::{OrderClient, PlacedOrder, TrackedOrder};
pub use user_client::UserClient;
