//! Data model of the ordering client. Plain data plus the pure rules that
//! act on it; nothing here touches the network or the session.

pub mod cart;
pub mod ids;
pub mod menu;
pub mod order;
pub mod user;

pub use cart::*;
pub use ids::*;
pub use menu::*;
pub use order::*;
pub use user::*;
