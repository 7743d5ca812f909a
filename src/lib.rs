//! Client core for the Urbanzest restaurant: menu, cart, checkout, live
//! order tracking and order history over a mock JSON document store.

pub mod actor_framework;
pub mod app_system;
pub mod clients;
pub mod config;
pub mod domain;
pub mod entities;
pub mod error;
pub mod history;
pub mod http_store;
pub mod router;
pub mod session;
pub mod tracking;

#[cfg(test)]
mod mock_framework;
