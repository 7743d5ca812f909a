//! System orchestration, startup, and shutdown logic.

pub mod ordering_system;
pub mod telemetry;

pub use ordering_system::*;
pub use telemetry::*;
