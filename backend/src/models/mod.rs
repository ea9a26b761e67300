//! Domain models for the parking simulator

pub mod car;
pub mod event;
pub mod queue;

// Re-exports
pub use car::{Car, CarKind};
pub use event::{Event, EventLog};
pub use queue::FlowQueue;
