//! Tick notifications for presentation collaborators
//!
//! Listeners are told about every completed tick, after all queue mutations
//! for that tick are done.

mod notifier;

pub use notifier::{EventNotifier, ListenerId, TickListener};
