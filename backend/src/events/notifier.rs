//! Subscription registry
//!
//! Two ways to follow the engine:
//! - synchronous listeners, called in subscription order at the end of each
//!   tick with the tick number
//! - channel subscriptions, which receive a [`TickResult`] per tick and never
//!   hold up the engine
//!
//! A listener must not panic; a panicking listener aborts the step it runs in.

use crate::orchestrator::TickResult;
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::warn;

/// Callback invoked after every completed tick
///
/// Closures taking the tick number implement this trait.
///
/// # Example
///
/// ```rust
/// use parking_simulator_core_rs::events::{EventNotifier, TickListener};
/// use std::sync::atomic::{AtomicU64, Ordering};
/// use std::sync::Arc;
///
/// let last = Arc::new(AtomicU64::new(0));
/// let seen = Arc::clone(&last);
///
/// let mut notifier = EventNotifier::new();
/// notifier.subscribe(Box::new(move |tick: u64| seen.store(tick, Ordering::SeqCst)));
/// assert_eq!(notifier.listener_count(), 1);
/// ```
pub trait TickListener: Send {
    fn on_tick_completed(&mut self, tick: u64);
}

impl<F> TickListener for F
where
    F: FnMut(u64) + Send,
{
    fn on_tick_completed(&mut self, tick: u64) {
        self(tick)
    }
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Registry of tick subscribers
#[derive(Default)]
pub struct EventNotifier {
    listeners: Vec<(ListenerId, Box<dyn TickListener>)>,
    channels: Vec<Sender<TickResult>>,
    next_id: u64,
}

impl EventNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Box<dyn TickListener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener; false if it was not subscribed
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Receive a result for every tick completed from now on
    ///
    /// Dropping the receiver ends the subscription.
    pub fn subscribe_channel(&mut self) -> Receiver<TickResult> {
        let (tx, rx) = mpsc::channel();
        self.channels.push(tx);
        rx
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Inform every subscriber that `result.tick` completed
    pub fn notify_all(&mut self, result: &TickResult) {
        for (_, listener) in self.listeners.iter_mut() {
            listener.on_tick_completed(result.tick);
        }

        let before = self.channels.len();
        self.channels.retain(|tx| tx.send(result.clone()).is_ok());
        let dropped = before - self.channels.len();
        if dropped > 0 {
            warn!(tick = result.tick, dropped, "tick channel receivers disconnected");
        }
    }
}

impl std::fmt::Debug for EventNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventNotifier")
            .field("listeners", &self.listeners.len())
            .field("channels", &self.channels.len())
            .finish()
    }
}
