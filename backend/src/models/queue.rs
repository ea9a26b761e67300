//! Flow queue
//!
//! Unbounded FIFO used for the entrance, payment and exit stages.
//! Removal order always equals insertion order; the only exception is
//! `requeue_front`, which puts back the element just taken from the front.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// First-in-first-out queue of waiting entities
///
/// An empty queue is a normal condition: `dequeue` and `peek` return `None`.
///
/// # Example
/// ```
/// use parking_simulator_core_rs::FlowQueue;
///
/// let mut queue = FlowQueue::new();
/// queue.enqueue("A");
/// queue.enqueue("B");
///
/// assert_eq!(queue.dequeue(), Some("A"));
/// assert_eq!(queue.dequeue(), Some("B"));
/// assert_eq!(queue.dequeue(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowQueue<T> {
    items: VecDeque<T>,
}

impl<T> Default for FlowQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FlowQueue<T> {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// Append to the back
    pub fn enqueue(&mut self, item: T) {
        self.items.push_back(item);
    }

    /// Remove and return the front element
    pub fn dequeue(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Front element without removing it
    pub fn peek(&self) -> Option<&T> {
        self.items.front()
    }

    /// Put an element back at the front
    ///
    /// Only meant for returning the element that was just dequeued, so the
    /// queue's FIFO order is left as it was before the dequeue.
    pub fn requeue_front(&mut self, item: T) {
        self.items.push_front(item);
    }

    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Front-to-back iteration for display
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T: Clone> FlowQueue<T> {
    /// Owned front-to-back copy of the contents
    pub fn snapshot(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}
