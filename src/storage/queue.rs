//! FIFO Queue
//!
//! Enqueue at the tail, dequeue at the head. Dequeuing an empty queue
//! returns `None`, reported at the wire as `EMPTY`. Values come out in
//! exactly the order they went in; the global dispatch lock keeps that true
//! under concurrent connections.

use std::collections::VecDeque;

/// A first-in, first-out sequence of strings.
#[derive(Debug, Default)]
pub struct Queue {
    items: VecDeque<String>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends a value at the tail. Always succeeds.
    pub fn enqueue(&mut self, value: String) {
        self.items.push_back(value);
    }

    /// Removes and returns the head value, or `None` if the queue is empty.
    pub fn dequeue(&mut self) -> Option<String> {
        self.items.pop_front()
    }

    /// Iterates from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }
}
