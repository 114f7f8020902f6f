//! LIFO Stack
//!
//! Push and pop at one end only. Popping an empty stack returns `None`,
//! which the command layer reports as the `EMPTY` sentinel.

/// A last-in, first-out sequence of strings.
#[derive(Debug, Default)]
pub struct Stack {
    items: Vec<String>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends a value to the top. Always succeeds.
    pub fn push(&mut self, value: String) {
        self.items.push(value);
    }

    /// Removes and returns the top value, or `None` if the stack is empty.
    pub fn pop(&mut self) -> Option<String> {
        self.items.pop()
    }

    /// Returns the top value without removing it.
    pub fn peek(&self) -> Option<&str> {
        self.items.last().map(String::as_str)
    }

    /// Iterates from bottom to top (the order pushes must be replayed in
    /// to reconstruct the stack).
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }
}
