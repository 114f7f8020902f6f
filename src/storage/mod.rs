//! Store Data Structures and Persistence
//!
//! The four in-process structures behind the command protocol, the `Store`
//! that owns them, and the snapshot layer that persists them.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                        Store                           │
//! │  ┌───────────┐ ┌───────┐ ┌─────────┐ ┌─────────┐      │
//! │  │ HashTable │ │  Set  │ │  Stack  │ │  Queue  │      │
//! │  │ (chained) │ │       │ │ (LIFO)  │ │ (FIFO)  │      │
//! │  └───────────┘ └───────┘ └─────────┘ └─────────┘      │
//! └───────────────────────▲────────────────────────────────┘
//!                         │ one process-wide Mutex
//!             every connection's dispatch
//! ```
//!
//! The structures themselves are single-threaded; all concurrency control
//! lives in the one global lock around command dispatch (see
//! [`store::SharedStore`]). The hash table and set share one hashing
//! discipline: `DefaultHasher` reduced modulo a bucket count that is fixed
//! at construction.

pub mod queue;
pub mod set;
pub mod snapshot;
pub mod stack;
pub mod store;
pub mod table;

pub use queue::Queue;
pub use set::Set;
pub use stack::Stack;
pub use store::{SharedStore, Store};
pub use table::{Entry, HashTable, DEFAULT_CAPACITY};
