//! Hashed String Set
//!
//! An unordered collection of unique strings, bucketed with the same hashing
//! discipline as the hash table (fixed buckets, chaining, `DefaultHasher`
//! modulo capacity). Add is idempotent; removing a non-member is a reported
//! no-op, never an error.

use std::hash::{DefaultHasher, Hash, Hasher};

use crate::storage::table::DEFAULT_CAPACITY;

/// An unordered set of unique strings.
#[derive(Debug)]
pub struct Set {
    buckets: Vec<Vec<String>>,
    len: usize,
}

impl Set {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "set needs at least one bucket");
        Self {
            buckets: (0..capacity).map(|_| Vec::new()).collect(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn bucket_index(&self, member: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        member.hash(&mut hasher);
        (hasher.finish() as usize) % self.buckets.len()
    }

    /// Adds a member. Returns `true` if newly added, `false` if it was
    /// already present.
    pub fn add(&mut self, member: String) -> bool {
        let idx = self.bucket_index(&member);
        if self.buckets[idx].iter().any(|m| *m == member) {
            return false;
        }
        self.buckets[idx].push(member);
        self.len += 1;
        true
    }

    /// Removes a member. Returns `true` if removed, `false` if absent.
    pub fn remove(&mut self, member: &str) -> bool {
        let idx = self.bucket_index(member);
        if let Some(pos) = self.buckets[idx].iter().position(|m| m == member) {
            self.buckets[idx].remove(pos);
            self.len -= 1;
            true
        } else {
            false
        }
    }

    /// Membership test.
    pub fn contains(&self, member: &str) -> bool {
        let idx = self.bucket_index(member);
        self.buckets[idx].iter().any(|m| m == member)
    }

    /// Iterates over every member, in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.buckets
            .iter()
            .flat_map(|chain| chain.iter().map(String::as_str))
    }
}

impl Default for Set {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut set = Set::new();

        assert!(set.add("x".into()));
        assert!(!set.add("x".into())); // second add reports "already present"
        assert_eq!(set.len(), 1);
        assert!(set.contains("x"));
    }

    #[test]
    fn test_remove() {
        let mut set = Set::new();

        set.add("x".into());
        assert!(set.remove("x"));
        assert!(!set.contains("x"));
        assert!(!set.remove("x")); // non-member removal is a no-op
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_contains() {
        let mut set = Set::new();

        assert!(!set.contains("a"));
        set.add("a".into());
        assert!(set.contains("a"));
        assert!(!set.contains("b"));
    }

    #[test]
    fn test_uniqueness_under_collisions() {
        let mut set = Set::with_capacity(1);

        for i in 0..10 {
            set.add(format!("m{}", i));
            set.add(format!("m{}", i));
        }

        assert_eq!(set.len(), 10);
        assert_eq!(set.iter().count(), 10);
    }
}
