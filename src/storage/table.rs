//! Fixed-Capacity Chained Hash Table
//!
//! The backing store for short-link → original-URL mappings and any generic
//! key/value commands. The table is built with a fixed number of buckets at
//! construction time; each bucket holds a chain of entries whose key hashes
//! to that bucket index, scanned linearly on lookup.
//!
//! There is no load-factor rehashing: capacity never changes after
//! construction. This is a documented scalability ceiling, not a bug — the
//! command protocol never observes capacity, so resizing could be added later
//! without breaking any client.
//!
//! Besides the plain key/value pair, every entry carries short-link
//! provenance (insertion id, source address, insertion hour bucket, GET hit
//! count). That metadata is what `SENDJSON` reports to the stats aggregator.

use std::hash::{DefaultHasher, Hash, Hasher};

/// Default number of buckets when none is specified.
pub const DEFAULT_CAPACITY: usize = 100;

/// One key/value pair in the table, plus short-link provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The key (unique within the table)
    pub key: String,
    /// The stored value (the original URL for short-link entries)
    pub value: String,
    /// Insertion counter, unique for the lifetime of the table
    pub id: i64,
    /// Address of the peer that inserted this entry
    pub source_ip: String,
    /// Hour bucket of the insertion time, e.g. "14:00-15:00"
    pub time_interval: String,
    /// Number of successful GET lookups on this key
    pub hits: i64,
}

/// A fixed-capacity hash table with separate chaining.
///
/// # Example
///
/// ```
/// use linkstore::storage::HashTable;
///
/// let mut table = HashTable::new();
/// table.put("ab12cd".into(), "https://example.com".into(), "local".into(), "14:00-15:00".into());
/// assert_eq!(table.get("ab12cd"), Some("https://example.com"));
/// assert!(table.delete("ab12cd"));
/// assert_eq!(table.get("ab12cd"), None);
/// ```
#[derive(Debug)]
pub struct HashTable {
    buckets: Vec<Vec<Entry>>,
    len: usize,
    next_id: i64,
}

impl HashTable {
    /// Creates a table with the default bucket count.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a table with a fixed number of buckets.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "hash table needs at least one bucket");
        Self {
            buckets: (0..capacity).map(|_| Vec::new()).collect(),
            len: 0,
            next_id: 0,
        }
    }

    /// Number of buckets. Fixed for the table's lifetime.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // Lookup, insert, and delete all go through the same hash + modulus.
    #[inline]
    fn bucket_index(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.buckets.len()
    }

    /// Inserts or overwrites a key. Always succeeds.
    ///
    /// Overwriting keeps the entry's id and hit count and replaces the value
    /// and provenance.
    ///
    /// # Returns
    ///
    /// `true` if a new entry was created, `false` if an existing one was
    /// overwritten.
    pub fn put(&mut self, key: String, value: String, source_ip: String, time_interval: String) -> bool {
        let idx = self.bucket_index(&key);
        let chain = &mut self.buckets[idx];

        if let Some(entry) = chain.iter_mut().find(|e| e.key == key) {
            entry.value = value;
            entry.source_ip = source_ip;
            entry.time_interval = time_interval;
            return false;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.buckets[idx].push(Entry {
            key,
            value,
            id,
            source_ip,
            time_interval,
            hits: 0,
        });
        self.len += 1;
        true
    }

    /// Looks up a value. Never fails for a missing key — `None` means
    /// not found.
    pub fn get(&self, key: &str) -> Option<&str> {
        let idx = self.bucket_index(key);
        self.buckets[idx]
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }

    /// Looks up a value and bumps the entry's hit counter.
    ///
    /// The wire-level GET goes through here so that `SENDJSON` can report a
    /// per-link access count.
    pub fn touch(&mut self, key: &str) -> Option<&str> {
        let idx = self.bucket_index(key);
        self.buckets[idx]
            .iter_mut()
            .find(|e| e.key == key)
            .map(|e| {
                e.hits += 1;
                e.value.as_str()
            })
    }

    /// Removes an entry if present.
    ///
    /// # Returns
    ///
    /// `true` if an entry was removed, `false` if the key was absent.
    pub fn delete(&mut self, key: &str) -> bool {
        let idx = self.bucket_index(key);
        let chain = &mut self.buckets[idx];

        if let Some(pos) = chain.iter().position(|e| e.key == key) {
            chain.remove(pos);
            self.len -= 1;
            true
        } else {
            false
        }
    }

    /// Iterates over every entry, in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.buckets.iter().flat_map(|chain| chain.iter())
    }
}

impl Default for HashTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put(table: &mut HashTable, key: &str, value: &str) -> bool {
        table.put(key.into(), value.into(), "local".into(), "00:00-01:00".into())
    }

    #[test]
    fn test_put_and_get() {
        let mut table = HashTable::new();

        assert!(put(&mut table, "ab12cd", "https://example.com"));
        assert_eq!(table.get("ab12cd"), Some("https://example.com"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_get_missing() {
        let table = HashTable::new();
        assert_eq!(table.get("nope"), None);
    }

    #[test]
    fn test_put_overwrites() {
        let mut table = HashTable::new();

        assert!(put(&mut table, "k", "v1"));
        assert!(!put(&mut table, "k", "v2"));
        assert_eq!(table.get("k"), Some("v2"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_overwrite_keeps_id_and_hits() {
        let mut table = HashTable::new();

        put(&mut table, "k", "v1");
        table.touch("k");
        put(&mut table, "k", "v2");

        let entry = table.iter().find(|e| e.key == "k").unwrap();
        assert_eq!(entry.id, 0);
        assert_eq!(entry.hits, 1);
        assert_eq!(entry.value, "v2");
    }

    #[test]
    fn test_delete() {
        let mut table = HashTable::new();

        put(&mut table, "k", "v");
        assert!(table.delete("k"));
        assert_eq!(table.get("k"), None);
        assert!(!table.delete("k")); // already gone
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_delete_missing_leaves_table_unchanged() {
        let mut table = HashTable::new();

        put(&mut table, "a", "1");
        assert!(!table.delete("b"));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("a"), Some("1"));
    }

    #[test]
    fn test_touch_counts_hits() {
        let mut table = HashTable::new();

        put(&mut table, "k", "v");
        assert_eq!(table.touch("k"), Some("v"));
        assert_eq!(table.touch("k"), Some("v"));
        assert_eq!(table.touch("missing"), None);

        let entry = table.iter().next().unwrap();
        assert_eq!(entry.hits, 2);
    }

    #[test]
    fn test_collisions_chain_within_one_bucket() {
        // A 1-bucket table forces every key into the same chain.
        let mut table = HashTable::with_capacity(1);

        for i in 0..20 {
            put(&mut table, &format!("key{}", i), &format!("value{}", i));
        }

        assert_eq!(table.len(), 20);
        for i in 0..20 {
            assert_eq!(
                table.get(&format!("key{}", i)),
                Some(format!("value{}", i).as_str())
            );
        }

        assert!(table.delete("key7"));
        assert_eq!(table.get("key7"), None);
        assert_eq!(table.len(), 19);
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut table = HashTable::new();

        put(&mut table, "a", "1");
        put(&mut table, "b", "2");
        put(&mut table, "c", "3");

        let mut ids: Vec<i64> = table.iter().map(|e| e.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_capacity_is_fixed() {
        let mut table = HashTable::with_capacity(4);
        for i in 0..100 {
            put(&mut table, &format!("key{}", i), "v");
        }
        assert_eq!(table.capacity(), 4);
        assert_eq!(table.len(), 100);
    }
}
