//! Storage abstraction: documents, price-ordered books, and tag sets.
//!
//! [`MarketStore`] is the minimum surface the engine and ledger consume.
//! Every operation is atomic at single-key granularity; the engine restores
//! invariants through operation ordering, never multi-key transactions.
//! [`MemoryStore`] is the in-process implementation used by the service
//! binary and the test suites.

use crate::error::StoreError;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::RwLock;

/// Builders for the store's key layout. The prefixes are wire-exact and
/// shared with external consumers of the store.
pub mod keys {
    use crate::types::Side;

    pub const TRADE_PREFIX: &str = "bonds:trades:";

    pub fn order(order_id: &str) -> String {
        format!("bonds:orders:{order_id}")
    }

    pub fn trade(trade_id: &str) -> String {
        format!("{TRADE_PREFIX}{trade_id}")
    }

    pub fn bids(instrument: &str) -> String {
        format!("bonds:bids:{instrument}")
    }

    pub fn asks(instrument: &str) -> String {
        format!("bonds:asks:{instrument}")
    }

    /// Book key for the given side of an instrument.
    pub fn book(side: Side, instrument: &str) -> String {
        match side {
            Side::Buy => bids(instrument),
            Side::Sell => asks(instrument),
        }
    }

    pub fn user_trades(user_id: &str) -> String {
        format!("bonds:user-trades:{user_id}")
    }

    pub fn instrument_trades(instrument: &str) -> String {
        format!("bonds:instrument-trades:{instrument}")
    }

    pub fn daily_trades(day: &str) -> String {
        format!("bonds:daily-trades:{day}")
    }
}

/// Primitive store operations the core consumes.
///
/// Sorted sets are multisets ordered by score; members at equal score
/// enumerate in insertion order, which is what gives resting orders their
/// time priority within a price level.
pub trait MarketStore: Send + Sync {
    /// Overwrites a document.
    fn doc_put(&self, key: &str, json: &str) -> Result<(), StoreError>;

    /// Returns the current document, or `None` if absent.
    fn doc_get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Inserts `member` into the sorted multiset at `score`.
    fn zadd(&self, key: &str, score: Decimal, member: &str) -> Result<(), StoreError>;

    /// All entries in ascending score order (FIFO within a score).
    fn zrange_asc(&self, key: &str) -> Result<Vec<(Decimal, String)>, StoreError>;

    /// All entries in descending score order (FIFO within a score).
    fn zrange_desc(&self, key: &str) -> Result<Vec<(Decimal, String)>, StoreError>;

    /// Removes one exact member match. Idempotent; returns whether a member was removed.
    fn zrem(&self, key: &str, member: &str) -> Result<bool, StoreError>;

    /// Inserts into a set. Idempotent; returns whether the member was new.
    fn sadd(&self, key: &str, member: &str) -> Result<bool, StoreError>;

    /// Enumerates set members.
    fn smembers(&self, key: &str) -> Result<Vec<String>, StoreError>;

    /// Enumerates document keys starting with `prefix`.
    fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

/// Per-score FIFO queues keyed by price. Equal-score members keep their
/// insertion order, so enumeration yields price-time priority directly.
type SortedSet = BTreeMap<Decimal, Vec<String>>;

/// In-memory [`MarketStore`]. State does not survive restart; callers that
/// need durability must supply a store backed by an external service.
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<HashMap<String, String>>,
    zsets: RwLock<HashMap<String, SortedSet>>,
    sets: RwLock<HashMap<String, BTreeSet<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MarketStore for MemoryStore {
    fn doc_put(&self, key: &str, json: &str) -> Result<(), StoreError> {
        self.docs
            .write()
            .expect("lock")
            .insert(key.to_string(), json.to_string());
        Ok(())
    }

    fn doc_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.docs.read().expect("lock").get(key).cloned())
    }

    fn zadd(&self, key: &str, score: Decimal, member: &str) -> Result<(), StoreError> {
        self.zsets
            .write()
            .expect("lock")
            .entry(key.to_string())
            .or_default()
            .entry(score)
            .or_default()
            .push(member.to_string());
        Ok(())
    }

    fn zrange_asc(&self, key: &str) -> Result<Vec<(Decimal, String)>, StoreError> {
        let zsets = self.zsets.read().expect("lock");
        let Some(levels) = zsets.get(key) else {
            return Ok(Vec::new());
        };
        Ok(levels
            .iter()
            .flat_map(|(score, queue)| queue.iter().map(|m| (*score, m.clone())))
            .collect())
    }

    fn zrange_desc(&self, key: &str) -> Result<Vec<(Decimal, String)>, StoreError> {
        let zsets = self.zsets.read().expect("lock");
        let Some(levels) = zsets.get(key) else {
            return Ok(Vec::new());
        };
        // Levels descend; members within a level keep insertion order.
        Ok(levels
            .iter()
            .rev()
            .flat_map(|(score, queue)| queue.iter().map(|m| (*score, m.clone())))
            .collect())
    }

    fn zrem(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let mut zsets = self.zsets.write().expect("lock");
        let Some(levels) = zsets.get_mut(key) else {
            return Ok(false);
        };
        let mut emptied = None;
        let mut removed = false;
        for (score, queue) in levels.iter_mut() {
            if let Some(pos) = queue.iter().position(|m| m == member) {
                queue.remove(pos);
                removed = true;
                if queue.is_empty() {
                    emptied = Some(*score);
                }
                break;
            }
        }
        if let Some(score) = emptied {
            levels.remove(&score);
        }
        Ok(removed)
    }

    fn sadd(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        Ok(self
            .sets
            .write()
            .expect("lock")
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string()))
    }

    fn smembers(&self, key: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .sets
            .read()
            .expect("lock")
            .get(key)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .docs
            .read()
            .expect("lock")
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Side;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn doc_put_overwrites_and_get_returns_latest() {
        let store = MemoryStore::new();
        store.doc_put("k", "v1").unwrap();
        store.doc_put("k", "v2").unwrap();
        assert_eq!(store.doc_get("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(store.doc_get("missing").unwrap(), None);
    }

    #[test]
    fn zrange_asc_orders_by_score_then_insertion() {
        let store = MemoryStore::new();
        store.zadd("book", dec("98.75"), "b").unwrap();
        store.zadd("book", dec("98.50"), "a1").unwrap();
        store.zadd("book", dec("98.50"), "a2").unwrap();
        let entries = store.zrange_asc("book").unwrap();
        let members: Vec<&str> = entries.iter().map(|(_, m)| m.as_str()).collect();
        assert_eq!(members, vec!["a1", "a2", "b"]);
    }

    #[test]
    fn zrange_desc_keeps_fifo_within_a_level() {
        let store = MemoryStore::new();
        store.zadd("book", dec("98.50"), "low1").unwrap();
        store.zadd("book", dec("99.00"), "hi1").unwrap();
        store.zadd("book", dec("99.00"), "hi2").unwrap();
        let entries = store.zrange_desc("book").unwrap();
        let members: Vec<&str> = entries.iter().map(|(_, m)| m.as_str()).collect();
        assert_eq!(members, vec!["hi1", "hi2", "low1"]);
    }

    #[test]
    fn zrem_removes_exact_member_and_is_idempotent() {
        let store = MemoryStore::new();
        store.zadd("book", dec("98.50"), "a").unwrap();
        assert!(store.zrem("book", "a").unwrap());
        assert!(!store.zrem("book", "a").unwrap());
        assert!(store.zrange_asc("book").unwrap().is_empty());
    }

    #[test]
    fn zrem_removes_one_occurrence_from_a_multiset() {
        let store = MemoryStore::new();
        store.zadd("book", dec("98.50"), "dup").unwrap();
        store.zadd("book", dec("98.50"), "dup").unwrap();
        assert!(store.zrem("book", "dup").unwrap());
        assert_eq!(store.zrange_asc("book").unwrap().len(), 1);
    }

    #[test]
    fn sadd_is_idempotent() {
        let store = MemoryStore::new();
        assert!(store.sadd("tags", "t1").unwrap());
        assert!(!store.sadd("tags", "t1").unwrap());
        assert_eq!(store.smembers("tags").unwrap(), vec!["t1".to_string()]);
    }

    #[test]
    fn scan_prefix_matches_document_keys_only() {
        let store = MemoryStore::new();
        store.doc_put("bonds:trades:1", "{}").unwrap();
        store.doc_put("bonds:trades:2", "{}").unwrap();
        store.doc_put("bonds:orders:1", "{}").unwrap();
        let mut keys = store.scan_prefix(keys::TRADE_PREFIX).unwrap();
        keys.sort();
        assert_eq!(keys, vec!["bonds:trades:1", "bonds:trades:2"]);
    }

    #[test]
    fn key_builders_produce_wire_exact_layout() {
        assert_eq!(keys::order("o1"), "bonds:orders:o1");
        assert_eq!(keys::trade("t1"), "bonds:trades:t1");
        assert_eq!(keys::bids("GOVT10Y"), "bonds:bids:GOVT10Y");
        assert_eq!(keys::asks("GOVT10Y"), "bonds:asks:GOVT10Y");
        assert_eq!(keys::book(Side::Buy, "X"), "bonds:bids:X");
        assert_eq!(keys::book(Side::Sell, "X"), "bonds:asks:X");
        assert_eq!(keys::user_trades("U1"), "bonds:user-trades:U1");
        assert_eq!(keys::instrument_trades("X"), "bonds:instrument-trades:X");
        assert_eq!(keys::daily_trades("20260802"), "bonds:daily-trades:20260802");
    }
}
