use std::collections::{HashMap, VecDeque};

use sha2::{Digest, Sha256};

use crate::matches::Match;

/// Identifies a checked fragment by its exact text and where it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    #[must_use]
    pub fn new(text: &str, offset: usize) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(offset.to_le_bytes());
        hasher.update(text.as_bytes());

        Self(hasher.finalize().into())
    }
}

/// Remembers the matches returned for each fragment. When full, the oldest
/// entry is evicted first. A capacity of 0 never evicts.
#[derive(Debug, Default)]
pub struct MatchCache {
    capacity: usize,
    entries: HashMap<CacheKey, Vec<Match>>,
    insertion_order: VecDeque<CacheKey>,
}

impl MatchCache {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
        }
    }

    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<&Vec<Match>> { self.entries.get(key) }

    pub fn insert(&mut self, key: CacheKey, matches: Vec<Match>) {
        if self.entries.insert(key, matches).is_some() {
            return;
        }

        self.insertion_order.push_back(key);

        if self.capacity > 0 {
            while self.insertion_order.len() > self.capacity {
                if let Some(oldest) = self.insertion_order.pop_front() {
                    self.entries.remove(&oldest);
                }
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }
}
