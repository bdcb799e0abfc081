//! Distance Memo (C5, spec §4.5).
//!
//! A symmetric, group-local cache of Levenshtein distances between
//! subdomain strings. Owned by exactly one group at a time (spec §5); the
//! caller drops it once that group finishes.

use lru::LruCache;
use rustc_hash::FxHashMap;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use crate::host::Host;

/// Precompute the full pairwise matrix below this group size; above it,
/// fall back to an on-demand LRU cache (spec §4.5).
const PRECOMPUTE_THRESHOLD: usize = 5_000;

const LRU_CAPACITY: usize = 200_000;

/// An unordered pair of host indices, used as the memo key so `(a, b)` and
/// `(b, a)` collide.
fn pair_key(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

enum Backing {
    Precomputed(FxHashMap<(usize, usize), usize>),
    Lru(Mutex<LruCache<(usize, usize), usize>>),
}

/// Memoized edit-distance lookup over one level-group's hosts, indexed by
/// position in the slice passed to [`DistanceMemo::new`].
pub struct DistanceMemo<'a> {
    hosts: &'a [Host],
    backing: Backing,
}

impl<'a> DistanceMemo<'a> {
    pub fn new(hosts: &'a [Host]) -> Self {
        let backing = if hosts.len() <= PRECOMPUTE_THRESHOLD {
            let mut table = FxHashMap::default();
            for i in 0..hosts.len() {
                for j in (i + 1)..hosts.len() {
                    let d = strsim::levenshtein(&hosts[i].subdomain, &hosts[j].subdomain);
                    table.insert((i, j), d);
                }
            }
            Backing::Precomputed(table)
        } else {
            let capacity = NonZeroUsize::new(LRU_CAPACITY).unwrap();
            Backing::Lru(Mutex::new(LruCache::new(capacity)))
        };
        Self { hosts, backing }
    }

    /// Levenshtein distance between `hosts[a].subdomain` and
    /// `hosts[b].subdomain`. `0` iff `a == b`.
    pub fn distance(&self, a: usize, b: usize) -> usize {
        if a == b {
            return 0;
        }
        let key = pair_key(a, b);
        match &self.backing {
            Backing::Precomputed(table) => *table.get(&key).expect("index out of bounds for group"),
            Backing::Lru(cache) => {
                let mut cache = cache.lock().expect("distance memo lock poisoned");
                if let Some(&d) = cache.get(&key) {
                    return d;
                }
                let d = strsim::levenshtein(&self.hosts[key.0].subdomain, &self.hosts[key.1].subdomain);
                cache.put(key, d);
                d
            }
        }
    }
}
