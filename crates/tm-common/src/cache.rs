use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::matching::MatchComputation;

const DEFAULT_CAPACITY: usize = 256;

/// Cache key for a ranking query. `min_score` is stored in basis points so
/// the key stays hashable.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum RankingKey {
    Candidate {
        id: i64,
        min_score_bp: i64,
        limit: usize,
    },
    Position {
        id: i64,
        min_score_bp: i64,
        limit: usize,
    },
}

impl RankingKey {
    fn candidate(id: i64, min_score: f64, limit: usize) -> Self {
        RankingKey::Candidate {
            id,
            min_score_bp: to_basis_points(min_score),
            limit,
        }
    }

    fn position(id: i64, min_score: f64, limit: usize) -> Self {
        RankingKey::Position {
            id,
            min_score_bp: to_basis_points(min_score),
            limit,
        }
    }
}

fn to_basis_points(score: f64) -> i64 {
    (score * 100.0).round() as i64
}

#[derive(Debug, Clone)]
struct CachedRanking {
    results: Vec<MatchComputation>,
    cached_at: Instant,
}

#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Bounded-TTL cache in front of "top matches for X" queries.
///
/// Entries carry no correctness obligation: a stale ranking is acceptable
/// until the TTL lapses, and recomputation simply overwrites. A TTL of zero
/// disables caching entirely.
pub struct RankingCache {
    entries: Mutex<LruCache<RankingKey, CachedRanking>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl RankingCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(ttl: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn get(&self, key: &RankingKey) -> Option<Vec<MatchComputation>> {
        let mut entries = self.entries.lock().ok()?;

        match entries.get(key) {
            Some(entry) if entry.cached_at.elapsed() < self.ttl => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.results.clone())
            }
            Some(_) => {
                entries.pop(key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    fn put(&self, key: RankingKey, results: Vec<MatchComputation>) {
        if self.ttl.is_zero() {
            return;
        }
        if let Ok(mut entries) = self.entries.lock() {
            entries.put(
                key,
                CachedRanking {
                    results,
                    cached_at: Instant::now(),
                },
            );
        }
    }

    pub fn get_for_candidate(
        &self,
        id: i64,
        min_score: f64,
        limit: usize,
    ) -> Option<Vec<MatchComputation>> {
        self.get(&RankingKey::candidate(id, min_score, limit))
    }

    pub fn put_for_candidate(
        &self,
        id: i64,
        min_score: f64,
        limit: usize,
        results: Vec<MatchComputation>,
    ) {
        self.put(RankingKey::candidate(id, min_score, limit), results);
    }

    pub fn get_for_position(
        &self,
        id: i64,
        min_score: f64,
        limit: usize,
    ) -> Option<Vec<MatchComputation>> {
        self.get(&RankingKey::position(id, min_score, limit))
    }

    pub fn put_for_position(
        &self,
        id: i64,
        min_score: f64,
        limit: usize,
        results: Vec<MatchComputation>,
    ) {
        self.put(RankingKey::position(id, min_score, limit), results);
    }

    /// Drop every cached ranking keyed by this candidate. Rankings for
    /// positions may still reference the candidate until their TTL lapses;
    /// that staleness is within contract.
    pub fn invalidate_candidate(&self, id: i64) {
        self.invalidate(|key| matches!(key, RankingKey::Candidate { id: kid, .. } if *kid == id));
    }

    pub fn invalidate_position(&self, id: i64) {
        self.invalidate(|key| matches!(key, RankingKey::Position { id: kid, .. } if *kid == id));
    }

    fn invalidate<F: Fn(&RankingKey) -> bool>(&self, matches: F) {
        if let Ok(mut entries) = self.entries.lock() {
            let stale: Vec<RankingKey> = entries
                .iter()
                .filter(|(key, _)| matches(key))
                .map(|(key, _)| key.clone())
                .collect();
            for key in stale {
                entries.pop(&key);
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
