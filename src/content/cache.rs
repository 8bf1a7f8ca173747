use rand::Rng;

use crate::foundation::core::Millis;
use crate::foundation::error::ZonecastResult;

/// Where a cache read came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadSource {
    /// Served from a fresh cached value.
    Cache,
    /// A fetch ran and succeeded.
    Fetch,
    /// A fetch ran, failed, and the static fallback was served.
    Fallback,
}

/// A value returned by a cache together with its provenance.
#[derive(Clone, Debug, PartialEq)]
pub struct Read<T> {
    /// The value.
    pub value: T,
    /// Provenance.
    pub source: ReadSource,
}

/// Single-value TTL memoization.
///
/// A value is fresh while `now - last_fetch < ttl`. A failed fetch leaves the previous value and
/// timestamp untouched, so the next read retries.
#[derive(Clone, Debug)]
pub struct ContentCache<T> {
    ttl_ms: u64,
    last_fetch: Option<Millis>,
    value: Option<T>,
    fetches: u64,
}

impl<T: Clone> ContentCache<T> {
    /// Empty cache with a TTL in milliseconds.
    pub fn new(ttl_ms: u64) -> Self {
        Self {
            ttl_ms,
            last_fetch: None,
            value: None,
            fetches: 0,
        }
    }

    /// Time-to-live in milliseconds.
    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }

    /// Instant of the last successful fetch.
    pub fn last_fetch(&self) -> Option<Millis> {
        self.last_fetch
    }

    /// Number of successful fetches so far.
    pub fn fetch_count(&self) -> u64 {
        self.fetches
    }

    /// The cached value regardless of freshness.
    pub fn peek(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// `true` when a value is cached and younger than the TTL at `now`.
    pub fn is_fresh(&self, now: Millis) -> bool {
        self.value.is_some()
            && self
                .last_fetch
                .is_some_and(|at| now.since(at) < self.ttl_ms)
    }

    /// Return the cached value when fresh, otherwise run `fetch` and cache its result.
    pub fn get_value<F>(&mut self, now: Millis, fetch: F) -> ZonecastResult<Read<T>>
    where
        F: FnOnce() -> ZonecastResult<T>,
    {
        if self.is_fresh(now)
            && let Some(v) = &self.value
        {
            return Ok(Read {
                value: v.clone(),
                source: ReadSource::Cache,
            });
        }

        let v = fetch()?;
        self.value = Some(v.clone());
        self.last_fetch = Some(now);
        self.fetches += 1;
        Ok(Read {
            value: v,
            source: ReadSource::Fetch,
        })
    }

    /// Forget the timestamp so the next read fetches.
    pub fn invalidate(&mut self) {
        self.last_fetch = None;
    }
}

/// Accumulating pool with a static fallback.
///
/// Every successful fetch appends to the pool; nothing is evicted. While fresh, reads return a
/// uniformly random member. A failed fetch returns the fallback without touching the timestamp.
#[derive(Clone, Debug)]
pub struct PoolCache<T> {
    ttl_ms: u64,
    last_fetch: Option<Millis>,
    pool: Vec<T>,
    fallback: T,
}

impl<T: Clone> PoolCache<T> {
    /// Empty pool with a TTL in milliseconds.
    pub fn new(ttl_ms: u64, fallback: T) -> Self {
        Self {
            ttl_ms,
            last_fetch: None,
            pool: Vec::new(),
            fallback,
        }
    }

    /// Time-to-live in milliseconds.
    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }

    /// Accumulated members.
    pub fn pool(&self) -> &[T] {
        &self.pool
    }

    /// Value served when a fetch fails.
    pub fn fallback(&self) -> &T {
        &self.fallback
    }

    /// Instant of the last successful fetch.
    pub fn last_fetch(&self) -> Option<Millis> {
        self.last_fetch
    }

    /// `true` when the pool is non-empty and younger than the TTL at `now`.
    pub fn is_fresh(&self, now: Millis) -> bool {
        !self.pool.is_empty()
            && self
                .last_fetch
                .is_some_and(|at| now.since(at) < self.ttl_ms)
    }

    /// Pick from the pool when fresh, otherwise fetch and append.
    pub fn get_value<R, F>(&mut self, now: Millis, rng: &mut R, fetch: F) -> Read<T>
    where
        R: Rng,
        F: FnOnce() -> ZonecastResult<T>,
    {
        if self.is_fresh(now) {
            let i = rng.gen_range(0..self.pool.len());
            return Read {
                value: self.pool[i].clone(),
                source: ReadSource::Cache,
            };
        }

        match fetch() {
            Ok(v) => {
                self.pool.push(v.clone());
                self.last_fetch = Some(now);
                Read {
                    value: v,
                    source: ReadSource::Fetch,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "pool fetch failed, serving fallback");
                Read {
                    value: self.fallback.clone(),
                    source: ReadSource::Fallback,
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/cache.rs"]
mod tests;
