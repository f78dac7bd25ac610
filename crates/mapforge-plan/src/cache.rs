//! Fingerprint-keyed plan cache using moka
//!
//! Plans are pure functions of (table, pair, configuration), so the Blake3
//! fingerprint of those inputs is a sound memoization key.

use crate::plan::MappingPlan;
use mapforge_resolve::TypePair;
use mapforge_schema::{Fingerprint, HashError, MappingConfiguration};
use moka::sync::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Statistics for cache performance monitoring
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Number of entries in cache
    pub entry_count: u64,
}

/// Memoization key of one plan request
///
/// # Errors
/// Returns error if the pair or configuration cannot be serialized
pub fn plan_key(
    table: Fingerprint,
    pair: TypePair,
    config: &MappingConfiguration,
) -> Result<Fingerprint, HashError> {
    Ok(Fingerprint::combine(&[
        table,
        Fingerprint::of(&pair)?,
        Fingerprint::of(config)?,
    ]))
}

/// Concurrent cache of assembled plans
///
/// Only successful plans are stored. Rejections are cheap to recompute and
/// cancelled results must never be memoized.
#[derive(Debug, Clone)]
pub struct PlanCache {
    inner: Cache<Fingerprint, Arc<MappingPlan>>,
}

impl PlanCache {
    /// Create new cache with max capacity
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    /// Create cache with time-based expiration
    #[inline]
    #[must_use]
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Get plan from cache
    #[inline]
    #[must_use]
    pub fn get(&self, key: &Fingerprint) -> Option<Arc<MappingPlan>> {
        self.inner.get(key)
    }

    /// Insert plan into cache
    #[inline]
    pub fn insert(&self, key: Fingerprint, plan: Arc<MappingPlan>) {
        self.inner.insert(key, plan);
    }

    /// Get or compute plan; failures are returned and not stored
    ///
    /// # Errors
    /// Propagates the error returned by `f`
    pub fn try_get_or_insert_with<E>(
        &self,
        key: Fingerprint,
        f: impl FnOnce() -> Result<MappingPlan, E>,
    ) -> Result<Arc<MappingPlan>, E> {
        if let Some(cached) = self.get(&key) {
            tracing::trace!("Plan cache hit: {}", key.short());
            return Ok(cached);
        }

        let plan = Arc::new(f()?);
        self.insert(key, Arc::clone(&plan));
        Ok(plan)
    }

    /// Invalidate all entries
    #[inline]
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Check if cache contains key
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &Fingerprint) -> bool {
        self.inner.contains_key(key)
    }

    /// Get cache statistics
    ///
    /// Counts are eventually consistent; call [`sync`](Self::sync) first for
    /// an exact figure.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.inner.entry_count(),
        }
    }

    /// Apply pending maintenance so statistics are exact
    #[inline]
    pub fn sync(&self) {
        self.inner.run_pending_tasks();
    }
}

impl Default for PlanCache {
    /// Create cache with default capacity (10,000 entries)
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::PlanAssembler;
    use crate::error::PlanError;
    use mapforge_schema::{ConfigOverrides, NullPolicy, TypeId};
    use mapforge_test_utils::company;

    #[test]
    fn key_depends_on_every_input() {
        let table = Fingerprint::compute(b"table");
        let pair = TypePair::new(TypeId(0), TypeId(1));
        let config = MappingConfiguration::new();

        let base = plan_key(table, pair, &config).unwrap();
        assert_eq!(base, plan_key(table, pair, &config.clone()).unwrap());
        assert_ne!(base, plan_key(Fingerprint::compute(b"other"), pair, &config).unwrap());
        assert_ne!(base, plan_key(table, TypePair::new(TypeId(1), TypeId(0)), &config).unwrap());

        let changed =
            config.with_call(ConfigOverrides::new().with_null_policy(NullPolicy::ThrowException));
        assert_ne!(base, plan_key(table, pair, &changed).unwrap());
    }

    #[test]
    fn successful_plans_are_memoized() {
        let c = company();
        let cache = PlanCache::new(16);
        let config = MappingConfiguration::new();
        let key = plan_key(
            c.table.fingerprint().unwrap(),
            TypePair::new(c.point, c.point_dto),
            &config,
        )
        .unwrap();
        let assembler = PlanAssembler::new(&c.table);

        let first = cache
            .try_get_or_insert_with(key, || assembler.assemble(c.point, c.point_dto, &config))
            .unwrap();
        let second = cache
            .try_get_or_insert_with::<PlanError>(key, || panic!("should hit the cache"))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        cache.sync();
        assert_eq!(cache.stats().entry_count, 1);
    }

    #[test]
    fn failures_are_not_stored() {
        let cache = PlanCache::default();
        let key = Fingerprint::compute(b"k");
        let r = cache.try_get_or_insert_with(key, || Err(PlanError::Cancelled));
        assert!(r.is_err());
        assert!(!cache.contains(&key));
    }
}
