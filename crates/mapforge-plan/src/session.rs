//! Mapping session
//!
//! Owns one type table, memoizes plans in a [`PlanCache`] and resolves
//! independent pairs in parallel with rayon.

use crate::assembler::PlanAssembler;
use crate::cache::{plan_key, PlanCache};
use crate::error::PlanError;
use crate::plan::MappingPlan;
use crate::provider::SchemaProvider;
use indexmap::IndexMap;
use mapforge_resolve::{CancellationFlag, TypePair};
use mapforge_schema::{Fingerprint, MappingConfiguration, TypeId, TypeTable};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;

/// One (source, target, configuration) request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRequest {
    /// Source type
    pub source: TypeId,
    /// Target type
    pub target: TypeId,
    /// Configuration of this mapping
    #[serde(default)]
    pub config: MappingConfiguration,
}

impl MappingRequest {
    /// Request with default configuration
    #[inline]
    #[must_use]
    pub fn new(source: TypeId, target: TypeId) -> Self {
        Self {
            source,
            target,
            config: MappingConfiguration::default(),
        }
    }

    /// With configuration
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: MappingConfiguration) -> Self {
        self.config = config;
        self
    }

    /// Source/target pair
    #[inline]
    #[must_use]
    pub fn pair(&self) -> TypePair {
        TypePair::new(self.source, self.target)
    }
}

/// Plans of a root pair and every pair it transitively depends on
pub type PlanGraph = IndexMap<TypePair, Result<Arc<MappingPlan>, PlanError>>;

/// Resolution session over one type table
#[derive(Debug)]
pub struct MappingSession {
    table: TypeTable,
    fingerprint: Fingerprint,
    cache: PlanCache,
    cancel: CancellationFlag,
}

impl MappingSession {
    /// Create session over a table
    ///
    /// # Errors
    /// Returns [`PlanError::Fingerprint`] if the table cannot be hashed
    pub fn new(table: TypeTable) -> Result<Self, PlanError> {
        let fingerprint = table.fingerprint()?;
        tracing::debug!("Session over {} types ({})", table.len(), fingerprint.short());
        Ok(Self {
            table,
            fingerprint,
            cache: PlanCache::default(),
            cancel: CancellationFlag::new(),
        })
    }

    /// Create session over a provider's table
    ///
    /// # Errors
    /// Returns [`PlanError::Fingerprint`] if the table cannot be hashed
    pub fn from_provider<P: SchemaProvider + ?Sized>(provider: &P) -> Result<Self, PlanError> {
        Self::new(provider.table().clone())
    }

    /// Use a shared cache
    #[inline]
    #[must_use]
    pub fn with_cache(mut self, cache: PlanCache) -> Self {
        self.cache = cache;
        self
    }

    /// Share a cancellation flag with the caller
    #[inline]
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Type table
    #[inline]
    #[must_use]
    pub fn table(&self) -> &TypeTable {
        &self.table
    }

    /// Plan cache
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &PlanCache {
        &self.cache
    }

    /// Cancellation flag
    #[inline]
    #[must_use]
    pub fn cancellation(&self) -> &CancellationFlag {
        &self.cancel
    }

    /// Resolve one pair, memoized
    ///
    /// # Errors
    /// See [`PlanAssembler::assemble`]
    pub fn resolve(
        &self,
        source: TypeId,
        target: TypeId,
        config: &MappingConfiguration,
    ) -> Result<Arc<MappingPlan>, PlanError> {
        let key = plan_key(self.fingerprint, TypePair::new(source, target), config)?;
        self.cache.try_get_or_insert_with(key, || {
            PlanAssembler::new(&self.table)
                .with_cancellation(self.cancel.clone())
                .assemble(source, target, config)
        })
    }

    /// Resolve one request
    ///
    /// # Errors
    /// See [`PlanAssembler::assemble`]
    #[inline]
    pub fn resolve_request(&self, request: &MappingRequest) -> Result<Arc<MappingPlan>, PlanError> {
        self.resolve(request.source, request.target, &request.config)
    }

    /// Resolve independent requests in parallel
    ///
    /// Results are in request order; a failure affects only its own entry.
    pub fn resolve_all(
        &self,
        requests: &[MappingRequest],
    ) -> Vec<Result<Arc<MappingPlan>, PlanError>> {
        tracing::info!("Resolving {} mapping requests", requests.len());
        let results: Vec<_> = requests
            .par_iter()
            .map(|request| self.resolve_request(request))
            .collect();
        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            tracing::warn!("{} of {} mapping requests failed", failed, requests.len());
        }
        results
    }

    /// Resolve a pair and every nested pair it calls, breadth first
    ///
    /// Nested pairs use [`MappingConfiguration::for_nested`]. Each pair is
    /// visited once, so self-referential graphs terminate. Resolution stops
    /// at the first cancellation.
    pub fn resolve_with_dependencies(
        &self,
        source: TypeId,
        target: TypeId,
        config: &MappingConfiguration,
    ) -> PlanGraph {
        let root = TypePair::new(source, target);
        let nested_config = config.for_nested();
        let mut graph = PlanGraph::new();
        let mut queue = VecDeque::from([root]);

        while let Some(pair) = queue.pop_front() {
            if graph.contains_key(&pair) {
                continue;
            }
            let config = if pair == root { config } else { &nested_config };
            let result = self.resolve(pair.source, pair.target, config);

            let cancelled = result.as_ref().err().is_some_and(PlanError::is_cancelled);
            if let Ok(plan) = &result {
                queue.extend(plan.nested_pairs.iter().filter(|p| !graph.contains_key(*p)));
            }
            graph.insert(pair, result);
            if cancelled {
                tracing::debug!("Dependency resolution cancelled at {}", pair);
                break;
            }
        }

        tracing::debug!("Resolved {} pairs reachable from {}", graph.len(), root);
        graph
    }

    /// Resolve every request a provider yields
    pub fn resolve_provided<P: SchemaProvider + ?Sized>(
        &self,
        provider: &P,
    ) -> Vec<Result<Arc<MappingPlan>, PlanError>> {
        self.resolve_all(&provider.requests())
    }
}
