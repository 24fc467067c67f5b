//! Read-only preview service
//!
//! Same shape as a generation request, none of the writes. Results are
//! memoized in the bounded cache keyed by the normalized request hash; the
//! per-group configurator matrix is deduplicated through the singleflight
//! so a cache-miss stampede costs one storage scan.

use super::cache::{request_cache_key, PreviewCache, Singleflight};
use super::enrich::{self, load_and_enrich};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::expansion;
use crate::identity;
use crate::lifecycle::VariantStatus;
use crate::limits;
use crate::normalize::{self, RawDimension};
use crate::services::{MasterDataLookup, VariantStore};
use parking_lot::RwLock;
use shared::{CombinationView, GenerationRequest, PreviewResult};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

/// Which value ids are still selectable per axis for one product group,
/// derived from its non-archived variants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfiguratorMatrix {
    /// axis -> selectable value ids
    pub axes: BTreeMap<String, BTreeSet<String>>,
    pub variant_count: u64,
}

pub struct PreviewService {
    config: EngineConfig,
    master: Arc<dyn MasterDataLookup>,
    store: Arc<dyn VariantStore>,
    cache: Arc<PreviewCache>,
    matrix_cache: RwLock<HashMap<String, Arc<ConfiguratorMatrix>>>,
    matrix_flight: Singleflight<Arc<ConfiguratorMatrix>>,
}

impl PreviewService {
    pub fn new(
        config: EngineConfig,
        master: Arc<dyn MasterDataLookup>,
        store: Arc<dyn VariantStore>,
        cache: Arc<PreviewCache>,
    ) -> Self {
        Self {
            config,
            master,
            store,
            cache,
            matrix_cache: RwLock::new(HashMap::new()),
            matrix_flight: Singleflight::new(),
        }
    }

    /// Expand a request without writing anything.
    pub async fn preview(&self, req: &GenerationRequest) -> EngineResult<Arc<PreviewResult>> {
        limits::validate_request_limits(req)?;
        let group = identity::normalize_id(&req.product_group_id)
            .ok_or(EngineError::MissingProductGroup)?;

        let key = request_cache_key(req);
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(product_group = %group, "preview cache hit");
            return Ok(hit);
        }

        let enriched = load_and_enrich(self.master.as_ref(), req).await?;
        let soft_limit = req
            .max_combinations
            .unwrap_or(self.config.soft_limit_default);
        let combinations = expansion::expand(&enriched.dimensions, soft_limit)?;

        let mut views = Vec::with_capacity(combinations.len());
        for combination in &combinations {
            let selection = enrich::selection_for(combination);
            identity::validate_cardinality(&selection.attributes)?;
            let config_hash = identity::build_config_hash(&req.product_group_id, &selection)?;
            let selections = combination
                .selections
                .iter()
                .map(|(axis, value)| (axis.clone(), value.label.clone()))
                .collect();
            views.push(CombinationView {
                combination_key: combination.combination_key.clone(),
                config_hash,
                selections,
            });
        }

        let dimension_breakdown = enriched
            .dimensions
            .iter()
            .filter(|d| d.is_active())
            .map(|d| (d.label.clone(), d.values.len() as u64))
            .collect();

        let result = Arc::new(PreviewResult {
            total_combinations: views.len() as u64,
            dimension_breakdown,
            combinations: views,
        });
        // Tag the entry with the normalized group id so generation-time
        // invalidation matches it regardless of the request's spelling.
        self.cache.insert(key, &group, result.clone());
        Ok(result)
    }

    /// Expand raw dimension payloads that are not backed by master data.
    ///
    /// The raw values go through the normalizer (string, foreign-record and
    /// pre-shaped forms all land on the canonical value type), so identity
    /// resolution follows the same priorities as everywhere else. Never
    /// cached; ad-hoc shapes have no stable cache identity worth tracking.
    pub fn preview_adhoc(
        &self,
        product_group_id: &str,
        raw_dimensions: &[RawDimension],
        max_combinations: Option<u64>,
    ) -> EngineResult<PreviewResult> {
        let mut dimensions = Vec::with_capacity(raw_dimensions.len());
        for (position, raw) in raw_dimensions.iter().enumerate() {
            dimensions.push(normalize::normalize_dimension(raw, position)?);
        }

        let soft_limit = max_combinations.unwrap_or(self.config.soft_limit_default);
        let combinations = expansion::expand(&dimensions, soft_limit)?;

        let mut views = Vec::with_capacity(combinations.len());
        for combination in &combinations {
            let selection = enrich::selection_for(combination);
            identity::validate_cardinality(&selection.attributes)?;
            let config_hash = identity::build_config_hash(product_group_id, &selection)?;
            let selections = combination
                .selections
                .iter()
                .map(|(axis, value)| (axis.clone(), value.label.clone()))
                .collect();
            views.push(CombinationView {
                combination_key: combination.combination_key.clone(),
                config_hash,
                selections,
            });
        }

        let dimension_breakdown = dimensions
            .iter()
            .filter(|d| d.is_active())
            .map(|d| (d.label.clone(), d.values.len() as u64))
            .collect();

        Ok(PreviewResult {
            total_combinations: views.len() as u64,
            dimension_breakdown,
            combinations: views,
        })
    }

    /// The per-group configurator matrix, computed at most once per group
    /// concurrently. Served from the matrix cache until the group's next
    /// successful generation invalidates it.
    pub async fn configurator_matrix(
        &self,
        product_group: &str,
    ) -> EngineResult<Arc<ConfiguratorMatrix>> {
        let group =
            identity::normalize_id(product_group).ok_or(EngineError::MissingProductGroup)?;
        if let Some(hit) = self.matrix_cache.read().get(&group).cloned() {
            return Ok(hit);
        }

        let store = self.store.clone();
        let scan_group = group.clone();
        let computed = self
            .matrix_flight
            .run(&group, async move { build_matrix(&store, &scan_group).await })
            .await
            .map_err(|shared| EngineError::Internal(anyhow::anyhow!("{shared}")))?;

        self.matrix_cache.write().insert(group, computed.clone());
        Ok(computed)
    }

    /// Invalidation hook, called after a successful generation.
    pub fn invalidate_group(&self, product_group: &str) {
        let group = identity::normalize_id(product_group)
            .unwrap_or_else(|| product_group.to_string());
        self.cache.invalidate_group(&group);
        self.matrix_cache.write().remove(&group);
    }
}

async fn build_matrix(
    store: &Arc<dyn VariantStore>,
    product_group: &str,
) -> EngineResult<Arc<ConfiguratorMatrix>> {
    let variants = store.list_by_group(product_group).await?;
    let mut matrix = ConfiguratorMatrix::default();
    for variant in variants {
        if variant.status == VariantStatus::Archived {
            continue;
        }
        matrix.variant_count += 1;
        if let Some(color) = &variant.color {
            matrix
                .axes
                .entry(enrich::COLOR_AXIS.to_string())
                .or_default()
                .insert(color.clone());
        }
        for size in &variant.sizes {
            matrix
                .axes
                .entry(format!("{}:{}", enrich::SIZE_AXIS, size.category))
                .or_default()
                .insert(size.size.clone());
        }
        for attr in &variant.attribute_dimensions {
            let axis = attr
                .attribute
                .clone()
                .unwrap_or_else(|| identity::UNKNOWN_AXIS.to_string());
            matrix.axes.entry(axis).or_default().insert(attr.value.clone());
        }
    }
    Ok(Arc::new(matrix))
}
