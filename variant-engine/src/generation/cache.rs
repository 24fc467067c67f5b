//! Preview memo cache and the per-group singleflight
//!
//! Both are explicit, injected, bounded state owned by the services that
//! use them — there is no ambient process-wide cache. The memo cache is
//! fixed-capacity with oldest-first eviction; invalidation is tied to
//! generation success for the affected product group.

use crate::error::EngineError;
use dashmap::DashMap;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use shared::{GenerationRequest, PreviewResult};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Arc;

/// Stable cache key over the normalized request content.
///
/// Value lists are sorted and deduplicated before hashing so permutations
/// of the same request share one entry.
pub fn request_cache_key(req: &GenerationRequest) -> String {
    let mut hasher = Sha256::new();
    hasher.update(req.product_group_id.trim().to_lowercase().as_bytes());
    hasher.update(b"|max:");
    hasher.update(req.max_combinations.unwrap_or(0).to_le_bytes());

    let mut colors = req.base_dimensions.color.clone();
    colors.sort();
    colors.dedup();
    hasher.update(b"|color:");
    hasher.update(colors.join(",").as_bytes());

    let mut sizes = req.base_dimensions.size.clone();
    sizes.sort();
    sizes.dedup();
    hasher.update(b"|size:");
    hasher.update(sizes.join(",").as_bytes());

    let mut axes: Vec<(String, Vec<String>)> = req
        .attribute_dimensions
        .iter()
        .filter(|a| !a.disabled)
        .map(|a| {
            let mut values = a.values.clone();
            values.sort();
            values.dedup();
            (a.attribute_id.clone(), values)
        })
        .collect();
    axes.sort_by(|a, b| a.0.cmp(&b.0));
    for (axis, values) in axes {
        hasher.update(b"|axis:");
        hasher.update(axis.as_bytes());
        hasher.update(b"=");
        hasher.update(values.join(",").as_bytes());
    }

    hex::encode(hasher.finalize())
}

struct MemoEntry {
    product_group: String,
    result: Arc<PreviewResult>,
}

#[derive(Default)]
struct MemoInner {
    map: HashMap<String, MemoEntry>,
    /// Insertion order for oldest-first eviction
    order: VecDeque<String>,
}

/// Bounded preview memo cache, keyed by [`request_cache_key`].
pub struct PreviewCache {
    inner: Mutex<MemoInner>,
    capacity: usize,
}

impl PreviewCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(MemoInner::default()),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<PreviewResult>> {
        self.inner.lock().map.get(key).map(|e| e.result.clone())
    }

    pub fn insert(&self, key: String, product_group: &str, result: Arc<PreviewResult>) {
        let mut inner = self.inner.lock();
        if !inner.map.contains_key(&key) {
            while inner.order.len() >= self.capacity {
                if let Some(oldest) = inner.order.pop_front() {
                    inner.map.remove(&oldest);
                }
            }
            inner.order.push_back(key.clone());
        }
        inner.map.insert(
            key,
            MemoEntry {
                product_group: product_group.to_string(),
                result,
            },
        );
    }

    /// Drop every entry belonging to `product_group`. Called on generation
    /// success for that group.
    pub fn invalidate_group(&self, product_group: &str) {
        let mut inner = self.inner.lock();
        let stale: Vec<String> = inner
            .map
            .iter()
            .filter(|(_, e)| e.product_group == product_group)
            .map(|(k, _)| k.clone())
            .collect();
        for key in stale {
            inner.map.remove(&key);
            inner.order.retain(|k| k != &key);
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.lock().map.len()
    }
}

type SharedComputation<T> = Shared<BoxFuture<'static, Result<T, Arc<EngineError>>>>;

/// In-process advisory lock map collapsing concurrent identical
/// computations into one shared result.
///
/// Purely a latency/cost optimization, never correctness-critical: a
/// failed computation is delivered to every waiter and the entry is
/// released either way, so the next caller retries from scratch.
pub struct Singleflight<T: Clone> {
    inflight: DashMap<String, SharedComputation<T>>,
}

impl<T: Clone + Send + Sync + 'static> Singleflight<T> {
    pub fn new() -> Self {
        Self {
            inflight: DashMap::new(),
        }
    }

    pub async fn run<F>(&self, key: &str, compute: F) -> Result<T, Arc<EngineError>>
    where
        F: Future<Output = Result<T, EngineError>> + Send + 'static,
    {
        let shared = match self.inflight.entry(key.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(entry) => entry.get().clone(),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let fut = compute.map(|r| r.map_err(Arc::new)).boxed().shared();
                entry.insert(fut.clone());
                fut
            }
        };
        let result = shared.clone().await;
        // A slow waiter from an earlier flight must not evict a newer
        // flight that reused the key; only this flight's own entry goes.
        self.inflight
            .remove_if(key, |_, inflight| inflight.ptr_eq(&shared));
        result
    }

    #[cfg(test)]
    pub fn inflight_len(&self) -> usize {
        self.inflight.len()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for Singleflight<T> {
    fn default() -> Self {
        Self::new()
    }
}
