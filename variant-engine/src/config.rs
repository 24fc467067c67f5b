//! Engine configuration
//!
//! All tunables can be overridden through environment variables; fixed
//! system ceilings (axis counts, hard cap) live in [`crate::limits`] and are
//! deliberately not configurable.
//!
//! | Environment variable | Default | Meaning |
//! |----------------------|---------|---------|
//! | VARIANT_SOFT_LIMIT | 500 | default combination cap per request |
//! | VARIANT_INSERT_CHUNK | 100 | records per unordered insert chunk |
//! | VARIANT_MAX_WRITE_RETRIES | 3 | retries for transient write conflicts |
//! | VARIANT_RETRY_BACKOFF_MS | 50 | base backoff, doubled per attempt |
//! | VARIANT_PREVIEW_CACHE_CAPACITY | 256 | preview memo cache entries |
//! | VARIANT_SNAPSHOT_DEBOUNCE_MS | 2000 | snapshot recompute coalescing window |

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Default soft cap on combinations when the request carries none
    pub soft_limit_default: u64,
    /// Records per unordered insert chunk
    pub insert_chunk_size: usize,
    /// Retry ceiling for transient (non-duplicate) write conflicts
    pub max_write_retries: u32,
    /// Base backoff in milliseconds, doubled on every retry
    pub retry_backoff_ms: u64,
    /// Fixed capacity of the preview memo cache (evict-oldest)
    pub preview_cache_capacity: usize,
    /// Delay window over which snapshot recompute notifications coalesce
    pub snapshot_debounce_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            soft_limit_default: 500,
            insert_chunk_size: 100,
            max_write_retries: 3,
            retry_backoff_ms: 50,
            preview_cache_capacity: 256,
            snapshot_debounce_ms: 2000,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            soft_limit_default: env_parse("VARIANT_SOFT_LIMIT", defaults.soft_limit_default),
            insert_chunk_size: env_parse("VARIANT_INSERT_CHUNK", defaults.insert_chunk_size),
            max_write_retries: env_parse("VARIANT_MAX_WRITE_RETRIES", defaults.max_write_retries),
            retry_backoff_ms: env_parse("VARIANT_RETRY_BACKOFF_MS", defaults.retry_backoff_ms),
            preview_cache_capacity: env_parse(
                "VARIANT_PREVIEW_CACHE_CAPACITY",
                defaults.preview_cache_capacity,
            ),
            snapshot_debounce_ms: env_parse(
                "VARIANT_SNAPSHOT_DEBOUNCE_MS",
                defaults.snapshot_debounce_ms,
            ),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
