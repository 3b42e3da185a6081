/// Concurrency management for Tributary.
/// Builds the bounded worker pool used by the ingestion pipeline.

use anyhow::{Context, Result};

/// Worker count when none is configured: one per available core.
pub fn default_workers() -> usize {
    std::cmp::max(1, num_cpus::get())
}

/// Build a local rayon pool with `workers` named threads (`ingest-N`).
/// A local pool keeps concurrent pipelines (and tests) independent of the
/// global rayon pool.
pub fn build_ingest_pool(workers: Option<usize>) -> Result<rayon::ThreadPool> {
    let workers = workers.filter(|&n| n > 0).unwrap_or_else(default_workers);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("ingest-{}", i))
        .build()
        .context("Failed to build ingestion thread pool")?;

    tracing::debug!(
        workers,
        cores = num_cpus::get(),
        "Initialized ingestion pool"
    );

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_respects_worker_count() {
        let pool = build_ingest_pool(Some(3)).unwrap();
        assert_eq!(pool.current_num_threads(), 3);
    }

    #[test]
    fn test_zero_workers_falls_back_to_default() {
        let pool = build_ingest_pool(Some(0)).unwrap();
        assert_eq!(pool.current_num_threads(), default_workers());
    }

    #[test]
    fn test_threads_are_named() {
        let pool = build_ingest_pool(Some(1)).unwrap();
        let name = pool.install(|| std::thread::current().name().map(str::to_string));
        assert_eq!(name.as_deref(), Some("ingest-0"));
    }
}
