pub mod config;
pub mod convert;
pub mod evaluate;
pub mod prepare;

pub use config::PipelineConfig;
pub use convert::convert_files;
pub use evaluate::{evaluate_corpus, evaluate_document, evaluate_image};
pub use prepare::{prepare_sample, prepare_samples, select_samples, PassOutcome};

/// Called once per finished item; drives progress display.
pub type Tick<'a> = &'a (dyn Fn() + Sync);

/// Runs `work` on a dedicated pool of `threads` workers, or on the global
/// rayon pool when `threads` is `None`.
pub(crate) fn with_pool<T, F>(threads: Option<usize>, work: F) -> crate::error::Result<T>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    match threads {
        None => Ok(work()),
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| crate::error::BenchError::invalid_input(format!("thread pool: {}", e)))?;
            Ok(pool.install(work))
        }
    }
}
