//! Bounded task group for per-file work.
//!
//! At most `width` tasks run at once; the rest wait for a slot in submission
//! order. Every task runs to completion even when a sibling fails, and the
//! group only reports once all of them have settled.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::{Error, Result};

/// Default number of in-flight tasks.
pub const DEFAULT_WIDTH: usize = 10;

/// A fixed-width pool that runs one async job per item.
#[derive(Debug, Clone)]
pub struct BoundedPool {
    width: usize,
}

impl Default for BoundedPool {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH)
    }
}

impl BoundedPool {
    /// Create a pool. A width of zero is treated as one.
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Run `job` over every item and wait for all of them to settle.
    ///
    /// Results come back in item order. If any job failed, the error of the
    /// earliest failing item is returned; successful jobs are not undone.
    pub async fn run<I, T, F, Fut>(&self, items: Vec<I>, job: F) -> Result<Vec<T>>
    where
        I: Send + 'static,
        T: Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let total = items.len();
        let slots = Arc::new(Semaphore::new(self.width));
        let job = Arc::new(job);
        let mut tasks = JoinSet::new();

        for (index, item) in items.into_iter().enumerate() {
            // Waiting here keeps later items queued behind earlier ones.
            let permit = slots
                .clone()
                .acquire_owned()
                .await
                .expect("pool semaphore is never closed");
            let job = job.clone();
            tasks.spawn(async move {
                let _permit = permit;
                (index, job(item).await)
            });
        }

        let mut results: Vec<Option<T>> = (0..total).map(|_| None).collect();
        let mut failure: Option<(usize, Error)> = None;
        let mut failed = 0usize;

        while let Some(joined) = tasks.join_next().await {
            let (index, outcome) = match joined {
                Ok(done) => done,
                Err(join_error) => {
                    // Panicked task: its index is lost, rank it last.
                    failed += 1;
                    tracing::error!(error = %join_error, "pool task panicked");
                    if failure.is_none() {
                        failure = Some((usize::MAX, Error::Task(join_error)));
                    }
                    continue;
                }
            };

            match outcome {
                Ok(value) => results[index] = Some(value),
                Err(err) => {
                    failed += 1;
                    tracing::warn!(index, error = %err, "pool task failed");
                    if failure.as_ref().is_none_or(|(first, _)| index < *first) {
                        failure = Some((index, err));
                    }
                }
            }
        }

        if let Some((_, err)) = failure {
            tracing::debug!(failed, total, "pool finished with failures");
            return Err(err);
        }

        Ok(results.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_results_in_item_order() {
        let pool = BoundedPool::new(3);
        let out = pool
            .run((0..20u64).collect(), |n| async move {
                // Later items finish first
                tokio::time::sleep(Duration::from_millis(20 - n)).await;
                Ok(n * 2)
            })
            .await
            .unwrap();
        assert_eq!(out, (0..20u64).map(|n| n * 2).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_never_exceeds_width() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let pool = BoundedPool::new(4);
        let (a, p) = (active.clone(), peak.clone());
        pool.run((0..25).collect(), move |_: i32| {
            let (active, peak) = (a.clone(), p.clone());
            async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                active.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .await
        .unwrap();

        assert_eq!(peak.load(Ordering::SeqCst), 4);
        assert_eq!(active.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failure_waits_for_siblings() {
        let finished = Arc::new(AtomicUsize::new(0));
        let f = finished.clone();

        let pool = BoundedPool::new(2);
        let err = pool
            .run((0..6).collect(), move |n: usize| {
                let finished = f.clone();
                async move {
                    if n == 1 || n == 4 {
                        return Err(Error::Config(format!("item {n}")));
                    }
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    finished.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .await
            .unwrap_err();

        assert_eq!(finished.load(Ordering::SeqCst), 4);
        assert_eq!(err.to_string(), "configuration error: item 1");
    }

    #[tokio::test]
    async fn test_zero_width_still_runs() {
        let pool = BoundedPool::new(0);
        assert_eq!(pool.width(), 1);
        let out = pool
            .run(vec!["a", "b"], |s| async move { Ok(s.len()) })
            .await
            .unwrap();
        assert_eq!(out, vec![1, 1]);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let out: Vec<()> = BoundedPool::default()
            .run(Vec::<u8>::new(), |_| async { Ok(()) })
            .await
            .unwrap();
        assert!(out.is_empty());
    }
}
