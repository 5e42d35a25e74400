//! Bounded worker pool for per-unit work

use crate::error::{EchoError, Result};
use rayon::prelude::*;

/// A dedicated rayon pool with a fixed number of threads
#[derive(Debug)]
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    threads: usize,
}

impl WorkerPool {
    /// Create a pool; `0` means one thread per CPU
    pub fn new(threads: usize) -> Result<Self> {
        let threads = if threads == 0 {
            num_cpus::get()
        } else {
            threads
        };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("echobook-worker-{i}"))
            .build()
            .map_err(|e| EchoError::Pool(e.to_string()))?;
        Ok(Self { pool, threads })
    }

    /// A single-threaded pool
    pub fn sequential() -> Result<Self> {
        Self::new(1)
    }

    /// Number of worker threads
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Run `f` over every item. Output order matches input order and each
    /// unit's result is independent of its siblings.
    pub fn map<T, R, E, F>(&self, items: Vec<T>, f: F) -> Vec<std::result::Result<R, E>>
    where
        T: Send,
        R: Send,
        E: Send,
        F: Fn(T) -> std::result::Result<R, E> + Send + Sync,
    {
        self.pool
            .install(|| items.into_par_iter().map(|item| f(item)).collect())
    }

    /// Run an infallible `f` over every item, preserving order
    pub fn map_ok<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Send + Sync,
    {
        self.pool
            .install(|| items.into_par_iter().map(|item| f(item)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_map_preserves_order() {
        let pool = WorkerPool::new(4).unwrap();
        let out = pool.map_ok((0..100).collect(), |i: u32| i * 2);
        assert_eq!(out, (0..100).map(|i| i * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_failures_do_not_abort_siblings() {
        let pool = WorkerPool::new(3).unwrap();
        let calls = AtomicUsize::new(0);
        let out = pool.map((1..=6).collect(), |i: u32| {
            calls.fetch_add(1, Ordering::SeqCst);
            if i % 2 == 0 {
                Err(format!("unit {i} failed"))
            } else {
                Ok(i)
            }
        });
        assert_eq!(calls.load(Ordering::SeqCst), 6);
        assert_eq!(out.iter().filter(|r| r.is_err()).count(), 3);
        assert_eq!(out[0], Ok(1));
        assert_eq!(out[1], Err("unit 2 failed".to_string()));
    }

    #[test]
    fn test_zero_threads_uses_cpus() {
        let pool = WorkerPool::new(0).unwrap();
        assert_eq!(pool.threads(), num_cpus::get());
        assert_eq!(WorkerPool::sequential().unwrap().threads(), 1);
    }
}
