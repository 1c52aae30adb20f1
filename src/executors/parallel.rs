// Copyright @yucwang 2026

use std::sync::Arc;

use rayon::prelude::*;

use crate::core::error::{RayBatchError, Result};
use crate::core::executor::Executor;

/// Data-parallel backend on top of rayon.
///
/// Uses the global rayon pool unless built with a dedicated thread count.
#[derive(Debug, Default, Clone)]
pub struct RayonExecutor {
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl RayonExecutor {
    pub fn new() -> Self {
        Self { pool: None }
    }

    pub fn with_threads(threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("raybatch-worker-{}", i))
            .build()
            .map_err(|e| RayBatchError::ThreadPool(e.to_string()))?;
        Ok(Self { pool: Some(Arc::new(pool)) })
    }

    pub fn threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    fn run<R, OP>(&self, op: OP) -> R
    where
        R: Send,
        OP: FnOnce() -> R + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

impl Executor for RayonExecutor {
    fn for_each_indexed<T, F>(&self, out: &mut [T], f: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Send + Sync,
    {
        self.run(|| out.par_iter_mut().enumerate().for_each(|(i, v)| f(i, v)))
    }

    fn count<T, P>(&self, data: &[T], pred: P) -> usize
    where
        T: Sync,
        P: Fn(&T) -> bool + Send + Sync,
    {
        self.run(|| data.par_iter().filter(|v| pred(v)).count())
    }

    fn map_collect<T, U, F>(&self, data: &[T], f: F) -> Vec<U>
    where
        T: Sync,
        U: Send,
        F: Fn(&T) -> U + Send + Sync,
    {
        self.run(|| data.par_iter().map(|v| f(v)).collect())
    }

    fn compact<T>(&self, data: &[T], mask: &[bool]) -> Vec<T>
    where
        T: Clone + Send + Sync,
    {
        // collect() into a Vec keeps the source order.
        self.run(|| {
            data.par_iter()
                .zip(mask.par_iter())
                .filter(|(_, keep)| **keep)
                .map(|(v, _)| v.clone())
                .collect()
        })
    }

    fn describe(&self) -> String {
        format!("RayonExecutor\n  threads: {}", self.threads())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executors::serial::SerialExecutor;

    #[test]
    fn test_rayon_matches_serial() {
        let data: Vec<u32> = (0..10_000).collect();
        let mask: Vec<bool> = data.iter().map(|v| v % 3 == 0).collect();

        let par = RayonExecutor::with_threads(4).expect("pool");
        assert_eq!(par.threads(), 4);
        assert_eq!(par.compact(&data, &mask), SerialExecutor.compact(&data, &mask));
        assert_eq!(par.count(&data, |v| v % 3 == 0), 3334);
        assert_eq!(par.map_collect(&data, |v| v * 2), SerialExecutor.map_collect(&data, |v| v * 2));
    }

    #[test]
    fn test_rayon_for_each_indexed_visits_every_element() {
        let mut data = vec![0usize; 4096];
        RayonExecutor::new().for_each_indexed(&mut data, |i, v| *v = i + 1);
        assert!(data.iter().enumerate().all(|(i, v)| *v == i + 1));
    }
}
