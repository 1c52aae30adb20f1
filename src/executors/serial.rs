// Copyright @yucwang 2026

use crate::core::executor::Executor;

/// Runs every primitive on the calling thread.
#[derive(Debug, Default, Copy, Clone)]
pub struct SerialExecutor;

impl Executor for SerialExecutor {
    fn for_each_indexed<T, F>(&self, out: &mut [T], f: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Send + Sync,
    {
        for (i, v) in out.iter_mut().enumerate() {
            f(i, v);
        }
    }

    fn count<T, P>(&self, data: &[T], pred: P) -> usize
    where
        T: Sync,
        P: Fn(&T) -> bool + Send + Sync,
    {
        data.iter().filter(|v| pred(v)).count()
    }

    fn map_collect<T, U, F>(&self, data: &[T], f: F) -> Vec<U>
    where
        T: Sync,
        U: Send,
        F: Fn(&T) -> U + Send + Sync,
    {
        data.iter().map(f).collect()
    }

    fn compact<T>(&self, data: &[T], mask: &[bool]) -> Vec<T>
    where
        T: Clone + Send + Sync,
    {
        data.iter()
            .zip(mask.iter())
            .filter(|(_, keep)| **keep)
            .map(|(v, _)| v.clone())
            .collect()
    }

    fn describe(&self) -> String {
        String::from("SerialExecutor")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_for_each_indexed() {
        let mut data = vec![0usize; 5];
        SerialExecutor.for_each_indexed(&mut data, |i, v| *v = i * 2);
        assert_eq!(data, vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn test_serial_compact_keeps_order() {
        let data = vec![10, 11, 12, 13, 14];
        let mask = vec![true, false, true, false, true];
        assert_eq!(SerialExecutor.compact(&data, &mask), vec![10, 12, 14]);
        assert_eq!(SerialExecutor.count(&mask, |m| *m), 3);
    }
}
