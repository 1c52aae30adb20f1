// Copyright @yucwang 2026

use std::any::Any;

use crate::core::error::{RayBatchError, Result};
use crate::core::executor::Executor;

/// Per-ray storage that follows every structural change of a batch.
///
/// The batch applies the same mask and the same new length to all of its
/// channels; state owned outside the batch implements this trait and is fed
/// the mask or size returned by the compactor and resizer.
pub trait RayChannel<E: Executor>: Send + Sync {
    fn len(&self) -> usize;

    /// Grows or shrinks to `n` elements, keeping the shared prefix.
    fn resize(&mut self, n: usize);

    /// Keeps element `i` iff `mask[i]`; `mask.len()` equals `self.len()`.
    fn compact(&mut self, mask: &[bool], executor: &E);

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Typed auxiliary payload, one `T` per ray.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel<T> {
    data: Vec<T>,
}

impl<T: Clone + Default> Channel<T> {
    pub fn new(len: usize, initial: T) -> Self {
        Self { data: vec![initial; len] }
    }

    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    pub fn fill(&mut self, value: T) {
        for v in self.data.iter_mut() {
            *v = value.clone();
        }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn get(&self, i: usize) -> Option<&T> {
        self.data.get(i)
    }
}

impl<T, E> RayChannel<E> for Channel<T>
where
    T: Clone + Default + Send + Sync + 'static,
    E: Executor,
{
    fn len(&self) -> usize {
        self.data.len()
    }

    fn resize(&mut self, n: usize) {
        self.data.resize(n, T::default());
    }

    fn compact(&mut self, mask: &[bool], executor: &E) {
        self.data = executor.compact(&self.data, mask);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Filters externally owned ray-aligned state with a mask produced by the
/// compactor.
pub fn apply_mask<E, C>(external: &mut C, mask: &[bool], executor: &E) -> Result<()>
where
    E: Executor,
    C: RayChannel<E> + ?Sized,
{
    if external.len() != mask.len() {
        return Err(RayBatchError::MaskLengthMismatch { expected: external.len(), actual: mask.len() });
    }
    external.compact(mask, executor);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executors::serial::SerialExecutor;

    #[test]
    fn test_channel_resize_keeps_prefix() {
        let mut c = Channel::from_vec(vec![1.0f32, 2.0, 3.0]);
        RayChannel::<SerialExecutor>::resize(&mut c, 5);
        assert_eq!(c.as_slice(), &[1.0, 2.0, 3.0, 0.0, 0.0]);
        RayChannel::<SerialExecutor>::resize(&mut c, 2);
        assert_eq!(c.as_slice(), &[1.0, 2.0]);
    }

    #[test]
    fn test_apply_mask_rejects_wrong_length() {
        let mut c = Channel::from_vec(vec![1u32, 2, 3]);
        let err = apply_mask(&mut c, &[true, false], &SerialExecutor).unwrap_err();
        assert_eq!(err, RayBatchError::MaskLengthMismatch { expected: 3, actual: 2 });

        apply_mask(&mut c, &[true, false, true], &SerialExecutor).expect("mask fits");
        assert_eq!(c.as_slice(), &[1, 3]);
    }
}
