// Copyright @yucwang 2026

/// Bulk primitives every batch operation is written against.
///
/// Implementations must keep element order in `map_collect` and `compact`,
/// and must call `f` exactly once per index in `for_each_indexed`.
pub trait Executor: Send + Sync {
    /// Applies `f(i, &mut out[i])` to every element.
    fn for_each_indexed<T, F>(&self, out: &mut [T], f: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Send + Sync;

    /// Counts the elements accepted by `pred`.
    fn count<T, P>(&self, data: &[T], pred: P) -> usize
    where
        T: Sync,
        P: Fn(&T) -> bool + Send + Sync;

    fn map_collect<T, U, F>(&self, data: &[T], f: F) -> Vec<U>
    where
        T: Sync,
        U: Send,
        F: Fn(&T) -> U + Send + Sync;

    /// Stable filter: keeps `data[i]` where `mask[i]` is set.
    fn compact<T>(&self, data: &[T], mask: &[bool]) -> Vec<T>
    where
        T: Clone + Send + Sync;

    fn describe(&self) -> String {
        String::from("Executor")
    }
}
