// Copyright @yucwang 2026

use std::convert::TryFrom;

use crate::core::error::Result;
use crate::core::executor::Executor;
use crate::core::ray_batch::RayBatch;
use crate::core::status::{RayStatus, StatusSet};

pub fn count_matching<E: Executor>(rays: &RayBatch<E>, status: RayStatus) -> usize {
    rays.executor.count(&rays.status, |s| *s == status)
}

pub fn count_matching_any<E: Executor>(rays: &RayBatch<E>, set: StatusSet) -> usize {
    rays.executor.count(&rays.status, |s| set.contains(*s))
}

/// Counts rays carrying a status given as a raw integer.
///
/// Values outside `0..=255` and bytes that name no status are caller bugs and
/// are reported instead of counting zero.
pub fn count_status_value<E: Executor>(rays: &RayBatch<E>, value: i64) -> Result<usize> {
    let status = RayStatus::try_from(value)?;
    Ok(count_matching(rays, status))
}

/// Rays still travelling: `Active` or `Lost`.
pub fn rays_in_mesh<E: Executor>(rays: &RayBatch<E>) -> usize {
    count_matching_any(rays, StatusSet::IN_MESH)
}

/// Rays done for this frame: `Terminated`, `ExitedDomain` or `Abandoned`.
pub fn rays_processed<E: Executor>(rays: &RayBatch<E>) -> usize {
    count_matching_any(rays, StatusSet::PROCESSED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::RayBatchError;
    use crate::executors::parallel::RayonExecutor;

    fn mixed_statuses(n: usize) -> Vec<RayStatus> {
        (0..n).map(|i| RayStatus::ALL[(i * 7 + 3) % RayStatus::ALL.len()]).collect()
    }

    #[test]
    fn test_count_matching_single_status() {
        let mut rays = RayBatch::new(5, false);
        rays.status_mut().copy_from_slice(&[
            RayStatus::Active, RayStatus::Lost, RayStatus::Active, RayStatus::Terminated, RayStatus::Abandoned,
        ]);
        assert_eq!(count_matching(&rays, RayStatus::Active), 2);
        assert_eq!(count_matching(&rays, RayStatus::ExitedMesh), 0);
        assert_eq!(rays_in_mesh(&rays), 3);
        assert_eq!(rays_processed(&rays), 2);
    }

    #[test]
    fn test_partitioning_sets_sum_to_num_rays() {
        let n = 10_000;
        let mut rays = RayBatch::with_executor(n, false, RayonExecutor::new());
        rays.status_mut().copy_from_slice(&mixed_statuses(n));

        let per_status: usize = RayStatus::ALL.iter().map(|s| count_matching(&rays, *s)).sum();
        assert_eq!(per_status, n);

        let covered = StatusSet::IN_MESH.union(StatusSet::PROCESSED);
        let total = rays_in_mesh(&rays)
            + rays_processed(&rays)
            + count_matching_any(&rays, covered.complement());
        assert_eq!(total, n);
    }

    #[test]
    fn test_count_status_value_validates_input() {
        let mut rays = RayBatch::new(3, false);
        rays.status_mut()[1] = RayStatus::Lost;

        assert_eq!(count_status_value(&rays, 5), Ok(1));
        assert_eq!(count_status_value(&rays, 0), Ok(2));
        assert_eq!(count_status_value(&rays, 256), Err(RayBatchError::InvalidStatus(256)));
        assert_eq!(count_status_value(&rays, -3), Err(RayBatchError::InvalidStatus(-3)));
        assert_eq!(count_status_value(&rays, 1), Err(RayBatchError::UnknownStatus(1)));
    }
}
