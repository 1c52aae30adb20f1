// Copyright @yucwang 2026

use crate::core::executor::Executor;
use crate::core::ray_batch::{RayBatch, NO_HIT};
use crate::core::status::RayStatus;
use crate::math::constants::Id;

/// Status a ray should carry given its hit index and current status.
///
/// `Terminated` and `ExitedDomain` are final and never overwritten. Any
/// other ray exits the domain on a miss and becomes active on a hit.
#[inline]
pub fn reconciled_status(hit_idx: Id, status: RayStatus) -> RayStatus {
    if status == RayStatus::Terminated || status == RayStatus::ExitedDomain {
        status
    } else if hit_idx == NO_HIT {
        RayStatus::ExitedDomain
    } else {
        RayStatus::Active
    }
}

/// Normalizes statuses after an intersector ran, in place.
pub fn reconcile_from_hits<E: Executor>(rays: &mut RayBatch<E>) {
    let hit_idx = &rays.hit_idx;
    rays.executor.for_each_indexed(&mut rays.status, |i, status| {
        *status = reconciled_status(hit_idx[i], *status);
    });
    log::debug!("Reconciled status of {} rays.", rays.num_rays);
}
