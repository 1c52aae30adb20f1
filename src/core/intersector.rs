// Copyright @yucwang 2026

use crate::core::executor::Executor;
use crate::core::ray_batch::RayBatch;

/// Geometry query run once per bounce.
///
/// Writes `hit_idx` for every ray (`NO_HIT` on a miss) and the hit distance;
/// it may also set statuses directly, which reconciliation preserves when
/// they are terminal.
pub trait Intersector: Sync {
    fn intersect<E: Executor>(&self, rays: &mut RayBatch<E>);
}
