// Copyright @yucwang 2026

use crate::core::error::Result;
use crate::core::executor::Executor;
use crate::core::ray_batch::RayBatch;

/// Shading stage of a bounce: consumes the hits of the current bounce and
/// either terminates rays or gives them a new origin and direction.
pub trait Scatterer {
    fn scatter<E: Executor>(&mut self, rays: &mut RayBatch<E>, bounce: u32) -> Result<()>;
}
