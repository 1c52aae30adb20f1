// Copyright @yucwang 2026

use crate::core::camera::Camera;
use crate::core::canvas::DepthCanvas;
use crate::core::error::{RayBatchError, Result};
use crate::core::executor::Executor;
use crate::core::ray_batch::RayBatch;
use crate::math::constants::{Float, Vector3f, Vector4f, DEPTH_OFFSET};
use crate::math::transform::Transform;

/// Maps canvas depth samples back onto the view rays of their pixels.
pub struct ScreenRayProjector {
    proj_view: Transform,
    width: usize,
    height: usize,
    double_inv_width: Float,
    double_inv_height: Float,
    origin: Vector3f,
}

impl ScreenRayProjector {
    pub fn new<C: Camera + ?Sized>(camera: &C, width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RayBatchError::InvalidCanvas { width, height });
        }
        let proj_view = Transform::new(camera.projection_matrix(width, height) * camera.view_matrix())?;
        Ok(Self {
            proj_view,
            width,
            height,
            double_inv_width: 2.0 / width as Float,
            double_inv_height: 2.0 / height as Float,
            origin: camera.position(),
        })
    }

    /// World-space point seen through `pixel` at normalized `depth`.
    pub fn reconstruct(&self, pixel: usize, depth: Float) -> Vector3f {
        let x = (pixel % self.width) as Float * self.double_inv_width - 1.0;
        let y = (pixel / self.width) as Float * self.double_inv_height - 1.0;
        let z = 2.0 * depth - 1.0 - DEPTH_OFFSET;
        self.proj_view.inv_apply_homogeneous(Vector4f::new(x, y, z, 1.0))
    }

    pub fn distance_to(&self, pixel: usize, depth: Float) -> Float {
        (self.reconstruct(pixel, depth) - self.origin).norm()
    }

    /// Seeds `max_distance` of every ray from the depth of its pixel.
    ///
    /// Pixel indices are validated up front so a failure leaves the batch
    /// untouched. Rays whose pixel has no finite depth keep their bound.
    pub fn project<D, E>(&self, canvas: &D, rays: &mut RayBatch<E>) -> Result<()>
    where
        D: DepthCanvas + ?Sized,
        E: Executor,
    {
        if canvas.width() != self.width || canvas.height() != self.height {
            return Err(RayBatchError::InvalidCanvas { width: canvas.width(), height: canvas.height() });
        }

        let count = self.width * self.height;
        let out_of_range = |p: &i64| *p < 0 || *p as usize >= count;
        if rays.executor.count(&rays.pixel_idx, out_of_range) > 0 {
            let pixel = rays.pixel_idx.iter().copied().find(|p| out_of_range(p)).unwrap_or(-1);
            return Err(RayBatchError::PixelOutOfRange { pixel, count });
        }

        let pixel_idx = &rays.pixel_idx;
        rays.executor.for_each_indexed(&mut rays.max_distance, |i, max_distance| {
            let pixel = pixel_idx[i] as usize;
            if let Some(depth) = canvas.depth(pixel) {
                if depth.is_finite() {
                    *max_distance = self.distance_to(pixel, depth);
                }
            }
        });
        log::debug!("Projected {}x{} depth buffer onto {} rays.", self.width, self.height, rays.num_rays);
        Ok(())
    }
}

pub fn project_depth_to_distance<C, D, E>(camera: &C, canvas: &D, rays: &mut RayBatch<E>) -> Result<()>
where
    C: Camera + ?Sized,
    D: DepthCanvas + ?Sized,
    E: Executor,
{
    ScreenRayProjector::new(camera, canvas.width(), canvas.height())?.project(canvas, rays)
}
