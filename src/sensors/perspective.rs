// Copyright @yucwang 2026

use nalgebra::{Perspective3, Point3};

use crate::core::camera::Camera;
use crate::core::executor::Executor;
use crate::core::ray_batch::{RayBatch, NO_HIT};
use crate::core::status::RayStatus;
use crate::math::constants::{Float, Id, Matrix4f, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::operations::resizer;
use crate::core::error::Result;

pub struct PerspectiveCamera {
    origin: Vector3f,
    target: Vector3f,
    up: Vector3f,
    forward: Vector3f,
    right: Vector3f,
    cam_up: Vector3f,
    fov_y: Float,
    tan_half_fov_y: Float,
    width: usize,
    height: usize,
    near_clip: Float,
    far_clip: Float,
}

impl PerspectiveCamera {
    pub fn new(origin: Vector3f,
               target: Vector3f,
               up: Vector3f,
               fov_y_radians: Float,
               width: usize,
               height: usize,
               near_clip: Float,
               far_clip: Float) -> Self {
        let forward = (target - origin).normalize();
        let right = forward.cross(&up).normalize();
        let cam_up = right.cross(&forward).normalize();

        Self {
            origin,
            target,
            up,
            forward,
            right,
            cam_up,
            fov_y: fov_y_radians,
            tan_half_fov_y: (0.5 * fov_y_radians).tan(),
            width,
            height,
            near_clip,
            far_clip,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn aspect(&self) -> Float {
        self.width as Float / self.height.max(1) as Float
    }

    /// Ray through film coordinate `u`, `(0, 0)` at the bottom-left corner.
    pub fn sample_ray(&self, u: &Vector2f) -> Ray3f {
        let px = (2.0 * u.x - 1.0) * self.aspect() * self.tan_half_fov_y;
        let py = (2.0 * u.y - 1.0) * self.tan_half_fov_y;

        let d_camera = Vector3f::new(px, py, 1.0).normalize();
        let dir = (self.right * d_camera.x + self.cam_up * d_camera.y + self.forward * d_camera.z).normalize();

        let inv_z = if d_camera.z != 0.0 { 1.0 / d_camera.z } else { std::f32::MAX };
        Ray3f::new(self.origin, dir, Some(self.near_clip * inv_z), Some(self.far_clip * inv_z))
    }

    /// Fills the batch with one primary ray per pixel.
    ///
    /// Pixel `p` samples the lower-left corner of its film cell, the same
    /// convention the depth projection uses.
    pub fn spawn_rays<E: Executor>(&self, rays: &mut RayBatch<E>) -> Result<()> {
        let count = self.width * self.height;
        resizer::resize(rays, count)?;

        let inv_w = 1.0 / self.width as Float;
        let inv_h = 1.0 / self.height as Float;
        for pixel in 0..count {
            let u = Vector2f::new((pixel % self.width) as Float * inv_w,
                                  (pixel / self.width) as Float * inv_h);
            let ray = self.sample_ray(&u);
            rays.set_ray(pixel, &ray);
            rays.pixel_idx_mut()[pixel] = pixel as Id;
        }
        rays.executor.for_each_indexed(&mut rays.hit_idx, |_, h| *h = NO_HIT);
        rays.executor.for_each_indexed(&mut rays.distance, |_, d| *d = 0.0);
        rays.reset_status(RayStatus::Active);
        log::debug!("Spawned {} primary rays from {}x{} film.", count, self.width, self.height);
        Ok(())
    }
}

impl Camera for PerspectiveCamera {
    fn projection_matrix(&self, width: usize, height: usize) -> Matrix4f {
        let aspect = width as Float / height.max(1) as Float;
        Perspective3::new(aspect, self.fov_y, self.near_clip, self.far_clip).to_homogeneous()
    }

    fn view_matrix(&self) -> Matrix4f {
        Matrix4f::look_at_rh(&Point3::from(self.origin), &Point3::from(self.target), &self.up)
    }

    fn position(&self) -> Vector3f {
        self.origin
    }

    fn describe(&self) -> String {
        format!("PerspectiveCamera\n  origin: {:?}\n  forward: {:?}\n  fov_y: {}\n  film: {}x{}\n  clip: [{}, {}]",
                self.origin, self.forward, self.fov_y, self.width, self.height, self.near_clip, self.far_clip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::transform::Transform;

    fn test_camera() -> PerspectiveCamera {
        PerspectiveCamera::new(Vector3f::new(0.0, 0.0, 0.0),
                               Vector3f::new(0.0, 0.0, -1.0),
                               Vector3f::new(0.0, 1.0, 0.0),
                               std::f32::consts::FRAC_PI_2,
                               4, 4, 0.1, 100.0)
    }

    #[test]
    fn test_perspective_camera_center_ray() {
        let cam = test_camera();
        let ray = cam.sample_ray(&Vector2f::new(0.5, 0.5));
        let dir = ray.dir();

        assert!((dir.x - 0.0).abs() < 1e-6);
        assert!((dir.y - 0.0).abs() < 1e-6);
        assert!((dir.z + 1.0).abs() < 1e-6);
        assert!((ray.min_t - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_sample_ray_agrees_with_projection() {
        let cam = test_camera();
        let proj_view = Transform::new(cam.projection_matrix(4, 4) * cam.view_matrix()).expect("invertible");

        let ray = cam.sample_ray(&Vector2f::new(0.25, 0.75));
        let ndc = proj_view.apply_point(ray.at(5.0));
        assert!((ndc.x - (-0.5)).abs() < 1e-4);
        assert!((ndc.y - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_spawn_rays_covers_film() {
        let cam = test_camera();
        let mut rays = RayBatch::new(3, true);
        rays.status_mut()[0] = RayStatus::Terminated;

        cam.spawn_rays(&mut rays).expect("consistent batch");
        assert_eq!(rays.num_rays(), 16);
        assert!(rays.check_consistency().is_ok());
        assert_eq!(rays.pixel_idx()[9], 9);
        assert!(rays.status().iter().all(|s| *s == RayStatus::Active));
        assert!(rays.hit_idx().iter().all(|h| *h == NO_HIT));
        assert_eq!(rays.origin(15), cam.position());
    }
}
