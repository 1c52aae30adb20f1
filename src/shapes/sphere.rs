// Copyright @yucwang 2026

use crate::core::executor::Executor;
use crate::core::intersector::Intersector;
use crate::core::ray_batch::{RayBatch, NO_HIT};
use crate::math::constants::{Float, Id, Vector2f, Vector3f, EPSILON, INV_PI, PI};
use crate::math::ray::Ray3f;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vector3f,
    pub radius: Float,
}

impl Sphere {
    pub fn new(center: Vector3f, radius: Float) -> Self {
        Self { center, radius }
    }

    /// Closest root of the ray-sphere quadratic inside `[min_t, max_t]`.
    pub fn ray_intersection(&self, ray: &Ray3f) -> Option<Float> {
        let oc = ray.origin() - self.center;
        let d = ray.dir();
        let a = d.dot(&d);
        if a < EPSILON {
            return None;
        }
        let half_b = oc.dot(&d);
        let c = oc.dot(&oc) - self.radius * self.radius;
        let disc = half_b * half_b - a * c;
        if disc < 0.0 {
            return None;
        }

        let sqrt_disc = disc.sqrt();
        let t0 = (-half_b - sqrt_disc) / a;
        let t1 = (-half_b + sqrt_disc) / a;
        if ray.test_segment(t0) {
            Some(t0)
        } else if ray.test_segment(t1) {
            Some(t1)
        } else {
            None
        }
    }

    pub fn normal_at(&self, p: &Vector3f) -> Vector3f {
        (p - self.center) / self.radius
    }

    /// Spherical coordinates of a surface point mapped to `[0, 1]^2`.
    pub fn uv_at(&self, p: &Vector3f) -> Vector2f {
        let n = self.normal_at(p);
        let phi = n.y.atan2(n.x);
        let phi = if phi < 0.0 { phi + 2.0 * PI } else { phi };
        let theta = n.z.max(-1.0).min(1.0).acos();
        Vector2f::new(0.5 * phi * INV_PI, theta * INV_PI)
    }
}

/// Brute-force closest-hit query over a handful of spheres.
///
/// `hit_idx` receives the index of the sphere that was hit. The scalar
/// attribute stores the cosine between the surface normal and the incoming
/// direction.
pub struct SphereIntersector {
    spheres: Vec<Sphere>,
}

impl SphereIntersector {
    pub fn new(spheres: Vec<Sphere>) -> Self {
        Self { spheres }
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    fn closest(&self, ray: &Ray3f) -> Option<(Id, Float)> {
        let mut ray = *ray;
        let mut closest = None;
        for (idx, sphere) in self.spheres.iter().enumerate() {
            if let Some(t) = sphere.ray_intersection(&ray) {
                ray.update(t);
                closest = Some((idx as Id, t));
            }
        }
        closest
    }
}

impl Intersector for SphereIntersector {
    fn intersect<E: Executor>(&self, rays: &mut RayBatch<E>) {
        let indices: Vec<usize> = (0..rays.num_rays()).collect();
        let hits = {
            let batch: &RayBatch<E> = rays;
            batch.executor().map_collect(&indices, |i| self.closest(&batch.ray(*i)))
        };

        for (i, hit) in hits.into_iter().enumerate() {
            match hit {
                Some((idx, t)) => {
                    rays.hit_idx_mut()[i] = idx;
                    rays.distance_mut()[i] = t;
                    let ray = rays.ray(i);
                    if let Some(data) = rays.intersection_mut() {
                        let sphere = &self.spheres[idx as usize];
                        let p = ray.at(t);
                        let n = sphere.normal_at(&p);
                        data.set(i, p, n, sphere.uv_at(&p), -n.dot(&ray.dir()));
                    }
                }
                None => rays.hit_idx_mut()[i] = NO_HIT,
            }
        }
        log::debug!("Intersected {} rays against {} spheres.", rays.num_rays(), self.spheres.len());
    }
}
