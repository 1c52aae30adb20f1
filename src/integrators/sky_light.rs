// Copyright @yucwang 2026

use crate::core::error::Result;
use crate::core::executor::Executor;
use crate::core::ray_batch::{RayBatch, NO_HIT};
use crate::core::rng::LcgRng;
use crate::core::scatter::Scatterer;
use crate::core::status::RayStatus;
use crate::math::bitmap::RgbBitmap;
use crate::math::constants::{Float, Vector3f, FLOAT_MAX};
use crate::math::frame::Frame;
use crate::math::ray::Ray3f;
use crate::math::warp::sample_cosine_hemisphere;

pub const THROUGHPUT_CHANNEL: &str = "throughput";

const SHADOW_EPSILON: Float = 1e-4;
const MIN_THROUGHPUT: Float = 1e-3;

enum Outcome {
    Escaped(Vector3f),
    Bounce(Ray3f, Vector3f),
    Absorbed,
    Unchanged,
}

/// Diffuse surfaces lit by a constant sky.
///
/// Rays that left the domain deposit `sky * throughput` into the film of
/// their pixel. Rays that hit a surface bounce in a cosine-weighted
/// direction with their throughput scaled by `albedo`, and are terminated
/// once it drops below a small threshold. Needs the intersection block for
/// surface normals; without it every hit is terminated.
pub struct SkyLightScatterer {
    sky: Vector3f,
    albedo: Float,
    seed: u64,
    film: RgbBitmap,
}

impl SkyLightScatterer {
    pub fn new(sky: Vector3f, albedo: Float, seed: u64, width: usize, height: usize) -> Self {
        Self { sky, albedo, seed, film: RgbBitmap::black(width, height) }
    }

    pub fn film(&self) -> &RgbBitmap {
        &self.film
    }

    pub fn into_film(self) -> RgbBitmap {
        self.film
    }

    /// Registers the per-ray throughput the scatterer carries across bounces.
    pub fn prepare<E: Executor>(&self, rays: &mut RayBatch<E>) -> Result<()> {
        if rays.has_channel(THROUGHPUT_CHANNEL) {
            rays.channel_mut::<Vector3f>(THROUGHPUT_CHANNEL)?.fill(Vector3f::new(1.0, 1.0, 1.0));
            Ok(())
        } else {
            rays.add_channel(THROUGHPUT_CHANNEL, Vector3f::new(1.0, 1.0, 1.0))
        }
    }

    fn outcome<E: Executor>(&self, rays: &RayBatch<E>, throughput: &[Vector3f], i: usize, bounce: u32) -> Outcome {
        match rays.status()[i] {
            RayStatus::ExitedDomain => Outcome::Escaped(self.sky.component_mul(&throughput[i])),
            RayStatus::Active => {
                let data = match rays.intersection() {
                    Some(data) => data,
                    None => return Outcome::Absorbed,
                };
                let weight = throughput[i] * self.albedo;
                if weight.max() < MIN_THROUGHPUT {
                    return Outcome::Absorbed;
                }

                let dir = rays.dir(i);
                let mut n = data.normal(i);
                if n.dot(&dir) > 0.0 {
                    n = -n;
                }
                let mut rng = LcgRng::for_ray(self.seed, rays.pixel_idx()[i] as u64, bounce);
                let local = sample_cosine_hemisphere(&rng.next_2d());
                let new_dir = Frame::from_normal(&n).from_local(local);
                let origin = data.point(i) + n * SHADOW_EPSILON;
                Outcome::Bounce(Ray3f::new(origin, new_dir, Some(0.0), Some(FLOAT_MAX)), weight)
            }
            _ => Outcome::Unchanged,
        }
    }
}

impl Scatterer for SkyLightScatterer {
    fn scatter<E: Executor>(&mut self, rays: &mut RayBatch<E>, bounce: u32) -> Result<()> {
        let indices: Vec<usize> = (0..rays.num_rays()).collect();
        let outcomes = {
            let batch: &RayBatch<E> = rays;
            let throughput = batch.channel::<Vector3f>(THROUGHPUT_CHANNEL)?.as_slice();
            batch.executor().map_collect(&indices, |i| self.outcome(batch, throughput, *i, bounce))
        };

        let width = self.film.width();
        let mut escaped = 0;
        let mut absorbed = 0;
        for (i, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Outcome::Escaped(radiance) => {
                    let pixel = rays.pixel_idx()[i] as usize;
                    if let Some(value) = self.film.get_mut(pixel) {
                        *value += radiance;
                    } else {
                        log::warn!("Ray {} carries pixel {} outside a {}-wide film.", i, pixel, width);
                    }
                    escaped += 1;
                }
                Outcome::Bounce(ray, weight) => {
                    rays.set_ray(i, &ray);
                    rays.hit_idx_mut()[i] = NO_HIT;
                    rays.channel_mut::<Vector3f>(THROUGHPUT_CHANNEL)?.as_mut_slice()[i] = weight;
                }
                Outcome::Absorbed => {
                    rays.status_mut()[i] = RayStatus::Terminated;
                    absorbed += 1;
                }
                Outcome::Unchanged => {}
            }
        }
        log::debug!("Bounce {}: {} rays escaped, {} absorbed.", bounce, escaped, absorbed);
        Ok(())
    }
}
