// Copyright @yucwang 2026

use indicatif::{ProgressBar, ProgressStyle};

use crate::core::channel::{apply_mask, RayChannel};
use crate::core::error::Result;
use crate::core::executor::Executor;
use crate::core::intersector::Intersector;
use crate::core::ray_batch::RayBatch;
use crate::core::scatter::Scatterer;
use crate::core::status::RayStatus;
use crate::operations::compactor::compact_active;
use crate::operations::query::{count_matching, rays_in_mesh};
use crate::operations::reconcile::reconcile_from_hits;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceStats {
    pub bounces: u32,
    /// Rays still travelling at the start of each bounce, after reconcile.
    pub active_per_bounce: Vec<usize>,
    /// Rays dropped by compaction over the whole run.
    pub retired: usize,
    pub abandoned: usize,
}

/// Drives a batch through intersect, reconcile, scatter and compact until
/// every ray is retired or the depth budget is spent.
pub struct WavefrontTracer {
    max_depth: u32,
    show_progress: bool,
}

impl WavefrontTracer {
    pub fn new(max_depth: u32) -> Self {
        Self { max_depth, show_progress: false }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn trace<E, I, S>(&self, rays: &mut RayBatch<E>, intersector: &I, scatterer: &mut S) -> Result<TraceStats>
    where
        E: Executor,
        I: Intersector,
        S: Scatterer,
    {
        self.run(rays, intersector, scatterer, None)
    }

    /// Same as `trace`, also filtering `external` with every compaction mask.
    pub fn trace_with_external<E, I, S>(&self,
                                        rays: &mut RayBatch<E>,
                                        intersector: &I,
                                        scatterer: &mut S,
                                        external: &mut dyn RayChannel<E>) -> Result<TraceStats>
    where
        E: Executor,
        I: Intersector,
        S: Scatterer,
    {
        self.run(rays, intersector, scatterer, Some(external))
    }

    fn run<E, I, S>(&self,
                    rays: &mut RayBatch<E>,
                    intersector: &I,
                    scatterer: &mut S,
                    mut external: Option<&mut dyn RayChannel<E>>) -> Result<TraceStats>
    where
        E: Executor,
        I: Intersector,
        S: Scatterer,
    {
        rays.check_consistency()?;
        rays.reset_status(RayStatus::Active);

        let progress = if self.show_progress {
            let bar = ProgressBar::new(self.max_depth as u64);
            bar.set_style(
                ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} bounces {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        } else {
            ProgressBar::hidden()
        };

        let mut stats = TraceStats::default();
        for bounce in 0..self.max_depth {
            intersector.intersect(rays);
            reconcile_from_hits(rays);

            // A bounce with nothing left in the scene still shades its misses
            // and compacts them away before the loop stops.
            let in_mesh = rays_in_mesh(rays);
            if in_mesh > 0 {
                stats.active_per_bounce.push(in_mesh);
                stats.bounces = bounce + 1;
            }

            scatterer.scatter(rays, bounce)?;

            let before = rays.num_rays();
            let mask = compact_active(rays)?;
            if let Some(external) = external.as_mut() {
                apply_mask(&mut **external, &mask, rays.executor())?;
            }
            stats.retired += before - rays.num_rays();

            log::info!("Bounce {}: {} rays in flight, {} continue.", bounce, in_mesh, rays.num_rays());
            progress.set_message(format!("{} rays", rays.num_rays()));
            progress.inc(1);

            if in_mesh == 0 || rays.is_empty() {
                break;
            }
        }
        progress.finish_and_clear();

        let leftover = count_matching(rays, RayStatus::Active);
        if leftover > 0 {
            log::warn!("Depth budget of {} bounces exhausted with {} rays still active.", self.max_depth, leftover);
            let status = rays.status_mut();
            for s in status.iter_mut().filter(|s| **s == RayStatus::Active) {
                *s = RayStatus::Abandoned;
            }
            stats.abandoned = leftover;
        }
        Ok(stats)
    }
}
