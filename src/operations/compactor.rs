// Copyright @yucwang 2026

use crate::core::error::{RayBatchError, Result};
use crate::core::executor::Executor;
use crate::core::ray_batch::RayBatch;
use crate::core::status::{RayStatus, StatusSet};

/// Drops every ray that is not `Active` and returns the mask that was
/// applied, so owners of external ray-aligned state can filter it the same
/// way.
pub fn compact_active<E: Executor>(rays: &mut RayBatch<E>) -> Result<Vec<bool>> {
    compact_matching(rays, StatusSet::single(RayStatus::Active))
}

/// Keeps `Active` and `Lost` rays.
pub fn compact_in_mesh<E: Executor>(rays: &mut RayBatch<E>) -> Result<Vec<bool>> {
    compact_matching(rays, StatusSet::IN_MESH)
}

pub fn compact_matching<E: Executor>(rays: &mut RayBatch<E>, keep: StatusSet) -> Result<Vec<bool>> {
    let mask = rays.executor.map_collect(&rays.status, |s| keep.contains(*s));
    compact_with_mask(rays, &mask)?;
    Ok(mask)
}

/// Filters every array of the batch with one mask, keeping relative order.
///
/// The batch is checked before anything is touched; on error it is left
/// unchanged. Returns the new ray count.
pub fn compact_with_mask<E: Executor>(rays: &mut RayBatch<E>, mask: &[bool]) -> Result<usize> {
    if mask.len() != rays.num_rays {
        return Err(RayBatchError::MaskLengthMismatch { expected: rays.num_rays, actual: mask.len() });
    }
    rays.check_consistency()?;

    let before = rays.num_rays;
    let RayBatch {
        origin_x, origin_y, origin_z,
        dir_x, dir_y, dir_z,
        distance, min_distance, max_distance,
        status, pixel_idx, hit_idx,
        intersection, channels, num_rays, executor,
    } = rays;
    let executor: &E = executor;

    let mut floats = [origin_x, origin_y, origin_z, dir_x, dir_y, dir_z, distance, min_distance, max_distance];
    for array in floats.iter_mut() {
        let compacted = executor.compact(array.as_slice(), mask);
        **array = compacted;
    }
    if let Some(data) = intersection {
        for array in data.arrays_mut().iter_mut() {
            let compacted = executor.compact(array.as_slice(), mask);
            **array = compacted;
        }
    }

    *status = executor.compact(status.as_slice(), mask);
    *pixel_idx = executor.compact(pixel_idx.as_slice(), mask);
    *hit_idx = executor.compact(hit_idx.as_slice(), mask);
    *num_rays = status.len();

    for (_, channel) in channels.iter_mut() {
        channel.compact(mask, executor);
    }

    log::debug!("Compacted ray batch: {} -> {} rays.", before, rays.num_rays);
    debug_assert!(rays.check_consistency().is_ok());
    Ok(rays.num_rays)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::channel::{apply_mask, Channel};
    use crate::core::ray_batch::NO_HIT;
    use crate::executors::parallel::RayonExecutor;
    use crate::executors::serial::SerialExecutor;
    use crate::math::constants::{Float, Id, Vector2f, Vector3f};
    use crate::operations::query::rays_in_mesh;
    use crate::operations::reconcile::reconcile_from_hits;

    fn tag_rays<E: Executor>(rays: &mut RayBatch<E>) {
        let n = rays.num_rays();
        for i in 0..n {
            let f = i as Float;
            rays.origin_x_mut()[i] = f;
            rays.origin_y_mut()[i] = f + 0.1;
            rays.origin_z_mut()[i] = f + 0.2;
            rays.dir_x_mut()[i] = -f;
            rays.dir_y_mut()[i] = -f - 0.1;
            rays.dir_z_mut()[i] = -f - 0.2;
            rays.distance_mut()[i] = 10.0 * f;
            rays.min_distance_mut()[i] = 20.0 * f;
            rays.max_distance_mut()[i] = 30.0 * f;
            rays.pixel_idx_mut()[i] = 100 + i as Id;
            rays.hit_idx_mut()[i] = 200 + i as Id;
            if let Some(data) = rays.intersection_mut() {
                data.set(i, Vector3f::new(f, f, f), Vector3f::new(0.0, f, 0.0), Vector2f::new(f, -f), 0.5 * f);
            }
        }
    }

    #[test]
    fn test_round_trip_scenario() {
        let mut rays = RayBatch::new(4, false);
        rays.hit_idx_mut().copy_from_slice(&[-1, 5, -1, 2]);
        rays.status_mut().copy_from_slice(&[
            RayStatus::Active, RayStatus::Active, RayStatus::Terminated, RayStatus::Active,
        ]);
        rays.pixel_idx_mut().copy_from_slice(&[10, 11, 12, 13]);

        reconcile_from_hits(&mut rays);
        assert_eq!(rays.status(), &[
            RayStatus::ExitedDomain, RayStatus::Active, RayStatus::Terminated, RayStatus::Active,
        ]);
        assert_eq!(rays_in_mesh(&rays), 2);

        let mask = compact_active(&mut rays).expect("consistent batch");
        assert_eq!(mask, vec![false, true, false, true]);
        assert_eq!(rays.num_rays(), 2);
        assert_eq!(rays.pixel_idx(), &[11, 13]);
        assert_eq!(rays.hit_idx(), &[5, 2]);
    }

    fn check_alignment<E: Executor>(mut rays: RayBatch<E>) {
        let n = rays.num_rays();
        tag_rays(&mut rays);
        rays.add_channel("throughput", Vector3f::zeros()).expect("new channel");
        for i in 0..n {
            rays.channel_mut::<Vector3f>("throughput").expect("typed").as_mut_slice()[i] =
                Vector3f::new(i as Float, 0.0, 1.0);
            rays.status_mut()[i] = if i % 3 == 1 { RayStatus::Terminated } else { RayStatus::Active };
        }

        let mask = compact_active(&mut rays).expect("consistent batch");
        let kept: Vec<usize> = (0..n).filter(|i| mask[*i]).collect();
        assert_eq!(rays.num_rays(), kept.len());
        assert_eq!(rays.num_rays(), mask.iter().filter(|m| **m).count());
        assert!(rays.check_consistency().is_ok());

        for (new, old) in kept.iter().enumerate() {
            let f = *old as Float;
            assert_eq!(rays.origin(new), Vector3f::new(f, f + 0.1, f + 0.2));
            assert_eq!(rays.dir(new), Vector3f::new(-f, -f - 0.1, -f - 0.2));
            assert_eq!(rays.distance()[new], 10.0 * f);
            assert_eq!(rays.min_distance()[new], 20.0 * f);
            assert_eq!(rays.max_distance()[new], 30.0 * f);
            assert_eq!(rays.pixel_idx()[new], 100 + *old as Id);
            assert_eq!(rays.hit_idx()[new], 200 + *old as Id);
            assert_eq!(rays.status()[new], RayStatus::Active);
            assert_eq!(rays.channel::<Vector3f>("throughput").expect("typed").as_slice()[new],
                       Vector3f::new(f, 0.0, 1.0));
            if let Some(data) = rays.intersection() {
                assert_eq!(data.point(new), Vector3f::new(f, f, f));
                assert_eq!(data.normal(new), Vector3f::new(0.0, f, 0.0));
                assert_eq!(data.uv(new), Vector2f::new(f, -f));
                assert_eq!(data.scalar(new), 0.5 * f);
            }
        }
    }

    #[test]
    fn test_compaction_keeps_every_array_aligned() {
        check_alignment(RayBatch::new(17, false));
        check_alignment(RayBatch::new(17, true));
        check_alignment(RayBatch::with_executor(5000, true, RayonExecutor::new()));
    }

    #[test]
    fn test_compact_in_mesh_keeps_lost_rays() {
        let mut rays = RayBatch::new(4, false);
        rays.status_mut().copy_from_slice(&[
            RayStatus::Lost, RayStatus::ExitedMesh, RayStatus::Active, RayStatus::Abandoned,
        ]);
        let mask = compact_in_mesh(&mut rays).expect("consistent batch");
        assert_eq!(mask, vec![true, false, true, false]);
        assert_eq!(rays.status(), &[RayStatus::Lost, RayStatus::Active]);
        assert_eq!(rays.pixel_idx(), &[0, 2]);
    }

    #[test]
    fn test_returned_mask_filters_external_state() {
        let mut rays = RayBatch::new(5, false);
        rays.hit_idx_mut().copy_from_slice(&[1, NO_HIT, 2, NO_HIT, 3]);
        reconcile_from_hits(&mut rays);

        let mut external = Channel::from_vec(vec!['a', 'b', 'c', 'd', 'e']);
        let mask = compact_active(&mut rays).expect("consistent batch");
        apply_mask(&mut external, &mask, &SerialExecutor).expect("aligned");
        assert_eq!(external.as_slice(), &['a', 'c', 'e']);
    }

    #[test]
    fn test_inconsistent_batch_is_rejected_untouched() {
        let mut rays = RayBatch::new(3, false);
        rays.dir_y.push(0.0);
        let err = compact_active(&mut rays).unwrap_err();
        assert_eq!(err, RayBatchError::LengthMismatch { field: "dir_y".to_string(), expected: 3, actual: 4 });
        assert_eq!(rays.num_rays(), 3);
        assert_eq!(rays.origin_x().len(), 3);

        let mut rays = RayBatch::new(3, false);
        assert!(matches!(
            compact_with_mask(&mut rays, &[true]),
            Err(RayBatchError::MaskLengthMismatch { expected: 3, actual: 1 })
        ));
    }

    #[test]
    fn test_compact_everything_away() {
        let mut rays = RayBatch::new(6, true);
        rays.reset_status(RayStatus::Terminated);
        let mask = compact_active(&mut rays).expect("consistent batch");
        assert!(mask.iter().all(|m| !m));
        assert!(rays.is_empty());
        assert!(rays.check_consistency().is_ok());
    }
}
