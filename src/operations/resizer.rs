// Copyright @yucwang 2026

use crate::core::channel::RayChannel;
use crate::core::error::Result;
use crate::core::executor::Executor;
use crate::core::ray_batch::{RayBatch, NO_HIT};
use crate::core::status::RayStatus;

/// Reshapes every array of the batch to `new_size` rays.
///
/// The first `min(old, new)` rays are kept as they are. New slots hold
/// placeholder values (zero distances, `NO_HIT` indices, `Active` status) and
/// must be filled by the caller before the next bounce. Statuses are not
/// interpreted. Resizing to the current size is a no-op.
pub fn resize<E: Executor>(rays: &mut RayBatch<E>, new_size: usize) -> Result<()> {
    if new_size == rays.num_rays {
        return Ok(());
    }
    rays.check_consistency()?;

    let before = rays.num_rays;
    let RayBatch {
        origin_x, origin_y, origin_z,
        dir_x, dir_y, dir_z,
        distance, min_distance, max_distance,
        status, pixel_idx, hit_idx,
        intersection, channels, num_rays, ..
    } = rays;

    let mut floats = [origin_x, origin_y, origin_z, dir_x, dir_y, dir_z, distance, min_distance, max_distance];
    for array in floats.iter_mut() {
        array.resize(new_size, 0.0);
    }
    if let Some(data) = intersection {
        for array in data.arrays_mut().iter_mut() {
            array.resize(new_size, 0.0);
        }
    }
    status.resize(new_size, RayStatus::Active);
    pixel_idx.resize(new_size, NO_HIT);
    hit_idx.resize(new_size, NO_HIT);
    for (_, channel) in channels.iter_mut() {
        channel.resize(new_size);
    }
    *num_rays = new_size;

    log::debug!("Resized ray batch: {} -> {} rays.", before, new_size);
    debug_assert!(rays.check_consistency().is_ok());
    Ok(())
}

/// Applies the same size decision to state kept outside the batch.
pub fn resize_external<E, C>(external: &mut C, new_size: usize)
where
    E: Executor,
    C: RayChannel<E> + ?Sized,
{
    if external.len() != new_size {
        external.resize(new_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::channel::Channel;
    use crate::core::error::RayBatchError;
    use crate::executors::parallel::RayonExecutor;
    use crate::executors::serial::SerialExecutor;
    use crate::math::constants::{Float, Id, Vector3f};

    fn numbered(n: usize, intersection: bool) -> RayBatch {
        let mut rays = RayBatch::new(n, intersection);
        for i in 0..n {
            rays.origin_x_mut()[i] = i as Float;
            rays.max_distance_mut()[i] = 2.0 * i as Float;
            rays.hit_idx_mut()[i] = i as Id;
            rays.status_mut()[i] = RayStatus::Lost;
        }
        rays.add_channel("weight", 1.0 as Float).expect("new channel");
        rays
    }

    #[test]
    fn test_resize_same_size_is_noop() {
        let mut rays = numbered(4, true);
        let origin_ptr = rays.origin_x().as_ptr();
        let channel_ptr = rays.channel::<Float>("weight").expect("typed").as_slice().as_ptr();

        resize(&mut rays, 4).expect("no-op");
        assert_eq!(rays.origin_x().as_ptr(), origin_ptr);
        assert_eq!(rays.channel::<Float>("weight").expect("typed").as_slice().as_ptr(), channel_ptr);
        assert_eq!(rays.origin_x(), &[0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_resize_growth_preserves_prefix() {
        let mut rays = numbered(3, true);
        resize(&mut rays, 7).expect("consistent batch");

        assert_eq!(rays.num_rays(), 7);
        assert!(rays.check_consistency().is_ok());
        assert_eq!(&rays.origin_x()[..3], &[0.0, 1.0, 2.0]);
        assert_eq!(&rays.max_distance()[..3], &[0.0, 2.0, 4.0]);
        assert_eq!(&rays.hit_idx()[..3], &[0, 1, 2]);
        assert!(rays.status()[..3].iter().all(|s| *s == RayStatus::Lost));
        assert_eq!(&rays.channel::<Float>("weight").expect("typed").as_slice()[..3], &[1.0, 1.0, 1.0]);
        assert_eq!(rays.intersection().map(|d| d.u.len()), Some(7));
        assert_eq!(&rays.hit_idx()[3..], &[NO_HIT; 4]);
    }

    #[test]
    fn test_resize_shrink_truncates_every_array() {
        let mut rays = RayBatch::with_executor(10, false, RayonExecutor::new());
        rays.add_channel("throughput", Vector3f::new(1.0, 1.0, 1.0)).expect("new channel");
        resize(&mut rays, 2).expect("consistent batch");
        assert_eq!(rays.num_rays(), 2);
        assert_eq!(rays.pixel_idx(), &[0, 1]);
        assert_eq!(rays.channel::<Vector3f>("throughput").expect("typed").as_slice().len(), 2);
        assert!(rays.check_consistency().is_ok());
    }

    #[test]
    fn test_resize_rejects_inconsistent_batch() {
        let mut rays = numbered(3, false);
        rays.pixel_idx.pop();
        assert!(matches!(resize(&mut rays, 5), Err(RayBatchError::LengthMismatch { .. })));
        assert_eq!(rays.num_rays(), 3);
    }

    #[test]
    fn test_resize_external_follows_batch() {
        let mut rays = numbered(2, false);
        let mut external = Channel::from_vec(vec![3u16, 4]);
        resize(&mut rays, 5).expect("consistent batch");
        resize_external::<SerialExecutor, _>(&mut external, rays.num_rays());
        assert_eq!(external.as_slice(), &[3, 4, 0, 0, 0]);
    }
}
