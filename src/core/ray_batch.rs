// Copyright @yucwang 2026

use std::any::type_name;

use crate::core::channel::{Channel, RayChannel};
use crate::core::error::{RayBatchError, Result};
use crate::core::executor::Executor;
use crate::core::status::RayStatus;
use crate::executors::serial::SerialExecutor;
use crate::math::constants::{Float, Id, Vector2f, Vector3f, FLOAT_MAX};
use crate::math::ray::Ray3f;

/// Hit index written by intersectors when a ray misses everything.
pub const NO_HIT: Id = -1;

/// Surface attributes recorded at the closest hit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntersectionData {
    pub(crate) point_x: Vec<Float>,
    pub(crate) point_y: Vec<Float>,
    pub(crate) point_z: Vec<Float>,
    pub(crate) u: Vec<Float>,
    pub(crate) v: Vec<Float>,
    pub(crate) normal_x: Vec<Float>,
    pub(crate) normal_y: Vec<Float>,
    pub(crate) normal_z: Vec<Float>,
    pub(crate) scalar: Vec<Float>,
}

const INTERSECTION_FIELDS: [&str; 9] = [
    "point_x", "point_y", "point_z", "u", "v", "normal_x", "normal_y", "normal_z", "scalar",
];

impl IntersectionData {
    fn new(n: usize) -> Self {
        Self {
            point_x: vec![0.0; n],
            point_y: vec![0.0; n],
            point_z: vec![0.0; n],
            u: vec![0.0; n],
            v: vec![0.0; n],
            normal_x: vec![0.0; n],
            normal_y: vec![0.0; n],
            normal_z: vec![0.0; n],
            scalar: vec![0.0; n],
        }
    }

    fn arrays(&self) -> [&Vec<Float>; 9] {
        [
            &self.point_x, &self.point_y, &self.point_z,
            &self.u, &self.v,
            &self.normal_x, &self.normal_y, &self.normal_z,
            &self.scalar,
        ]
    }

    pub(crate) fn arrays_mut(&mut self) -> [&mut Vec<Float>; 9] {
        [
            &mut self.point_x, &mut self.point_y, &mut self.point_z,
            &mut self.u, &mut self.v,
            &mut self.normal_x, &mut self.normal_y, &mut self.normal_z,
            &mut self.scalar,
        ]
    }

    pub fn point(&self, i: usize) -> Vector3f {
        Vector3f::new(self.point_x[i], self.point_y[i], self.point_z[i])
    }

    pub fn normal(&self, i: usize) -> Vector3f {
        Vector3f::new(self.normal_x[i], self.normal_y[i], self.normal_z[i])
    }

    pub fn uv(&self, i: usize) -> Vector2f {
        Vector2f::new(self.u[i], self.v[i])
    }

    pub fn scalar(&self, i: usize) -> Float {
        self.scalar[i]
    }

    pub fn set(&mut self, i: usize, point: Vector3f, normal: Vector3f, uv: Vector2f, scalar: Float) {
        self.point_x[i] = point.x;
        self.point_y[i] = point.y;
        self.point_z[i] = point.z;
        self.normal_x[i] = normal.x;
        self.normal_y[i] = normal.y;
        self.normal_z[i] = normal.z;
        self.u[i] = uv.x;
        self.v[i] = uv.y;
        self.scalar[i] = scalar;
    }
}

macro_rules! slice_accessors {
    ($($field:ident, $field_mut:ident: $ty:ty;)*) => {
        $(
            pub fn $field(&self) -> &[$ty] {
                &self.$field
            }

            pub fn $field_mut(&mut self) -> &mut [$ty] {
                &mut self.$field
            }
        )*
    };
}

const CORE_FLOAT_FIELDS: [&str; 9] = [
    "origin_x", "origin_y", "origin_z", "dir_x", "dir_y", "dir_z",
    "distance", "min_distance", "max_distance",
];

/// Structure-of-arrays batch of rays.
///
/// Every array, including the optional intersection block and every named
/// channel, holds exactly `num_rays` elements; index `i` is the same ray in
/// all of them. Only the compactor and the resizer change the ray count.
pub struct RayBatch<E: Executor = SerialExecutor> {
    pub(crate) origin_x: Vec<Float>,
    pub(crate) origin_y: Vec<Float>,
    pub(crate) origin_z: Vec<Float>,
    pub(crate) dir_x: Vec<Float>,
    pub(crate) dir_y: Vec<Float>,
    pub(crate) dir_z: Vec<Float>,
    pub(crate) distance: Vec<Float>,
    pub(crate) min_distance: Vec<Float>,
    pub(crate) max_distance: Vec<Float>,
    pub(crate) status: Vec<RayStatus>,
    pub(crate) pixel_idx: Vec<Id>,
    pub(crate) hit_idx: Vec<Id>,
    pub(crate) intersection: Option<IntersectionData>,
    pub(crate) channels: Vec<(String, Box<dyn RayChannel<E>>)>,
    pub(crate) num_rays: usize,
    pub(crate) executor: E,
}

impl RayBatch<SerialExecutor> {
    pub fn new(num_rays: usize, intersection_data: bool) -> Self {
        Self::with_executor(num_rays, intersection_data, SerialExecutor)
    }
}

impl<E: Executor> RayBatch<E> {
    pub fn with_executor(num_rays: usize, intersection_data: bool, executor: E) -> Self {
        log::debug!("Allocating ray batch: {} rays, intersection data {}.", num_rays, intersection_data);
        Self {
            origin_x: vec![0.0; num_rays],
            origin_y: vec![0.0; num_rays],
            origin_z: vec![0.0; num_rays],
            dir_x: vec![0.0; num_rays],
            dir_y: vec![0.0; num_rays],
            dir_z: vec![0.0; num_rays],
            distance: vec![0.0; num_rays],
            min_distance: vec![0.0; num_rays],
            max_distance: vec![FLOAT_MAX; num_rays],
            status: vec![RayStatus::Active; num_rays],
            pixel_idx: (0..num_rays as Id).collect(),
            hit_idx: vec![NO_HIT; num_rays],
            intersection: if intersection_data { Some(IntersectionData::new(num_rays)) } else { None },
            channels: Vec::new(),
            num_rays,
            executor,
        }
    }

    pub fn num_rays(&self) -> usize {
        self.num_rays
    }

    pub fn is_empty(&self) -> bool {
        self.num_rays == 0
    }

    pub fn intersection_data_enabled(&self) -> bool {
        self.intersection.is_some()
    }

    pub fn intersection(&self) -> Option<&IntersectionData> {
        self.intersection.as_ref()
    }

    pub fn intersection_mut(&mut self) -> Option<&mut IntersectionData> {
        self.intersection.as_mut()
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    slice_accessors! {
        origin_x, origin_x_mut: Float;
        origin_y, origin_y_mut: Float;
        origin_z, origin_z_mut: Float;
        dir_x, dir_x_mut: Float;
        dir_y, dir_y_mut: Float;
        dir_z, dir_z_mut: Float;
        distance, distance_mut: Float;
        min_distance, min_distance_mut: Float;
        max_distance, max_distance_mut: Float;
        status, status_mut: RayStatus;
        pixel_idx, pixel_idx_mut: Id;
        hit_idx, hit_idx_mut: Id;
    }

    pub fn origin(&self, i: usize) -> Vector3f {
        Vector3f::new(self.origin_x[i], self.origin_y[i], self.origin_z[i])
    }

    pub fn dir(&self, i: usize) -> Vector3f {
        Vector3f::new(self.dir_x[i], self.dir_y[i], self.dir_z[i])
    }

    pub fn ray(&self, i: usize) -> Ray3f {
        Ray3f::from_parts(self.origin(i), self.dir(i), self.min_distance[i], self.max_distance[i])
    }

    pub fn set_ray(&mut self, i: usize, ray: &Ray3f) {
        let o = ray.origin();
        let d = ray.dir();
        self.origin_x[i] = o.x;
        self.origin_y[i] = o.y;
        self.origin_z[i] = o.z;
        self.dir_x[i] = d.x;
        self.dir_y[i] = d.y;
        self.dir_z[i] = d.z;
        self.min_distance[i] = ray.min_t;
        self.max_distance[i] = ray.max_t;
    }

    pub fn reset_status(&mut self, status: RayStatus) {
        self.executor.for_each_indexed(&mut self.status, |_, s| *s = status);
    }

    /// Moves the lower bound of rays that left a mesh to just past their
    /// exit distance.
    pub fn copy_distances_to_min(&mut self, offset: Float) {
        let distance = &self.distance;
        let status = &self.status;
        self.executor.for_each_indexed(&mut self.min_distance, |i, min| {
            if status[i] == RayStatus::ExitedMesh {
                *min = distance[i] + offset;
            }
        });
    }

    pub fn add_channel<T>(&mut self, name: &str, initial: T) -> Result<()>
    where
        T: Clone + Default + Send + Sync + 'static,
    {
        if self.has_channel(name) {
            return Err(RayBatchError::DuplicateChannel(name.to_string()));
        }
        let channel: Box<dyn RayChannel<E>> = Box::new(Channel::new(self.num_rays, initial));
        self.channels.push((name.to_string(), channel));
        Ok(())
    }

    /// Registers externally built storage; its length must match the batch.
    pub fn insert_channel(&mut self, name: &str, channel: Box<dyn RayChannel<E>>) -> Result<()> {
        if self.has_channel(name) {
            return Err(RayBatchError::DuplicateChannel(name.to_string()));
        }
        if channel.len() != self.num_rays {
            return Err(RayBatchError::LengthMismatch {
                field: name.to_string(),
                expected: self.num_rays,
                actual: channel.len(),
            });
        }
        self.channels.push((name.to_string(), channel));
        Ok(())
    }

    pub fn remove_channel(&mut self, name: &str) -> Result<Box<dyn RayChannel<E>>> {
        let pos = self.channels.iter().position(|(n, _)| n == name)
            .ok_or_else(|| RayBatchError::UnknownChannel(name.to_string()))?;
        Ok(self.channels.remove(pos).1)
    }

    pub fn has_channel(&self, name: &str) -> bool {
        self.channels.iter().any(|(n, _)| n == name)
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn channel<T: 'static>(&self, name: &str) -> Result<&Channel<T>> {
        let (_, channel) = self.channels.iter().find(|(n, _)| n == name)
            .ok_or_else(|| RayBatchError::UnknownChannel(name.to_string()))?;
        channel.as_any().downcast_ref::<Channel<T>>()
            .ok_or_else(|| RayBatchError::ChannelTypeMismatch { name: name.to_string(), expected: type_name::<T>() })
    }

    pub fn channel_mut<T: 'static>(&mut self, name: &str) -> Result<&mut Channel<T>> {
        let (_, channel) = self.channels.iter_mut().find(|(n, _)| n == name)
            .ok_or_else(|| RayBatchError::UnknownChannel(name.to_string()))?;
        channel.as_any_mut().downcast_mut::<Channel<T>>()
            .ok_or_else(|| RayBatchError::ChannelTypeMismatch { name: name.to_string(), expected: type_name::<T>() })
    }

    /// Fails with the first array whose length differs from `num_rays`.
    pub fn check_consistency(&self) -> Result<()> {
        let expected = self.num_rays;
        let check = |field: &str, actual: usize| -> Result<()> {
            if actual != expected {
                return Err(RayBatchError::LengthMismatch { field: field.to_string(), expected, actual });
            }
            Ok(())
        };

        for (name, array) in CORE_FLOAT_FIELDS.iter().zip(self.core_float_arrays().iter()) {
            check(name, array.len())?;
        }
        check("status", self.status.len())?;
        check("pixel_idx", self.pixel_idx.len())?;
        check("hit_idx", self.hit_idx.len())?;
        if let Some(data) = &self.intersection {
            for (name, array) in INTERSECTION_FIELDS.iter().zip(data.arrays().iter()) {
                check(name, array.len())?;
            }
        }
        for (name, channel) in self.channels.iter() {
            check(name, channel.len())?;
        }
        Ok(())
    }

    fn core_float_arrays(&self) -> [&Vec<Float>; 9] {
        [
            &self.origin_x, &self.origin_y, &self.origin_z,
            &self.dir_x, &self.dir_y, &self.dir_z,
            &self.distance, &self.min_distance, &self.max_distance,
        ]
    }

    pub(crate) fn core_float_arrays_mut(&mut self) -> [&mut Vec<Float>; 9] {
        [
            &mut self.origin_x, &mut self.origin_y, &mut self.origin_z,
            &mut self.dir_x, &mut self.dir_y, &mut self.dir_z,
            &mut self.distance, &mut self.min_distance, &mut self.max_distance,
        ]
    }

    pub fn describe(&self) -> String {
        format!("RayBatch\n  num_rays: {}\n  intersection_data: {}\n  channels: [{}]\n  executor: {}",
                self.num_rays,
                self.intersection_data_enabled(),
                self.channel_names().join(", "),
                self.executor.describe())
    }
}
