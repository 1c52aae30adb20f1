/* Copyright 2020 @Yuchen Wong */

pub type Float = f32;
pub type Id = i64;

pub type Vector2f = nalgebra::Vector2<Float>;
pub type Vector3f = nalgebra::Vector3<Float>;
pub type Vector4f = nalgebra::Vector4<Float>;
pub type Matrix4f = nalgebra::Matrix4<Float>;

pub const EPSILON: Float = 1e-4;
pub const PI: Float = 3.14159265359;
pub const INV_PI: Float = 0.31830988618;

pub const FLOAT_MAX: Float = std::f32::MAX;

// Pulls the reconstructed depth slightly towards the camera so a ray never
// ends exactly on the surface that produced the depth sample.
pub const DEPTH_OFFSET: Float = 1e-5;
