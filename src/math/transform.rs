// Copyright 2020 @TwoCookingMice

use super::constants::{ Vector3f, Vector4f, Matrix4f };
use crate::core::error::{ RayBatchError, Result };

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    matrix: Matrix4f,
    inv_matrix: Matrix4f
}

impl Transform {
    // Singular matrices are rejected.
    pub fn new(matrix: Matrix4f) -> Result<Self> {
        let inv_matrix = matrix.try_inverse().ok_or(RayBatchError::DegenerateTransform)?;
        Ok(Self { matrix, inv_matrix })
    }

    pub fn apply_point(&self, p: Vector3f) -> Vector3f {
        Self::project(&self.matrix, Vector4f::new(p[0], p[1], p[2], 1.0))
    }

    pub fn inv_apply_point(&self, p: Vector3f) -> Vector3f {
        Self::project(&self.inv_matrix, Vector4f::new(p[0], p[1], p[2], 1.0))
    }

    // Maps a homogeneous point through the inverse and divides by w.
    pub fn inv_apply_homogeneous(&self, p: Vector4f) -> Vector3f {
        Self::project(&self.inv_matrix, p)
    }

    fn project(m: &Matrix4f, p: Vector4f) -> Vector3f {
        let q = m * p;
        Vector3f::new(q[0] / q[3], q[1] / q[3], q[2] / q[3])
    }
}
