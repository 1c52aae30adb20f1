// Copyright @yucwang 2026

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RayBatchError {
    /// Projection * view has no inverse.
    #[error("camera transform is degenerate: projection * view is not invertible")]
    DegenerateTransform,

    #[error("invalid canvas size {width}x{height}")]
    InvalidCanvas { width: usize, height: usize },

    #[error("pixel index {pixel} outside canvas of {count} pixels")]
    PixelOutOfRange { pixel: i64, count: usize },

    /// Raw status value that does not fit in a byte.
    #[error("invalid ray status value {0}, expected 0..=255")]
    InvalidStatus(i64),

    /// Byte that is not one of the known statuses.
    #[error("unknown ray status {0}")]
    UnknownStatus(u8),

    #[error("array `{field}` has {actual} elements, batch holds {expected} rays")]
    LengthMismatch { field: String, expected: usize, actual: usize },

    #[error("mask has {actual} entries, batch holds {expected} rays")]
    MaskLengthMismatch { expected: usize, actual: usize },

    #[error("channel `{0}` already exists")]
    DuplicateChannel(String),

    #[error("channel `{0}` does not exist")]
    UnknownChannel(String),

    #[error("channel `{name}` does not hold elements of type {expected}")]
    ChannelTypeMismatch { name: String, expected: &'static str },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

pub type Result<T> = std::result::Result<T, RayBatchError>;
