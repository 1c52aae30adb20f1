// Copyright @yucwang 2026

use crate::math::bitmap::DepthBuffer;
use crate::math::constants::Float;

/// Per-pixel depth written by an earlier raster pass, indexed by linear
/// pixel id `x + width * y`.
pub trait DepthCanvas: Sync {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// `None` when `pixel` lies outside the canvas.
    fn depth(&self, pixel: usize) -> Option<Float>;
}

impl DepthCanvas for DepthBuffer {
    fn width(&self) -> usize {
        DepthBuffer::width(self)
    }

    fn height(&self) -> usize {
        DepthBuffer::height(self)
    }

    fn depth(&self, pixel: usize) -> Option<Float> {
        self.get(pixel).copied()
    }
}
