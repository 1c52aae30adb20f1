// Copyright 2020 @TwoCookingMice

use super::constants::{ Float, Vector3f };

use std::ops;
use std::vec::Vec;

/// Dense row-major image of per-pixel values.
#[derive(Debug, Clone)]
pub struct Bitmap<T> {
    data: Vec<T>,
    height: usize,
    width: usize
}

/// Per-pixel normalized depth in `[0, 1]`; `Float::INFINITY` marks a pixel
/// without a recorded depth.
pub type DepthBuffer = Bitmap<Float>;

pub type RgbBitmap = Bitmap<Vector3f>;

impl<T> ops::Index<(usize, usize)> for Bitmap<T> {
    type Output = T;

    fn index(&self, index: (usize, usize)) -> &T {
        assert!(index.0 < self.width && index.1 < self.height);
        &self.data[index.0 + self.width * index.1]
    }
}

impl<T> ops::IndexMut<(usize, usize)> for Bitmap<T> {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut T {
        assert!(index.0 < self.width && index.1 < self.height);
        &mut self.data[index.0 + self.width * index.1]
    }
}

impl<T: Clone> Bitmap<T> {
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self { data: vec![value; width * height],
               width,
               height }
    }
}

impl<T> Bitmap<T> {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, pixel: usize) -> Option<&T> {
        self.data.get(pixel)
    }

    pub fn get_mut(&mut self, pixel: usize) -> Option<&mut T> {
        self.data.get_mut(pixel)
    }

    pub fn pixels(&self) -> &[T] {
        &self.data
    }
}

impl DepthBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, Float::INFINITY)
    }
}

impl RgbBitmap {
    pub fn black(width: usize, height: usize) -> Self {
        Self::filled(width, height, Vector3f::zeros())
    }
}

/* Test for Bitmap */
