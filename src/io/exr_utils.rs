/* Copyright 2020 @TwoCookingMice */

use std::path::Path;

use exr::prelude::*;

use crate::math::bitmap::{Bitmap, RgbBitmap};
use crate::math::constants::Float;

// Write an RGB film to an OpenEXR file
pub fn write_rgb_exr<P: AsRef<Path>>(film: &RgbBitmap, file_path: P) -> exr::error::Result<()> {
    let path = file_path.as_ref();
    log::info!("Starting writing openexr image: {}.", path.display());

    let width = film.width();
    write_rgb_file(path, width, film.height(), |x, y| {
        let v = film.pixels()[y * width + x];
        (v.x, v.y, v.z)
    })?;
    log::info!("EXR written to: {}.", path.display());
    Ok(())
}

// Write a per-pixel scalar field as a grey OpenEXR image; values that are
// not finite are written as `background`.
pub fn write_scalar_exr<P: AsRef<Path>>(field: &Bitmap<Float>,
                                        background: Float,
                                        file_path: P) -> exr::error::Result<()> {
    let path = file_path.as_ref();
    log::info!("Starting writing openexr image: {}.", path.display());

    let width = field.width();
    write_rgb_file(path, width, field.height(), |x, y| {
        let v = field.pixels()[y * width + x];
        let v = if v.is_finite() { v } else { background };
        (v, v, v)
    })?;
    log::info!("EXR written to: {}.", path.display());
    Ok(())
}
