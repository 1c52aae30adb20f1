// Copyright @yucwang 2026

pub mod sky_light;
pub mod wavefront;
