// Copyright @yucwang 2026

pub mod parallel;
pub mod serial;

pub use parallel::RayonExecutor;
pub use serial::SerialExecutor;
