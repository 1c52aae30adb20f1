// Copyright @yucwang 2021

pub mod core;
pub mod executors;
pub mod integrators;
pub mod io;
pub mod math;
pub mod operations;
pub mod sensors;
pub mod shapes;
