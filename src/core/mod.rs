// Copyright @yucwang 2021

pub mod camera;
pub mod canvas;
pub mod channel;
pub mod config;
pub mod error;
pub mod executor;
pub mod intersector;
pub mod ray_batch;
pub mod rng;
pub mod scatter;
pub mod status;
