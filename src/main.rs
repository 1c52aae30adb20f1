// Copyright 2020 TwoCookingMice

use std::env;
use std::error::Error;
use std::path::{Path, PathBuf};

use raybatch::core::camera::Camera;
use raybatch::core::config::{load_settings, TraceSettings};
use raybatch::core::executor::Executor;
use raybatch::core::ray_batch::RayBatch;
use raybatch::executors::{RayonExecutor, SerialExecutor};
use raybatch::integrators::sky_light::SkyLightScatterer;
use raybatch::integrators::wavefront::WavefrontTracer;
use raybatch::io::exr_utils;
use raybatch::math::bitmap::{Bitmap, DepthBuffer};
use raybatch::math::constants::{Float, Vector2f, Vector3f};
use raybatch::math::transform::Transform;
use raybatch::operations::projector::project_depth_to_distance;
use raybatch::sensors::perspective::PerspectiveCamera;
use raybatch::shapes::sphere::SphereIntersector;

fn main() {
    env::set_var("RUST_LOG", "info");
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <settings.xml> <output.exr> [--max-depth N] [--threads N] [--serial]", args[0]);
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = PathBuf::from(&args[2]);
    let mut max_depth_override: Option<u32> = None;
    let mut threads_override: Option<usize> = None;
    let mut serial = false;

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--max-depth" => {
                i += 1;
                max_depth_override = args.get(i).and_then(|v| v.parse::<u32>().ok());
            }
            "--threads" => {
                i += 1;
                threads_override = args.get(i).and_then(|v| v.parse::<usize>().ok());
            }
            "--serial" => serial = true,
            other => log::warn!("Ignoring unknown argument: {}.", other),
        }
        i += 1;
    }

    let mut settings = match load_settings(input_path) {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Failed to load {}: {}.", input_path, e);
            std::process::exit(1);
        }
    };
    if let Some(depth) = max_depth_override {
        settings.max_depth = depth;
    }
    if let Some(threads) = threads_override {
        settings.threads = threads;
    }
    if serial {
        settings.parallel = false;
    }

    let result = if settings.parallel {
        let executor = if settings.threads > 0 {
            RayonExecutor::with_threads(settings.threads)
        } else {
            Ok(RayonExecutor::new())
        };
        match executor {
            Ok(executor) => run(&settings, executor, &output_path),
            Err(e) => Err(Box::<dyn Error>::from(e)),
        }
    } else {
        run(&settings, SerialExecutor, &output_path)
    };

    if let Err(e) = result {
        log::error!("Trace failed: {}.", e);
        std::process::exit(1);
    }
}

fn run<E: Executor>(settings: &TraceSettings, executor: E, output_path: &Path) -> Result<(), Box<dyn Error>> {
    let camera = PerspectiveCamera::new(settings.origin,
                                        settings.target,
                                        settings.up,
                                        settings.fov.to_radians(),
                                        settings.width,
                                        settings.height,
                                        settings.near_clip,
                                        settings.far_clip);
    log::info!("{}", camera.describe());

    let mut rays = RayBatch::with_executor(0, settings.intersection_data, executor);
    camera.spawn_rays(&mut rays)?;
    log::info!("{}", rays.describe());

    let depth = rasterize_backdrop(&camera, settings.backdrop)?;
    project_depth_to_distance(&camera, &depth, &mut rays)?;

    let mut max_distance = Bitmap::filled(settings.width, settings.height, Float::INFINITY);
    for (pixel, d) in rays.pixel_idx().iter().zip(rays.max_distance().iter()) {
        if let Some(v) = max_distance.get_mut(*pixel as usize) {
            *v = *d;
        }
    }

    let intersector = SphereIntersector::new(settings.spheres.clone());
    let mut scatterer = SkyLightScatterer::new(settings.sky, settings.albedo, settings.seed,
                                               settings.width, settings.height);
    scatterer.prepare(&mut rays)?;

    let stats = WavefrontTracer::new(settings.max_depth)
        .with_progress(true)
        .trace(&mut rays, &intersector, &mut scatterer)?;
    log::info!("Traced {} bounces: {:?} rays per bounce, {} retired, {} abandoned.",
               stats.bounces, stats.active_per_bounce, stats.retired, stats.abandoned);

    exr_utils::write_rgb_exr(scatterer.film(), output_path)?;
    exr_utils::write_scalar_exr(&max_distance, 0.0, distance_path(output_path))?;
    Ok(())
}

/// Depth buffer of a plane facing the camera at `distance` along the view
/// axis, standing in for a raster pass over opaque geometry.
fn rasterize_backdrop(camera: &PerspectiveCamera, distance: Float) -> Result<DepthBuffer, Box<dyn Error>> {
    let (width, height) = (camera.width(), camera.height());
    let proj_view = Transform::new(camera.projection_matrix(width, height) * camera.view_matrix())?;
    let mut depth = DepthBuffer::new(width, height);
    if distance <= 0.0 {
        return Ok(depth);
    }

    let center = camera.sample_ray(&Vector2f::new(0.5, 0.5));
    let normal: Vector3f = center.dir();
    let plane_point = center.at(distance);
    for y in 0..height {
        for x in 0..width {
            let ray = camera.sample_ray(&Vector2f::new(x as Float / width as Float, y as Float / height as Float));
            let cos = ray.dir().dot(&normal);
            if cos <= 0.0 {
                continue;
            }
            let t = (plane_point - ray.origin()).dot(&normal) / cos;
            let ndc = proj_view.apply_point(ray.at(t));
            if ndc.z.abs() <= 1.0 {
                depth[(x, y)] = 0.5 * (ndc.z + 1.0);
            }
        }
    }
    Ok(depth)
}

fn distance_path(output_path: &Path) -> PathBuf {
    let stem = output_path.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
    output_path.with_file_name(format!("{}_distance.exr", stem))
}
