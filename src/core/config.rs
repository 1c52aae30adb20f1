// Copyright @yucwang 2026

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use crate::math::constants::{Float, Vector3f};
use crate::shapes::sphere::Sphere;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings: {0}")]
    Parse(String),
    #[error("missing field `{0}`")]
    MissingField(&'static str),
}

/// Everything a traversal run needs besides the geometry itself.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceSettings {
    pub width: usize,
    pub height: usize,
    pub max_depth: u32,
    /// Vertical field of view in degrees.
    pub fov: Float,
    pub near_clip: Float,
    pub far_clip: Float,
    pub origin: Vector3f,
    pub target: Vector3f,
    pub up: Vector3f,
    pub intersection_data: bool,
    pub parallel: bool,
    pub threads: usize,
    pub seed: u64,
    pub sky: Vector3f,
    pub albedo: Float,
    /// Distance of the backdrop plane rasterized into the depth buffer.
    pub backdrop: Float,
    pub spheres: Vec<Sphere>,
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            max_depth: 8,
            fov: 45.0,
            near_clip: 0.01,
            far_clip: 1000.0,
            origin: Vector3f::new(0.0, 0.0, 5.0),
            target: Vector3f::new(0.0, 0.0, 0.0),
            up: Vector3f::new(0.0, 1.0, 0.0),
            intersection_data: true,
            parallel: true,
            threads: 0,
            seed: 0,
            sky: Vector3f::new(1.0, 1.0, 1.0),
            albedo: 0.7,
            backdrop: 50.0,
            spheres: Vec::new(),
        }
    }
}

pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<TraceSettings, ConfigError> {
    let path = path.as_ref();
    log::info!("Loading trace settings from: {}.", path.display());
    let xml = fs::read_to_string(path)?;
    parse_settings(&xml)
}

pub fn parse_settings(xml: &str) -> Result<TraceSettings, ConfigError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut defaults: HashMap<String, String> = HashMap::new();
    let mut settings = TraceSettings::default();
    let mut seen_root = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let attrs = read_attributes(&e, &defaults)?;
                match e.name().as_ref() {
                    b"trace" => seen_root = true,
                    b"default" => {
                        let key = attrs.get("name").ok_or(ConfigError::MissingField("default.name"))?;
                        let value = attrs.get("value").ok_or(ConfigError::MissingField("default.value"))?;
                        defaults.insert(key.clone(), value.clone());
                    }
                    b"integer" => {
                        let (name, value) = named_value(&attrs, "integer")?;
                        match name {
                            "width" => settings.width = parse_usize(value)?,
                            "height" => settings.height = parse_usize(value)?,
                            "max_depth" => settings.max_depth = parse_u32(value)?,
                            "threads" => settings.threads = parse_usize(value)?,
                            "seed" => settings.seed = parse_u32(value)? as u64,
                            _ => log::warn!("Ignoring unknown integer setting: {}.", name),
                        }
                    }
                    b"float" => {
                        let (name, value) = named_value(&attrs, "float")?;
                        match name {
                            "fov" => settings.fov = parse_float(value)?,
                            "near_clip" => settings.near_clip = parse_float(value)?,
                            "far_clip" => settings.far_clip = parse_float(value)?,
                            "albedo" => settings.albedo = parse_float(value)?,
                            "backdrop" => settings.backdrop = parse_float(value)?,
                            _ => log::warn!("Ignoring unknown float setting: {}.", name),
                        }
                    }
                    b"boolean" => {
                        let (name, value) = named_value(&attrs, "boolean")?;
                        match name {
                            "intersection_data" => settings.intersection_data = parse_bool(value)?,
                            "parallel" => settings.parallel = parse_bool(value)?,
                            _ => log::warn!("Ignoring unknown boolean setting: {}.", name),
                        }
                    }
                    b"rgb" => {
                        let (name, value) = named_value(&attrs, "rgb")?;
                        if name == "sky" {
                            settings.sky = parse_vec3(value)?;
                        }
                    }
                    b"lookat" => {
                        if let Some(v) = attrs.get("origin") {
                            settings.origin = parse_vec3(v)?;
                        }
                        if let Some(v) = attrs.get("target") {
                            settings.target = parse_vec3(v)?;
                        }
                        if let Some(v) = attrs.get("up") {
                            settings.up = parse_vec3(v)?;
                        }
                    }
                    b"sphere" => {
                        let center = attrs.get("center").ok_or(ConfigError::MissingField("sphere.center"))?;
                        let radius = attrs.get("radius").ok_or(ConfigError::MissingField("sphere.radius"))?;
                        settings.spheres.push(Sphere::new(parse_vec3(center)?, parse_float(radius)?));
                    }
                    _ => {}
                }
            }
            Err(e) => {
                return Err(ConfigError::Parse(e.to_string()));
            }
            _ => {}
        }

        buf.clear();
    }

    if !seen_root {
        return Err(ConfigError::MissingField("trace"));
    }
    if settings.width == 0 || settings.height == 0 {
        return Err(ConfigError::Parse(format!("film must be non-empty, got {}x{}", settings.width, settings.height)));
    }
    Ok(settings)
}

fn read_attributes(e: &BytesStart, defaults: &HashMap<String, String>) -> Result<HashMap<String, String>, ConfigError> {
    let mut out = HashMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| ConfigError::Parse(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value().map_err(|err| ConfigError::Parse(err.to_string()))?;
        out.insert(key, resolve_value(&value, defaults));
    }
    Ok(out)
}

fn named_value<'a>(attrs: &'a HashMap<String, String>, tag: &'static str) -> Result<(&'a str, &'a str), ConfigError> {
    let name = attrs.get("name").ok_or(ConfigError::MissingField("name"))?;
    let value = attrs.get("value").ok_or_else(|| ConfigError::Parse(format!("<{} name=\"{}\"> has no value", tag, name)))?;
    Ok((name.as_str(), value.as_str()))
}

fn resolve_value(raw: &str, defaults: &HashMap<String, String>) -> String {
    let mut out = raw.to_string();
    for (k, v) in defaults {
        out = out.replace(&format!("${}", k), v);
    }
    out
}

fn parse_float(value: &str) -> Result<Float, ConfigError> {
    value.trim().parse::<Float>().map_err(|_| ConfigError::Parse(format!("invalid float: {}", value)))
}

fn parse_u32(value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| ConfigError::Parse(format!("invalid integer: {}", value)))
}

fn parse_usize(value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| ConfigError::Parse(format!("invalid integer: {}", value)))
}

fn parse_bool(value: &str) -> Result<bool, ConfigError> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::Parse(format!("invalid boolean: {}", value))),
    }
}

fn parse_vec3(value: &str) -> Result<Vector3f, ConfigError> {
    let mut parts = value.split(',').map(|s| s.trim()).filter(|s| !s.is_empty());
    let x = parts.next().ok_or_else(|| ConfigError::Parse("invalid vec3".to_string()))?;
    let y = parts.next().ok_or_else(|| ConfigError::Parse("invalid vec3".to_string()))?;
    let z = parts.next().ok_or_else(|| ConfigError::Parse("invalid vec3".to_string()))?;
    Ok(Vector3f::new(parse_float(x)?, parse_float(y)?, parse_float(z)?))
}
