//! Scene description files.
//!
//! This module provides line-by-line parsing of the scene text format.
//! The parser is intentionally simple and fails closed: any tag or key
//! it does not recognize is a fatal error rather than a silent skip.
//!
//! # Format
//!
//! A file is a sequence of blocks separated by blank lines. Each block
//! opens with a tag line and continues with `key: value` lines:
//!
//! ```text
//! Material glass
//! color: 1,1,1
//! specular: 0.1
//! transmission: 0.9
//! refractiveIndex: 1.5
//!
//! Sphere
//! origin: 0,0,-2
//! radius: 0.5
//! material: glass
//! ```
//!
//! Numeric values are comma-separated floats (three values make a
//! vector, one a scalar). Materials are declared with an id and bound
//! to objects by the `material` key. `Renderer` and `Camera` blocks
//! populate the `RenderConfig` and `Camera` respectively. Lines
//! starting with `#` are comments.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;

use glint_math::Vec3;
use thiserror::Error;

use crate::camera::Camera;
use crate::config::{AntiAliasingMethod, RenderConfig};
use crate::light::PointLight;
use crate::material::{Material, Pattern};
use crate::primitive::SceneObject;
use crate::scene::Scene;

/// Errors raised while loading a scene file.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("unknown tag `{tag}` at line {line}")]
    UnknownTag { line: usize, tag: String },

    #[error("unknown key `{key}` at line {line}")]
    UnknownKey { line: usize, key: String },

    #[error("no material with id `{id}` at line {line}")]
    UnknownMaterial { line: usize, id: String },

    #[error("missing required key `{key}` in block at line {line}")]
    MissingKey { line: usize, key: String },
}

/// Result type for scene loading.
pub type ParseResult<T> = Result<T, ParseError>;

/// Load a scene and render settings from a file on disk.
pub fn load_scene_path(path: impl AsRef<Path>) -> ParseResult<(Scene, RenderConfig)> {
    let content = std::fs::read_to_string(path)?;
    load_scene_str(&content)
}

/// Load a scene and render settings from scene-file text.
pub fn load_scene_str(content: &str) -> ParseResult<(Scene, RenderConfig)> {
    SceneFileParser::new(content).parse()
}

/// One parsed `key: value` line. The raw value is kept so keys can be
/// interpreted as floats, ids, or enums depending on the block.
struct Property {
    line: usize,
    value: String,
}

struct Block {
    tag: String,
    /// Id following the tag, for material declarations
    id: Option<String>,
    line: usize,
    properties: HashMap<String, Property>,
}

struct SceneFileParser {
    lines: VecDeque<(usize, String)>,
    materials: HashMap<String, Arc<Material>>,
}

impl SceneFileParser {
    fn new(content: &str) -> Self {
        let lines = content
            .lines()
            .enumerate()
            .map(|(i, s)| (i + 1, s.to_string()))
            .collect();

        Self {
            lines,
            materials: HashMap::new(),
        }
    }

    fn parse(mut self) -> ParseResult<(Scene, RenderConfig)> {
        let mut scene = Scene::default();
        let mut config = RenderConfig::default();

        while let Some(block) = self.next_block()? {
            let tag = block.tag.clone();
            match tag.as_str() {
                "Material" => self.parse_material(block, false)?,
                "CheckerboardMaterial" => self.parse_material(block, true)?,
                "Sphere" => {
                    let object = self.parse_sphere(block)?;
                    scene.objects.push(object);
                }
                "Plane" => {
                    let object = self.parse_plane(block)?;
                    scene.objects.push(object);
                }
                "Disk" => {
                    let object = self.parse_disk(block)?;
                    scene.objects.push(object);
                }
                "PointLight" => scene.lights.push(parse_point_light(block)?),
                "Camera" => scene.camera = parse_camera(block)?,
                "Renderer" => config = parse_renderer(block)?,
                _ => {
                    return Err(ParseError::UnknownTag {
                        line: block.line,
                        tag,
                    })
                }
            }
        }

        log::info!(
            "loaded scene: {} objects, {} lights, {} materials",
            scene.objects.len(),
            scene.lights.len(),
            self.materials.len()
        );
        Ok((scene, config))
    }

    /// Pull the next block off the line queue, or `None` at EOF.
    fn next_block(&mut self) -> ParseResult<Option<Block>> {
        // Skip blank lines and comments between blocks.
        let (line, header) = loop {
            match self.lines.pop_front() {
                Some((n, l)) => {
                    let trimmed = l.trim();
                    if !trimmed.is_empty() && !trimmed.starts_with('#') {
                        break (n, trimmed.to_string());
                    }
                }
                None => return Ok(None),
            }
        };

        let mut parts = header.splitn(2, ' ');
        let tag = parts.next().unwrap_or_default().to_string();
        let id = parts.next().map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        let mut properties = HashMap::new();
        while let Some((n, l)) = self.lines.pop_front() {
            let trimmed = l.trim();
            if trimmed.is_empty() {
                break;
            }
            if trimmed.starts_with('#') {
                continue;
            }

            let (key, value) = trimmed.split_once(':').ok_or_else(|| ParseError::Syntax {
                line: n,
                message: format!("property must be of form `key: value`, got `{trimmed}`"),
            })?;
            properties.insert(
                key.trim().to_string(),
                Property {
                    line: n,
                    value: value.trim().to_string(),
                },
            );
        }

        Ok(Some(Block {
            tag,
            id,
            line,
            properties,
        }))
    }

    fn parse_material(&mut self, mut block: Block, checkerboard: bool) -> ParseResult<()> {
        let id = block.id.take().ok_or_else(|| ParseError::Syntax {
            line: block.line,
            message: format!("{} requires an id, e.g. `{} glass`", block.tag, block.tag),
        })?;

        let mut material = Material::default();
        if checkerboard {
            material.color = Vec3::ONE;
            material.pattern = Pattern::Checkerboard {
                odd_color: Vec3::ZERO,
                grain: 0.5,
            };
        }

        for (key, property) in block.properties {
            match key.as_str() {
                "color" => material.color = parse_vec3(&property)?,
                "ambient" => material.ambient = parse_f32(&property)?,
                "diffuse" => material.diffuse = parse_f32(&property)?,
                "specular" => material.specular = parse_f32(&property)?,
                "transmission" => material.transmission = parse_f32(&property)?,
                "refractiveIndex" => material.refractive_index = parse_f32(&property)?,
                "odd" if checkerboard => {
                    if let Pattern::Checkerboard { odd_color, .. } = &mut material.pattern {
                        *odd_color = parse_vec3(&property)?;
                    }
                }
                "grain" if checkerboard => {
                    if let Pattern::Checkerboard { grain, .. } = &mut material.pattern {
                        *grain = parse_f32(&property)?;
                    }
                }
                _ => {
                    return Err(ParseError::UnknownKey {
                        line: property.line,
                        key: key.clone(),
                    })
                }
            }
        }

        log::debug!("registered {} `{}`", block.tag, id);
        self.materials.insert(id, Arc::new(material));
        Ok(())
    }

    /// Resolve a `material: <id>` property against the declared
    /// materials. Declaration order matters: objects can only bind
    /// materials that appeared earlier in the file.
    fn bind_material(&self, block: &Block) -> ParseResult<Arc<Material>> {
        let property = block
            .properties
            .get("material")
            .ok_or_else(|| ParseError::MissingKey {
                line: block.line,
                key: "material".to_string(),
            })?;
        self.materials
            .get(&property.value)
            .cloned()
            .ok_or_else(|| ParseError::UnknownMaterial {
                line: property.line,
                id: property.value.clone(),
            })
    }

    fn parse_sphere(&self, block: Block) -> ParseResult<SceneObject> {
        let material = self.bind_material(&block)?;
        let mut origin = None;
        let mut radius = None;
        for (key, property) in &block.properties {
            match key.as_str() {
                "origin" => origin = Some(parse_vec3(property)?),
                "radius" => radius = Some(parse_f32(property)?),
                "material" => {}
                _ => {
                    return Err(ParseError::UnknownKey {
                        line: property.line,
                        key: key.clone(),
                    })
                }
            }
        }
        Ok(SceneObject::sphere(
            material,
            require(origin, "origin", block.line)?,
            require(radius, "radius", block.line)?,
        ))
    }

    fn parse_plane(&self, block: Block) -> ParseResult<SceneObject> {
        let material = self.bind_material(&block)?;
        let mut point = None;
        let mut normal = None;
        for (key, property) in &block.properties {
            match key.as_str() {
                "point" => point = Some(parse_vec3(property)?),
                "normal" => normal = Some(parse_vec3(property)?),
                "material" => {}
                _ => {
                    return Err(ParseError::UnknownKey {
                        line: property.line,
                        key: key.clone(),
                    })
                }
            }
        }
        Ok(SceneObject::plane(
            material,
            require(point, "point", block.line)?,
            require(normal, "normal", block.line)?,
        ))
    }

    fn parse_disk(&self, block: Block) -> ParseResult<SceneObject> {
        let material = self.bind_material(&block)?;
        let mut origin = None;
        let mut normal = None;
        let mut radius = None;
        for (key, property) in &block.properties {
            match key.as_str() {
                "origin" => origin = Some(parse_vec3(property)?),
                "normal" => normal = Some(parse_vec3(property)?),
                "radius" => radius = Some(parse_f32(property)?),
                "material" => {}
                _ => {
                    return Err(ParseError::UnknownKey {
                        line: property.line,
                        key: key.clone(),
                    })
                }
            }
        }
        Ok(SceneObject::disk(
            material,
            require(origin, "origin", block.line)?,
            require(normal, "normal", block.line)?,
            require(radius, "radius", block.line)?,
        ))
    }
}

fn parse_point_light(block: Block) -> ParseResult<PointLight> {
    let mut light = PointLight::new(Vec3::ZERO, 1.0, 0.0);
    let mut position = None;
    for (key, property) in block.properties {
        match key.as_str() {
            "position" => position = Some(parse_vec3(&property)?),
            "intensity" => light.intensity = parse_f32(&property)?,
            "radius" => light.radius = parse_f32(&property)?,
            _ => return Err(ParseError::UnknownKey { line: property.line, key: key.clone() }),
        }
    }
    light.position = require(position, "position", block.line)?;
    Ok(light)
}

fn parse_camera(block: Block) -> ParseResult<Camera> {
    let mut camera = Camera::default();
    for (key, property) in block.properties {
        match key.as_str() {
            // Degrees in the file, radians in memory.
            "fov" => camera.field_of_view = parse_f32(&property)?.to_radians(),
            "position" => camera.position = parse_vec3(&property)?,
            "lookAt" => camera.look_at = parse_vec3(&property)?,
            "apertureRadius" => camera.aperture_radius = parse_f32(&property)?,
            _ => return Err(ParseError::UnknownKey { line: property.line, key: key.clone() }),
        }
    }
    Ok(camera)
}

fn parse_renderer(block: Block) -> ParseResult<RenderConfig> {
    let mut config = RenderConfig::default();
    for (key, property) in block.properties {
        match key.as_str() {
            "width" => config.width = parse_u32(&property)?,
            "height" => config.height = parse_u32(&property)?,
            "maxDepth" => config.max_depth = parse_u32(&property)?,
            "antiAliasing" => config.anti_aliasing = parse_u32(&property)?,
            "antiAliasingMethod" => {
                config.anti_aliasing_method = match property.value.as_str() {
                    "REGULAR" => AntiAliasingMethod::Regular,
                    "RANDOM" => AntiAliasingMethod::Random,
                    other => {
                        return Err(ParseError::Syntax {
                            line: property.line,
                            message: format!(
                                "expected REGULAR or RANDOM for antiAliasingMethod, got `{other}`"
                            ),
                        })
                    }
                }
            }
            "softShadows" => {
                config.soft_shadows = match property.value.as_str() {
                    "true" => true,
                    "false" => false,
                    other => {
                        return Err(ParseError::Syntax {
                            line: property.line,
                            message: format!("expected true or false for softShadows, got `{other}`"),
                        })
                    }
                }
            }
            "noiseReduction" => config.noise_reduction = parse_u32(&property)?,
            "threads" => config.num_threads = parse_u32(&property)?,
            _ => return Err(ParseError::UnknownKey { line: property.line, key: key.clone() }),
        }
    }
    Ok(config)
}

fn parse_floats(property: &Property, expected: usize) -> ParseResult<Vec<f32>> {
    let values: Result<Vec<f32>, _> = property
        .value
        .split(',')
        .map(|s| s.trim().parse::<f32>())
        .collect();
    let values = values.map_err(|e| ParseError::Syntax {
        line: property.line,
        message: format!("invalid number in `{}`: {e}", property.value),
    })?;
    if values.len() != expected {
        return Err(ParseError::Syntax {
            line: property.line,
            message: format!(
                "expected {expected} value(s), got {} in `{}`",
                values.len(),
                property.value
            ),
        });
    }
    Ok(values)
}

fn parse_vec3(property: &Property) -> ParseResult<Vec3> {
    let v = parse_floats(property, 3)?;
    Ok(Vec3::new(v[0], v[1], v[2]))
}

fn parse_f32(property: &Property) -> ParseResult<f32> {
    Ok(parse_floats(property, 1)?[0])
}

fn parse_u32(property: &Property) -> ParseResult<u32> {
    property.value.parse::<u32>().map_err(|e| ParseError::Syntax {
        line: property.line,
        message: format!("invalid integer `{}`: {e}", property.value),
    })
}

fn require<T>(value: Option<T>, key: &str, line: usize) -> ParseResult<T> {
    value.ok_or_else(|| ParseError::MissingKey {
        line,
        key: key.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = "\
# A small demo scene.
Material red
color: 1,0,0
ambient: 0.1
diffuse: 0.7
specular: 0.2

CheckerboardMaterial floor
color: 1,1,1
odd: 0,0,0
grain: 0.5
diffuse: 0.9

Material glass
color: 1,1,1
specular: 0.1
transmission: 0.9
refractiveIndex: 1.5

Sphere
origin: 0,0,-2
radius: 0.5
material: glass

Plane
point: 0,-1,0
normal: 0,1,0
material: floor

Disk
origin: 1,0,-3
normal: 0,0,1
radius: 0.75
material: red

PointLight
position: 0,4,0
intensity: 0.8
radius: 0.1

Camera
fov: 90
position: 0,0,0.25
lookAt: 0.5,0.8,-2
apertureRadius: 0.2

Renderer
width: 320
height: 240
maxDepth: 4
antiAliasing: 4
antiAliasingMethod: RANDOM
softShadows: true
noiseReduction: 2
threads: 3
";

    #[test]
    fn test_full_scene_round_trip() {
        let (scene, config) = load_scene_str(SCENE).expect("scene should parse");

        assert_eq!(scene.objects.len(), 3);
        assert_eq!(scene.lights.len(), 1);
        assert_eq!(scene.lights[0].intensity, 0.8);

        assert!((scene.camera.field_of_view - 90.0_f32.to_radians()).abs() < 1e-6);
        assert_eq!(scene.camera.look_at, Vec3::new(0.5, 0.8, -2.0));
        assert_eq!(scene.camera.aperture_radius, 0.2);

        assert_eq!(config.width, 320);
        assert_eq!(config.height, 240);
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.anti_aliasing, 4);
        assert_eq!(config.anti_aliasing_method, AntiAliasingMethod::Random);
        assert!(config.soft_shadows);
        assert_eq!(config.noise_reduction, 2);
        assert_eq!(config.num_threads, 3);
    }

    #[test]
    fn test_material_binding_by_id() {
        let (scene, _) = load_scene_str(SCENE).expect("scene should parse");
        let sphere = &scene.objects[0];
        assert_eq!(sphere.material.transmission, 0.9);
        assert_eq!(sphere.material.refractive_index, 1.5);

        let plane = &scene.objects[1];
        assert!(matches!(
            plane.material.pattern,
            Pattern::Checkerboard { .. }
        ));
    }

    #[test]
    fn test_materials_are_shared_between_objects() {
        let text = "\
Material red
color: 1,0,0

Sphere
origin: 0,0,-2
radius: 0.5
material: red

Sphere
origin: 1,0,-2
radius: 0.5
material: red
";
        let (scene, _) = load_scene_str(text).expect("scene should parse");
        assert!(Arc::ptr_eq(
            &scene.objects[0].material,
            &scene.objects[1].material
        ));
    }

    #[test]
    fn test_unknown_tag_is_fatal() {
        let err = load_scene_str("Cube\nsize: 1\n").unwrap_err();
        assert!(matches!(err, ParseError::UnknownTag { line: 1, .. }));
    }

    #[test]
    fn test_unknown_key_is_fatal() {
        let text = "Material m\ncolor: 1,0,0\nshininess: 3\n";
        let err = load_scene_str(text).unwrap_err();
        assert!(matches!(err, ParseError::UnknownKey { line: 3, .. }));
    }

    #[test]
    fn test_missing_material_id_reference() {
        let text = "Sphere\norigin: 0,0,-2\nradius: 0.5\nmaterial: nope\n";
        let err = load_scene_str(text).unwrap_err();
        assert!(matches!(err, ParseError::UnknownMaterial { .. }));
    }

    #[test]
    fn test_material_without_id_is_fatal() {
        let err = load_scene_str("Material\ncolor: 1,0,0\n").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { line: 1, .. }));
    }

    #[test]
    fn test_wrong_arity_is_fatal() {
        let text = "Material m\ncolor: 1,0\n";
        let err = load_scene_str(text).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { line: 2, .. }));
    }

    #[test]
    fn test_bad_enum_value_is_fatal() {
        let text = "Renderer\nantiAliasingMethod: SOMETIMES\n";
        let err = load_scene_str(text).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { line: 2, .. }));
    }

    #[test]
    fn test_bad_boolean_is_fatal() {
        let text = "Renderer\nsoftShadows: maybe\n";
        let err = load_scene_str(text).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { line: 2, .. }));
    }

    #[test]
    fn test_malformed_property_line_is_fatal() {
        let text = "Material m\ncolor 1,0,0\n";
        let err = load_scene_str(text).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { line: 2, .. }));
    }

    #[test]
    fn test_missing_required_shape_key() {
        let text = "Material m\ncolor: 1,0,0\n\nSphere\nmaterial: m\n";
        let err = load_scene_str(text).unwrap_err();
        assert!(matches!(err, ParseError::MissingKey { .. }));
    }
}
