//! Glint Core - scene model for the ray tracer.
//!
//! This crate provides:
//!
//! - **Scene types**: `Material`, `SceneObject` (sphere / plane / disk),
//!   `PointLight`, `Camera`, `Scene`
//! - **Render settings**: `RenderConfig`, populated by hand or by the
//!   scene-file loader
//! - **Scene files**: a line-oriented text format describing materials,
//!   objects, lights, the camera, and render settings
//!
//! # Example
//!
//! ```ignore
//! use glint_core::scene_file::load_scene_path;
//!
//! let (scene, config) = load_scene_path("scene.txt")?;
//! println!("Loaded {} objects, {} lights",
//!     scene.objects.len(),
//!     scene.lights.len());
//! ```

pub mod camera;
pub mod config;
pub mod light;
pub mod material;
pub mod primitive;
pub mod scene;
pub mod scene_file;

// Re-export commonly used types
pub use camera::Camera;
pub use config::{AntiAliasingMethod, RenderConfig};
pub use light::PointLight;
pub use material::{Material, Pattern};
pub use primitive::{SceneObject, Shape};
pub use scene::Scene;
pub use scene_file::{load_scene_path, load_scene_str, ParseError};
