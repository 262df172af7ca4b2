/// Paramesh Core Library - Shared geometry, camera and render-loop logic
///
/// This library provides the stateless core of the surface viewer:
/// parametric mesh generators, transformation and projection matrices,
/// the orbiting camera with its keymap, and the scene description parser.

pub mod config;
pub mod geometry;
pub mod input;
pub mod projection;
pub mod scene;
pub mod transform;

// Re-export commonly used types
pub use config::{parse_scene, ModelSpec, SceneError, DEFAULT_SCENE};
pub use geometry::{
    Dini, FillStyle, Geometry, GeometryError, Mesh, Pillow, Plane, Sphere, Torus, Triangle, Vertex,
};
pub use input::{command_for_key, CameraCommand};
pub use projection::{Camera, ProjectionMode};
pub use scene::{Model, RenderTarget, Scene};
pub use transform::{RotationState, Transform};
