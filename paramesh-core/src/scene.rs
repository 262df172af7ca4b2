/// Static model list and the per-frame render sequence
use nalgebra::{Matrix4, Vector3};

use crate::config::{parse_scene, ModelSpec, SceneError};
use crate::geometry::{FillStyle, Geometry, GeometryError, Mesh};
use crate::projection::Camera;
use crate::transform::{RotationState, Transform};

/// A generated mesh placed in the world
#[derive(Debug, Clone)]
pub struct Model {
    pub geometry: Geometry,
    pub mesh: Mesh,
    pub fill: FillStyle,
    pub translate: Vector3<f32>,
    pub rotation: RotationState,
    pub scale: Vector3<f32>,
}

impl Model {
    pub fn new(geometry: Geometry, fill: FillStyle) -> Result<Self, GeometryError> {
        Ok(Self {
            mesh: geometry.mesh()?,
            geometry,
            fill,
            translate: Vector3::zeros(),
            rotation: RotationState::zero(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        })
    }

    pub fn from_spec(spec: &ModelSpec) -> Result<Self, GeometryError> {
        let mut model = Self::new(spec.geometry, spec.fill)?;
        model.translate = spec.translate;
        model.scale = Vector3::repeat(spec.scale);
        Ok(model)
    }

    pub fn name(&self) -> &'static str {
        self.geometry.name()
    }

    /// Translate * rotate * scale
    pub fn model_matrix(&self) -> Matrix4<f32> {
        Transform::translation_matrix(self.translate.x, self.translate.y, self.translate.z)
            * Transform::rotation_matrix(&self.rotation)
            * Transform::scale_matrix(self.scale.x, self.scale.y, self.scale.z)
    }
}

/// Backend that turns one frame of the scene into pixels
pub trait RenderTarget {
    type Error;

    /// Clear color and depth
    fn clear(&mut self) -> Result<(), Self::Error>;

    fn set_projection(&mut self, projection: &Matrix4<f32>) -> Result<(), Self::Error>;

    /// Draw `model` (the `index`-th of the scene) with its model-view matrix
    fn draw_model(
        &mut self,
        index: usize,
        model: &Model,
        model_view: &Matrix4<f32>,
    ) -> Result<(), Self::Error>;
}

/// Camera plus the static list of models drawn every frame
#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: Camera,
    pub models: Vec<Model>,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            models: Vec::new(),
        }
    }

    /// Build every model named by a scene description
    pub fn from_description(description: &str, camera: Camera) -> Result<Self, SceneError> {
        let mut scene = Self::new(camera);
        for spec in parse_scene(description)? {
            scene.add_model(Model::from_spec(&spec)?);
        }
        log::info!("scene ready with {} model(s)", scene.models.len());
        Ok(scene)
    }

    pub fn add_model(&mut self, model: Model) {
        self.models.push(model);
    }

    /// Run one frame: clear, projection, orbit view, then every model in order
    pub fn render<T: RenderTarget>(&self, target: &mut T) -> Result<(), T::Error> {
        target.clear()?;
        target.set_projection(&self.camera.projection_matrix())?;

        let view = self.camera.view_matrix();
        for (index, model) in self.models.iter().enumerate() {
            let model_view = Transform::model_view(&view, &model.model_matrix());
            target.draw_model(index, model, &model_view)?;
        }
        Ok(())
    }
}
