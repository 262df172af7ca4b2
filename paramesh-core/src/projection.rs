/// Orbiting camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3};

use crate::transform::Transform;

/// Half-extent of the near-plane window after switching to orthographic
pub const ORTHO_LRTB: f32 = 2.0;
/// Half-extent of the near-plane window after switching to frustum
pub const FRUSTUM_LRTB: f32 = 1.2;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    Ortho,
    Frustum,
    Perspective,
}

/// Camera orbiting `center` in the xz plane
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Only `eye.y` is free; x and z follow the orbit
    pub eye: Point3<f32>,
    pub center: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical opening angle in radians
    pub fovy: f32,
    /// Left/right/top/bottom half-extent for ortho and frustum
    pub lrtb: f32,
    pub aspect: f32,
    pub mode: ProjectionMode,
    /// Orbit angle around the y axis, measured from +z
    pub z_angle: f32,
    /// Distance from `center` in the xz plane
    pub distance: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        let mut camera = Self {
            eye: Point3::new(0.0, 1.0, 4.0),
            center: Point3::origin(),
            up: Vector3::y(),
            fovy: 60f32.to_radians(),
            lrtb: ORTHO_LRTB,
            aspect: 1.0,
            mode: ProjectionMode::Ortho,
            z_angle: 0.0,
            distance: 4.0,
        };
        camera.set_viewport(width, height);
        camera
    }

    /// Update the aspect ratio for a new viewport size
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = if width == 0 || height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        };
    }

    /// Eye position on the orbit for the current angle and distance
    pub fn orbit_eye(&self) -> Point3<f32> {
        let (sin, cos) = self.z_angle.sin_cos();
        Point3::new(
            self.center.x + self.distance * sin,
            self.eye.y,
            self.center.z + self.distance * cos,
        )
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Transform::look_at(&self.orbit_eye(), &self.center, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let v = self.lrtb;
        match self.mode {
            ProjectionMode::Ortho => {
                Transform::ortho(-v * self.aspect, v * self.aspect, -v, v, -10.0, 10.0)
            }
            ProjectionMode::Frustum => {
                let h = v / 2.0;
                Transform::frustum(-h * self.aspect, h * self.aspect, -h, h, 1.0, 10.0)
            }
            ProjectionMode::Perspective => {
                Transform::perspective(self.fovy, self.aspect, 1.0, 10.0)
            }
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 800)
    }
}
