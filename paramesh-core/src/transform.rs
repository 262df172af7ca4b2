/// 4x4 transformation and projection matrices (OpenGL clip conventions)
use nalgebra::{Matrix4, Point3, Vector3, Vector4};

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    pub fn identity() -> Matrix4<f32> {
        Matrix4::identity()
    }

    /// Create a rotation matrix from a rotation state
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z));

        // Apply rotations in order: X, Y, Z
        rz * ry * rx
    }

    /// Create a translation matrix
    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Create a scale matrix
    pub fn scale_matrix(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }

    /// Right-handed view matrix looking from `eye` at `center`
    pub fn look_at(eye: &Point3<f32>, center: &Point3<f32>, up: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::look_at_rh(eye, center, up)
    }

    /// Orthographic projection mapping the box to the [-1, 1] cube
    pub fn ortho(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Matrix4<f32> {
        Matrix4::new_orthographic(left, right, bottom, top, near, far)
    }

    /// Perspective projection for an off-axis view volume on the near plane
    pub fn frustum(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Matrix4<f32> {
        let rl = 1.0 / (right - left);
        let tb = 1.0 / (top - bottom);
        let nf = 1.0 / (near - far);

        #[rustfmt::skip]
        let matrix = Matrix4::new(
            2.0 * near * rl, 0.0, (right + left) * rl, 0.0,
            0.0, 2.0 * near * tb, (top + bottom) * tb, 0.0,
            0.0, 0.0, (far + near) * nf, 2.0 * far * near * nf,
            0.0, 0.0, -1.0, 0.0,
        );
        matrix
    }

    /// Symmetric perspective projection from a vertical field of view
    pub fn perspective(fovy: f32, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
        Matrix4::new_perspective(aspect, fovy, near, far)
    }

    /// Create a model-view matrix
    pub fn model_view(view: &Matrix4<f32>, model: &Matrix4<f32>) -> Matrix4<f32> {
        view * model
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(
        model: &Matrix4<f32>,
        view: &Matrix4<f32>,
        projection: &Matrix4<f32>,
    ) -> Matrix4<f32> {
        projection * view * model
    }

    /// Map a point through `mvp` into viewport pixels (y down).
    ///
    /// Returns `(x, y, ndc_depth)`, or `None` when the point sits at or
    /// behind the eye plane.
    pub fn project_to_viewport(
        mvp: &Matrix4<f32>,
        point: &Point3<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let clip = mvp * Vector4::new(point.x, point.y, point.z, 1.0);
        if clip.w < 1e-6 {
            return None;
        }

        let ndc = clip.xyz() / clip.w;
        let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;
        Some((screen_x, screen_y, ndc.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn close(a: &Matrix4<f32>, b: &Matrix4<f32>) -> bool {
        (a - b).norm() < 1e-5
    }

    #[test]
    fn test_rotation_state() {
        let mut state = RotationState::zero();
        assert_eq!(state.x, 0.0);
        assert_eq!(state.y, 0.0);
        assert_eq!(state.z, 0.0);

        state.rotate(0.1, 0.2, 0.3);
        assert!((state.x - 0.1).abs() < 1e-6);
        assert!((state.y - 0.2).abs() < 1e-6);
        assert!((state.z - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_identity_rotation() {
        let rotation = RotationState::zero();
        let matrix = Transform::rotation_matrix(&rotation);
        assert!(close(&matrix, &Transform::identity()));
    }

    #[test]
    fn test_rotation_about_y() {
        let matrix = Transform::rotation_matrix(&RotationState::new(0.0, FRAC_PI_2, 0.0));
        let p = matrix.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((p - Point3::new(0.0, 0.0, -1.0)).norm() < 1e-6);
    }

    #[test]
    fn test_translate_then_scale() {
        let model =
            Transform::translation_matrix(1.0, 2.0, 3.0) * Transform::scale_matrix(2.0, 2.0, 2.0);
        let p = model.transform_point(&Point3::new(1.0, 1.0, 1.0));
        assert!((p - Point3::new(3.0, 4.0, 5.0)).norm() < 1e-6);
    }

    #[test]
    fn test_look_at_moves_eye_to_origin() {
        let eye = Point3::new(0.0, 1.0, 4.0);
        let view = Transform::look_at(&eye, &Point3::origin(), &Vector3::y());
        let p = view.transform_point(&eye);
        assert!(p.coords.norm() < 1e-5);

        // The target ends up straight ahead on -z.
        let target = view.transform_point(&Point3::origin());
        assert!(target.x.abs() < 1e-5 && target.y.abs() < 1e-5);
        assert!(target.z < 0.0);
    }

    #[test]
    fn test_ortho_maps_box_to_unit_cube() {
        let p = Transform::ortho(-2.0, 2.0, -2.0, 2.0, -10.0, 10.0);
        let corner = p.transform_point(&Point3::new(2.0, -2.0, -10.0));
        assert!((corner - Point3::new(1.0, -1.0, 1.0)).norm() < 1e-5);
    }

    #[test]
    fn test_symmetric_frustum_matches_perspective() {
        let near = 1.0;
        let fovy = 60f32.to_radians();
        let half = near * (fovy / 2.0).tan();
        let frustum = Transform::frustum(-half, half, -half, half, near, 10.0);
        let perspective = Transform::perspective(fovy, 1.0, near, 10.0);
        assert!(close(&frustum, &perspective));
    }

    #[test]
    fn test_frustum_depth_range() {
        let p = Transform::frustum(-0.6, 0.6, -0.6, 0.6, 1.0, 10.0);
        let near = p.transform_point(&Point3::new(0.0, 0.0, -1.0));
        let far = p.transform_point(&Point3::new(0.0, 0.0, -10.0));
        assert!((near.z + 1.0).abs() < 1e-5);
        assert!((far.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_project_to_viewport() {
        let corner = Point3::new(-1.0, 1.0, 0.5);
        let (x, y, z) =
            Transform::project_to_viewport(&Transform::identity(), &corner, 80, 40).unwrap();
        assert_eq!((x, y), (0.0, 0.0));
        assert_eq!(z, 0.5);

        let behind = Transform::perspective(1.0, 1.0, 1.0, 10.0);
        let point = Point3::new(0.0, 0.0, 2.0);
        assert!(Transform::project_to_viewport(&behind, &point, 80, 40).is_none());
    }

    #[test]
    fn test_mvp_order() {
        let model = Transform::translation_matrix(1.0, 0.0, 0.0);
        let view = Transform::scale_matrix(2.0, 2.0, 2.0);
        let projection = Transform::identity();
        let mvp = Transform::mvp_matrix(&model, &view, &projection);
        assert!(close(&mvp, &Transform::model_view(&view, &model)));
        let p = mvp.transform_point(&Point3::origin());
        assert!((p.x - 2.0).abs() < 1e-6);
    }
}
