/// Keyboard commands that steer the camera
use std::f32::consts::PI;

use crate::projection::{Camera, ProjectionMode, FRUSTUM_LRTB, ORTHO_LRTB};

/// Orbit step per key press
pub const DELTA_ROTATE: f32 = PI / 36.0;
/// Height and distance step per key press
pub const DELTA_TRANSLATE: f32 = 0.05;
/// Field of view step per key press
pub const DELTA_FOVY: f32 = 5.0 * PI / 180.0;
/// Near-plane window step per key press
pub const DELTA_LRTB: f32 = 0.1;

const MIN_DISTANCE: f32 = DELTA_TRANSLATE;
const MIN_LRTB: f32 = DELTA_LRTB;

/// Signed camera changes. Negative steps come from shift-held keys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraCommand {
    Projection(ProjectionMode),
    Orbit(f32),
    Height(f32),
    Distance(f32),
    FieldOfView(f32),
    Window(f32),
}

/// Map a key and the shift state to a camera command.
///
/// Letters are case-insensitive; shift flips the direction of stepping
/// commands.
pub fn command_for_key(key: char, shift: bool) -> Option<CameraCommand> {
    let sign = if shift { -1.0 } else { 1.0 };
    let command = match key.to_ascii_uppercase() {
        'O' => CameraCommand::Projection(ProjectionMode::Ortho),
        'F' => CameraCommand::Projection(ProjectionMode::Frustum),
        'P' => CameraCommand::Projection(ProjectionMode::Perspective),
        'C' => CameraCommand::Orbit(sign * DELTA_ROTATE),
        'H' => CameraCommand::Height(sign * DELTA_TRANSLATE),
        'D' => CameraCommand::Distance(sign * DELTA_TRANSLATE),
        'V' => CameraCommand::FieldOfView(sign * DELTA_FOVY),
        'B' => CameraCommand::Window(sign * DELTA_LRTB),
        _ => {
            log::trace!("no camera command bound to {:?}", key);
            return None;
        }
    };
    Some(command)
}

impl Camera {
    pub fn apply(&mut self, command: CameraCommand) {
        log::debug!("camera command {:?}", command);
        match command {
            CameraCommand::Projection(mode) => {
                self.mode = mode;
                match mode {
                    ProjectionMode::Ortho => self.lrtb = ORTHO_LRTB,
                    ProjectionMode::Frustum => self.lrtb = FRUSTUM_LRTB,
                    ProjectionMode::Perspective => {}
                }
            }
            CameraCommand::Orbit(delta) => {
                self.z_angle = (self.z_angle + delta).rem_euclid(2.0 * PI);
            }
            CameraCommand::Height(delta) => self.eye.y += delta,
            CameraCommand::Distance(delta) => {
                self.distance = (self.distance + delta).max(MIN_DISTANCE);
            }
            CameraCommand::FieldOfView(delta) => {
                self.fovy = (self.fovy + delta).clamp(DELTA_FOVY, PI - DELTA_FOVY);
            }
            CameraCommand::Window(delta) => {
                self.lrtb = (self.lrtb + delta).max(MIN_LRTB);
            }
        }
    }

    /// Apply whatever the key is bound to. Returns whether anything changed.
    pub fn handle_key(&mut self, key: char, shift: bool) -> bool {
        match command_for_key(key, shift) {
            Some(command) => {
                self.apply(command);
                true
            }
            None => false,
        }
    }
}
