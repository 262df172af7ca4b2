/// Paramesh Terminal Demo - Parametric surfaces under an orbiting camera
///
/// Usage: paramesh-terminal ["torus:fillwireframe; sphere(3):fill at (1.5,0,0) scale 0.5"]
/// Controls:
///   - O/F/P: Ortho, frustum, perspective projection
///   - C/H/D: Orbit, height, distance (Shift reverses)
///   - V/B: Field of view, near-plane window (Shift reverses)
///   - Q/ESC: Quit

use std::env;
use std::io;
use paramesh_core::{Camera, Scene, DEFAULT_SCENE};
use paramesh_terminal::TerminalApp;

fn main() -> io::Result<()> {
    env_logger::init();

    let description = env::args().nth(1).unwrap_or_else(|| DEFAULT_SCENE.to_string());
    log::info!("building scene {:?}", description);

    let scene = Scene::from_description(&description, Camera::default()).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Failed to build scene: {}", e),
        )
    })?;

    // Run the terminal app
    let mut app = TerminalApp::new(scene)?;
    app.run()?;

    Ok(())
}
