/// Paramesh Web - WASM/WebGL front-end for the surface viewer
///
/// Generates the configured meshes once, uploads them to static GPU
/// buffers and redraws the scene on every key press.
use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use paramesh_core::{Camera, Scene, DEFAULT_SCENE};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, KeyboardEvent, WebGl2RenderingContext};

pub mod renderer;

pub use renderer::GlRenderer;

/// Canvas attribute holding the scene description
pub const SCENE_ATTRIBUTE: &str = "data-scene";

#[wasm_bindgen]
pub struct WebRenderer {
    scene: Scene,
    renderer: GlRenderer,
}

#[wasm_bindgen]
impl WebRenderer {
    /// Create a renderer for the canvas with the given id.
    ///
    /// The scene comes from the canvas `data-scene` attribute, or the
    /// default torus when the attribute is missing.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<WebRenderer, JsValue> {
        let canvas = canvas_by_id(canvas_id)?;
        let description = canvas
            .get_attribute(SCENE_ATTRIBUTE)
            .unwrap_or_else(|| DEFAULT_SCENE.to_string());
        Self::from_canvas(canvas, &description)
    }

    /// Create a renderer with an explicit scene description
    #[wasm_bindgen(js_name = withScene)]
    pub fn with_scene(canvas_id: &str, description: &str) -> Result<WebRenderer, JsValue> {
        Self::from_canvas(canvas_by_id(canvas_id)?, description)
    }

    /// Render a frame
    pub fn render(&mut self) -> Result<(), JsValue> {
        self.scene.render(&mut self.renderer)
    }

    /// Feed a key press to the camera and redraw, whether or not the key is bound
    #[wasm_bindgen(js_name = handleKey)]
    pub fn handle_key(&mut self, key: &str, shift: bool) -> Result<(), JsValue> {
        if let Some(key) = key_char(key) {
            self.scene.camera.handle_key(key, shift);
        }
        self.render()
    }

    /// Update viewport and aspect ratio after the canvas changed size
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), JsValue> {
        self.renderer.resize(width, height);
        self.scene.camera.set_viewport(width, height);
        self.render()
    }
}

impl WebRenderer {
    fn from_canvas(canvas: HtmlCanvasElement, description: &str) -> Result<WebRenderer, JsValue> {
        let gl: WebGl2RenderingContext = canvas
            .get_context("webgl2")?
            .ok_or("WebGL2 not supported")?
            .dyn_into()?;

        let (width, height) = (canvas.width(), canvas.height());
        let scene = Scene::from_description(description, Camera::new(width, height))
            .map_err(js_error)?;

        let mut renderer = GlRenderer::new(gl, width, height)?;
        renderer.upload(&scene.models)?;

        Ok(WebRenderer { scene, renderer })
    }
}

/// Draw the canvas once and redraw it on every keydown
#[wasm_bindgen]
pub fn run(canvas_id: &str) -> Result<(), JsValue> {
    let viewer = Rc::new(RefCell::new(WebRenderer::new(canvas_id)?));
    viewer.borrow_mut().render()?;

    let handler = viewer.clone();
    let keydown = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        if let Err(e) = handler.borrow_mut().handle_key(&event.key(), event.shift_key()) {
            log::error!("redraw failed: {:?}", e);
        }
    }) as Box<dyn FnMut(_)>);

    web_sys::window()
        .ok_or("no global window")?
        .add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
    keydown.forget();
    Ok(())
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    // Setup panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    console_log::init_with_level(log::Level::Info).map_err(js_error)?;
    Ok(())
}

fn canvas_by_id(canvas_id: &str) -> Result<HtmlCanvasElement, JsValue> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or("no document")?
        .get_element_by_id(canvas_id)
        .ok_or_else(|| JsValue::from_str(&format!("no element with id {}", canvas_id)))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| JsValue::from_str(&format!("element {} is not a canvas", canvas_id)))
}

/// Letter carried by a `KeyboardEvent.key` value; named keys yield `None`
fn key_char(key: &str) -> Option<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn js_error(error: impl Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_key_char() {
        assert_eq!(key_char("c"), Some('c'));
        assert_eq!(key_char("C"), Some('C'));
        assert_eq!(key_char("ArrowLeft"), None);
        assert_eq!(key_char("Shift"), None);
        assert_eq!(key_char(""), None);
    }

    #[test]
    fn test_shifted_key_drives_camera() {
        let mut camera = Camera::default();
        let key = key_char("C").unwrap();
        assert!(camera.handle_key(key, true));
        assert!(camera.z_angle > std::f32::consts::PI);
    }
}
