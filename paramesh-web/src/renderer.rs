//! WebGL implementation of the scene render target.

use js_sys::{Float32Array, Uint16Array};
use nalgebra::Matrix4;
use paramesh_core::{Model, RenderTarget};
use wasm_bindgen::prelude::*;
use web_sys::{
    WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader, WebGlUniformLocation,
};

/// Vertex shader: positions through projection and model-view, normals become colors
pub const VERTEX_SHADER_SOURCE: &str = r#"
attribute vec3 aPosition;
attribute vec3 aNormal;

uniform mat4 uPMatrix;
uniform mat4 uMVMatrix;

varying vec4 vColor;

void main() {
    gl_Position = uPMatrix * uMVMatrix * vec4(aPosition, 1.0);

    vColor = vec4(aNormal.x, aNormal.y, aNormal.z, 1.0);
    vColor = (vColor + 1.0) / 2.0;
}
"#;

/// Fragment shader writing the interpolated vertex color
pub const FRAGMENT_SHADER_SOURCE: &str = r#"
precision mediump float;
varying vec4 vColor;

void main() {
    gl_FragColor = vColor;
}
"#;

const CLEAR_COLOR: [f32; 4] = [0.95, 0.95, 0.95, 1.0];

/// Static GPU buffers for one model
struct ModelBuffers {
    positions: WebGlBuffer,
    normals: WebGlBuffer,
    lines: WebGlBuffer,
    line_count: i32,
    triangles: WebGlBuffer,
    triangle_count: i32,
}

/// WebGL renderer drawing models uploaded once at startup
pub struct GlRenderer {
    gl: GL,
    program: WebGlProgram,
    position_attrib: u32,
    normal_attrib: u32,
    p_matrix: WebGlUniformLocation,
    mv_matrix: WebGlUniformLocation,
    buffers: Vec<ModelBuffers>,
}

impl GlRenderer {
    /// Compile the shader program and set the fixed pipeline state
    pub fn new(gl: GL, width: u32, height: u32) -> Result<Self, JsValue> {
        let vertex_shader = compile_shader(&gl, GL::VERTEX_SHADER, VERTEX_SHADER_SOURCE)?;
        let fragment_shader = compile_shader(&gl, GL::FRAGMENT_SHADER, FRAGMENT_SHADER_SOURCE)?;
        let program = link_program(&gl, &vertex_shader, &fragment_shader)?;
        gl.use_program(Some(&program));

        let position_attrib = attrib_location(&gl, &program, "aPosition")?;
        let normal_attrib = attrib_location(&gl, &program, "aNormal")?;
        let p_matrix = uniform_location(&gl, &program, "uPMatrix")?;
        let mv_matrix = uniform_location(&gl, &program, "uMVMatrix")?;

        let [r, g, b, a] = CLEAR_COLOR;
        gl.clear_color(r, g, b, a);

        // Backface culling
        gl.front_face(GL::CCW);
        gl.enable(GL::CULL_FACE);
        gl.cull_face(GL::BACK);

        gl.enable(GL::DEPTH_TEST);

        // Push filled faces back so wireframe lines stay visible on top
        gl.enable(GL::POLYGON_OFFSET_FILL);
        gl.polygon_offset(0.5, 0.0);

        let mut renderer = Self {
            gl,
            program,
            position_attrib,
            normal_attrib,
            p_matrix,
            mv_matrix,
            buffers: Vec::new(),
        };
        renderer.resize(width, height);
        Ok(renderer)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.gl.viewport(0, 0, width as i32, height as i32);
    }

    /// Create static vertex and index buffers for every model, in scene order
    pub fn upload(&mut self, models: &[Model]) -> Result<(), JsValue> {
        self.buffers = models
            .iter()
            .map(|model| self.upload_model(model))
            .collect::<Result<_, _>>()?;
        log::info!("uploaded {} model(s) to the GPU", self.buffers.len());
        Ok(())
    }

    fn upload_model(&self, model: &Model) -> Result<ModelBuffers, JsValue> {
        let gl = &self.gl;
        let mesh = &model.mesh;

        let positions = create_buffer(gl)?;
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&positions));
        gl.buffer_data_with_array_buffer_view(
            GL::ARRAY_BUFFER,
            &Float32Array::from(mesh.positions.as_slice()),
            GL::STATIC_DRAW,
        );

        let normals = create_buffer(gl)?;
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&normals));
        gl.buffer_data_with_array_buffer_view(
            GL::ARRAY_BUFFER,
            &Float32Array::from(mesh.normals.as_slice()),
            GL::STATIC_DRAW,
        );

        let lines = create_buffer(gl)?;
        gl.bind_buffer(GL::ELEMENT_ARRAY_BUFFER, Some(&lines));
        gl.buffer_data_with_array_buffer_view(
            GL::ELEMENT_ARRAY_BUFFER,
            &Uint16Array::from(mesh.lines.as_slice()),
            GL::STATIC_DRAW,
        );

        let triangles = create_buffer(gl)?;
        gl.bind_buffer(GL::ELEMENT_ARRAY_BUFFER, Some(&triangles));
        gl.buffer_data_with_array_buffer_view(
            GL::ELEMENT_ARRAY_BUFFER,
            &Uint16Array::from(mesh.triangles.as_slice()),
            GL::STATIC_DRAW,
        );
        gl.bind_buffer(GL::ELEMENT_ARRAY_BUFFER, None);

        log::debug!(
            "{}: {} vertices uploaded ({})",
            model.name(),
            mesh.vertex_count(),
            model.fill.name()
        );

        Ok(ModelBuffers {
            positions,
            normals,
            lines,
            line_count: mesh.lines.len() as i32,
            triangles,
            triangle_count: mesh.triangles.len() as i32,
        })
    }
}

impl RenderTarget for GlRenderer {
    type Error = JsValue;

    fn clear(&mut self) -> Result<(), JsValue> {
        self.gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);
        Ok(())
    }

    fn set_projection(&mut self, projection: &Matrix4<f32>) -> Result<(), JsValue> {
        self.gl
            .uniform_matrix4fv_with_f32_array(Some(&self.p_matrix), false, projection.as_slice());
        Ok(())
    }

    fn draw_model(
        &mut self,
        index: usize,
        model: &Model,
        model_view: &Matrix4<f32>,
    ) -> Result<(), JsValue> {
        let gl = &self.gl;
        let buffers = self
            .buffers
            .get(index)
            .ok_or_else(|| JsValue::from_str(&format!("model {} was never uploaded", index)))?;

        gl.uniform_matrix4fv_with_f32_array(Some(&self.mv_matrix), false, model_view.as_slice());

        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffers.positions));
        gl.vertex_attrib_pointer_with_i32(self.position_attrib, 3, GL::FLOAT, false, 0, 0);
        gl.enable_vertex_attrib_array(self.position_attrib);

        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffers.normals));
        gl.vertex_attrib_pointer_with_i32(self.normal_attrib, 3, GL::FLOAT, false, 0, 0);

        if model.fill.draws_triangles() {
            gl.enable_vertex_attrib_array(self.normal_attrib);
            gl.bind_buffer(GL::ELEMENT_ARRAY_BUFFER, Some(&buffers.triangles));
            gl.draw_elements_with_i32(GL::TRIANGLES, buffers.triangle_count, GL::UNSIGNED_SHORT, 0);
        }

        if model.fill.draws_lines() {
            // Constant zero normal renders lines in mid grey
            gl.disable_vertex_attrib_array(self.normal_attrib);
            gl.vertex_attrib3f(self.normal_attrib, 0.0, 0.0, 0.0);
            gl.bind_buffer(GL::ELEMENT_ARRAY_BUFFER, Some(&buffers.lines));
            gl.draw_elements_with_i32(GL::LINES, buffers.line_count, GL::UNSIGNED_SHORT, 0);
        }

        Ok(())
    }
}

impl Drop for GlRenderer {
    fn drop(&mut self) {
        for buffers in self.buffers.drain(..) {
            for buffer in [
                &buffers.positions,
                &buffers.normals,
                &buffers.lines,
                &buffers.triangles,
            ] {
                self.gl.delete_buffer(Some(buffer));
            }
        }
        self.gl.delete_program(Some(&self.program));
    }
}

fn create_buffer(gl: &GL) -> Result<WebGlBuffer, JsValue> {
    gl.create_buffer()
        .ok_or_else(|| JsValue::from_str("Failed to create buffer"))
}

/// Compile a shader, logging the info log when compilation fails
fn compile_shader(gl: &GL, shader_type: u32, source: &str) -> Result<WebGlShader, JsValue> {
    let shader = gl
        .create_shader(shader_type)
        .ok_or_else(|| JsValue::from_str("Failed to create shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if !gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        let error = gl
            .get_shader_info_log(&shader)
            .unwrap_or_else(|| "Unknown error".to_string());
        log::error!("Error: {}", error);
        gl.delete_shader(Some(&shader));
        return Err(JsValue::from_str(&format!("Failed to compile shader: {}", error)));
    }

    Ok(shader)
}

fn link_program(
    gl: &GL,
    vertex: &WebGlShader,
    fragment: &WebGlShader,
) -> Result<WebGlProgram, JsValue> {
    let program = gl
        .create_program()
        .ok_or_else(|| JsValue::from_str("Failed to create program"))?;
    gl.attach_shader(&program, vertex);
    gl.attach_shader(&program, fragment);
    gl.bind_attrib_location(&program, 0, "aPosition");
    gl.link_program(&program);

    if !gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        let error = gl
            .get_program_info_log(&program)
            .unwrap_or_else(|| "Unknown error".to_string());
        log::error!("Error: {}", error);
        return Err(JsValue::from_str(&format!("Failed to link program: {}", error)));
    }

    Ok(program)
}

fn attrib_location(gl: &GL, program: &WebGlProgram, name: &str) -> Result<u32, JsValue> {
    u32::try_from(gl.get_attrib_location(program, name))
        .map_err(|_| JsValue::from_str(&format!("attribute {} not found", name)))
}

fn uniform_location(
    gl: &GL,
    program: &WebGlProgram,
    name: &str,
) -> Result<WebGlUniformLocation, JsValue> {
    gl.get_uniform_location(program, name)
        .ok_or_else(|| JsValue::from_str(&format!("uniform {} not found", name)))
}
