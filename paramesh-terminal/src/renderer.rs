/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix4, Vector3};
use paramesh_core::{Model, RenderTarget, Transform, Triangle};
use std::convert::Infallible;
use std::io::Write;

/// Character luminosity ramp for filled faces (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Character used for wireframe lines
pub const WIRE_CHAR: char = '·';

/// Lines win depth ties against the faces they outline
const LINE_DEPTH_BIAS: f32 = 1e-3;

/// ASCII renderer that converts 3D meshes to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
    projection: Matrix4<f32>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
            projection: Matrix4::identity(),
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self {
            projection: self.projection,
            ..Self::new(width, height)
        };
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
    }

    /// Character and color at a cell
    pub fn cell(&self, x: usize, y: usize) -> (char, Color) {
        let idx = y * self.width + x;
        (self.char_buffer[idx], self.color_buffer[idx])
    }

    fn project(
        &self,
        mvp: &Matrix4<f32>,
        triangle: &Triangle,
    ) -> Option<[(f32, f32, f32); 3]> {
        let mut screen = [(0.0, 0.0, 0.0); 3];
        for (slot, vertex) in screen.iter_mut().zip(&triangle.vertices) {
            *slot = Transform::project_to_viewport(
                mvp,
                &vertex.position,
                self.width as u32,
                self.height as u32,
            )?;
        }
        Some(screen)
    }

    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        mvp: &Matrix4<f32>,
        model_view: &Matrix4<f32>,
    ) {
        // Triangle is clipped
        let Some(coords) = self.project(mvp, triangle) else {
            return;
        };

        // Screen y points down, so front faces have negative area
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);
        let area = (v1.0 - v0.0) * (v2.1 - v0.1) - (v2.0 - v0.0) * (v1.1 - v0.1);
        if area >= 0.0 {
            return;
        }

        // Shade by how directly the face looks at the viewer
        let view_normal = model_view
            .transform_vector(&triangle.calculate_normal())
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros);
        let brightness = view_normal.z.clamp(0.0, 1.0);
        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
        let character = LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)];

        let normal = triangle.vertices.iter().map(|v| v.normal).sum::<Vector3<f32>>() / 3.0;
        self.rasterize_triangle(&coords, character, normal_color(&normal));
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32)], character: char, color: Color) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        // Scanline rasterization
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                // Barycentric coordinates
                if let Some((w0, w1, w2)) = barycentric(
                    (v0.0, v0.1),
                    (v1.0, v1.1),
                    (v2.0, v2.1),
                    (px, py),
                ) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        // Interpolate depth
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                        self.plot(x as usize, y as usize, depth, character, color);
                    }
                }
            }
        }
    }

    fn render_line(&mut self, from: (f32, f32, f32), to: (f32, f32, f32)) {
        let limit = (2 * (self.width + self.height)) as f32;
        let steps = (to.0 - from.0)
            .abs()
            .max((to.1 - from.1).abs())
            .ceil()
            .clamp(1.0, limit.max(1.0)) as usize;
        let color = normal_color(&Vector3::zeros());

        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let x = from.0 + (to.0 - from.0) * t;
            let y = from.1 + (to.1 - from.1) * t;
            if x < 0.0 || y < 0.0 || x >= self.width as f32 || y >= self.height as f32 {
                continue;
            }
            let depth = from.2 + (to.2 - from.2) * t - LINE_DEPTH_BIAS;
            self.plot(x as usize, y as usize, depth, WIRE_CHAR, color);
        }
    }

    fn plot(&mut self, x: usize, y: usize, depth: f32, character: char, color: Color) {
        if !(-1.0..=1.0).contains(&depth) {
            return;
        }
        let idx = y * self.width + x;
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.char_buffer[idx] = character;
            self.color_buffer[idx] = color;
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let (c, color) = self.cell(x, y);
                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl RenderTarget for AsciiRenderer {
    type Error = Infallible;

    fn clear(&mut self) -> Result<(), Infallible> {
        AsciiRenderer::clear(self);
        Ok(())
    }

    fn set_projection(&mut self, projection: &Matrix4<f32>) -> Result<(), Infallible> {
        self.projection = *projection;
        Ok(())
    }

    fn draw_model(
        &mut self,
        _index: usize,
        model: &Model,
        model_view: &Matrix4<f32>,
    ) -> Result<(), Infallible> {
        let mvp = self.projection * model_view;

        if model.fill.draws_triangles() {
            for triangle in model.mesh.triangles() {
                self.render_triangle(&triangle, &mvp, model_view);
            }
        }

        if model.fill.draws_lines() {
            let (width, height) = (self.width as u32, self.height as u32);
            for (a, b) in model.mesh.line_segments() {
                let from = Transform::project_to_viewport(&mvp, &a.position, width, height);
                let to = Transform::project_to_viewport(&mvp, &b.position, width, height);
                if let (Some(from), Some(to)) = (from, to) {
                    self.render_line(from, to);
                }
            }
        }

        Ok(())
    }
}

/// Same mapping as the vertex shader: `(n + 1) / 2` per channel
fn normal_color(normal: &Vector3<f32>) -> Color {
    let channel = |c: f32| (((c + 1.0) / 2.0).clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::Rgb {
        r: channel(normal.x),
        g: channel(normal.y),
        b: channel(normal.z),
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
