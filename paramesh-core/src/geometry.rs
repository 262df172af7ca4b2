/// Geometry primitives and parametric surface generators
use nalgebra::{Point3, Vector3};
use std::f32::consts::PI;
use thiserror::Error;

/// Largest number of vertices addressable by a 16-bit index buffer
pub const MAX_VERTICES: usize = u16::MAX as usize + 1;

/// Errors raised while generating a mesh
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("{geometry}: grid resolution must be non-zero (n={n}, m={m})")]
    InvalidResolution {
        geometry: &'static str,
        n: u32,
        m: u32,
    },
    #[error("sphere subdivision depth must be at least 1")]
    InvalidDepth,
    #[error("{count} vertices exceed the 16-bit index range")]
    TooManyVertices { count: usize },
}

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32, nx: f32, ny: f32, nz: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            normal: Vector3::new(nx, ny, nz),
        }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Face normal of the counter-clockwise winding. Zero for degenerate faces.
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1
            .cross(&edge2)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }
}

/// Which index buffers of a mesh get drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillStyle {
    Fill,
    Wireframe,
    #[default]
    FillWireframe,
}

impl FillStyle {
    pub fn draws_triangles(self) -> bool {
        matches!(self, FillStyle::Fill | FillStyle::FillWireframe)
    }

    pub fn draws_lines(self) -> bool {
        matches!(self, FillStyle::Wireframe | FillStyle::FillWireframe)
    }

    pub fn name(self) -> &'static str {
        match self {
            FillStyle::Fill => "fill",
            FillStyle::Wireframe => "wireframe",
            FillStyle::FillWireframe => "fillwireframe",
        }
    }
}

/// Indexed mesh laid out the way GL buffers want it.
///
/// `positions` and `normals` hold packed xyz triples, `lines` holds index
/// pairs for `LINES` and `triangles` holds index triples for `TRIANGLES`
/// with counter-clockwise front faces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub lines: Vec<u16>,
    pub triangles: Vec<u16>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, lines: usize, triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices * 3),
            normals: Vec::with_capacity(vertices * 3),
            lines: Vec::with_capacity(lines),
            triangles: Vec::with_capacity(triangles),
        }
    }

    /// Append a vertex and return its index
    pub fn push_vertex(
        &mut self,
        position: Point3<f32>,
        normal: Vector3<f32>,
    ) -> Result<u16, GeometryError> {
        let count = self.vertex_count();
        let index = u16::try_from(count)
            .map_err(|_| GeometryError::TooManyVertices { count: count + 1 })?;
        self.positions
            .extend_from_slice(&[position.x, position.y, position.z]);
        self.normals.extend_from_slice(&[normal.x, normal.y, normal.z]);
        Ok(index)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn vertex(&self, index: usize) -> Vertex {
        let p = &self.positions[index * 3..index * 3 + 3];
        let n = &self.normals[index * 3..index * 3 + 3];
        Vertex::new(p[0], p[1], p[2], n[0], n[1], n[2])
    }

    /// Faces described by the triangle index buffer
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.triangles.chunks_exact(3).map(|t| {
            Triangle::new(
                self.vertex(t[0] as usize),
                self.vertex(t[1] as usize),
                self.vertex(t[2] as usize),
            )
        })
    }

    /// Segments described by the line index buffer
    pub fn line_segments(&self) -> impl Iterator<Item = (Vertex, Vertex)> + '_ {
        self.lines
            .chunks_exact(2)
            .map(|l| (self.vertex(l[0] as usize), self.vertex(l[1] as usize)))
    }
}

/// Fill a `(n+1) x (m+1)` vertex grid and its line/triangle indices.
///
/// `eval(i, j)` returns position and normal of grid vertex `(i, j)`.
fn grid_mesh<F>(
    geometry: &'static str,
    n: u32,
    m: u32,
    mut eval: F,
) -> Result<Mesh, GeometryError>
where
    F: FnMut(u32, u32) -> (Point3<f32>, Vector3<f32>),
{
    if n == 0 || m == 0 {
        return Err(GeometryError::InvalidResolution { geometry, n, m });
    }
    let count = (n as usize + 1) * (m as usize + 1);
    if count > MAX_VERTICES {
        return Err(GeometryError::TooManyVertices { count });
    }

    let cells = n as usize * m as usize;
    let mut mesh = Mesh::with_capacity(count, 4 * cells, 6 * cells);
    let row = m as u16 + 1;

    for i in 0..=n {
        for j in 0..=m {
            let (position, normal) = eval(i, j);
            let k = mesh.push_vertex(position, normal)?;

            if i > 0 && j > 0 {
                // Line along v, then along u.
                mesh.lines.extend_from_slice(&[k - 1, k, k - row, k]);
                mesh.triangles.extend_from_slice(&[
                    k,
                    k - 1,
                    k - row,
                    k - 1,
                    k - row - 1,
                    k - row,
                ]);
            }
        }
    }

    Ok(mesh)
}

/// Torus around the z axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Torus {
    pub n: u32,
    pub m: u32,
    /// Tube radius
    pub r: f32,
    /// Distance from the center to the middle of the tube
    pub big_r: f32,
}

impl Default for Torus {
    fn default() -> Self {
        Self {
            n: 16,
            m: 32,
            r: 0.3,
            big_r: 0.5,
        }
    }
}

impl Torus {
    pub fn mesh(&self) -> Result<Mesh, GeometryError> {
        let du = 2.0 * PI / self.n.max(1) as f32;
        let dv = 2.0 * PI / self.m.max(1) as f32;

        grid_mesh("torus", self.n, self.m, |i, j| {
            let (su, cu) = (i as f32 * du).sin_cos();
            let (sv, cv) = (j as f32 * dv).sin_cos();
            let ring = self.big_r + self.r * cu;
            (
                Point3::new(ring * cv, ring * sv, self.r * su),
                Vector3::new(cu * cv, cu * sv, su),
            )
        })
    }
}

/// Flat grid in the xz plane facing +y
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub n: u32,
    pub m: u32,
    pub half_extent: f32,
}

impl Default for Plane {
    fn default() -> Self {
        Self {
            n: 100,
            m: 100,
            half_extent: 10.0,
        }
    }
}

impl Plane {
    pub fn mesh(&self) -> Result<Mesh, GeometryError> {
        let start = -self.half_extent;
        let du = 2.0 * self.half_extent / self.n.max(1) as f32;
        let dv = 2.0 * self.half_extent / self.m.max(1) as f32;

        grid_mesh("plane", self.n, self.m, |i, j| {
            (
                Point3::new(start + i as f32 * du, 0.0, start + j as f32 * dv),
                Vector3::y(),
            )
        })
    }
}

/// Pillow: `x = cos u, y = a sin u sin v, z = cos v` over `u in [0, pi], v in [-pi, pi]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pillow {
    pub n: u32,
    pub m: u32,
    pub a: f32,
}

impl Default for Pillow {
    fn default() -> Self {
        Self { n: 32, m: 7, a: 0.5 }
    }
}

impl Pillow {
    pub fn mesh(&self) -> Result<Mesh, GeometryError> {
        let a = self.a;
        let du = PI / self.n.max(1) as f32;
        let dv = 2.0 * PI / self.m.max(1) as f32;

        grid_mesh("pillow", self.n, self.m, |i, j| {
            let (su, cu) = (i as f32 * du).sin_cos();
            let (sv, cv) = (-PI + j as f32 * dv).sin_cos();

            let d_u = Vector3::new(-su, a * cu * sv, 0.0);
            let d_v = Vector3::new(0.0, a * su * cv, -sv);
            // Grid winding makes d_v x d_u the front-facing side. Both
            // partials vanish on the seam corners; point outwards there.
            let normal = d_v
                .cross(&d_u)
                .try_normalize(1e-6)
                .or_else(|| Vector3::new(cu, 0.0, cv).try_normalize(1e-6))
                .unwrap_or_else(Vector3::y);

            (Point3::new(cu, a * su * sv, cv), normal)
        })
    }
}

/// Dini's surface, a twisted pseudosphere, scaled by `c`.
///
/// `u` sweeps two turns, `v` runs over `[v_min, v_max]` which has to stay
/// inside `(0, pi/2)`; the surface folds into a cusp at `v = pi/2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dini {
    pub n: u32,
    pub m: u32,
    pub a: f32,
    /// Rise per radian of `u` before scaling by `c`
    pub b: f32,
    pub c: f32,
    pub v_min: f32,
    pub v_max: f32,
}

impl Default for Dini {
    fn default() -> Self {
        Self {
            n: 32,
            m: 7,
            a: 3.0,
            b: 0.6,
            c: 0.17,
            v_min: 0.01,
            v_max: 0.01 + 7.0 * 1.99 / 32.0,
        }
    }
}

impl Dini {
    pub fn mesh(&self) -> Result<Mesh, GeometryError> {
        let Self { a, b, c, .. } = *self;
        let du = 4.0 * PI / self.n.max(1) as f32;
        let dv = (self.v_max - self.v_min) / self.m.max(1) as f32;

        grid_mesh("dini", self.n, self.m, |i, j| {
            let u = i as f32 * du;
            let v = self.v_min + j as f32 * dv;
            let (su, cu) = u.sin_cos();
            let (sv, cv) = v.sin_cos();

            let position = Point3::new(
                a * cu * sv * c,
                (a * (cv + (v * 0.5).tan().ln()) + b * u) * c,
                a * su * sv * c,
            );
            let d_u = Vector3::new(-a * su * sv, b, a * cu * sv) * c;
            let d_v = Vector3::new(a * cu * cv, a * (1.0 / sv - sv), a * su * cv) * c;
            let normal = d_v
                .cross(&d_u)
                .try_normalize(1e-6)
                .unwrap_or_else(|| Vector3::new(cu, 0.0, su));

            (position, normal)
        })
    }
}

/// Unit sphere from a recursively subdivided tetrahedron
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Depth 1 is the bare tetrahedron; each level splits every face in four
    pub depth: u32,
}

impl Default for Sphere {
    fn default() -> Self {
        Self { depth: 3 }
    }
}

impl Sphere {
    /// Number of faces produced at this depth
    pub fn face_count(&self) -> Option<usize> {
        let depth = self.depth.checked_sub(1)?;
        4usize.checked_pow(depth)?.checked_mul(4)
    }

    pub fn mesh(&self) -> Result<Mesh, GeometryError> {
        if self.depth == 0 {
            return Err(GeometryError::InvalidDepth);
        }
        let faces = self.face_count().unwrap_or(usize::MAX);
        let count = faces.saturating_mul(3);
        if count > MAX_VERTICES {
            return Err(GeometryError::TooManyVertices { count });
        }

        let a = Vector3::new(-1.0, 1.0, 1.0).normalize();
        let b = Vector3::new(1.0, 1.0, -1.0).normalize();
        let c = Vector3::new(1.0, -1.0, 1.0).normalize();
        let d = Vector3::new(-1.0, -1.0, -1.0).normalize();

        let mut mesh = Mesh::with_capacity(count, faces * 6, faces * 3);
        for (p, q, r) in [(a, b, c), (a, b, d), (a, c, d), (b, c, d)] {
            tessellate(&mut mesh, p, q, r, self.depth)?;
        }
        Ok(mesh)
    }
}

fn tessellate(
    mesh: &mut Mesh,
    a: Vector3<f32>,
    b: Vector3<f32>,
    c: Vector3<f32>,
    depth: u32,
) -> Result<(), GeometryError> {
    if depth <= 1 {
        return push_outward_face(mesh, a, b, c);
    }

    let ab = (a + b).normalize();
    let ac = (a + c).normalize();
    let bc = (b + c).normalize();

    tessellate(mesh, a, ab, ac, depth - 1)?;
    tessellate(mesh, ac, bc, c, depth - 1)?;
    tessellate(mesh, ab, b, bc, depth - 1)?;
    tessellate(mesh, ab, bc, ac, depth - 1)
}

/// Emit one face with its own three vertices, wound counter-clockwise
/// when seen from outside the sphere.
fn push_outward_face(
    mesh: &mut Mesh,
    a: Vector3<f32>,
    mut b: Vector3<f32>,
    mut c: Vector3<f32>,
) -> Result<(), GeometryError> {
    if (b - a).cross(&(c - a)).dot(&(a + b + c)) < 0.0 {
        std::mem::swap(&mut b, &mut c);
    }

    let i0 = mesh.push_vertex(Point3::from(a), a)?;
    let i1 = mesh.push_vertex(Point3::from(b), b)?;
    let i2 = mesh.push_vertex(Point3::from(c), c)?;

    mesh.triangles.extend_from_slice(&[i0, i1, i2]);
    mesh.lines.extend_from_slice(&[i0, i1, i1, i2, i2, i0]);
    Ok(())
}

/// One of the built-in surfaces with its parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    Torus(Torus),
    Plane(Plane),
    Pillow(Pillow),
    Dini(Dini),
    Sphere(Sphere),
}

impl Geometry {
    pub fn name(&self) -> &'static str {
        match self {
            Geometry::Torus(_) => "torus",
            Geometry::Plane(_) => "plane",
            Geometry::Pillow(_) => "pillow",
            Geometry::Dini(_) => "dini",
            Geometry::Sphere(_) => "sphere",
        }
    }

    pub fn mesh(&self) -> Result<Mesh, GeometryError> {
        let mesh = match self {
            Geometry::Torus(torus) => torus.mesh(),
            Geometry::Plane(plane) => plane.mesh(),
            Geometry::Pillow(pillow) => pillow.mesh(),
            Geometry::Dini(dini) => dini.mesh(),
            Geometry::Sphere(sphere) => sphere.mesh(),
        }?;
        log::debug!(
            "generated {}: {} vertices, {} line indices, {} triangle indices",
            self.name(),
            mesh.vertex_count(),
            mesh.lines.len(),
            mesh.triangles.len()
        );
        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn assert_indices_in_range(mesh: &Mesh) {
        let count = mesh.vertex_count();
        assert!(mesh.lines.iter().all(|&i| (i as usize) < count));
        assert!(mesh.triangles.iter().all(|&i| (i as usize) < count));
    }

    fn assert_unit_normals(mesh: &Mesh) {
        for i in 0..mesh.vertex_count() {
            let n = mesh.vertex(i).normal;
            assert!((n.norm() - 1.0).abs() < 1e-4, "normal {} = {:?}", i, n);
        }
    }

    /// Every non-degenerate face must wind counter-clockwise towards its normals
    fn assert_front_faces_match_normals(mesh: &Mesh) {
        for triangle in mesh.triangles() {
            let face = triangle.calculate_normal();
            if face.norm() < 0.5 {
                continue;
            }
            let avg: Vector3<f32> = triangle.vertices.iter().map(|v| v.normal).sum();
            assert!(face.dot(&avg) > 0.0, "face {:?} vs {:?}", face, avg);
        }
    }

    #[test]
    fn test_torus_counts() {
        let mesh = Torus::default().mesh().unwrap();
        assert_eq!(mesh.vertex_count(), 17 * 33);
        assert_eq!(mesh.lines.len(), 4 * 16 * 32);
        assert_eq!(mesh.triangles.len(), 6 * 16 * 32);
        assert_eq!(mesh.normals.len(), mesh.positions.len());
        assert_indices_in_range(&mesh);
    }

    #[test]
    fn test_torus_first_vertex() {
        let mesh = Torus::default().mesh().unwrap();
        let v = mesh.vertex(0);
        assert!((v.position - Point3::new(0.8, 0.0, 0.0)).norm() < 1e-6);
        assert!((v.normal - Vector3::x()).norm() < 1e-6);
    }

    #[test]
    fn test_torus_orientation() {
        let mesh = Torus::default().mesh().unwrap();
        assert_unit_normals(&mesh);
        assert_front_faces_match_normals(&mesh);
    }

    #[test]
    fn test_grid_index_pattern() {
        let mesh = Plane {
            n: 1,
            m: 1,
            half_extent: 1.0,
        }
        .mesh()
        .unwrap();
        assert_eq!(mesh.lines, vec![2, 3, 1, 3]);
        assert_eq!(mesh.triangles, vec![3, 2, 1, 2, 0, 1]);
    }

    #[test]
    fn test_plane_faces_up() {
        let mesh = Plane::default().mesh().unwrap();
        assert_eq!(mesh.vertex_count(), 101 * 101);
        let first = mesh.vertex(0).position;
        let last = mesh.vertex(mesh.vertex_count() - 1).position;
        assert!((first - Point3::new(-10.0, 0.0, -10.0)).norm() < 1e-4);
        assert!((last - Point3::new(10.0, 0.0, 10.0)).norm() < 1e-4);
        assert_front_faces_match_normals(&mesh);
    }

    #[test]
    fn test_pillow_shape() {
        let pillow = Pillow::default();
        let mesh = pillow.mesh().unwrap();
        assert_eq!(mesh.vertex_count(), 33 * 8);
        assert_indices_in_range(&mesh);
        assert_unit_normals(&mesh);
        assert_front_faces_match_normals(&mesh);

        for i in 0..mesh.vertex_count() {
            let p = mesh.vertex(i).position;
            assert!(p.x.abs() <= 1.0 + 1e-6);
            assert!(p.y.abs() <= pillow.a + 1e-6);
            assert!(p.z.abs() <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn test_pillow_top_normal_points_up() {
        // u = pi/2 at i = 16, v = pi/2 needs an even m to land on a grid line.
        let mesh = Pillow { n: 32, m: 8, a: 0.5 }.mesh().unwrap();
        let v = mesh.vertex(16 * 9 + 6);
        assert!((v.position - Point3::new(0.0, 0.5, 0.0)).norm() < 1e-5);
        assert!((v.normal - Vector3::y()).norm() < 1e-5);
    }

    #[test]
    fn test_pillow_seam_corner_normals() {
        // (u, v) = (0, -pi) collapses both partials
        let mesh = Pillow::default().mesh().unwrap();
        let corner = mesh.vertex(0);
        assert!((corner.position - Point3::new(1.0, 0.0, -1.0)).norm() < 1e-5);
        let expected = Vector3::new(1.0, 0.0, -1.0).normalize();
        assert!((corner.normal - expected).norm() < 1e-5);
    }

    #[test]
    fn test_dini_shape() {
        let dini = Dini::default();
        let mesh = dini.mesh().unwrap();
        assert_eq!(mesh.vertex_count(), 33 * 8);
        assert_eq!(mesh.lines.len(), 4 * 32 * 7);
        assert_eq!(mesh.triangles.len(), 6 * 32 * 7);
        assert_indices_in_range(&mesh);
        assert_unit_normals(&mesh);
        assert_front_faces_match_normals(&mesh);

        let first = mesh.vertex(0).position;
        let y0 = dini.a * dini.c * (0.01f32.cos() + 0.005f32.tan().ln());
        assert!((first - Point3::new(dini.a * dini.c * 0.01f32.sin(), y0, 0.0)).norm() < 1e-4);

        // Two full turns later the same profile sits higher by b * 4pi * c.
        let last_turn = mesh.vertex(32 * 8).position;
        let rise = dini.b * 4.0 * PI * dini.c;
        assert!((last_turn - (first + Vector3::new(0.0, rise, 0.0))).norm() < 1e-3);
    }

    #[test]
    fn test_sphere_depth_one_is_tetrahedron() {
        let mesh = Sphere { depth: 1 }.mesh().unwrap();
        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(mesh.triangles.len(), 12);
        assert_eq!(mesh.lines.len(), 24);
    }

    #[test]
    fn test_sphere_subdivision() {
        let sphere = Sphere { depth: 4 };
        let mesh = sphere.mesh().unwrap();
        assert_eq!(sphere.face_count(), Some(256));
        assert_eq!(mesh.triangles.len(), 256 * 3);
        assert_indices_in_range(&mesh);

        for i in 0..mesh.vertex_count() {
            let v = mesh.vertex(i);
            assert!((v.position.coords.norm() - 1.0).abs() < 1e-5);
            assert!((v.position.coords - v.normal).norm() < 1e-6);
        }
        assert_front_faces_match_normals(&mesh);
    }

    #[test]
    fn test_sphere_rejects_bad_depth() {
        assert_eq!(Sphere { depth: 0 }.mesh(), Err(GeometryError::InvalidDepth));
        assert!(matches!(
            Sphere { depth: 9 }.mesh(),
            Err(GeometryError::TooManyVertices { .. })
        ));
        assert!(Sphere { depth: 200 }.mesh().is_err());
    }

    #[test]
    fn test_grid_rejects_bad_resolution() {
        let err = Torus {
            n: 0,
            ..Torus::default()
        }
        .mesh()
        .unwrap_err();
        assert_eq!(
            err,
            GeometryError::InvalidResolution {
                geometry: "torus",
                n: 0,
                m: 32
            }
        );

        let err = Plane {
            n: 300,
            m: 300,
            half_extent: 1.0,
        }
        .mesh()
        .unwrap_err();
        assert_eq!(err, GeometryError::TooManyVertices { count: 301 * 301 });
    }

    #[test]
    fn test_fill_style_flags() {
        assert!(FillStyle::Fill.draws_triangles());
        assert!(!FillStyle::Fill.draws_lines());
        assert!(!FillStyle::Wireframe.draws_triangles());
        assert!(FillStyle::FillWireframe.draws_lines());
        assert_eq!(FillStyle::default(), FillStyle::FillWireframe);
    }

    #[test]
    fn test_calculate_normal() {
        let t = Triangle::new(
            Vertex::new(0.0, 0.0, 0.0, 0.0, 0.0, 1.0),
            Vertex::new(1.0, 0.0, 0.0, 0.0, 0.0, 1.0),
            Vertex::new(0.0, 1.0, 0.0, 0.0, 0.0, 1.0),
        );
        assert!((t.calculate_normal() - Vector3::z()).norm() < 1e-6);
    }
}
