//! Primitive mesh builders.
//!
//! Every builder returns a CPU-side [`Mesh`] centered on the origin with
//! counter-clockwise front faces and outward normals. Option structs are
//! `serde(default)`, so a preset only names the values it changes.

use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use wgpu::util::DeviceExt;

use crate::error::ConfigError;

/// Upper bound for segments, tessellation and grid subdivisions.
pub const MAX_SEGMENTS: u32 = 1024;
/// Each icosphere subdivision quadruples the face count.
pub const MAX_ICOSPHERE_SUBDIVISIONS: u32 = 8;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    fn new(pos: Vec3, normal: Vec3, uv: [f32; 2]) -> Self {
        Self { pos: pos.to_array(), normal: normal.to_array(), uv }
    }
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn push(&mut self, pos: Vec3, normal: Vec3, uv: [f32; 2]) -> u32 {
        self.vertices.push(Vertex::new(pos, normal, uv));
        (self.vertices.len() - 1) as u32
    }

    fn tri(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Axis-aligned bounds in mesh space, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.vertices.iter().map(|v| Vec3::from(v.pos));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }

    pub fn upload(&self, device: &wgpu::Device) -> MeshBuffer {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: self.indices.len() as u32,
        }
    }
}

/// Shape selector used by presets, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeSpec {
    Box(BoxOptions),
    Sphere(SphereOptions),
    Cylinder(CylinderOptions),
    Cone(ConeOptions),
    Torus(TorusOptions),
    Ground(GroundOptions),
    Plane(PlaneOptions),
    Disc(DiscOptions),
    #[serde(alias = "icosphere")]
    IcoSphere(IcoSphereOptions),
}

impl ShapeSpec {
    pub fn build(&self) -> Mesh {
        match self {
            ShapeSpec::Box(o) => create_box(o),
            ShapeSpec::Sphere(o) => create_sphere(o),
            ShapeSpec::Cylinder(o) => create_cylinder(o),
            ShapeSpec::Cone(o) => create_cone(o),
            ShapeSpec::Torus(o) => create_torus(o),
            ShapeSpec::Ground(o) => create_ground(o),
            ShapeSpec::Plane(o) => create_plane(o),
            ShapeSpec::Disc(o) => create_disc(o),
            ShapeSpec::IcoSphere(o) => create_icosphere(o),
        }
    }

    /// Rejects negative or non-finite dimensions and tessellation counts
    /// large enough to overflow the index range or exhaust memory.
    pub fn validate(&self, mesh_name: &str) -> Result<(), ConfigError> {
        let (dimensions, counts): (Vec<(&str, f32)>, Vec<(&str, u32, u32)>) = match self {
            ShapeSpec::Box(o) => (
                vec![
                    ("size", o.size),
                    ("width", o.width.unwrap_or(0.0)),
                    ("height", o.height.unwrap_or(0.0)),
                    ("depth", o.depth.unwrap_or(0.0)),
                ],
                vec![],
            ),
            ShapeSpec::Sphere(o) => (vec![("diameter", o.diameter)], vec![("segments", o.segments, MAX_SEGMENTS)]),
            ShapeSpec::Cylinder(o) => (
                vec![("height", o.height), ("diameter_top", o.diameter_top), ("diameter_bottom", o.diameter_bottom)],
                vec![("tessellation", o.tessellation, MAX_SEGMENTS)],
            ),
            ShapeSpec::Cone(o) => (
                vec![("height", o.height), ("diameter", o.diameter)],
                vec![("tessellation", o.tessellation, MAX_SEGMENTS)],
            ),
            ShapeSpec::Torus(o) => (
                vec![("diameter", o.diameter), ("thickness", o.thickness)],
                vec![("tessellation", o.tessellation, MAX_SEGMENTS)],
            ),
            ShapeSpec::Ground(o) => (
                vec![("width", o.width), ("height", o.height)],
                vec![("subdivisions", o.subdivisions, MAX_SEGMENTS)],
            ),
            ShapeSpec::Plane(o) => (
                vec![("size", o.size), ("width", o.width.unwrap_or(0.0)), ("height", o.height.unwrap_or(0.0))],
                vec![],
            ),
            ShapeSpec::Disc(o) => (vec![("radius", o.radius)], vec![("tessellation", o.tessellation, MAX_SEGMENTS)]),
            ShapeSpec::IcoSphere(o) => (
                vec![("radius", o.radius)],
                vec![("subdivisions", o.subdivisions, MAX_ICOSPHERE_SUBDIVISIONS)],
            ),
        };

        let field = |name: &str| format!("meshes.{mesh_name}.shape.{name}");
        for (name, value) in dimensions {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::InvalidValue {
                    field: field(name),
                    reason: "must be a finite value >= 0".to_string(),
                });
            }
        }
        for (name, value, max) in counts {
            if value > max {
                return Err(ConfigError::InvalidValue { field: field(name), reason: format!("must be <= {max}") });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxOptions {
    pub size: f32,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub depth: Option<f32>,
}

impl Default for BoxOptions {
    fn default() -> Self {
        Self { size: 1.0, width: None, height: None, depth: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereOptions {
    pub diameter: f32,
    pub segments: u32,
}

impl Default for SphereOptions {
    fn default() -> Self {
        Self { diameter: 1.0, segments: 32 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CylinderOptions {
    pub height: f32,
    pub diameter_top: f32,
    pub diameter_bottom: f32,
    pub tessellation: u32,
}

impl Default for CylinderOptions {
    fn default() -> Self {
        Self { height: 2.0, diameter_top: 1.0, diameter_bottom: 1.0, tessellation: 24 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConeOptions {
    pub height: f32,
    pub diameter: f32,
    pub tessellation: u32,
}

impl Default for ConeOptions {
    fn default() -> Self {
        Self { height: 2.0, diameter: 1.0, tessellation: 24 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TorusOptions {
    pub diameter: f32,
    pub thickness: f32,
    pub tessellation: u32,
}

impl Default for TorusOptions {
    fn default() -> Self {
        Self { diameter: 1.0, thickness: 0.5, tessellation: 16 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundOptions {
    pub width: f32,
    pub height: f32,
    pub subdivisions: u32,
}

impl Default for GroundOptions {
    fn default() -> Self {
        Self { width: 1.0, height: 1.0, subdivisions: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneOptions {
    pub size: f32,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl Default for PlaneOptions {
    fn default() -> Self {
        Self { size: 1.0, width: None, height: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscOptions {
    pub radius: f32,
    pub tessellation: u32,
}

impl Default for DiscOptions {
    fn default() -> Self {
        Self { radius: 0.5, tessellation: 64 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcoSphereOptions {
    pub radius: f32,
    pub subdivisions: u32,
}

impl Default for IcoSphereOptions {
    fn default() -> Self {
        Self { radius: 1.0, subdivisions: 4 }
    }
}

pub fn create_box(options: &BoxOptions) -> Mesh {
    let half = Vec3::new(
        options.width.unwrap_or(options.size),
        options.height.unwrap_or(options.size),
        options.depth.unwrap_or(options.size),
    ) * 0.5;

    // (face normal, first tangent); second tangent is normal x first
    let faces = [
        (Vec3::X, Vec3::Y),
        (Vec3::NEG_X, Vec3::Y),
        (Vec3::Y, Vec3::Z),
        (Vec3::NEG_Y, Vec3::Z),
        (Vec3::Z, Vec3::X),
        (Vec3::NEG_Z, Vec3::X),
    ];
    let corners = [(-1.0, -1.0, [0.0, 1.0]), (1.0, -1.0, [1.0, 1.0]), (1.0, 1.0, [1.0, 0.0]), (-1.0, 1.0, [0.0, 0.0])];

    let mut mesh = Mesh::empty();
    for (normal, u) in faces {
        let v = normal.cross(u);
        let base = mesh.vertices.len() as u32;
        for (su, sv, uv) in corners {
            mesh.push((normal + u * su + v * sv) * half, normal, uv);
        }
        mesh.tri(base, base + 1, base + 2);
        mesh.tri(base, base + 2, base + 3);
    }
    mesh
}

pub fn create_sphere(options: &SphereOptions) -> Mesh {
    let radius = options.diameter * 0.5;
    let rings = options.segments.max(2);
    let slices = (options.segments * 2).max(3);

    let mut mesh = Mesh::empty();
    for i in 0..=rings {
        let theta = PI * i as f32 / rings as f32;
        for j in 0..=slices {
            let phi = TAU * j as f32 / slices as f32;
            let normal = Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
            mesh.push(normal * radius, normal, [j as f32 / slices as f32, i as f32 / rings as f32]);
        }
    }

    let row = slices + 1;
    for i in 0..rings {
        for j in 0..slices {
            let a = i * row + j;
            let b = (i + 1) * row + j;
            let c = b + 1;
            let d = a + 1;
            // pole rows collapse one triangle of each quad
            if i != 0 {
                mesh.tri(a, d, b);
            }
            if i != rings - 1 {
                mesh.tri(d, c, b);
            }
        }
    }
    mesh
}

pub fn create_cylinder(options: &CylinderOptions) -> Mesh {
    let height = options.height;
    let top = options.diameter_top * 0.5;
    let bottom = options.diameter_bottom * 0.5;
    let tessellation = options.tessellation.max(3);
    let slope = if height > 0.0 { (bottom - top) / height } else { 0.0 };

    let mut mesh = Mesh::empty();
    for j in 0..=tessellation {
        let phi = TAU * j as f32 / tessellation as f32;
        let (s, c) = phi.sin_cos();
        let normal = Vec3::new(c, slope, s).normalize();
        let u = j as f32 / tessellation as f32;
        mesh.push(Vec3::new(bottom * c, -height * 0.5, bottom * s), normal, [u, 1.0]);
        mesh.push(Vec3::new(top * c, height * 0.5, top * s), normal, [u, 0.0]);
    }
    for j in 0..tessellation {
        let a = 2 * j;
        let b = a + 1;
        let d = 2 * (j + 1);
        let c = d + 1;
        if bottom > 0.0 {
            mesh.tri(a, b, d);
        }
        if top > 0.0 {
            mesh.tri(b, c, d);
        }
    }

    for (y, radius, up) in [(height * 0.5, top, true), (-height * 0.5, bottom, false)] {
        if radius <= 0.0 {
            continue;
        }
        let normal = if up { Vec3::Y } else { Vec3::NEG_Y };
        let center = mesh.push(Vec3::new(0.0, y, 0.0), normal, [0.5, 0.5]);
        let start = center + 1;
        for j in 0..=tessellation {
            let (s, c) = (TAU * j as f32 / tessellation as f32).sin_cos();
            mesh.push(Vec3::new(radius * c, y, radius * s), normal, [0.5 + 0.5 * c, 0.5 + 0.5 * s]);
        }
        for j in 0..tessellation {
            if up {
                mesh.tri(center, start + j + 1, start + j);
            } else {
                mesh.tri(center, start + j, start + j + 1);
            }
        }
    }
    mesh
}

pub fn create_cone(options: &ConeOptions) -> Mesh {
    create_cylinder(&CylinderOptions {
        height: options.height,
        diameter_top: 0.0,
        diameter_bottom: options.diameter,
        tessellation: options.tessellation,
    })
}

pub fn create_torus(options: &TorusOptions) -> Mesh {
    let ring = options.diameter * 0.5;
    let tube = options.thickness * 0.5;
    let tessellation = options.tessellation.max(3);

    let mut mesh = Mesh::empty();
    for i in 0..=tessellation {
        let (st, ct) = (TAU * i as f32 / tessellation as f32).sin_cos();
        for j in 0..=tessellation {
            let (sp, cp) = (TAU * j as f32 / tessellation as f32).sin_cos();
            let normal = Vec3::new(cp * ct, sp, cp * st);
            let pos = Vec3::new(ring * ct, 0.0, ring * st) + normal * tube;
            mesh.push(pos, normal, [i as f32 / tessellation as f32, j as f32 / tessellation as f32]);
        }
    }

    let row = tessellation + 1;
    for i in 0..tessellation {
        for j in 0..tessellation {
            let a = i * row + j;
            let b = (i + 1) * row + j;
            let c = b + 1;
            let d = a + 1;
            mesh.tri(a, d, b);
            mesh.tri(d, c, b);
        }
    }
    mesh
}

/// Horizontal grid in the XZ plane facing +Y. `height` is the extent along Z.
pub fn create_ground(options: &GroundOptions) -> Mesh {
    let subdivisions = options.subdivisions.max(1);

    let mut mesh = Mesh::empty();
    for iz in 0..=subdivisions {
        for ix in 0..=subdivisions {
            let (fx, fz) = (ix as f32 / subdivisions as f32, iz as f32 / subdivisions as f32);
            let pos = Vec3::new((fx - 0.5) * options.width, 0.0, (fz - 0.5) * options.height);
            mesh.push(pos, Vec3::Y, [fx, 1.0 - fz]);
        }
    }

    let row = subdivisions + 1;
    for iz in 0..subdivisions {
        for ix in 0..subdivisions {
            let a = iz * row + ix;
            let b = a + 1;
            let d = a + row;
            let c = d + 1;
            mesh.tri(a, d, b);
            mesh.tri(d, c, b);
        }
    }
    mesh
}

/// Vertical quad in the XY plane facing +Z.
pub fn create_plane(options: &PlaneOptions) -> Mesh {
    let half_w = options.width.unwrap_or(options.size) * 0.5;
    let half_h = options.height.unwrap_or(options.size) * 0.5;

    let mut mesh = Mesh::empty();
    for (x, y, uv) in [(-1.0, -1.0, [0.0, 1.0]), (1.0, -1.0, [1.0, 1.0]), (1.0, 1.0, [1.0, 0.0]), (-1.0, 1.0, [0.0, 0.0])] {
        mesh.push(Vec3::new(x * half_w, y * half_h, 0.0), Vec3::Z, uv);
    }
    mesh.tri(0, 1, 2);
    mesh.tri(0, 2, 3);
    mesh
}

/// Triangle fan in the XY plane facing +Z.
pub fn create_disc(options: &DiscOptions) -> Mesh {
    let tessellation = options.tessellation.max(3);

    let mut mesh = Mesh::empty();
    let center = mesh.push(Vec3::ZERO, Vec3::Z, [0.5, 0.5]);
    for j in 0..=tessellation {
        let (s, c) = (TAU * j as f32 / tessellation as f32).sin_cos();
        mesh.push(Vec3::new(options.radius * c, options.radius * s, 0.0), Vec3::Z, [0.5 + 0.5 * c, 0.5 - 0.5 * s]);
    }
    for j in 0..tessellation {
        mesh.tri(center, center + 1 + j, center + 2 + j);
    }
    mesh
}

pub fn create_icosphere(options: &IcoSphereOptions) -> Mesh {
    let t = (1.0 + 5f32.sqrt()) * 0.5;
    let mut points: Vec<Vec3> = [
        (-1.0, t, 0.0), (1.0, t, 0.0), (-1.0, -t, 0.0), (1.0, -t, 0.0),
        (0.0, -1.0, t), (0.0, 1.0, t), (0.0, -1.0, -t), (0.0, 1.0, -t),
        (t, 0.0, -1.0), (t, 0.0, 1.0), (-t, 0.0, -1.0), (-t, 0.0, 1.0),
    ]
    .iter()
    .map(|&(x, y, z)| Vec3::new(x, y, z).normalize())
    .collect();

    let mut faces: Vec<[u32; 3]> = vec![
        [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
        [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
        [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
        [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
    ];

    for _ in 0..options.subdivisions {
        let mut midpoints = std::collections::HashMap::new();
        let mut midpoint = |a: u32, b: u32, points: &mut Vec<Vec3>| -> u32 {
            *midpoints.entry((a.min(b), a.max(b))).or_insert_with(|| {
                let p = ((points[a as usize] + points[b as usize]) * 0.5).normalize();
                points.push(p);
                (points.len() - 1) as u32
            })
        };

        let mut next = Vec::with_capacity(faces.len() * 4);
        for [a, b, c] in faces {
            let ab = midpoint(a, b, &mut points);
            let bc = midpoint(b, c, &mut points);
            let ca = midpoint(c, a, &mut points);
            next.extend_from_slice(&[[a, ab, ca], [b, bc, ab], [c, ca, bc], [ab, bc, ca]]);
        }
        faces = next;
    }

    let mut mesh = Mesh::empty();
    for p in points {
        let uv = [0.5 + p.z.atan2(p.x) / TAU, p.y.clamp(-1.0, 1.0).acos() / PI];
        mesh.push(p * options.radius, p, uv);
    }
    for [a, b, c] in faces {
        mesh.tri(a, b, c);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_shapes() -> Vec<(&'static str, Mesh)> {
        vec![
            ("box", create_box(&BoxOptions { size: 1.0, width: Some(1.0), height: Some(2.0), depth: Some(3.0) })),
            ("sphere", create_sphere(&SphereOptions::default())),
            ("coarse sphere", create_sphere(&SphereOptions { diameter: 2.0, segments: 4 })),
            ("cylinder", create_cylinder(&CylinderOptions::default())),
            ("cone", create_cone(&ConeOptions::default())),
            ("torus", create_torus(&TorusOptions::default())),
            ("ground", create_ground(&GroundOptions { width: 10.0, height: 10.0, subdivisions: 4 })),
            ("plane", create_plane(&PlaneOptions::default())),
            ("disc", create_disc(&DiscOptions::default())),
            ("icosphere", create_icosphere(&IcoSphereOptions { radius: 1.0, subdivisions: 2 })),
        ]
    }

    #[test]
    fn indices_are_in_range() {
        for (name, mesh) in all_shapes() {
            assert_eq!(mesh.indices.len() % 3, 0, "{name}");
            let n = mesh.vertices.len() as u32;
            assert!(mesh.indices.iter().all(|&i| i < n), "{name} has out of range index");
        }
    }

    #[test]
    fn normals_are_unit_length() {
        for (name, mesh) in all_shapes() {
            for v in &mesh.vertices {
                let len = Vec3::from(v.normal).length();
                assert!((len - 1.0).abs() < 1e-4, "{name} normal length {len}");
            }
        }
    }

    #[test]
    fn winding_agrees_with_normals() {
        for (name, mesh) in all_shapes() {
            for tri in mesh.indices.chunks(3) {
                let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| mesh.vertices[i as usize]);
                let face = (Vec3::from(b.pos) - Vec3::from(a.pos)).cross(Vec3::from(c.pos) - Vec3::from(a.pos));
                assert!(face.length() > 1e-9, "{name} has a degenerate triangle");
                let avg = Vec3::from(a.normal) + Vec3::from(b.normal) + Vec3::from(c.normal);
                assert!(face.dot(avg) > 0.0, "{name} triangle winds against its normals");
            }
        }
    }

    #[test]
    fn box_dimensions_fall_back_to_size() {
        let mesh = create_box(&BoxOptions { size: 2.0, width: None, height: Some(4.0), depth: None });
        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(max - min, Vec3::new(2.0, 4.0, 2.0));
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn sphere_and_icosphere_respect_radius() {
        let sphere = create_sphere(&SphereOptions { diameter: 3.0, segments: 8 });
        for v in &sphere.vertices {
            assert!((Vec3::from(v.pos).length() - 1.5).abs() < 1e-4);
        }
        let ico = create_icosphere(&IcoSphereOptions { radius: 2.0, subdivisions: 1 });
        assert_eq!(ico.triangle_count(), 80);
        for v in &ico.vertices {
            assert!((Vec3::from(v.pos).length() - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn ground_is_flat_and_spans_its_extent() {
        let mesh = create_ground(&GroundOptions { width: 6.0, height: 4.0, subdivisions: 3 });
        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Vec3::new(-3.0, 0.0, -2.0));
        assert_eq!(max, Vec3::new(3.0, 0.0, 2.0));
        assert_eq!(mesh.triangle_count(), 18);
    }

    #[test]
    fn cone_has_no_top_cap() {
        let cone = create_cone(&ConeOptions { height: 2.0, diameter: 1.0, tessellation: 8 });
        // 8 side triangles plus 8 bottom cap triangles
        assert_eq!(cone.triangle_count(), 16);
        assert!(cone.vertices.iter().all(|v| v.pos[1] <= 1.0 + 1e-6));
    }

    #[test]
    fn shape_spec_parses_from_inline_table() {
        let spec: ShapeSpec = toml::from_str("kind = \"sphere\"\ndiameter = 2.0").unwrap();
        assert_eq!(spec, ShapeSpec::Sphere(SphereOptions { diameter: 2.0, segments: 32 }));
        let spec: ShapeSpec = toml::from_str("kind = \"ico_sphere\"").unwrap();
        assert_eq!(spec, ShapeSpec::IcoSphere(IcoSphereOptions::default()));
    }
}
