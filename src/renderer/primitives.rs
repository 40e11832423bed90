//! Triangle-list geometry for the scene.
//!
//! All shapes are emitted as plain triangle lists (no index buffer) into a
//! [`Mesh`]. Every vertex carries a normal for lighting, a texture coordinate
//! for posters, a tint and a glow weight that the fragment shader multiplies
//! with the exit pulse.

use crate::math::mat::Mat4;
use crate::math::vec::Vec3;
use std::f32::consts::{PI, TAU};

/// Vertex data for every lit mesh.
///
/// Each vertex contains:
/// - `position`: 3D position in world space.
/// - `normal`: unit surface normal.
/// - `uv`: texture coordinate into the material texture.
/// - `color`: RGBA tint (as 4 normalized u8 values).
/// - `glow`: emissive weight, `1.0` for the exit.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub color: [u8; 4],
    pub glow: f32,
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
        3 => Unorm8x4,
        4 => Float32,
    ];

    /// Returns the vertex buffer layout for use in a wgpu pipeline.
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Surface look shared by every vertex of one shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub color: [u8; 4],
    pub glow: f32,
}

impl Paint {
    pub const fn solid(color: [u8; 4]) -> Self {
        Self { color, glow: 0.0 }
    }

    pub const fn glowing(color: [u8; 4]) -> Self {
        Self { color, glow: 1.0 }
    }
}

/// Growable triangle list.
#[derive(Debug, Default, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    fn push(&mut self, position: Vec3, normal: Vec3, uv: [f32; 2], paint: Paint) {
        self.vertices.push(Vertex {
            position: position.into(),
            normal: normal.into(),
            uv,
            color: paint.color,
            glow: paint.glow,
        });
    }

    /// Two triangles over `corners` given counter-clockwise from the outside,
    /// starting bottom-left.
    pub fn push_quad(&mut self, corners: [Vec3; 4], normal: Vec3, paint: Paint) {
        let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
        for i in [0, 1, 2, 0, 2, 3] {
            self.push(corners[i], normal, uvs[i], paint);
        }
    }

    /// Horizontal square of side `size` centred on the origin at height `y`.
    pub fn push_floor(&mut self, size: f32, y: f32, paint: Paint) {
        let h = size / 2.0;
        self.push_quad(
            [
                Vec3::new(-h, y, h),
                Vec3::new(h, y, h),
                Vec3::new(h, y, -h),
                Vec3::new(-h, y, -h),
            ],
            Vec3::UP,
            paint,
        );
    }

    /// Axis-aligned box. Each face maps the full texture.
    pub fn push_box(&mut self, center: [f32; 3], size: [f32; 3], paint: Paint) {
        let c = Vec3::from(center);
        let x = Vec3::new(size[0] / 2.0, 0.0, 0.0);
        let y = Vec3::new(0.0, size[1] / 2.0, 0.0);
        let z = Vec3::new(0.0, 0.0, size[2] / 2.0);

        // (outward offset, right, up) with right x up pointing outward
        let faces = [(x, -z, y), (-x, z, y), (z, x, y), (-z, -x, y), (y, x, -z), (-y, x, z)];
        for (out, right, up) in faces {
            let base = c + out;
            self.push_quad(
                [
                    base - right - up,
                    base + right - up,
                    base + right + up,
                    base - right + up,
                ],
                out.normalize(),
                paint,
            );
        }
    }

    /// UV sphere with `segments` slices and half as many stacks.
    pub fn push_sphere(&mut self, center: [f32; 3], radius: f32, segments: u32, paint: Paint) {
        let c = Vec3::from(center);
        let slices = segments.max(3);
        let stacks = (segments / 2).max(2);
        let point = |stack: u32, slice: u32| {
            let theta = PI * stack as f32 / stacks as f32;
            let phi = TAU * slice as f32 / slices as f32;
            Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin())
        };
        let uv = |stack: u32, slice: u32| [slice as f32 / slices as f32, stack as f32 / stacks as f32];

        for stack in 0..stacks {
            for slice in 0..slices {
                let quad = [
                    (stack, slice),
                    (stack + 1, slice),
                    (stack + 1, slice + 1),
                    (stack, slice + 1),
                ];
                for i in [0, 1, 2, 0, 2, 3] {
                    let (st, sl) = quad[i];
                    let n = point(st, sl);
                    self.push(c + n * radius, n, uv(st, sl), paint);
                }
            }
        }
    }

    /// Upright capped cylinder centred on `center`.
    pub fn push_cylinder(
        &mut self,
        center: [f32; 3],
        radius: f32,
        height: f32,
        segments: u32,
        paint: Paint,
    ) {
        let c = Vec3::from(center);
        let slices = segments.max(3);
        let half = height / 2.0;
        let rim = |slice: u32| {
            let phi = TAU * slice as f32 / slices as f32;
            Vec3::new(phi.cos(), 0.0, phi.sin())
        };

        for slice in 0..slices {
            let (a, b) = (rim(slice), rim(slice + 1));
            let (u0, u1) = (slice as f32 / slices as f32, (slice + 1) as f32 / slices as f32);
            let bottom_a = c + a * radius - Vec3::UP * half;
            let bottom_b = c + b * radius - Vec3::UP * half;
            let top_a = c + a * radius + Vec3::UP * half;
            let top_b = c + b * radius + Vec3::UP * half;

            self.push(bottom_a, a, [u0, 1.0], paint);
            self.push(top_b, b, [u1, 0.0], paint);
            self.push(bottom_b, b, [u1, 1.0], paint);
            self.push(bottom_a, a, [u0, 1.0], paint);
            self.push(top_a, a, [u0, 0.0], paint);
            self.push(top_b, b, [u1, 0.0], paint);

            let top = c + Vec3::UP * half;
            let bottom = c - Vec3::UP * half;
            self.push(top, Vec3::UP, [0.5, 0.5], paint);
            self.push(top_b, Vec3::UP, [0.5, 0.5], paint);
            self.push(top_a, Vec3::UP, [0.5, 0.5], paint);
            self.push(bottom, -Vec3::UP, [0.5, 0.5], paint);
            self.push(bottom_a, -Vec3::UP, [0.5, 0.5], paint);
            self.push(bottom_b, -Vec3::UP, [0.5, 0.5], paint);
        }
    }

    /// Copy of this mesh with `transform` applied to positions and normals.
    /// `transform` must be a rigid motion.
    pub fn transformed(&self, transform: &Mat4) -> Mesh {
        let origin = transform.transform_point(Vec3::ZERO);
        let vertices = self
            .vertices
            .iter()
            .map(|v| {
                let normal = transform.transform_point(Vec3::from(v.normal)) - origin;
                Vertex {
                    position: transform.transform_point(Vec3::from(v.position)).into(),
                    normal: normal.normalize().into(),
                    ..*v
                }
            })
            .collect();
        Mesh { vertices }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Paint = Paint::solid([255, 255, 255, 255]);

    fn assert_unit_normals(mesh: &Mesh) {
        for v in &mesh.vertices {
            let n = Vec3::from(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-4, "normal {n:?}");
        }
    }

    /// A box is six quads lying exactly on its bounds.
    #[test]
    fn test_box_geometry() {
        let mut mesh = Mesh::new();
        mesh.push_box([1.0, 2.0, 3.0], [2.0, 4.0, 6.0], WHITE);
        assert_eq!(mesh.len(), 36);
        assert_unit_normals(&mesh);
        for v in &mesh.vertices {
            let [x, y, z] = v.position;
            assert!((0.0 - 1e-5..=2.0 + 1e-5).contains(&x));
            assert!((0.0 - 1e-5..=4.0 + 1e-5).contains(&y));
            assert!((0.0 - 1e-5..=6.0 + 1e-5).contains(&z));
        }
    }

    /// Every box face winds counter-clockwise seen from outside.
    #[test]
    fn test_box_faces_wind_outward() {
        let mut mesh = Mesh::new();
        mesh.push_box([0.0; 3], [1.0; 3], WHITE);
        for tri in mesh.vertices.chunks(3) {
            let a = Vec3::from(tri[0].position);
            let b = Vec3::from(tri[1].position);
            let c = Vec3::from(tri[2].position);
            let face = (b - a).cross(&(c - a));
            assert!(face.dot(&Vec3::from(tri[0].normal)) > 0.0);
        }
    }

    #[test]
    fn test_sphere_vertices_on_surface() {
        let mut mesh = Mesh::new();
        mesh.push_sphere([0.0, 1.0, 0.0], 0.5, 16, WHITE);
        assert_eq!(mesh.len(), 16 * 8 * 6);
        assert_unit_normals(&mesh);
        for v in &mesh.vertices {
            let offset = Vec3::from(v.position) - Vec3::new(0.0, 1.0, 0.0);
            assert!((offset.length() - 0.5).abs() < 1e-4);
        }
    }

    #[test]
    fn test_cylinder_stays_in_bounds() {
        let mut mesh = Mesh::new();
        mesh.push_cylinder([0.0, 0.4, 0.0], 0.4, 0.8, 12, WHITE);
        assert_eq!(mesh.len(), 12 * 12);
        assert_unit_normals(&mesh);
        for v in &mesh.vertices {
            let [x, y, z] = v.position;
            assert!((x * x + z * z).sqrt() <= 0.4 + 1e-4);
            assert!((-1e-5..=0.8 + 1e-5).contains(&y));
        }
    }

    /// Translation moves positions but leaves normals alone.
    #[test]
    fn test_transformed_rigid_motion() {
        let mut mesh = Mesh::new();
        mesh.push_floor(2.0, 0.0, WHITE);
        let moved = mesh.transformed(&Mat4::translation(0.0, 3.0, 0.0));
        for (before, after) in mesh.vertices.iter().zip(&moved.vertices) {
            assert!((after.position[1] - before.position[1] - 3.0).abs() < 1e-5);
            assert_eq!(after.normal, before.normal);
        }
    }
}
