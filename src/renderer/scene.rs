//! Turns session state into per-material triangle lists.
//!
//! Material `0` is a plain white texel, so untextured geometry is coloured by
//! its vertex tint alone. Material `1 + batch` holds the poster of sculpture
//! batch `batch`.

use crate::game::Session;
use crate::game::entity::{Body, Entity, EntityKind, PreviewCategory, PreviewDescriptor};
use crate::math::mat::Mat4;
use crate::renderer::primitives::{Mesh, Paint};

pub const FLOOR_SIZE: f32 = 500.0;
/// Edge length of the black cube left at each click point.
pub const MARK_SIZE: f32 = 0.1;
const CURVE_SEGMENTS: u32 = 24;

const FLOOR: Paint = Paint::solid([0x80, 0x80, 0x80, 0xff]);
const WALL: Paint = Paint::solid([0x1e, 0x3a, 0x8a, 0xff]);
const EXIT: Paint = Paint::glowing([0x00, 0xff, 0x00, 0xff]);
const MARK: Paint = Paint::solid([0x00, 0x00, 0x00, 0xff]);
const POSTER: Paint = Paint::solid([0xff, 0xff, 0xff, 0xff]);
const PREVIEW_FALLBACK: Paint = Paint::solid([0xc0, 0xc0, 0xc0, 0xff]);

/// Material slot of a sculpture batch.
pub fn poster_material(batch: usize) -> usize {
    batch + 1
}

/// One mesh per material, `material_count` long. Entities referring to a
/// batch without a material fall back to slot `0`.
pub fn build_scene(session: &Session, material_count: usize) -> Vec<Mesh> {
    let mut meshes = vec![Mesh::new(); material_count.max(1)];
    meshes[0].push_floor(FLOOR_SIZE, 0.0, FLOOR);

    for entity in session.entities().iter() {
        match &entity.kind {
            EntityKind::Wall => push_body(&mut meshes[0], entity, WALL),
            EntityKind::Exit => push_body(&mut meshes[0], entity, EXIT),
            EntityKind::Figure(figure) => {
                let [r, g, b] = figure.color;
                push_body(&mut meshes[0], entity, Paint::solid([r, g, b, 0xff]));
            }
            EntityKind::Sculpture(sculpture) => {
                let slot = poster_material(sculpture.batch);
                let slot = if slot < meshes.len() { slot } else { 0 };
                push_body(&mut meshes[slot], entity, POSTER);
                for mark in &sculpture.marks {
                    let center = [
                        entity.position[0] + mark[0],
                        entity.position[1] + mark[1],
                        entity.position[2] + mark[2],
                    ];
                    meshes[0].push_box(center, [MARK_SIZE; 3], MARK);
                }
            }
        }
    }
    meshes
}

fn push_body(mesh: &mut Mesh, entity: &Entity, paint: Paint) {
    push_shape(mesh, entity.body, entity.position, paint);
}

fn push_shape(mesh: &mut Mesh, body: Body, center: [f32; 3], paint: Paint) {
    match body {
        Body::Cuboid { size } => mesh.push_box(center, size, paint),
        Body::Sphere { radius } => mesh.push_sphere(center, radius, CURVE_SEGMENTS, paint),
        Body::Cylinder { radius, height } => {
            mesh.push_cylinder(center, radius, height, CURVE_SEGMENTS, paint)
        }
    }
}

/// Model shown on the preview card, spun by `(yaw, pitch)` around its centre
/// and shifted right of the text column.
pub fn preview_mesh(descriptor: &PreviewDescriptor, spin: (f32, f32)) -> Mesh {
    let paint = match (descriptor.category, descriptor.color) {
        (PreviewCategory::Mini, Some([r, g, b])) => Paint::solid([r, g, b, 0xff]),
        _ => PREVIEW_FALLBACK,
    };
    let body = match descriptor.category {
        PreviewCategory::Sculpture => Body::Cuboid {
            size: [0.9, 1.4, 0.9],
        },
        PreviewCategory::Mini => crate::game::figure_body(descriptor.shape, 1.6),
    };

    let mut mesh = Mesh::new();
    push_shape(&mut mesh, body, [0.0; 3], paint);

    let transform = Mat4::translation(0.8, 0.0, 0.0)
        .multiply(&Mat4::rotation_y(spin.0))
        .multiply(&Mat4::rotation_x(spin.1));
    mesh.transformed(&transform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::entity::Shape;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn small_session() -> Session {
        let mut config = GameConfig {
            rows: 7,
            cols: 7,
            ..GameConfig::default()
        };
        for batch in &mut config.sculptures {
            batch.count = 4;
        }
        config.figures.count = 4;
        Session::new(config, &mut StdRng::seed_from_u64(3)).expect("valid config")
    }

    /// Walls, the exit and the floor share the untextured slot; every
    /// sculpture lands in its batch's slot.
    #[test]
    fn test_scene_materials() {
        let session = small_session();
        let batches = session.config().sculptures.len();
        let meshes = build_scene(&session, batches + 1);
        assert_eq!(meshes.len(), batches + 1);

        let walls = session
            .entities()
            .iter()
            .filter(|e| matches!(e.kind, EntityKind::Wall))
            .count();
        assert!(meshes[0].len() >= 6 + (walls + 1) * 36);

        let posters: usize = meshes[1..].iter().map(Mesh::len).sum();
        let sculptures = session
            .entities()
            .iter()
            .filter(|e| matches!(e.kind, EntityKind::Sculpture(_)))
            .count();
        assert_eq!(posters, sculptures * 36);
    }

    /// Without poster materials every sculpture falls back to slot 0.
    #[test]
    fn test_scene_without_posters() {
        let session = small_session();
        let meshes = build_scene(&session, 1);
        assert_eq!(meshes.len(), 1);
        let glowing = meshes[0].vertices.iter().filter(|v| v.glow > 0.0).count();
        assert_eq!(glowing, 36);
    }

    #[test]
    fn test_preview_is_shifted_right() {
        let descriptor = PreviewDescriptor::mini(Shape::Sphere, [0, 255, 0]);
        let mesh = preview_mesh(&descriptor, (1.0, 0.5));
        assert!(!mesh.is_empty());
        let mean_x =
            mesh.vertices.iter().map(|v| v.position[0]).sum::<f32>() / mesh.len() as f32;
        assert!((mean_x - 0.8).abs() < 0.05);
        assert!(mesh.vertices.iter().all(|v| v.color == [0, 255, 0, 255]));
    }
}
