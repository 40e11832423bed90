//! Scene entities: walls, the exit, sculptures and mini figures.
//!
//! Entity behaviour is a closed set, so the kind is an enum and each variant
//! carries exactly the state it needs. Sculptures count clicks and can be
//! destroyed; figures open the preview overlay; walls and the exit are inert
//! until the escape sequence.

use crate::game::collision::AABB;
use crate::math::ray::{self, Ray};
use crate::math::vec::Vec3;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// Index of a loaded soundtrack clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipId(pub usize);

/// Primitive shape of a mini figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Box,
    Sphere,
    Cylinder,
}

impl Shape {
    pub const ALL: [Shape; 3] = [Shape::Box, Shape::Sphere, Shape::Cylinder];
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Shape::Box => "Box",
            Shape::Sphere => "Sphere",
            Shape::Cylinder => "Cylinder",
        };
        f.write_str(name)
    }
}

/// Solid occupied by an entity, centred on its position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Body {
    Cuboid { size: [f32; 3] },
    Sphere { radius: f32 },
    Cylinder { radius: f32, height: f32 },
}

impl Body {
    pub fn bounds(&self, center: [f32; 3]) -> AABB {
        match *self {
            Body::Cuboid { size } => AABB::from_center_size(center, size),
            Body::Sphere { radius } => {
                AABB::from_center_size(center, [radius * 2.0, radius * 2.0, radius * 2.0])
            }
            Body::Cylinder { radius, height } => {
                AABB::from_center_size(center, [radius * 2.0, height, radius * 2.0])
            }
        }
    }

    /// Distance along `ray` to the surface, if it is hit.
    pub fn intersect(&self, center: [f32; 3], ray: &Ray) -> Option<f32> {
        match *self {
            Body::Cuboid { .. } => {
                let bounds = self.bounds(center);
                ray::intersect_aabb(ray, bounds.min, bounds.max)
            }
            Body::Sphere { radius } => ray::intersect_sphere(ray, center.into(), radius),
            Body::Cylinder { radius, height } => {
                ray::intersect_cylinder(ray, Vec3::from(center), radius, height)
            }
        }
    }

    pub fn height(&self) -> f32 {
        match *self {
            Body::Cuboid { size } => size[1],
            Body::Sphere { radius } => radius * 2.0,
            Body::Cylinder { height, .. } => height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewCategory {
    Sculpture,
    Mini,
}

/// What the overlay needs to show a selected entity.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewDescriptor {
    pub category: PreviewCategory,
    pub shape: Shape,
    pub image: Option<PathBuf>,
    pub color: Option<[u8; 3]>,
    pub info: String,
}

impl PreviewDescriptor {
    pub fn sculpture(image: PathBuf) -> Self {
        let info = format!("Sculpture ({})", image.display());
        Self {
            category: PreviewCategory::Sculpture,
            shape: Shape::Box,
            image: Some(image),
            color: None,
            info,
        }
    }

    pub fn mini(shape: Shape, color: [u8; 3]) -> Self {
        Self {
            category: PreviewCategory::Mini,
            shape,
            image: None,
            color: Some(color),
            info: format!("Mini figure, {shape}"),
        }
    }
}

/// Destructible poster block.
#[derive(Debug, Clone, PartialEq)]
pub struct Sculpture {
    /// Batch index, which doubles as the material slot of its poster.
    pub batch: usize,
    pub clip: Option<ClipId>,
    pub clicks: u32,
    /// Click points relative to the entity centre.
    pub marks: Vec<[f32; 3]>,
    /// Set once removal has been scheduled.
    pub doomed: bool,
    pub preview: PreviewDescriptor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub shape: Shape,
    pub color: [u8; 3],
    pub preview: PreviewDescriptor,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Wall,
    Exit,
    Sculpture(Sculpture),
    Figure(Figure),
}

impl EntityKind {
    /// Whether clicks are resolved against this entity.
    pub fn is_pickable(&self) -> bool {
        !matches!(self, EntityKind::Wall)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// World-space centre.
    pub position: [f32; 3],
    /// Centre at placement time, used to animate from.
    pub origin: [f32; 3],
    pub body: Body,
}

impl Entity {
    pub fn bounds(&self) -> AABB {
        self.body.bounds(self.position)
    }
}

/// Nearest ray hit on an entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub entity: EntityId,
    pub distance: f32,
    pub point: Vec3,
}

/// Id-ordered entity store owned by the session.
#[derive(Debug, Default)]
pub struct Entities {
    next_id: u32,
    items: BTreeMap<EntityId, Entity>,
}

impl Entities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, kind: EntityKind, position: [f32; 3], body: Body) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.items.insert(
            id,
            Entity {
                id,
                kind,
                position,
                origin: position,
                body,
            },
        );
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.items.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.items.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.items.contains_key(&id)
    }

    /// Removes and returns the entity; `None` if it was already gone.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.items.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.items.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.items.values_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Nearest pickable entity along `ray`. Walls are not part of the set.
    pub fn raycast(&self, ray: &Ray) -> Option<Hit> {
        self.iter()
            .filter(|entity| entity.kind.is_pickable())
            .filter_map(|entity| {
                let distance = entity.body.intersect(entity.position, ray)?;
                Some(Hit {
                    entity: entity.id,
                    distance,
                    point: ray.at(distance),
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
