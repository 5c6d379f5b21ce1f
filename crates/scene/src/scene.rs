use crate::rng::SplitMix64;
use glam::{Mat4, Vec3};
use serde::Serialize;
use std::collections::BTreeMap;
use walkabout_common::{Color, Transform};

/// Sequential identifier of an object within one scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObjectId(pub u32);

/// Geometry of an object, in object-local units, centred on the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Shape {
    /// Horizontal plane facing +Y.
    Plane { width: f32, depth: f32 },
    Box { width: f32, height: f32, depth: f32 },
    Cylinder { radius: f32, height: f32 },
    Cone { radius: f32, height: f32 },
}

/// Which unit mesh a shape is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeshKind {
    Plane,
    Box,
    Cylinder,
    Cone,
}

impl Shape {
    pub fn mesh(&self) -> MeshKind {
        match self {
            Shape::Plane { .. } => MeshKind::Plane,
            Shape::Box { .. } => MeshKind::Box,
            Shape::Cylinder { .. } => MeshKind::Cylinder,
            Shape::Cone { .. } => MeshKind::Cone,
        }
    }

    /// Scale that stretches the unit mesh to this shape's dimensions.
    pub fn extent(&self) -> Vec3 {
        match *self {
            Shape::Plane { width, depth } => Vec3::new(width, 1.0, depth),
            Shape::Box {
                width,
                height,
                depth,
            } => Vec3::new(width, height, depth),
            Shape::Cylinder { radius, height } | Shape::Cone { radius, height } => {
                Vec3::new(radius, height, radius)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneObject {
    pub name: String,
    pub shape: Shape,
    pub transform: Transform,
    pub color: Color,
}

impl SceneObject {
    /// Object transform applied after stretching the unit mesh.
    pub fn model_matrix(&self) -> Mat4 {
        self.transform.matrix() * Mat4::from_scale(self.shape.extent())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    /// Light shines from this point towards the origin.
    pub position: Vec3,
}

impl DirectionalLight {
    /// Unit vector pointing towards the light.
    pub fn direction(&self) -> Vec3 {
        self.position.normalize_or_zero()
    }
}

/// Linear distance fog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fog {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

/// Static scene description consumed by renderers.
///
/// Objects live in a BTreeMap so iteration order is the spawn order.
#[derive(Debug, Clone, Serialize)]
pub struct Scene {
    pub background: Color,
    pub fog: Option<Fog>,
    pub ambient: AmbientLight,
    pub sun: DirectionalLight,
    objects: BTreeMap<ObjectId, SceneObject>,
    next_id: u32,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            background: Color::from_hex(0x000000),
            fog: None,
            ambient: AmbientLight {
                color: Color::WHITE,
                intensity: 0.5,
            },
            sun: DirectionalLight {
                color: Color::WHITE,
                intensity: 0.8,
                position: Vec3::new(10.0, 10.0, 10.0),
            },
            objects: BTreeMap::new(),
            next_id: 0,
        }
    }
}

/// Number of trees in the demo scene.
pub const DEMO_TREE_COUNT: usize = 20;
/// Trees are scattered over a square of this side, centred on the origin.
pub const DEMO_TREE_SPREAD: f32 = 80.0;

const SKY: Color = Color::from_hex(0x87ceeb);

impl Scene {
    /// Empty scene with default lighting and no fog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grass ground, four boxes and a seeded scatter of trees under a sky
    /// background with matching fog.
    pub fn demo(seed: u64) -> Self {
        let mut scene = Self {
            background: SKY,
            fog: Some(Fog {
                color: SKY,
                near: 10.0,
                far: 100.0,
            }),
            ..Self::default()
        };

        scene.spawn(
            "ground",
            Shape::Plane {
                width: 100.0,
                depth: 100.0,
            },
            Transform::default(),
            Color::from_hex(0x567d46),
        );

        let boxes = [
            (Vec3::new(5.0, 1.0, -5.0), Vec3::new(2.0, 2.0, 2.0), 0xff0000),
            (Vec3::new(-5.0, 1.0, 5.0), Vec3::new(2.0, 2.0, 2.0), 0x00ff00),
            (Vec3::new(-10.0, 1.0, -10.0), Vec3::new(2.0, 4.0, 2.0), 0x0000ff),
            (Vec3::new(10.0, 1.0, 10.0), Vec3::new(2.0, 1.0, 6.0), 0xffff00),
        ];
        for (position, size, color) in boxes {
            scene.spawn(
                "box",
                Shape::Box {
                    width: size.x,
                    height: size.y,
                    depth: size.z,
                },
                Transform::from_position(position),
                Color::from_hex(color),
            );
        }

        let mut rng = SplitMix64::new(seed);
        for _ in 0..DEMO_TREE_COUNT {
            let x = rng.centered(DEMO_TREE_SPREAD);
            let z = rng.centered(DEMO_TREE_SPREAD);
            scene.spawn_tree(x, z);
        }

        tracing::debug!(seed, objects = scene.object_count(), "built demo scene");
        scene
    }

    /// A tree is a brown trunk topped by a green cone.
    pub fn spawn_tree(&mut self, x: f32, z: f32) -> (ObjectId, ObjectId) {
        let trunk = self.spawn(
            "tree trunk",
            Shape::Cylinder {
                radius: 0.2,
                height: 2.0,
            },
            Transform::from_position(Vec3::new(x, 1.0, z)),
            Color::from_hex(0x8b4513),
        );
        let leaves = self.spawn(
            "tree leaves",
            Shape::Cone {
                radius: 1.0,
                height: 3.0,
            },
            Transform::from_position(Vec3::new(x, 3.5, z)),
            Color::from_hex(0x006400),
        );
        (trunk, leaves)
    }

    pub fn spawn(
        &mut self,
        name: impl Into<String>,
        shape: Shape,
        transform: Transform,
        color: Color,
    ) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.insert(
            id,
            SceneObject {
                name: name.into(),
                shape,
                transform,
                color,
            },
        );
        id
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn objects(&self) -> &BTreeMap<ObjectId, SceneObject> {
        &self.objects
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// FNV-1a hash over object shapes, positions and colours, in id order.
    /// Two scenes with the same layout hash identically.
    pub fn layout_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        for (id, object) in &self.objects {
            mix(&mut h, &id.0.to_le_bytes());
            mix(&mut h, &object.color.0.to_le_bytes());
            for v in object.shape.extent().to_array() {
                mix(&mut h, &v.to_le_bytes());
            }
            for v in object.transform.position.to_array() {
                mix(&mut h, &v.to_le_bytes());
            }
        }
        h
    }
}
