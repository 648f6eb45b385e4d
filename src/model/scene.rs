use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::config::ScenePreset;
use crate::controller::camera_controller::GroundRect;
use crate::controller::physics::{BodyHandle, PhysicsWorld, RigidBody};
use crate::model::camera::{Camera, CameraRig};
use crate::model::light::Light;
use crate::model::material::Material;
use crate::model::mesh::{Mesh, ShapeSpec};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scaling: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self { position: Vec3::ZERO, rotation: Quat::IDENTITY, scaling: Vec3::ONE }
    }
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scaling, self.rotation, self.position)
    }
}

/// A named mesh instance, optionally driven by a physics body.
pub struct Entity {
    pub name: String,
    pub shape: ShapeSpec,
    pub mesh: Mesh,
    pub material: Material,
    pub transform: Transform,
    pub layer_mask: u32,
    pub body: Option<BodyHandle>,
}

pub struct Scene {
    pub name: String,
    pub clear_color: [f32; 4],
    pub camera: Camera,
    pub lights: Vec<Light>,
    pub entities: Vec<Entity>,
    pub physics: Option<PhysicsWorld>,
    pub show_overlay: bool,
}

impl Scene {
    /// Builds camera, lights, meshes and bodies from a validated preset.
    pub fn from_preset(preset: &ScenePreset, width: u32, height: u32) -> Self {
        let mut physics = preset.physics.as_ref().map(|p| PhysicsWorld::new(Vec3::from(p.gravity)));

        let entities = preset
            .meshes
            .iter()
            .map(|spec| {
                let mesh = spec.shape.build();
                let [rx, ry, rz] = spec.rotation.map(f32::to_radians);
                let transform = Transform {
                    position: Vec3::from(spec.position),
                    rotation: Quat::from_euler(EulerRot::XYZ, rx, ry, rz),
                    scaling: Vec3::from(spec.scaling),
                };

                let body = match (&spec.body, physics.as_mut()) {
                    (Some(body_spec), Some(world)) => {
                        let half_extents = mesh
                            .bounds()
                            .map(|(min, max)| (max - min) * 0.5 * transform.scaling.abs())
                            .unwrap_or(Vec3::ZERO);
                        Some(world.add_body(RigidBody::from_spec(body_spec, transform.position, half_extents)))
                    }
                    _ => None,
                };

                tracing::debug!(
                    "mesh '{}': {} triangles{}",
                    spec.name,
                    mesh.triangle_count(),
                    if body.is_some() { ", with body" } else { "" }
                );

                Entity {
                    name: spec.name.clone(),
                    shape: spec.shape.clone(),
                    mesh,
                    material: spec.material.clone().unwrap_or_default(),
                    transform,
                    layer_mask: spec.layer_mask,
                    body,
                }
            })
            .collect();

        let mut scene = Self {
            name: preset.name.clone(),
            clear_color: preset.clear_color,
            camera: Camera::from_spec(&preset.camera, &preset.lens, width, height),
            lights: preset.lights.clone(),
            entities,
            physics,
            show_overlay: preset.show_overlay,
        };
        scene.snap_follow_camera();
        scene
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn entity_position(&self, name: &str) -> Option<Vec3> {
        self.entity(name).map(|e| e.transform.position)
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.physics.as_ref()?.body(handle)
    }

    /// Position of the entity a follow camera is locked onto.
    pub fn follow_target(&self) -> Option<Vec3> {
        match &self.camera.rig {
            CameraRig::Follow(follow) => self.entity_position(&follow.locked_target),
            _ => None,
        }
    }

    /// Copies body positions onto their entities.
    pub fn sync_from_physics(&mut self) {
        let Some(world) = &self.physics else { return };
        for entity in &mut self.entities {
            if let Some(body) = entity.body.and_then(|h| world.body(h)) {
                entity.transform.position = body.position;
            }
        }
    }

    pub fn reset_bodies(&mut self) {
        if let Some(world) = &mut self.physics {
            world.reset();
            tracing::info!("physics bodies reset");
        }
        self.sync_from_physics();
    }

    /// Ground meshes as horizontal rectangles, for camera collisions.
    pub fn grounds(&self) -> Vec<GroundRect> {
        self.entities
            .iter()
            .filter(|e| matches!(e.shape, ShapeSpec::Ground(_)))
            .filter_map(|e| {
                let (min, max) = e.mesh.bounds()?;
                let half = (max - min) * 0.5 * e.transform.scaling.abs();
                Some(GroundRect { center: e.transform.position, half_x: half.x, half_z: half.z })
            })
            .collect()
    }

    /// Places a follow camera at its goal so the first frames do not sweep in
    /// from the origin.
    fn snap_follow_camera(&mut self) {
        let target = self.follow_target();
        if let (CameraRig::Follow(follow), Some(target)) = (&mut self.camera.rig, target) {
            if follow.eye == Vec3::ZERO {
                follow.eye = follow.goal(target);
            }
            follow.target = target;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_preset_builds_the_startup_scene() {
        let scene = Scene::from_preset(&ScenePreset::builtin("basic").unwrap(), 800, 600);
        assert_eq!(scene.entities.len(), 1);
        assert!(scene.physics.is_none());
        assert!((scene.camera.eye() - Vec3::new(0.0, 0.0, 2.0)).length() < 1e-5);
        let cube = scene.entity("Box").unwrap();
        assert_eq!(cube.mesh.bounds(), Some((Vec3::splat(-0.5), Vec3::splat(0.5))));
    }

    #[test]
    fn physics_preset_creates_bodies_from_mesh_bounds() {
        let scene = Scene::from_preset(&ScenePreset::builtin("physics").unwrap(), 800, 600);
        let ground = scene.entity("ground").unwrap();
        let ground_body = scene.body(ground.body.unwrap()).unwrap();
        assert!(ground_body.is_static());
        assert!((ground_body.half_extents - Vec3::new(5.0, 0.0, 5.0)).length() < 1e-5);

        let sphere = scene.entity("sphere").unwrap();
        let sphere_body = scene.body(sphere.body.unwrap()).unwrap();
        assert_eq!(sphere_body.mass, 1.0);
        assert!((sphere_body.half_extents - Vec3::splat(0.5)).length() < 1e-5);

        assert_eq!(scene.follow_target(), Some(Vec3::new(0.0, 2.0, 0.0)));
        assert_eq!(scene.grounds().len(), 1);
    }

    #[test]
    fn sync_and_reset_follow_the_bodies() {
        let mut scene = Scene::from_preset(&ScenePreset::builtin("physics").unwrap(), 800, 600);
        for _ in 0..30 {
            scene.physics.as_mut().unwrap().step(1.0 / 60.0);
        }
        scene.sync_from_physics();
        let fallen = scene.entity_position("sphere").unwrap();
        assert!(fallen.y < 2.0);
        assert_eq!(scene.entity_position("ground"), Some(Vec3::ZERO));

        scene.reset_bodies();
        assert_eq!(scene.entity_position("sphere"), Some(Vec3::new(0.0, 2.0, 0.0)));
    }
}
