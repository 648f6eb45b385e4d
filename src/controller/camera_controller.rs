use glam::Vec3;

use crate::controller::input::InputState;
use crate::model::camera::{Camera, CameraRig};

/// Minimum eye height above a ground surface when collisions are on.
pub const COLLISION_HEIGHT: f32 = 1.0;

/// A horizontal rectangle the universal camera may not sink below.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundRect {
    pub center: Vec3,
    pub half_x: f32,
    pub half_z: f32,
}

impl GroundRect {
    pub fn contains_xz(&self, p: Vec3) -> bool {
        (p.x - self.center.x).abs() <= self.half_x && (p.z - self.center.z).abs() <= self.half_z
    }
}

/// Attached camera control: drag to rotate/look, wheel to zoom, arrow keys to
/// move the universal camera, and per-frame chasing for the follow camera.
pub struct CameraController {
    /// Pointer pixels per radian of orbit rotation.
    pub angular_sensibility: f32,
    /// Wheel delta divisor for orbit zoom.
    pub wheel_precision: f32,
    pub look_sensitivity: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self { angular_sensibility: 1000.0, wheel_precision: 3.0, look_sensitivity: 0.002 }
    }
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies this frame's input. `follow_target` is the locked entity's
    /// position for follow cameras.
    pub fn update(
        &self,
        camera: &mut Camera,
        input: &mut InputState,
        follow_target: Option<Vec3>,
        grounds: &[GroundRect],
        dt: f32,
    ) {
        let (dx, dy) = input.consume_look();
        let wheel = input.consume_wheel();

        match &mut camera.rig {
            CameraRig::Orbit(orbit) => {
                orbit.rotate(-dx / self.angular_sensibility, -dy / self.angular_sensibility);
                // DOM wheel deltas come in lines of roughly 40 pixels
                orbit.zoom(wheel / (self.wheel_precision * 40.0));
            }
            CameraRig::Free(look) => {
                look.look(dx * self.look_sensitivity, -dy * self.look_sensitivity);
            }
            CameraRig::Follow(follow) => {
                if let Some(target) = follow_target {
                    follow.follow(target);
                }
            }
            CameraRig::Universal(universal) => {
                universal.look.look(dx * self.look_sensitivity, -dy * self.look_sensitivity);

                let forward = universal.look.forward();
                let right = forward.cross(camera.up).normalize_or_zero();
                let mut dir = Vec3::ZERO;
                if input.is_held("ArrowUp") {
                    dir += forward;
                }
                if input.is_held("ArrowDown") {
                    dir -= forward;
                }
                if input.is_held("ArrowRight") {
                    dir += right;
                }
                if input.is_held("ArrowLeft") {
                    dir -= right;
                }

                if dir.length_squared() > 0.0 {
                    universal.look.eye += dir.normalize() * universal.speed * dt * 60.0;
                }

                if universal.check_collisions {
                    let eye = &mut universal.look.eye;
                    for ground in grounds {
                        if ground.contains_xz(*eye) {
                            eye.y = eye.y.max(ground.center.y + COLLISION_HEIGHT);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::input::InputEvent;
    use crate::model::camera::{CameraSpec, LensSpec};

    fn camera(spec: CameraSpec) -> Camera {
        Camera::from_spec(&spec, &LensSpec::default(), 800, 600)
    }

    #[test]
    fn orbit_drag_and_wheel() {
        let mut cam = camera(CameraSpec::Orbit {
            alpha: 1.0,
            beta: 1.0,
            radius: 2.0,
            target: [0.0; 3],
            lower_radius_limit: 0.1,
        });
        let mut input = InputState::new();
        input.process_event(&InputEvent::PointerDown { x: 0.0, y: 0.0 });
        input.process_event(&InputEvent::PointerMove { dx: 100.0, dy: 50.0 });
        input.process_event(&InputEvent::Wheel { delta_y: 120.0 });

        CameraController::new().update(&mut cam, &mut input, None, &[], 1.0 / 60.0);
        let CameraRig::Orbit(orbit) = &cam.rig else { panic!("not an orbit camera") };
        assert!((orbit.alpha - 0.9).abs() < 1e-6);
        assert!((orbit.beta - 0.95).abs() < 1e-6);
        assert!((orbit.radius - 3.0).abs() < 1e-6);
    }

    #[test]
    fn universal_moves_with_arrows_and_stays_above_ground() {
        let mut cam = camera(CameraSpec::Universal {
            position: [0.0, 1.5, 0.0],
            up: [0.0, 1.0, 0.0],
            speed: 1.0,
            check_collisions: true,
            target: [0.0, -10.0, -10.0],
        });
        let grounds = [GroundRect { center: Vec3::ZERO, half_x: 50.0, half_z: 50.0 }];
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown("ArrowUp".into()));

        let controller = CameraController::new();
        for _ in 0..60 {
            controller.update(&mut cam, &mut input, None, &grounds, 1.0 / 60.0);
        }
        let eye = cam.eye();
        assert!(eye.z < -1.0, "camera should move forward: {eye}");
        assert!(eye.y >= COLLISION_HEIGHT - 1e-6);
    }

    #[test]
    fn follow_tracks_given_target() {
        let mut cam = camera(CameraSpec::Follow {
            locked_target: "sphere".into(),
            radius: 10.0,
            height_offset: 4.0,
            rotation_offset: 0.0,
            acceleration: 0.05,
            max_speed: 20.0,
            position: [0.0, 0.0, 0.0],
        });
        let mut input = InputState::new();
        let controller = CameraController::new();
        controller.update(&mut cam, &mut input, Some(Vec3::new(1.0, 0.0, 0.0)), &[], 1.0 / 60.0);
        assert_eq!(cam.target(), Vec3::new(1.0, 0.0, 0.0));
        assert!(cam.eye().z > 0.0);
    }
}
