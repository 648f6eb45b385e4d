use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Camera behavior as written in a preset, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CameraSpec {
    /// Rotates around `target` on a sphere of `radius`.
    Orbit {
        alpha: f32,
        beta: f32,
        radius: f32,
        #[serde(default)]
        target: [f32; 3],
        #[serde(default = "default_lower_radius_limit")]
        lower_radius_limit: f32,
    },
    Free {
        position: [f32; 3],
        #[serde(default = "default_up")]
        up: [f32; 3],
        #[serde(default)]
        target: [f32; 3],
    },
    /// Chases a named entity from behind and above.
    Follow {
        locked_target: String,
        #[serde(default = "default_follow_radius")]
        radius: f32,
        #[serde(default = "default_height_offset")]
        height_offset: f32,
        /// Degrees around the target's Y axis.
        #[serde(default)]
        rotation_offset: f32,
        #[serde(default = "default_acceleration")]
        acceleration: f32,
        #[serde(default = "default_max_speed")]
        max_speed: f32,
        #[serde(default)]
        position: [f32; 3],
    },
    /// Keyboard-driven free camera.
    Universal {
        position: [f32; 3],
        #[serde(default = "default_up")]
        up: [f32; 3],
        #[serde(default = "default_universal_speed")]
        speed: f32,
        #[serde(default)]
        check_collisions: bool,
        #[serde(default)]
        target: [f32; 3],
    },
}

fn default_lower_radius_limit() -> f32 {
    0.1
}
fn default_up() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}
fn default_follow_radius() -> f32 {
    12.0
}
fn default_height_offset() -> f32 {
    4.0
}
fn default_acceleration() -> f32 {
    0.05
}
fn default_max_speed() -> f32 {
    20.0
}
fn default_universal_speed() -> f32 {
    2.0
}

/// Projection parameters shared by every camera kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensSpec {
    pub fov: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl Default for LensSpec {
    fn default() -> Self {
        Self { fov: 0.8, min_z: 1.0, max_z: 10_000.0 }
    }
}

const MIN_BETA: f32 = 0.01;
const MAX_PITCH: f32 = 1.5533; // slightly less than pi/2

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitRig {
    pub alpha: f32,
    pub beta: f32,
    pub radius: f32,
    pub target: Vec3,
    pub lower_radius_limit: f32,
}

impl OrbitRig {
    pub fn eye(&self) -> Vec3 {
        let (sa, ca) = self.alpha.sin_cos();
        let (sb, cb) = self.beta.sin_cos();
        self.target + self.radius * Vec3::new(ca * sb, cb, sa * sb)
    }

    pub fn rotate(&mut self, d_alpha: f32, d_beta: f32) {
        self.alpha += d_alpha;
        self.beta = (self.beta + d_beta).clamp(MIN_BETA, std::f32::consts::PI - MIN_BETA);
    }

    pub fn zoom(&mut self, d_radius: f32) {
        self.radius = (self.radius + d_radius).max(self.lower_radius_limit);
    }
}

/// Yaw/pitch look state shared by the free and universal cameras.
#[derive(Debug, Clone, PartialEq)]
pub struct LookRig {
    pub eye: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl LookRig {
    pub fn new(eye: Vec3, target: Vec3) -> Self {
        let mut rig = Self { eye, yaw: -std::f32::consts::FRAC_PI_2, pitch: 0.0 };
        rig.set_look_at(target);
        rig
    }

    pub fn forward(&self) -> Vec3 {
        let cp = self.pitch.clamp(-MAX_PITCH, MAX_PITCH);
        Vec3::new(self.yaw.cos() * cp.cos(), cp.sin(), self.yaw.sin() * cp.cos()).normalize()
    }

    /// Keeps the current orientation when `target` coincides with the eye.
    pub fn set_look_at(&mut self, target: Vec3) {
        let dir = target - self.eye;
        if dir.length_squared() < 1e-12 {
            return;
        }
        let dir = dir.normalize();
        self.yaw = dir.z.atan2(dir.x);
        self.pitch = dir.y.asin().clamp(-MAX_PITCH, MAX_PITCH);
    }

    pub fn look(&mut self, d_yaw: f32, d_pitch: f32) {
        self.yaw += d_yaw;
        self.pitch = (self.pitch + d_pitch).clamp(-MAX_PITCH, MAX_PITCH);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FollowRig {
    pub locked_target: String,
    pub eye: Vec3,
    pub target: Vec3,
    pub radius: f32,
    pub height_offset: f32,
    pub rotation_offset: f32,
    pub acceleration: f32,
    pub max_speed: f32,
}

impl FollowRig {
    pub fn goal(&self, target: Vec3) -> Vec3 {
        let (s, c) = self.rotation_offset.to_radians().sin_cos();
        target + Vec3::new(s * self.radius, self.height_offset, c * self.radius)
    }

    /// Moves the eye one frame toward its goal behind `target`.
    pub fn follow(&mut self, target: Vec3) {
        let limit = Vec3::splat(self.max_speed);
        let step = ((self.goal(target) - self.eye) * self.acceleration * 2.0).clamp(-limit, limit);
        self.eye += step;
        self.target = target;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UniversalRig {
    pub look: LookRig,
    pub speed: f32,
    pub check_collisions: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CameraRig {
    Orbit(OrbitRig),
    Free(LookRig),
    Follow(FollowRig),
    Universal(UniversalRig),
}

pub struct Camera {
    pub rig: CameraRig,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn from_spec(spec: &CameraSpec, lens: &LensSpec, width: u32, height: u32) -> Self {
        let (rig, up) = match spec {
            CameraSpec::Orbit { alpha, beta, radius, target, lower_radius_limit } => {
                let mut orbit = OrbitRig {
                    alpha: *alpha,
                    beta: *beta,
                    radius: radius.max(*lower_radius_limit),
                    target: Vec3::from(*target),
                    lower_radius_limit: *lower_radius_limit,
                };
                orbit.rotate(0.0, 0.0);
                (CameraRig::Orbit(orbit), Vec3::Y)
            }
            CameraSpec::Free { position, up, target } => (
                CameraRig::Free(LookRig::new(Vec3::from(*position), Vec3::from(*target))),
                Vec3::from(*up),
            ),
            CameraSpec::Follow {
                locked_target,
                radius,
                height_offset,
                rotation_offset,
                acceleration,
                max_speed,
                position,
            } => (
                CameraRig::Follow(FollowRig {
                    locked_target: locked_target.clone(),
                    eye: Vec3::from(*position),
                    target: Vec3::ZERO,
                    radius: *radius,
                    height_offset: *height_offset,
                    rotation_offset: *rotation_offset,
                    acceleration: *acceleration,
                    max_speed: *max_speed,
                }),
                Vec3::Y,
            ),
            CameraSpec::Universal { position, up, speed, check_collisions, target } => (
                CameraRig::Universal(UniversalRig {
                    look: LookRig::new(Vec3::from(*position), Vec3::from(*target)),
                    speed: *speed,
                    check_collisions: *check_collisions,
                }),
                Vec3::from(*up),
            ),
        };

        Self {
            rig,
            up: Vec3::from(up).normalize_or_zero(),
            fov_y: lens.fov,
            aspect: width as f32 / height.max(1) as f32,
            z_near: lens.min_z,
            z_far: lens.max_z,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self.rig {
            CameraRig::Orbit(_) => "orbit",
            CameraRig::Free(_) => "free",
            CameraRig::Follow(_) => "follow",
            CameraRig::Universal(_) => "universal",
        }
    }

    pub fn eye(&self) -> Vec3 {
        match &self.rig {
            CameraRig::Orbit(orbit) => orbit.eye(),
            CameraRig::Free(look) => look.eye,
            CameraRig::Follow(follow) => follow.eye,
            CameraRig::Universal(universal) => universal.look.eye,
        }
    }

    pub fn target(&self) -> Vec3 {
        match &self.rig {
            CameraRig::Orbit(orbit) => orbit.target,
            CameraRig::Free(look) => look.eye + look.forward(),
            CameraRig::Follow(follow) => follow.target,
            CameraRig::Universal(universal) => universal.look.eye + universal.look.forward(),
        }
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye(), self.target(), self.up);
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far);
        proj * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn orbit_eye_follows_alpha_beta_radius() {
        let spec = CameraSpec::Orbit {
            alpha: FRAC_PI_2,
            beta: FRAC_PI_2,
            radius: 2.0,
            target: [0.0; 3],
            lower_radius_limit: 0.1,
        };
        let cam = Camera::from_spec(&spec, &LensSpec::default(), 800, 600);
        assert!(close(cam.eye(), Vec3::new(0.0, 0.0, 2.0)));
        assert_eq!(cam.target(), Vec3::ZERO);
        assert!((cam.aspect - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn orbit_beta_and_radius_are_clamped() {
        let mut orbit = OrbitRig { alpha: 0.0, beta: 0.5, radius: 1.0, target: Vec3::ZERO, lower_radius_limit: 0.5 };
        orbit.rotate(0.0, -10.0);
        assert_eq!(orbit.beta, MIN_BETA);
        orbit.rotate(0.0, 10.0);
        assert_eq!(orbit.beta, PI - MIN_BETA);
        orbit.zoom(-5.0);
        assert_eq!(orbit.radius, 0.5);
    }

    #[test]
    fn follow_moves_toward_goal_within_max_speed() {
        let mut follow = FollowRig {
            locked_target: "sphere".into(),
            eye: Vec3::ZERO,
            target: Vec3::ZERO,
            radius: 10.0,
            height_offset: 4.0,
            rotation_offset: 0.0,
            acceleration: 0.05,
            max_speed: 0.5,
        };
        let target = Vec3::new(0.0, 1.0, 0.0);
        let goal = follow.goal(target);
        assert!(close(goal, Vec3::new(0.0, 5.0, 10.0)));

        let mut last = (goal - follow.eye).length();
        for _ in 0..500 {
            let before = follow.eye;
            follow.follow(target);
            let step = follow.eye - before;
            assert!(step.abs().max_element() <= 0.5 + 1e-6);
            let dist = (goal - follow.eye).length();
            assert!(dist <= last + 1e-6);
            last = dist;
        }
        assert!(last < 0.01);
        assert_eq!(follow.target, target);
    }

    #[test]
    fn look_rig_faces_its_target() {
        let rig = LookRig::new(Vec3::new(0.0, 5.0, -10.0), Vec3::ZERO);
        let expected = (Vec3::ZERO - Vec3::new(0.0, 5.0, -10.0)).normalize();
        assert!(close(rig.forward(), expected));

        let same = LookRig::new(Vec3::ONE, Vec3::ONE);
        assert!(same.forward().is_finite());
    }
}
