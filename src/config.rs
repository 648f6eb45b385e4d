//! Scene presets: a declarative TOML description of camera, lights, meshes,
//! physics and keyboard actuation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::controller::actuator::ActuatorConfig;
use crate::controller::input::KeyAction;
use crate::controller::physics::BodySpec;
use crate::error::ConfigError;
use crate::model::camera::{CameraSpec, LensSpec};
use crate::model::light::{Light, MAX_LIGHTS};
use crate::model::material::Material;
use crate::model::mesh::ShapeSpec;

const BUILTIN_PRESETS: &[(&str, &str)] = &[
    ("basic", include_str!("../presets/basic.toml")),
    ("physics", include_str!("../presets/physics.toml")),
];

/// Meshes are on every layer except the top nibble unless told otherwise.
pub const DEFAULT_LAYER_MASK: u32 = 0x0FFF_FFFF;

fn default_clear_color() -> [f32; 4] {
    [0.2, 0.2, 0.3, 1.0]
}

fn default_true() -> bool {
    true
}

fn default_scaling() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_layer_mask() -> u32 {
    DEFAULT_LAYER_MASK
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenePreset {
    pub name: String,
    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 4],
    #[serde(default = "default_true")]
    pub show_overlay: bool,
    pub camera: CameraSpec,
    #[serde(default)]
    pub lens: LensSpec,
    #[serde(default)]
    pub lights: Vec<Light>,
    #[serde(default)]
    pub meshes: Vec<MeshSpec>,
    #[serde(default)]
    pub physics: Option<PhysicsSpec>,
    #[serde(default)]
    pub actuator: Option<ActuatorSpec>,
    #[serde(default)]
    pub actions: Vec<KeyAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshSpec {
    pub name: String,
    pub shape: ShapeSpec,
    #[serde(default)]
    pub position: [f32; 3],
    /// Euler angles in degrees, applied X then Y then Z.
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "default_scaling")]
    pub scaling: [f32; 3],
    #[serde(default)]
    pub material: Option<Material>,
    #[serde(default)]
    pub body: Option<BodySpec>,
    #[serde(default = "default_layer_mask")]
    pub layer_mask: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSpec {
    pub gravity: [f32; 3],
}

impl Default for PhysicsSpec {
    fn default() -> Self {
        Self { gravity: [0.0, -9.81, 0.0] }
    }
}

/// Binds the keyboard actuator to one mesh with a body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActuatorSpec {
    pub body: String,
    #[serde(flatten)]
    pub config: ActuatorConfig,
}

impl ScenePreset {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let preset: ScenePreset = toml::from_str(text)?;
        preset.validate()?;
        Ok(preset)
    }

    pub fn builtin_names() -> impl Iterator<Item = &'static str> {
        BUILTIN_PRESETS.iter().map(|(name, _)| *name)
    }

    pub fn builtin(name: &str) -> Result<Self, ConfigError> {
        let (_, text) = BUILTIN_PRESETS
            .iter()
            .find(|(builtin, _)| *builtin == name)
            .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))?;
        Self::from_toml_str(text)
    }

    /// A built-in preset name, or inline TOML text.
    pub fn resolve(name_or_toml: &str) -> Result<Self, ConfigError> {
        let trimmed = name_or_toml.trim();
        if BUILTIN_PRESETS.iter().any(|(name, _)| *name == trimmed) {
            Self::builtin(trimmed)
        } else if trimmed.contains('=') {
            Self::from_toml_str(name_or_toml)
        } else {
            Err(ConfigError::UnknownPreset(trimmed.to_string()))
        }
    }

    /// A built-in preset name, or a path to a TOML file.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(name_or_path: &str) -> Result<Self, ConfigError> {
        if Self::builtin_names().any(|name| name == name_or_path) {
            return Self::builtin(name_or_path);
        }
        let text = std::fs::read_to_string(name_or_path).map_err(|source| ConfigError::Io {
            path: name_or_path.to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn mesh(&self, name: &str) -> Option<&MeshSpec> {
        self.meshes.iter().find(|m| m.name == name)
    }

    /// Checks cross references and value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for mesh in &self.meshes {
            if !seen.insert(mesh.name.as_str()) {
                return Err(ConfigError::DuplicateName(mesh.name.clone()));
            }
            if let Some(body) = &mesh.body {
                if self.physics.is_none() {
                    return Err(ConfigError::PhysicsDisabled(mesh.name.clone()));
                }
                for (field, value) in [("mass", body.mass), ("friction", body.friction), ("restitution", body.restitution)] {
                    if !(value >= 0.0 && value.is_finite()) {
                        return Err(invalid(format!("meshes.{}.body.{field}", mesh.name), "must be a finite value >= 0"));
                    }
                }
            }
            mesh.shape.validate(&mesh.name)?;
            if mesh.scaling.iter().any(|s| *s == 0.0 || !s.is_finite()) {
                return Err(invalid(format!("meshes.{}.scaling", mesh.name), "components must be finite and non-zero"));
            }
        }

        match &self.camera {
            CameraSpec::Follow { locked_target, .. } if self.mesh(locked_target).is_none() => {
                return Err(ConfigError::UnknownEntity(locked_target.clone()));
            }
            CameraSpec::Orbit { radius, .. } if !(*radius > 0.0) => {
                return Err(invalid("camera.radius", "must be > 0"));
            }
            _ => {}
        }

        if !(self.lens.fov > 0.0 && self.lens.fov < std::f32::consts::PI) {
            return Err(invalid("lens.fov", "must be in (0, pi)"));
        }
        if !(self.lens.min_z > 0.0 && self.lens.max_z > self.lens.min_z) {
            return Err(invalid("lens", "need 0 < min_z < max_z"));
        }

        if let Some(actuator) = &self.actuator {
            let mesh = self
                .mesh(&actuator.body)
                .ok_or_else(|| ConfigError::UnknownEntity(actuator.body.clone()))?;
            match &mesh.body {
                Some(body) if body.mass > 0.0 => {}
                _ => return Err(ConfigError::ActuatorWithoutBody(actuator.body.clone())),
            }
            if self.physics.is_none() {
                return Err(ConfigError::PhysicsDisabled(actuator.body.clone()));
            }
            if actuator.config.impulse < 0.0 || actuator.config.dead_zone < 0.0 || actuator.config.friction < 0.0 {
                return Err(invalid("actuator", "impulse, dead_zone and friction must be >= 0"));
            }
        }

        if self.lights.len() > MAX_LIGHTS {
            tracing::warn!(
                "preset '{}' declares {} lights, only the first {} are shaded",
                self.name,
                self.lights.len(),
                MAX_LIGHTS
            );
        }

        Ok(())
    }
}

fn invalid(field: impl Into<String>, reason: &str) -> ConfigError {
    ConfigError::InvalidValue { field: field.into(), reason: reason.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
name = "minimal"

[camera]
kind = "orbit"
alpha = 0.0
beta = 1.0
radius = 5.0
"#;

    #[test]
    fn builtins_parse_and_validate() {
        for name in ScenePreset::builtin_names() {
            let preset = ScenePreset::builtin(name).unwrap();
            assert_eq!(preset.name, name);
        }
    }

    #[test]
    fn basic_preset_matches_the_startup_scene() {
        let preset = ScenePreset::builtin("basic").unwrap();
        let CameraSpec::Orbit { alpha, beta, radius, target, .. } = preset.camera else {
            panic!("basic preset should use an orbit camera");
        };
        assert!((alpha - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!((beta - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(radius, 2.0);
        assert_eq!(target, [0.0; 3]);
        assert_eq!(preset.lights.len(), 1);
        assert_eq!(preset.meshes.len(), 1);
        assert_eq!(preset.meshes[0].name, "Box");
        assert!(preset.physics.is_none());
        assert!(preset.actuator.is_none());
    }

    #[test]
    fn physics_preset_wires_the_actuator() {
        let preset = ScenePreset::builtin("physics").unwrap();
        let actuator = preset.actuator.as_ref().unwrap();
        assert_eq!(actuator.config, ActuatorConfig::default());
        assert!(preset.mesh(&actuator.body).and_then(|m| m.body.as_ref()).is_some());
    }

    #[test]
    fn resolve_accepts_names_and_inline_toml() {
        assert_eq!(ScenePreset::resolve("basic").unwrap().name, "basic");
        assert_eq!(ScenePreset::resolve(MINIMAL).unwrap().name, "minimal");
        assert!(matches!(ScenePreset::resolve("nope"), Err(ConfigError::UnknownPreset(_))));
        assert!(matches!(ScenePreset::resolve("name = "), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn minimal_preset_gets_defaults() {
        let preset = ScenePreset::from_toml_str(MINIMAL).unwrap();
        assert!(preset.show_overlay);
        assert_eq!(preset.lens, LensSpec::default());
        assert!(preset.lights.is_empty());
    }

    #[test]
    fn actuator_requires_a_dynamic_body() {
        let text = format!(
            "{MINIMAL}\n[physics]\n\n[[meshes]]\nname = \"box\"\nshape = {{ kind = \"box\" }}\n\n[actuator]\nbody = \"box\"\n"
        );
        assert!(matches!(
            ScenePreset::from_toml_str(&text),
            Err(ConfigError::ActuatorWithoutBody(name)) if name == "box"
        ));

        let text = format!(
            "{MINIMAL}\n[physics]\n\n[[meshes]]\nname = \"box\"\nshape = {{ kind = \"box\" }}\nbody = {{ mass = 1.0 }}\n\n[actuator]\nbody = \"box\"\nimpulse = 0.5\n"
        );
        let preset = ScenePreset::from_toml_str(&text).unwrap();
        assert_eq!(preset.actuator.unwrap().config.impulse, 0.5);
    }

    #[test]
    fn rejects_bad_references() {
        let unknown_follow = MINIMAL.replace(
            "kind = \"orbit\"\nalpha = 0.0\nbeta = 1.0\nradius = 5.0",
            "kind = \"follow\"\nlocked_target = \"ghost\"",
        );
        assert!(matches!(ScenePreset::from_toml_str(&unknown_follow), Err(ConfigError::UnknownEntity(_))));

        let body_without_physics =
            format!("{MINIMAL}\n[[meshes]]\nname = \"b\"\nshape = {{ kind = \"box\" }}\nbody = {{ mass = 1.0 }}\n");
        assert!(matches!(ScenePreset::from_toml_str(&body_without_physics), Err(ConfigError::PhysicsDisabled(_))));

        let duplicate = format!(
            "{MINIMAL}\n[[meshes]]\nname = \"b\"\nshape = {{ kind = \"box\" }}\n\n[[meshes]]\nname = \"b\"\nshape = {{ kind = \"sphere\" }}\n"
        );
        assert!(matches!(ScenePreset::from_toml_str(&duplicate), Err(ConfigError::DuplicateName(_))));

        let negative_mass = format!(
            "{MINIMAL}\n[physics]\n\n[[meshes]]\nname = \"b\"\nshape = {{ kind = \"box\" }}\nbody = {{ mass = -1.0 }}\n"
        );
        assert!(matches!(ScenePreset::from_toml_str(&negative_mass), Err(ConfigError::InvalidValue { .. })));
    }

    fn with_shape(shape: &str) -> String {
        format!("{MINIMAL}\n[[meshes]]\nname = \"m\"\nshape = {shape}\n")
    }

    fn invalid_field(text: &str) -> Option<String> {
        match ScenePreset::from_toml_str(text) {
            Err(ConfigError::InvalidValue { field, .. }) => Some(field),
            _ => None,
        }
    }

    #[test]
    fn rejects_oversized_and_degenerate_shapes() {
        let sphere = with_shape("{ kind = \"sphere\", segments = 3000000000 }");
        assert_eq!(invalid_field(&sphere).as_deref(), Some("meshes.m.shape.segments"));

        let icosphere = with_shape("{ kind = \"ico_sphere\", subdivisions = 40 }");
        assert_eq!(invalid_field(&icosphere).as_deref(), Some("meshes.m.shape.subdivisions"));

        let ground = with_shape("{ kind = \"ground\", subdivisions = 4294967295 }");
        assert_eq!(invalid_field(&ground).as_deref(), Some("meshes.m.shape.subdivisions"));

        let negative = with_shape("{ kind = \"sphere\", diameter = -1.0 }");
        assert_eq!(invalid_field(&negative).as_deref(), Some("meshes.m.shape.diameter"));

        let infinite = with_shape("{ kind = \"box\", width = inf }");
        assert_eq!(invalid_field(&infinite).as_deref(), Some("meshes.m.shape.width"));
    }

    #[test]
    fn accepts_shapes_at_the_limits() {
        let sphere = with_shape(&format!("{{ kind = \"sphere\", segments = {} }}", crate::model::mesh::MAX_SEGMENTS));
        assert!(ScenePreset::from_toml_str(&sphere).is_ok());
        let icosphere = with_shape(&format!(
            "{{ kind = \"ico_sphere\", subdivisions = {} }}",
            crate::model::mesh::MAX_ICOSPHERE_SUBDIVISIONS
        ));
        assert!(ScenePreset::from_toml_str(&icosphere).is_ok());
    }
}
