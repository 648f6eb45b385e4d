//! Light sources and their GPU packing.
//!
//! Four variants: point, directional, spot and hemispheric. Each light may
//! be restricted to meshes whose layer mask intersects
//! `include_only_with_layer_mask` (0 means every layer).

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Lights beyond this count are not shaded.
pub const MAX_LIGHTS: usize = 4;

const KIND_POINT: f32 = 0.0;
const KIND_DIRECTIONAL: f32 = 1.0;
const KIND_SPOT: f32 = 2.0;
const KIND_HEMISPHERIC: f32 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LightSource {
    Point {
        position: [f32; 3],
    },
    Directional {
        direction: [f32; 3],
        #[serde(default)]
        position: Option<[f32; 3]>,
    },
    Spot {
        position: [f32; 3],
        direction: [f32; 3],
        /// Full cone angle in radians.
        angle: f32,
        exponent: f32,
    },
    Hemispheric {
        /// Points toward the sky.
        direction: [f32; 3],
        #[serde(default)]
        ground_color: [f32; 3],
    },
}

fn default_intensity() -> f32 {
    1.0
}

fn white() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub name: String,
    pub source: LightSource,
    #[serde(default = "default_intensity")]
    pub intensity: f32,
    #[serde(default = "white")]
    pub diffuse: [f32; 3],
    #[serde(default = "white")]
    pub specular: [f32; 3],
    #[serde(default)]
    pub include_only_with_layer_mask: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightUniform {
    /// xyz position, w kind
    pub position: [f32; 4],
    /// xyz direction, w cosine of the spot half angle
    pub direction: [f32; 4],
    /// rgb diffuse, w intensity
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    /// rgb ground color, w spot exponent
    pub ground: [f32; 4],
    pub mask: [u32; 4],
}

impl Light {
    pub fn new(name: impl Into<String>, source: LightSource) -> Self {
        Self {
            name: name.into(),
            source,
            intensity: default_intensity(),
            diffuse: white(),
            specular: white(),
            include_only_with_layer_mask: 0,
        }
    }

    pub fn to_uniform(&self) -> LightUniform {
        let extend = |v: [f32; 3], w: f32| [v[0], v[1], v[2], w];
        let normalized = |v: [f32; 3]| Vec3::from(v).normalize_or_zero().to_array();

        let (position, direction, ground) = match &self.source {
            LightSource::Point { position } => {
                (extend(*position, KIND_POINT), [0.0; 4], [0.0; 4])
            }
            LightSource::Directional { direction, position } => (
                extend(position.unwrap_or([0.0; 3]), KIND_DIRECTIONAL),
                extend(normalized(*direction), 0.0),
                [0.0; 4],
            ),
            LightSource::Spot { position, direction, angle, exponent } => (
                extend(*position, KIND_SPOT),
                extend(normalized(*direction), (angle * 0.5).cos()),
                [0.0, 0.0, 0.0, *exponent],
            ),
            LightSource::Hemispheric { direction, ground_color } => (
                [0.0, 0.0, 0.0, KIND_HEMISPHERIC],
                extend(normalized(*direction), 0.0),
                extend(*ground_color, 0.0),
            ),
        };

        LightUniform {
            position,
            direction,
            diffuse: extend(self.diffuse, self.intensity),
            specular: extend(self.specular, 0.0),
            ground,
            mask: [self.include_only_with_layer_mask, 0, 0, 0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_mask_is_packed_for_the_shader() {
        let mut light = Light::new("sun", LightSource::Point { position: [0.0, 5.0, 0.0] });
        assert_eq!(light.to_uniform().mask, [0, 0, 0, 0]);
        light.include_only_with_layer_mask = 0b10;
        let u = light.to_uniform();
        assert_eq!(u.mask[0], 0b10);
        assert_eq!(u.position, [0.0, 5.0, 0.0, KIND_POINT]);
    }

    #[test]
    fn spot_packs_cone_and_exponent() {
        let light = Light::new(
            "spot",
            LightSource::Spot {
                position: [0.0, 10.0, 0.0],
                direction: [0.0, -2.0, 0.0],
                angle: std::f32::consts::FRAC_PI_2,
                exponent: 8.0,
            },
        );
        let u = light.to_uniform();
        assert_eq!(u.position[3], KIND_SPOT);
        assert_eq!(&u.direction[..3], &[0.0, -1.0, 0.0]);
        assert!((u.direction[3] - std::f32::consts::FRAC_PI_4.cos()).abs() < 1e-6);
        assert_eq!(u.ground[3], 8.0);
    }

    #[test]
    fn hemispheric_defaults_from_toml() {
        let light: Light = toml::from_str(
            "name = \"light\"\nintensity = 0.7\nsource = { type = \"hemispheric\", direction = [0.0, 1.0, 0.0] }",
        )
        .unwrap();
        assert_eq!(light.diffuse, [1.0, 1.0, 1.0]);
        let u = light.to_uniform();
        assert_eq!(u.position[3], KIND_HEMISPHERIC);
        assert_eq!(u.diffuse, [1.0, 1.0, 1.0, 0.7]);
        assert_eq!(u.ground, [0.0; 4]);
    }
}
