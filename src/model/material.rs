use serde::{Deserialize, Serialize};

/// Standard surface material: diffuse/specular/emissive colors plus an
/// optional diffuse texture referenced by asset path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub diffuse_color: [f32; 3],
    pub specular_color: [f32; 3],
    pub emissive_color: [f32; 3],
    pub specular_power: f32,
    pub alpha: f32,
    pub diffuse_texture: Option<String>,
    pub uv_scale: [f32; 2],
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse_color: [1.0, 1.0, 1.0],
            specular_color: [1.0, 1.0, 1.0],
            emissive_color: [0.0, 0.0, 0.0],
            specular_power: 64.0,
            alpha: 1.0,
            diffuse_texture: None,
            uv_scale: [1.0, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let m: Material = toml::from_str("diffuse_texture = \"textures/ball.png\"\nuv_scale = [4.0, 4.0]").unwrap();
        assert_eq!(m.diffuse_texture.as_deref(), Some("textures/ball.png"));
        assert_eq!(m.uv_scale, [4.0, 4.0]);
        assert_eq!(m.diffuse_color, [1.0, 1.0, 1.0]);
        assert_eq!(m.specular_power, 64.0);
    }
}
