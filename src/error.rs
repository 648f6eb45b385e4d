use thiserror::Error;

/// Anything that can stop a scene from being created.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("initialization failed: {0}")]
    Init(#[from] InitError),
    #[error("invalid scene configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Failures while acquiring the GPU, the drawing surface or assets.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface is not supported by the adapter: {0}")]
    SurfaceUnsupported(String),
    #[error("failed to decode texture '{path}': {source}")]
    Texture {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("asset not found: {0}")]
    MissingAsset(String),
    #[error("host environment: {0}")]
    Host(String),
}

/// Preset parsing and validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse preset: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),
    #[error("failed to read preset '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("'{0}' does not name a mesh in this scene")]
    UnknownEntity(String),
    #[error("actuator target '{0}' has no physics body")]
    ActuatorWithoutBody(String),
    #[error("'{0}' needs physics but the scene has no [physics] section")]
    PhysicsDisabled(String),
    #[error("duplicate mesh name '{0}'")]
    DuplicateName(String),
}

pub type Result<T, E = SceneError> = std::result::Result<T, E>;

#[cfg(target_arch = "wasm32")]
impl From<SceneError> for wasm_bindgen::JsValue {
    fn from(err: SceneError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_convert_into_scene_errors() {
        let err: SceneError = ConfigError::ActuatorWithoutBody("sphere".into()).into();
        assert!(matches!(err, SceneError::Config(ConfigError::ActuatorWithoutBody(_))));
        assert_eq!(
            err.to_string(),
            "invalid scene configuration: actuator target 'sphere' has no physics body"
        );
    }
}
