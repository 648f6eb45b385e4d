use std::borrow::Cow;

use crate::error::InitError;

/// Assets compiled into the binary, keyed by their path under `assets/`.
const EMBEDDED: &[(&str, &[u8])] = &[
    ("textures/ground.png", include_bytes!("../assets/textures/ground.png")),
    ("textures/ball.png", include_bytes!("../assets/textures/ball.png")),
];

pub fn embedded(path: &str) -> Option<&'static [u8]> {
    let path = path.trim_start_matches("./").trim_start_matches("assets/");
    EMBEDDED.iter().find(|(name, _)| *name == path).map(|(_, bytes)| *bytes)
}

/// Embedded bytes first; natively, falls back to reading the path from disk.
pub fn load(path: &str) -> Result<Cow<'static, [u8]>, InitError> {
    if let Some(bytes) = embedded(path) {
        return Ok(Cow::Borrowed(bytes));
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Ok(bytes) = std::fs::read(path) {
            tracing::debug!("loaded asset '{path}' from disk");
            return Ok(Cow::Owned(bytes));
        }
    }

    Err(InitError::MissingAsset(path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_textures_resolve_with_or_without_prefix() {
        let a = embedded("textures/ground.png").unwrap();
        let b = embedded("assets/textures/ground.png").unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with(b"\x89PNG"));
        assert!(load("textures/ball.png").is_ok());
        assert!(matches!(load("textures/missing.png"), Err(InitError::MissingAsset(_))));
    }
}
