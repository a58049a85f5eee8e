//! Asset Selection - Deterministic Rotation Over Fixed Pools
//!
//! Images are logical references only. Loading them belongs to the
//! presentation layer.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigError;

/// Logical image reference handed to the asset resolution service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Static image configuration shared by both faces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPool {
    pub signatures: Vec<ImageRef>,
    #[serde(default)]
    pub card_background: Option<ImageRef>,
}

impl AssetPool {
    pub fn new(signatures: Vec<ImageRef>, card_background: Option<ImageRef>) -> Self {
        Self { signatures, card_background }
    }

    /// The pool shipped with the engine.
    pub fn builtin() -> Self {
        Self {
            signatures: vec![
                ImageRef::new("signatures/ttd-1.png"),
                ImageRef::new("signatures/ttd-2.png"),
                ImageRef::new("signatures/ttd-3.png"),
                ImageRef::new("signatures/ttd-4.png"),
                ImageRef::new("signatures/ttd-5.png"),
            ],
            card_background: Some(ImageRef::new("templates/ktm-front-bg.png")),
        }
    }

    pub fn signature_for(&self, index: u32) -> Result<&ImageRef, ConfigError> {
        select_signature(index, &self.signatures)
    }

    pub fn background_template(&self) -> Option<&ImageRef> {
        self.card_background.as_ref()
    }
}

impl Default for AssetPool {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Select `pool[index mod len]`. An empty pool is a deployment error.
pub fn select_signature(index: u32, pool: &[ImageRef]) -> Result<&ImageRef, ConfigError> {
    if pool.is_empty() {
        return Err(ConfigError::EmptySignaturePool);
    }
    Ok(&pool[index as usize % pool.len()])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> Vec<ImageRef> {
        vec!["a.png".into(), "b.png".into(), "c.png".into()]
    }

    #[test]
    fn test_selection_wraps() {
        let pool = pool();
        assert_eq!(select_signature(0, &pool).unwrap().as_str(), "a.png");
        assert_eq!(select_signature(2, &pool).unwrap().as_str(), "c.png");
        assert_eq!(select_signature(4, &pool).unwrap().as_str(), "b.png");
    }

    #[test]
    fn test_selection_periodic() {
        let pool = pool();
        for i in 0..20u32 {
            assert_eq!(
                select_signature(i, &pool).unwrap(),
                select_signature(i + pool.len() as u32, &pool).unwrap()
            );
        }
    }

    #[test]
    fn test_selection_large_index() {
        let pool = pool();
        let picked = select_signature(u32::MAX, &pool).unwrap();
        assert_eq!(picked, &pool[u32::MAX as usize % 3]);
    }

    #[test]
    fn test_empty_pool_is_config_error() {
        let err = select_signature(1, &[]).unwrap_err();
        assert!(matches!(err, ConfigError::EmptySignaturePool));
    }

    #[test]
    fn test_image_ref_serializes_as_string() {
        let json = serde_json::to_string(&ImageRef::new("x/y.png")).unwrap();
        assert_eq!(json, r#""x/y.png""#);
    }
}
