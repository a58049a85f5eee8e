//! Configuration errors
//!
//! Malformed record data never reaches this type. Only missing static
//! configuration does.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Signature asset pool is empty")]
    EmptySignaturePool,

    #[error("Theme set is empty")]
    EmptyThemeSet,
}
