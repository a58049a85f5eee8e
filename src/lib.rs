//! KTM Card Core - Student ID Card Layout Engine
//!
//! # Guarantees
//! 1. Renders Are Pure
//! 2. Layout Lives in Profiles
//! 3. Bad Data Degrades, Bad Config Fails
//! 4. Deterministic Output
//! 5. Hashes Enable Reproduction

pub mod assets;
pub mod error;
pub mod format;
pub mod layout;
pub mod model;
pub mod theme;
pub mod profile;
pub mod render;
pub mod front;
pub mod back;
pub mod validation;
pub mod hashing;
pub mod pipeline;

pub use assets::{select_signature, AssetPool, ImageRef};
pub use error::ConfigError;
pub use format::{format_birth_info, Locale};
pub use layout::{CardFace, LayoutFrame, LayoutNode, LayoutTree, NodeContent};
pub use model::{RenderContext, StudentRecord, UniversityRecord};
pub use theme::{resolve_theme, CardTheme, ThemeSet};
pub use profile::{LayoutProfile, ProfileRegistry};
pub use render::CardRenderer;
pub use validation::{ValidationReport, ValidationRule, Violation, ViolationSeverity};
pub use hashing::{canonical_json, compute_job_hash, compute_layout_hash};
pub use pipeline::{Face, RenderError, RenderPipeline, RenderRequest, RenderedCard};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const MIN_ENGINE_VERSION: &str = "1.0.0";
