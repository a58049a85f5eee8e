//! Render Pipeline - Single Entry Point
//!
//! `render` always validates the configuration first. No bypass.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::assets::AssetPool;
use crate::error::ConfigError;
use crate::hashing::{compute_job_hash, compute_layout_hash};
use crate::layout::LayoutTree;
use crate::model::{RenderContext, StudentRecord, UniversityRecord};
use crate::profile::{LayoutProfile, ProfileRegistry, STANDARD_PROFILE_ID};
use crate::render::CardRenderer;
use crate::theme::ThemeSet;
use crate::validation::{RenderConfig, ValidationReport, Validator, ViolationSeverity};
use crate::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Theme not found: {0}")]
    ThemeNotFound(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Profile version {0} requires engine >= {1}, current is {2}")]
    EngineVersionMismatch(String, String, String),

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Face {
    Front,
    Back,
    #[default]
    Both,
}

impl Face {
    fn front(self) -> bool {
        matches!(self, Face::Front | Face::Both)
    }

    fn back(self) -> bool {
        matches!(self, Face::Back | Face::Both)
    }
}

fn default_profile() -> String { STANDARD_PROFILE_ID.to_string() }

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    #[serde(default = "default_profile")]
    pub profile_id: String,
    #[serde(default)]
    pub theme_id: Option<String>,
    #[serde(default)]
    pub face: Face,
    pub student: StudentRecord,
    pub university: UniversityRecord,
    #[serde(default = "RenderContext::from_clock")]
    pub context: RenderContext,
}

/// Rendered faces plus reproduction metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedCard {
    pub id: String,
    pub profile_id: String,
    pub profile_version: String,
    pub engine_version: String,
    pub created_at: DateTime<Utc>,
    pub theme_id: String,
    pub front: Option<LayoutTree>,
    pub back: Option<LayoutTree>,
    /// Hash of the faces only. Stable across runs for equal inputs.
    pub layout_hash: String,
    pub job_hash: String,
    pub validation: ValidationReport,
}

#[derive(Serialize)]
struct Faces<'a> {
    front: &'a Option<LayoutTree>,
    back: &'a Option<LayoutTree>,
}

/// The render pipeline - single entry point for card rendering
pub struct RenderPipeline {
    registry: ProfileRegistry,
    themes: ThemeSet,
    assets: AssetPool,
    validator: Validator,
}

impl RenderPipeline {
    pub fn new(registry: ProfileRegistry, themes: ThemeSet, assets: AssetPool) -> Self {
        Self {
            registry,
            themes,
            assets,
            validator: Validator::new(),
        }
    }

    pub fn list_profiles(&self) -> Vec<&LayoutProfile> {
        self.registry.list()
    }

    pub fn get_profile(&self, id: &str) -> Option<&LayoutProfile> {
        self.registry.get(id)
    }

    pub fn themes(&self) -> &ThemeSet {
        &self.themes
    }

    /// Validate the configuration a profile would render with
    ///
    /// This is the ONLY validation entry point.
    pub fn validate_profile(&self, profile_id: &str) -> Result<ValidationReport, RenderError> {
        let profile = self.profile(profile_id)?;
        self.check_engine_version(profile)?;
        Ok(self.validator.validate(&RenderConfig {
            profile,
            themes: &self.themes,
            assets: &self.assets,
        }))
    }

    pub fn render(&self, request: &RenderRequest) -> Result<RenderedCard, RenderError> {
        let profile = self.profile(&request.profile_id)?;

        let validation = self.validate_profile(&request.profile_id)?;
        if !validation.valid {
            let messages: Vec<_> = validation.violations.iter()
                .filter(|v| v.severity == ViolationSeverity::Error)
                .map(|v| format!("{}: {}", v.rule, v.message))
                .collect();
            return Err(RenderError::ValidationFailed(messages.join("; ")));
        }
        if profile.deprecated {
            tracing::warn!(
                profile = %profile.id,
                superseded_by = ?profile.superseded_by,
                "rendering with a deprecated profile"
            );
        }

        let theme = match &request.theme_id {
            Some(id) => Some(
                self.themes.find(id).ok_or_else(|| RenderError::ThemeNotFound(id.clone()))?,
            ),
            None => None,
        };

        let renderer = CardRenderer::new(profile, &self.themes, &self.assets, request.context);
        let front = if request.face.front() {
            Some(renderer.render_front(&request.student, &request.university, theme)?)
        } else {
            None
        };
        let back = if request.face.back() {
            Some(renderer.render_back(&request.student, &request.university, theme)?)
        } else {
            None
        };

        let theme_id = match theme {
            Some(t) => t.id.clone(),
            None => self.themes.default_theme()?.id.clone(),
        };
        let layout_hash = compute_layout_hash(&Faces { front: &front, back: &back })?;
        let job_hash = compute_job_hash(
            &profile.id,
            &profile.profile_version,
            request,
            ENGINE_VERSION,
        )?;

        tracing::info!(
            profile = %profile.id,
            theme = %theme_id,
            face = ?request.face,
            layout_hash = %layout_hash,
            "card rendered"
        );

        Ok(RenderedCard {
            id: Uuid::new_v4().to_string(),
            profile_id: profile.id.clone(),
            profile_version: profile.profile_version.clone(),
            engine_version: ENGINE_VERSION.to_string(),
            created_at: Utc::now(),
            theme_id,
            front,
            back,
            layout_hash,
            job_hash,
            validation,
        })
    }

    fn profile(&self, id: &str) -> Result<&LayoutProfile, RenderError> {
        self.registry.get(id)
            .ok_or_else(|| RenderError::ProfileNotFound(id.to_string()))
    }

    fn check_engine_version(&self, profile: &LayoutProfile) -> Result<(), RenderError> {
        let engine_ver = semver::Version::parse(ENGINE_VERSION)
            .map_err(|_| RenderError::InvalidVersion(ENGINE_VERSION.to_string()))?;
        let min_ver = semver::Version::parse(&profile.engine_min_version)
            .map_err(|_| RenderError::InvalidVersion(profile.engine_min_version.clone()))?;

        if engine_ver < min_ver {
            return Err(RenderError::EngineVersionMismatch(
                profile.profile_version.clone(),
                profile.engine_min_version.clone(),
                ENGINE_VERSION.to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new(ProfileRegistry::default(), ThemeSet::default(), AssetPool::default())
    }
}
