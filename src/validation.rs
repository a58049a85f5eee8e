//! Validation System - Rule/Policy Separation
//!
//! Rules produce structured violations.
//! Policy maps violations to actions.

use serde::{Deserialize, Serialize};

use crate::assets::AssetPool;
use crate::front::FrontField;
use crate::layout::{LayoutFrame, Size};
use crate::profile::{LayoutProfile, TERM_COUNT};
use crate::theme::{is_valid_color, ThemeSet};

/// Width over height of an ISO/IEC 7810 ID-1 card (85.60 × 53.98 mm).
pub const ID1_ASPECT_RATIO: f32 = 85.60 / 53.98;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub rule: String,
    pub severity: ViolationSeverity,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub remediation: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    #[default]
    Block,
    Warn,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub violations: Vec<Violation>,
    pub profile_id: String,
    pub profile_version: String,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == ViolationSeverity::Error)
    }
}

/// Everything a render depends on besides the records themselves.
#[derive(Debug, Clone, Copy)]
pub struct RenderConfig<'a> {
    pub profile: &'a LayoutProfile,
    pub themes: &'a ThemeSet,
    pub assets: &'a AssetPool,
}

/// Validation rule trait - produces violations
pub trait ValidationRule {
    fn name(&self) -> &'static str;
    fn validate(&self, config: &RenderConfig<'_>) -> Vec<Violation>;
}

// --- Concrete Rules ---

pub struct SignaturePoolRule;

impl ValidationRule for SignaturePoolRule {
    fn name(&self) -> &'static str { "signature_pool" }

    fn validate(&self, config: &RenderConfig<'_>) -> Vec<Violation> {
        if !config.assets.signatures.is_empty() {
            return vec![];
        }
        vec![Violation {
            rule: self.name().to_string(),
            severity: ViolationSeverity::Error,
            message: "Signature asset pool is empty".to_string(),
            expected: Some("at least 1 signature".to_string()),
            actual: Some("0".to_string()),
            remediation: vec!["Ship at least one signature image with the deployment".to_string()],
        }]
    }
}

pub struct ThemeSetRule;

impl ValidationRule for ThemeSetRule {
    fn name(&self) -> &'static str { "theme_set" }

    fn validate(&self, config: &RenderConfig<'_>) -> Vec<Violation> {
        if config.themes.is_empty() {
            return vec![Violation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Error,
                message: "Theme set is empty".to_string(),
                expected: Some("at least 1 theme".to_string()),
                actual: Some("0".to_string()),
                remediation: vec!["Provide a default card theme".to_string()],
            }];
        }

        let mut violations = vec![];
        for theme in config.themes.as_slice() {
            for color in theme.colors().into_iter().filter(|c| !is_valid_color(c)) {
                violations.push(Violation {
                    rule: self.name().to_string(),
                    severity: ViolationSeverity::Error,
                    message: format!("Theme '{}' has an unparseable color", theme.id),
                    expected: Some("CSS color".to_string()),
                    actual: Some(color.to_string()),
                    remediation: vec!["Use a hex, rgb() or named CSS color".to_string()],
                });
            }
        }
        violations
    }
}

pub struct AspectRatioRule;

impl AspectRatioRule {
    fn check(&self, face: &str, canvas: Size, tolerance: f32) -> Option<Violation> {
        let actual = canvas.aspect_ratio();
        if (ID1_ASPECT_RATIO - actual).abs() <= tolerance {
            return None;
        }
        Some(Violation {
            rule: self.name().to_string(),
            severity: ViolationSeverity::Warning,
            message: format!("{} canvas is not ID-card shaped", face),
            expected: Some(format!("{:.3}", ID1_ASPECT_RATIO)),
            actual: Some(format!("{:.3}", actual)),
            remediation: vec!["Resize the canvas to an 85.60:53.98 ratio".to_string()],
        })
    }
}

impl ValidationRule for AspectRatioRule {
    fn name(&self) -> &'static str { "aspect_ratio" }

    fn validate(&self, config: &RenderConfig<'_>) -> Vec<Violation> {
        let p = config.profile;
        [("front", p.front.canvas), ("back", p.back.canvas)]
            .into_iter()
            .filter_map(|(face, canvas)| self.check(face, canvas, p.aspect_tolerance))
            .collect()
    }
}

pub struct RegionsRule;

impl RegionsRule {
    fn check(&self, face: &str, canvas: Size, regions: Vec<(&'static str, LayoutFrame)>) -> Vec<Violation> {
        regions
            .into_iter()
            .filter(|(_, frame)| !frame.fits_within(canvas))
            .map(|(name, frame)| Violation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Error,
                message: format!("{} region '{}' leaves the canvas", face, name),
                expected: Some(format!("within {}x{}", canvas.width, canvas.height)),
                actual: Some(format!(
                    "{},{} {}x{}",
                    frame.left, frame.top, frame.width, frame.height
                )),
                remediation: vec!["Move or shrink the region in the layout profile".to_string()],
            })
            .collect()
    }

    /// Stacked rows must stay inside the region that holds them.
    fn check_rows(
        &self,
        face: &str,
        container: (&str, LayoutFrame),
        rows: Vec<(String, LayoutFrame)>,
    ) -> Vec<Violation> {
        let (region, bounds) = container;
        rows.into_iter()
            .filter(|(_, frame)| !bounds.contains(frame))
            .map(|(name, frame)| Violation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Error,
                message: format!("{} row '{}' overflows the '{}' region", face, name, region),
                expected: Some(format!("bottom <= {}", bounds.bottom())),
                actual: Some(format!("bottom {}", frame.bottom())),
                remediation: vec![format!(
                    "Shrink the row height or grow the '{}' region",
                    region
                )],
            })
            .collect()
    }
}

impl ValidationRule for RegionsRule {
    fn name(&self) -> &'static str { "regions" }

    fn validate(&self, config: &RenderConfig<'_>) -> Vec<Violation> {
        let p = config.profile;
        let mut violations = self.check("front", p.front.canvas, p.front_regions());
        violations.extend(self.check("back", p.back.canvas, p.back_regions()));

        let table = &p.front.table;
        let rows = FrontField::ALL
            .iter()
            .enumerate()
            .map(|(i, field)| (format!("row.{}", field.key()), table.row_frame(i)))
            .collect();
        violations.extend(self.check_rows("front", ("table", table.frame), rows));

        let terms = (0..TERM_COUNT)
            .map(|i| (format!("term.{}", i + 1), p.back.term_frame(i)))
            .collect();
        violations.extend(self.check_rows("back", ("terms", p.back.terms), terms));
        violations
    }
}

pub struct DeprecationRule;

impl ValidationRule for DeprecationRule {
    fn name(&self) -> &'static str { "deprecation" }

    fn validate(&self, config: &RenderConfig<'_>) -> Vec<Violation> {
        let p = config.profile;
        if !p.deprecated {
            return vec![];
        }
        let remediation = match &p.superseded_by {
            Some(next) => vec![format!("Switch to profile '{}'", next)],
            None => vec![],
        };
        vec![Violation {
            rule: self.name().to_string(),
            severity: ViolationSeverity::Info,
            message: format!("Profile '{}' is deprecated", p.id),
            expected: None,
            actual: p.superseded_by.clone(),
            remediation,
        }]
    }
}

/// Validator orchestrates rules and applies the profile's policy
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(SignaturePoolRule),
                Box::new(ThemeSetRule),
                Box::new(AspectRatioRule),
                Box::new(RegionsRule),
                Box::new(DeprecationRule),
            ],
        }
    }

    pub fn validate(&self, config: &RenderConfig<'_>) -> ValidationReport {
        let violations: Vec<_> = self.rules.iter().flat_map(|r| r.validate(config)).collect();

        let has_errors = violations.iter().any(|v| v.severity == ViolationSeverity::Error);
        let valid = match config.profile.failure_mode {
            FailureMode::Block => !has_errors,
            // Never block, just record
            FailureMode::Warn => true,
        };

        for v in &violations {
            tracing::debug!(rule = %v.rule, severity = ?v.severity, message = %v.message, "violation");
        }

        ValidationReport {
            valid,
            violations,
            profile_id: config.profile.id.clone(),
            profile_version: config.profile.profile_version.clone(),
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
