//! Card Themes - Predefined Visual Variants

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub color: String,
    /// Position along the gradient line, 0.0..=1.0
    pub offset: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gradient {
    pub angle_deg: f32,
    pub stops: Vec<ColorStop>,
}

impl Gradient {
    pub fn linear(angle_deg: f32, from: &str, to: &str) -> Self {
        Self {
            angle_deg,
            stops: vec![
                ColorStop { color: from.to_string(), offset: 0.0 },
                ColorStop { color: to.to_string(), offset: 1.0 },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Fill {
    Solid { color: String },
    Gradient(Gradient),
}

impl Fill {
    pub fn solid(color: &str) -> Self {
        Self::Solid { color: color.to_string() }
    }

    /// Every color string this fill references.
    pub fn colors(&self) -> Vec<&str> {
        match self {
            Fill::Solid { color } => vec![color.as_str()],
            Fill::Gradient(g) => g.stops.iter().map(|s| s.color.as_str()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardTheme {
    pub id: String,
    pub name: String,
    pub gradient: Gradient,
    pub accent_color: String,
    pub photo_bg: String,
    pub photo_border: String,
    pub bottom_bar: Fill,
}

impl CardTheme {
    /// Every color string the theme references, for validation.
    pub fn colors(&self) -> Vec<&str> {
        let mut colors: Vec<&str> = self.gradient.stops.iter().map(|s| s.color.as_str()).collect();
        colors.push(&self.accent_color);
        colors.push(&self.photo_bg);
        colors.push(&self.photo_border);
        colors.extend(self.bottom_bar.colors());
        colors
    }
}

fn theme(id: &str, name: &str, from: &str, to: &str, accent: &str, photo_bg: &str) -> CardTheme {
    CardTheme {
        id: id.to_string(),
        name: name.to_string(),
        gradient: Gradient::linear(135.0, from, to),
        accent_color: accent.to_string(),
        photo_bg: photo_bg.to_string(),
        photo_border: accent.to_string(),
        bottom_bar: Fill::Gradient(Gradient::linear(90.0, from, to)),
    }
}

/// Whether `color` is a CSS color the presentation layer can paint.
pub fn is_valid_color(color: &str) -> bool {
    color.parse::<csscolorparser::Color>().is_ok()
}

/// `color` as `#rrggbbaa` with the given alpha. Unparseable input is
/// returned unchanged.
pub fn with_alpha(color: &str, alpha: u8) -> String {
    match color.parse::<csscolorparser::Color>() {
        Ok(parsed) => {
            let [r, g, b, _] = parsed.to_rgba8();
            format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, alpha)
        }
        Err(_) => color.to_string(),
    }
}

/// Ordered, immutable theme collection. The first entry is the default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeSet(Vec<CardTheme>);

impl ThemeSet {
    pub fn new(themes: Vec<CardTheme>) -> Self {
        Self(themes)
    }

    pub fn builtin() -> Self {
        Self(vec![
            theme("blue", "Biru Akademik", "#1e3a8a", "#3b82f6", "#1e40af", "#eff6ff"),
            theme("green", "Hijau Kampus", "#14532d", "#22c55e", "#15803d", "#f0fdf4"),
            theme("red", "Merah Almamater", "#7f1d1d", "#ef4444", "#b91c1c", "#fef2f2"),
            theme("purple", "Ungu Elegan", "#4c1d95", "#a855f7", "#6d28d9", "#faf5ff"),
            theme("dark", "Gelap Formal", "#111827", "#4b5563", "#1f2937", "#f3f4f6"),
        ])
    }

    pub fn as_slice(&self) -> &[CardTheme] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&CardTheme> {
        self.0.iter().find(|t| t.id == id)
    }

    pub fn default_theme(&self) -> Result<&CardTheme, ConfigError> {
        resolve_theme(None, &self.0)
    }
}

impl Default for ThemeSet {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Return `requested` if given, otherwise the first theme of the set.
pub fn resolve_theme<'a>(
    requested: Option<&'a CardTheme>,
    themes: &'a [CardTheme],
) -> Result<&'a CardTheme, ConfigError> {
    if themes.is_empty() {
        return Err(ConfigError::EmptyThemeSet);
    }
    Ok(requested.unwrap_or(&themes[0]))
}
