//! Layout Profiles - Every Layout Constant in One Table
//!
//! A profile fixes canvas sizes, region coordinates, font sizes and the
//! card's printed wording. Visual tuning happens here, never in the
//! renderers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::format::Locale;
use crate::layout::{LayoutFrame, Size, TextAlign};
use crate::validation::FailureMode;

pub type ProfileId = String;

pub const STANDARD_PROFILE_ID: &str = "ktm-standard";
pub const STANDARD_EN_PROFILE_ID: &str = "ktm-standard-en";

/// Placeholder in the first back-face term replaced by the university name.
pub const UNIVERSITY_PLACEHOLDER: &str = "{university}";

/// Rows in the front data table.
pub const TABLE_ROWS: usize = 9;
/// Numbered statements on the back face.
pub const TERM_COUNT: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutProfile {
    pub id: ProfileId,
    pub name: String,
    pub profile_version: String,
    pub engine_min_version: String,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub superseded_by: Option<String>,
    #[serde(default)]
    pub failure_mode: FailureMode,
    #[serde(default)]
    pub locale: Locale,
    #[serde(default = "default_academic_year")]
    pub default_academic_year: String,
    #[serde(default = "default_aspect_tolerance")]
    pub aspect_tolerance: f32,
    pub front_text: FrontText,
    pub back_text: BackText,
    pub front: FrontLayout,
    pub back: BackLayout,
}

fn default_academic_year() -> String { "2024 - 2028".to_string() }
fn default_aspect_tolerance() -> f32 { 0.1 }

/// A text region and its typography.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSlot {
    pub frame: LayoutFrame,
    pub font_size: f32,
    #[serde(default = "default_weight")]
    pub font_weight: u16,
    #[serde(default)]
    pub align: TextAlign,
    #[serde(default)]
    pub letter_spacing: f32,
    #[serde(default)]
    pub uppercase: bool,
    #[serde(default = "default_text_color")]
    pub color: String,
}

fn default_weight() -> u16 { 400 }
fn default_text_color() -> String { "#000000".to_string() }

impl TextSlot {
    fn new(frame: LayoutFrame, font_size: f32, font_weight: u16, align: TextAlign) -> Self {
        Self {
            frame,
            font_size,
            font_weight,
            align,
            letter_spacing: 0.0,
            uppercase: false,
            color: default_text_color(),
        }
    }

    fn spaced(mut self, letter_spacing: f32) -> Self {
        self.letter_spacing = letter_spacing;
        self
    }

    fn upper(mut self) -> Self {
        self.uppercase = true;
        self
    }

    fn colored(mut self, color: &str) -> Self {
        self.color = color.to_string();
        self
    }
}

/// Label/colon/value table geometry. Row count is fixed by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableLayout {
    pub frame: LayoutFrame,
    pub label_width: f32,
    pub colon_width: f32,
    pub row_height: f32,
    pub font_size: f32,
    pub font_weight: u16,
}

impl TableLayout {
    pub fn value_width(&self) -> f32 {
        (self.frame.width - self.label_width - self.colon_width).max(0.0)
    }

    /// Frame of the `index`th row, stacked down from the table's top edge.
    pub fn row_frame(&self, index: usize) -> LayoutFrame {
        LayoutFrame::new(
            self.frame.left,
            self.frame.top + self.row_height * index as f32,
            self.frame.width,
            self.row_height,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontLayout {
    pub canvas: Size,
    pub corner_radius: f32,
    pub font_family: String,
    pub background_color: String,
    pub header: LayoutFrame,
    pub logo: LayoutFrame,
    pub country: TextSlot,
    pub university: TextSlot,
    pub address: TextSlot,
    pub header_rule: LayoutFrame,
    pub title: TextSlot,
    pub photo: LayoutFrame,
    pub photo_fill: String,
    pub no_photo: TextSlot,
    pub table: TableLayout,
    pub barcode: LayoutFrame,
    pub barcode_bar_width: f32,
    pub barcode_height: f32,
    pub serial: TextSlot,
    pub qr: LayoutFrame,
    pub signature: LayoutFrame,
    pub advisor: TextSlot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackLayout {
    pub canvas: Size,
    pub corner_radius: f32,
    pub font_family: String,
    pub background_color: String,
    pub banner: LayoutFrame,
    pub banner_title: TextSlot,
    pub terms: LayoutFrame,
    pub term_marker_width: f32,
    pub term_height: f32,
    pub term_font_size: f32,
    pub term_color: String,
    pub footer_rule: LayoutFrame,
    pub card_number: TextSlot,
    pub issued: TextSlot,
    pub barcode: LayoutFrame,
    pub barcode_bar_width: f32,
    pub barcode_height: f32,
    pub advisor_caption: TextSlot,
    pub signature: LayoutFrame,
    pub signature_rule: LayoutFrame,
    pub advisor: TextSlot,
    pub seal: LayoutFrame,
    pub seal_font_size: f32,
    pub bottom_bar: LayoutFrame,
}

/// Printed wording of the front face.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontText {
    pub country: String,
    pub title: String,
    pub no_photo: String,
    pub full_name: String,
    pub birth: String,
    pub student_number: String,
    pub faculty: String,
    pub program: String,
    pub level: String,
    pub academic_year: String,
    pub validity_period: String,
    pub status: String,
    pub status_value: String,
    pub serial_prefix: String,
}

/// Printed wording of the back face.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackText {
    pub title: String,
    pub terms: [String; TERM_COUNT],
    pub card_number: String,
    pub issued: String,
    pub advisor_caption: String,
    pub logo_placeholder: String,
}

impl FrontText {
    pub fn indonesian() -> Self {
        Self {
            country: "REPUBLIK INDONESIA".into(),
            title: "KARTU TANDA MAHASISWA".into(),
            no_photo: "No Photo".into(),
            full_name: "Nama Lengkap".into(),
            birth: "TTL".into(),
            student_number: "NIM".into(),
            faculty: "Fakultas".into(),
            program: "Program Studi".into(),
            level: "Jenjang".into(),
            academic_year: "Tahun Akademik".into(),
            validity_period: "Masa Aktif Kartu".into(),
            status: "Status".into(),
            status_value: "Mahasiswa Aktif".into(),
            serial_prefix: "Serial".into(),
        }
    }

    pub fn english() -> Self {
        Self {
            country: "REPUBLIC OF INDONESIA".into(),
            title: "STUDENT IDENTITY CARD".into(),
            no_photo: "No Photo".into(),
            full_name: "Full Name".into(),
            birth: "Place/Date of Birth".into(),
            student_number: "Student Number".into(),
            faculty: "Faculty".into(),
            program: "Program".into(),
            level: "Level".into(),
            academic_year: "Academic Year".into(),
            validity_period: "Card Validity Period".into(),
            status: "Status".into(),
            status_value: "Active Student".into(),
            serial_prefix: "Serial".into(),
        }
    }
}

impl BackText {
    pub fn indonesian() -> Self {
        Self {
            title: "SYARAT DAN KETENTUAN".into(),
            terms: [
                format!("Kartu ini merupakan identitas resmi mahasiswa {}.", UNIVERSITY_PLACEHOLDER),
                "Kartu ini tidak dapat dipindahtangankan kepada pihak lain.".into(),
                "Jika kartu ini ditemukan, harap mengembalikan ke alamat kampus.".into(),
                "Penyalahgunaan kartu ini akan dikenakan sanksi sesuai peraturan yang berlaku.".into(),
                "Kartu ini berlaku selama mahasiswa berstatus aktif.".into(),
                "Jika kartu hilang atau rusak, segera lapor ke bagian akademik.".into(),
            ],
            card_number: "No. Kartu".into(),
            issued: "Diterbitkan".into(),
            advisor_caption: "Dosen Wali,".into(),
            logo_placeholder: "LOGO".into(),
        }
    }

    pub fn english() -> Self {
        Self {
            title: "TERMS AND CONDITIONS".into(),
            terms: [
                format!("This card is the official student identity of {}.", UNIVERSITY_PLACEHOLDER),
                "This card is not transferable to any other person.".into(),
                "If found, please return this card to the campus address.".into(),
                "Misuse of this card is subject to sanctions under applicable regulations.".into(),
                "This card is valid while the holder is an active student.".into(),
                "Report a lost or damaged card to the academic office immediately.".into(),
            ],
            card_number: "Card No.".into(),
            issued: "Issued".into(),
            advisor_caption: "Academic Advisor,".into(),
            logo_placeholder: "LOGO".into(),
        }
    }
}

const fn frame(left: f32, top: f32, width: f32, height: f32) -> LayoutFrame {
    LayoutFrame::new(left, top, width, height)
}

impl FrontLayout {
    pub fn standard() -> Self {
        use TextAlign::{Center, Left};
        Self {
            canvas: Size::new(600.0, 380.0),
            corner_radius: 16.0,
            font_family: "Arial, sans-serif".into(),
            background_color: "#ffffff".into(),
            header: frame(0.0, 22.0, 600.0, 70.0),
            logo: frame(35.0, 24.0, 58.0, 58.0),
            country: TextSlot::new(frame(103.0, 24.0, 447.0, 18.0), 15.0, 700, Center).spaced(0.5),
            university: TextSlot::new(frame(103.0, 42.0, 447.0, 26.0), 21.0, 800, Center).upper(),
            address: TextSlot::new(frame(103.0, 68.0, 447.0, 13.0), 10.0, 400, Center),
            header_rule: frame(30.0, 88.0, 540.0, 2.0),
            title: TextSlot::new(frame(35.0, 110.0, 535.0, 18.0), 15.0, 800, Center)
                .spaced(0.5)
                .upper(),
            photo: frame(35.0, 140.0, 135.0, 170.0),
            photo_fill: "#e2e2e2".into(),
            no_photo: TextSlot::new(frame(35.0, 217.0, 135.0, 16.0), 14.0, 400, Center).colored("#666666"),
            table: TableLayout {
                frame: frame(190.0, 142.0, 380.0, 144.0),
                label_width: 115.0,
                colon_width: 20.0,
                row_height: 16.0,
                font_size: 11.0,
                font_weight: 700,
            },
            barcode: frame(35.0, 318.0, 200.0, 28.0),
            barcode_bar_width: 1.4,
            barcode_height: 28.0,
            serial: TextSlot::new(frame(35.0, 348.0, 200.0, 12.0), 10.0, 700, Left),
            qr: frame(262.0, 300.0, 55.0, 55.0),
            signature: frame(455.0, 308.0, 90.0, 40.0),
            advisor: TextSlot::new(frame(420.0, 348.0, 160.0, 12.0), 10.0, 700, Center),
        }
    }
}

impl BackLayout {
    pub fn standard() -> Self {
        use TextAlign::{Center, Left};
        Self {
            canvas: Size::new(600.0, 380.0),
            corner_radius: 12.0,
            font_family: "'Open Sans', sans-serif".into(),
            background_color: "#ffffff".into(),
            banner: frame(0.0, 0.0, 600.0, 46.0),
            banner_title: TextSlot::new(frame(20.0, 16.0, 560.0, 14.0), 12.0, 700, Center)
                .spaced(2.0)
                .upper()
                .colored("#ffffff"),
            terms: frame(20.0, 62.0, 560.0, 106.0),
            term_marker_width: 16.0,
            term_height: 17.6,
            term_font_size: 8.5,
            term_color: "#444444".into(),
            footer_rule: frame(0.0, 290.0, 600.0, 1.0),
            card_number: TextSlot::new(frame(20.0, 299.0, 180.0, 10.0), 6.5, 400, Left).colored("#888888"),
            issued: TextSlot::new(frame(20.0, 309.0, 180.0, 10.0), 6.5, 400, Left).colored("#888888"),
            barcode: frame(20.0, 323.0, 180.0, 22.0),
            barcode_bar_width: 1.0,
            barcode_height: 22.0,
            advisor_caption: TextSlot::new(frame(218.0, 296.0, 165.0, 10.0), 8.0, 400, Center).colored("#666666"),
            signature: frame(225.5, 307.0, 150.0, 50.0),
            signature_rule: frame(225.5, 358.0, 150.0, 1.0),
            advisor: TextSlot::new(frame(225.5, 361.0, 150.0, 10.0), 7.5, 600, Center).colored("#333333"),
            seal: frame(540.0, 322.0, 40.0, 40.0),
            seal_font_size: 7.0,
            bottom_bar: frame(0.0, 374.0, 600.0, 6.0),
        }
    }

    /// Frame of the `index`th term, stacked down from the terms region's top edge.
    pub fn term_frame(&self, index: usize) -> LayoutFrame {
        LayoutFrame::new(
            self.terms.left,
            self.terms.top + self.term_height * index as f32,
            self.terms.width,
            self.term_height,
        )
    }
}

impl LayoutProfile {
    pub fn standard() -> Self {
        Self {
            id: STANDARD_PROFILE_ID.into(),
            name: "KTM Standard".into(),
            profile_version: "1.0.0".into(),
            engine_min_version: crate::MIN_ENGINE_VERSION.into(),
            deprecated: false,
            superseded_by: None,
            failure_mode: FailureMode::Block,
            locale: Locale::Id,
            default_academic_year: default_academic_year(),
            aspect_tolerance: default_aspect_tolerance(),
            front_text: FrontText::indonesian(),
            back_text: BackText::indonesian(),
            front: FrontLayout::standard(),
            back: BackLayout::standard(),
        }
    }

    pub fn standard_english() -> Self {
        let mut front = FrontLayout::standard();
        // Room for "Card Validity Period" at the table font
        front.table.label_width = 125.0;
        Self {
            id: STANDARD_EN_PROFILE_ID.into(),
            name: "KTM Standard (English)".into(),
            locale: Locale::En,
            front_text: FrontText::english(),
            back_text: BackText::english(),
            front,
            ..Self::standard()
        }
    }

    /// Fixed regions of the front face, by name.
    pub fn front_regions(&self) -> Vec<(&'static str, LayoutFrame)> {
        let f = &self.front;
        vec![
            ("header", f.header),
            ("logo", f.logo),
            ("country", f.country.frame),
            ("university", f.university.frame),
            ("address", f.address.frame),
            ("header_rule", f.header_rule),
            ("title", f.title.frame),
            ("photo", f.photo),
            ("no_photo", f.no_photo.frame),
            ("table", f.table.frame),
            ("barcode", f.barcode),
            ("serial", f.serial.frame),
            ("qr", f.qr),
            ("signature", f.signature),
            ("advisor", f.advisor.frame),
        ]
    }

    /// Fixed regions of the back face, by name.
    pub fn back_regions(&self) -> Vec<(&'static str, LayoutFrame)> {
        let b = &self.back;
        vec![
            ("banner", b.banner),
            ("banner_title", b.banner_title.frame),
            ("terms", b.terms),
            ("footer_rule", b.footer_rule),
            ("card_number", b.card_number.frame),
            ("issued", b.issued.frame),
            ("barcode", b.barcode),
            ("advisor_caption", b.advisor_caption.frame),
            ("signature", b.signature),
            ("signature_rule", b.signature_rule),
            ("advisor", b.advisor.frame),
            ("seal", b.seal),
            ("bottom_bar", b.bottom_bar),
        ]
    }
}

impl Default for LayoutProfile {
    fn default() -> Self {
        Self::standard()
    }
}

/// Profile registry - built-ins plus any JSON profiles found on disk
pub struct ProfileRegistry {
    profiles: BTreeMap<ProfileId, LayoutProfile>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self { profiles: BTreeMap::new() }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(LayoutProfile::standard());
        registry.register(LayoutProfile::standard_english());
        registry
    }

    /// Files that fail to parse are skipped. A profile on disk replaces a
    /// built-in with the same id.
    pub fn load_from_dir(dir: &Path) -> Result<Self, std::io::Error> {
        let mut registry = Self::with_builtins();
        if !dir.exists() {
            tracing::debug!(dir = %dir.display(), "profiles directory absent, using built-ins");
            return Ok(registry);
        }

        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().map_or(false, |e| e == "json"))
            .collect();
        paths.sort();

        for path in paths {
            let content = match fs::read_to_string(&path) {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "unreadable profile skipped");
                    continue;
                }
            };
            match serde_json::from_str::<LayoutProfile>(&content) {
                Ok(profile) => {
                    tracing::debug!(id = %profile.id, path = %path.display(), "profile loaded");
                    registry.register(profile);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "invalid profile skipped");
                }
            }
        }
        Ok(registry)
    }

    pub fn get(&self, id: &str) -> Option<&LayoutProfile> {
        self.profiles.get(id)
    }

    pub fn list(&self) -> Vec<&LayoutProfile> {
        self.profiles.values().collect()
    }

    pub fn register(&mut self, profile: LayoutProfile) {
        self.profiles.insert(profile.id.clone(), profile);
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let registry = ProfileRegistry::with_builtins();
        assert!(registry.get(STANDARD_PROFILE_ID).is_some());
        assert_eq!(registry.get(STANDARD_EN_PROFILE_ID).map(|p| p.locale), Some(Locale::En));
        assert_eq!(registry.list().len(), 2);
    }

    #[test]
    fn test_standard_regions_inside_canvas() {
        let profile = LayoutProfile::standard();
        for (name, frame) in profile.front_regions() {
            assert!(frame.fits_within(profile.front.canvas), "front {name} out of canvas");
        }
        for (name, frame) in profile.back_regions() {
            assert!(frame.fits_within(profile.back.canvas), "back {name} out of canvas");
        }
    }

    #[test]
    fn test_table_fits_nine_rows() {
        let table = LayoutProfile::standard().front.table;
        assert!(table.row_height * 9.0 <= table.frame.height);
        assert_eq!(table.value_width(), 245.0);
    }

    #[test]
    fn test_row_and_term_frames_stack() {
        let profile = LayoutProfile::standard();
        let table = &profile.front.table;
        assert_eq!(table.row_frame(0), LayoutFrame::new(190.0, 142.0, 380.0, 16.0));
        assert_eq!(table.row_frame(2).top, 174.0);
        assert!(table.frame.contains(&table.row_frame(TABLE_ROWS - 1)));

        let back = &profile.back;
        assert_eq!(back.term_frame(0).top, back.terms.top);
        assert!(back.terms.contains(&back.term_frame(TERM_COUNT - 1)));
    }

    #[test]
    fn test_english_labels_fit_their_column() {
        let profile = LayoutProfile::standard_english();
        let capacity = crate::format::glyph_capacity(
            profile.front.table.label_width,
            profile.front.table.font_size,
        );
        assert!(profile.front_text.validity_period.chars().count() <= capacity);
        assert!(profile.front_text.birth.chars().count() <= capacity);
    }

    #[test]
    fn test_failure_mode_defaults_to_block() {
        let mut json = serde_json::to_value(LayoutProfile::standard()).unwrap();
        json.as_object_mut().unwrap().remove("failureMode");
        let profile: LayoutProfile = serde_json::from_value(json).unwrap();
        assert_eq!(profile.failure_mode, FailureMode::Block);
    }

    #[test]
    fn test_profile_json_shape() {
        let json = serde_json::to_value(LayoutProfile::standard()).unwrap();
        assert_eq!(json["id"], STANDARD_PROFILE_ID);
        assert_eq!(json["locale"], "id");
        assert_eq!(json["backText"]["terms"].as_array().map(|a| a.len()), Some(6));
        assert!(json["front"]["table"]["rowHeight"].is_number());
    }

    #[test]
    fn test_terms_count_enforced() {
        let mut json = serde_json::to_value(LayoutProfile::standard()).unwrap();
        json["backText"]["terms"] = serde_json::json!(["only one"]);
        assert!(serde_json::from_value::<LayoutProfile>(json).is_err());
    }
}
