//! Front face: header, photo, data table, barcode, QR code, signature.

use crate::error::ConfigError;
use crate::format::{barcode_value, format_birth_info, normalize_university_name, qr_payload};
use crate::layout::{
    BarcodeSpec, CardFace, EcLevel, ImageContent, LayoutFrame, LayoutNode, LayoutTree, NodeContent,
    ObjectFit, QrSpec, Symbology, TextAlign,
};
use crate::model::{StudentRecord, UniversityRecord};
use crate::profile::{FrontText, TextSlot, TABLE_ROWS};
use crate::render::{text_node, text_node_at, text_run, CardRenderer};
use crate::theme::{resolve_theme, CardTheme, Fill};

const QR_FOREGROUND: &str = "#000000";
const QR_BACKGROUND: &str = "#ffffff";

/// Rows of the front data table, in print order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontField {
    FullName,
    Birth,
    StudentNumber,
    Faculty,
    Program,
    Level,
    AcademicYear,
    ValidityPeriod,
    Status,
}

impl FrontField {
    pub const ALL: [FrontField; TABLE_ROWS] = [
        FrontField::FullName,
        FrontField::Birth,
        FrontField::StudentNumber,
        FrontField::Faculty,
        FrontField::Program,
        FrontField::Level,
        FrontField::AcademicYear,
        FrontField::ValidityPeriod,
        FrontField::Status,
    ];

    pub fn key(self) -> &'static str {
        match self {
            FrontField::FullName => "full_name",
            FrontField::Birth => "birth",
            FrontField::StudentNumber => "student_number",
            FrontField::Faculty => "faculty",
            FrontField::Program => "program",
            FrontField::Level => "level",
            FrontField::AcademicYear => "academic_year",
            FrontField::ValidityPeriod => "validity_period",
            FrontField::Status => "status",
        }
    }

    pub fn label(self, text: &FrontText) -> &str {
        match self {
            FrontField::FullName => &text.full_name,
            FrontField::Birth => &text.birth,
            FrontField::StudentNumber => &text.student_number,
            FrontField::Faculty => &text.faculty,
            FrontField::Program => &text.program,
            FrontField::Level => &text.level,
            FrontField::AcademicYear => &text.academic_year,
            FrontField::ValidityPeriod => &text.validity_period,
            FrontField::Status => &text.status,
        }
    }
}

/// Id of a table cell node, e.g. `row.birth.value`.
pub fn cell_id(field: FrontField, cell: &str) -> String {
    format!("row.{}.{}", field.key(), cell)
}

impl<'a> CardRenderer<'a> {
    pub fn render_front(
        &self,
        student: &StudentRecord,
        university: &UniversityRecord,
        theme: Option<&CardTheme>,
    ) -> Result<LayoutTree, ConfigError> {
        let theme = resolve_theme(theme, self.themes.as_slice())?;
        let signature = self.assets.signature_for(student.signature_index)?;
        let layout = &self.profile.front;
        tracing::debug!(nim = %student.student_number, theme = %theme.id, "rendering front face");

        let mut nodes = Vec::with_capacity(8);
        nodes.push(self.front_header(university));
        nodes.push(text_node("title", &layout.title, &self.profile.front_text.title));
        nodes.push(self.front_photo(student));
        nodes.push(self.front_table(student));

        let barcode_source = if student.serial_number.is_empty() {
            &student.student_number
        } else {
            &student.serial_number
        };
        let barcode = barcode_value(barcode_source);
        let serial_shown = if student.serial_number.is_empty() {
            barcode.as_str()
        } else {
            student.serial_number.as_str()
        };
        let serial = format!("{}: {}", self.profile.front_text.serial_prefix, serial_shown);
        nodes.push(LayoutNode::new(
            "barcode",
            layout.barcode,
            NodeContent::Barcode(BarcodeSpec {
                value: barcode,
                symbology: Symbology::Code128,
                bar_width: layout.barcode_bar_width,
                height: layout.barcode_height.min(layout.barcode.height),
                display_value: false,
            }),
        ));
        nodes.push(text_node("serial", &layout.serial, &serial));

        nodes.push(LayoutNode::new(
            "qr",
            layout.qr,
            NodeContent::QrCode(QrSpec {
                payload: qr_payload(&student.card_number, &student.student_number, self.ctx.year),
                size: layout.qr.width.min(layout.qr.height),
                level: EcLevel::M,
                foreground: QR_FOREGROUND.into(),
                background: QR_BACKGROUND.into(),
            }),
        ));

        let block = LayoutFrame::new(
            layout.advisor.frame.left,
            layout.signature.top,
            layout.advisor.frame.width,
            layout.advisor.frame.bottom() - layout.signature.top,
        );
        nodes.push(LayoutNode::block("signature_block", block).with_children(vec![
            LayoutNode::new(
                "signature",
                layout.signature,
                NodeContent::Image(ImageContent {
                    source: signature.clone(),
                    fit: ObjectFit::Contain,
                    opacity: 1.0,
                    circular: false,
                }),
            ),
            text_node("advisor", &layout.advisor, &student.advisor_name),
        ]));

        let canvas = LayoutFrame::new(0.0, 0.0, layout.canvas.width, layout.canvas.height);
        let r = layout.corner_radius;
        Ok(LayoutTree {
            face: CardFace::Front,
            theme_id: theme.id.clone(),
            canvas: layout.canvas,
            frame: canvas.inset(r, r, r, r),
            corner_radius: layout.corner_radius,
            font_family: layout.font_family.clone(),
            background: Fill::solid(&layout.background_color),
            background_image: self.assets.background_template().cloned(),
            nodes,
        })
    }

    fn front_header(&self, university: &UniversityRecord) -> LayoutNode {
        let layout = &self.profile.front;
        let mut children = Vec::with_capacity(5);
        if let Some(logo) = &university.logo {
            children.push(LayoutNode::new(
                "logo",
                layout.logo,
                NodeContent::Image(ImageContent {
                    source: logo.clone(),
                    fit: ObjectFit::Contain,
                    opacity: 1.0,
                    circular: false,
                }),
            ));
        }
        children.push(text_node("country", &layout.country, &self.profile.front_text.country));
        children.push(text_node(
            "university",
            &layout.university,
            normalize_university_name(&university.name),
        ));
        children.push(text_node("address", &layout.address, &university.address));
        children.push(LayoutNode::new(
            "header_rule",
            layout.header_rule,
            NodeContent::Rule { color: "#000000".into(), thickness: layout.header_rule.height },
        ));
        LayoutNode::block("header", layout.header).with_children(children)
    }

    fn front_photo(&self, student: &StudentRecord) -> LayoutNode {
        let layout = &self.profile.front;
        let content = match &student.photo {
            Some(photo) => NodeContent::Image(ImageContent {
                source: photo.clone(),
                fit: ObjectFit::Cover,
                opacity: 1.0,
                circular: false,
            }),
            None => NodeContent::ImagePlaceholder {
                label: Some(text_run(&layout.no_photo, &self.profile.front_text.no_photo)),
                fill: Fill::solid(&layout.photo_fill),
                border: None,
                circular: false,
            },
        };
        LayoutNode::new("photo", layout.photo, content)
    }

    fn front_table(&self, student: &StudentRecord) -> LayoutNode {
        let table = &self.profile.front.table;
        let text = &self.profile.front_text;
        let cell = TextSlot {
            frame: table.frame,
            font_size: table.font_size,
            font_weight: table.font_weight,
            align: TextAlign::Left,
            letter_spacing: 0.0,
            uppercase: false,
            color: "#000000".into(),
        };
        let colon = TextSlot { align: TextAlign::Center, ..cell.clone() };

        let rows = FrontField::ALL
            .iter()
            .enumerate()
            .map(|(i, &field)| {
                let row = table.row_frame(i);
                let (left, top) = (row.left, row.top);
                let label_frame = LayoutFrame::new(left, top, table.label_width, table.row_height);
                let colon_frame = LayoutFrame::new(
                    left + table.label_width,
                    top,
                    table.colon_width,
                    table.row_height,
                );
                let value_frame = LayoutFrame::new(
                    left + table.label_width + table.colon_width,
                    top,
                    table.value_width(),
                    table.row_height,
                );
                let value = self.field_value(field, student);
                LayoutNode::block(format!("row.{}", field.key()), row).with_children(vec![
                    text_node_at(&cell_id(field, "label"), label_frame, &cell, field.label(text)),
                    text_node_at(&cell_id(field, "colon"), colon_frame, &colon, ":"),
                    text_node_at(&cell_id(field, "value"), value_frame, &cell, &value),
                ])
            })
            .collect();

        LayoutNode::block("data_table", table.frame).with_children(rows)
    }

    fn field_value(&self, field: FrontField, student: &StudentRecord) -> String {
        match field {
            FrontField::FullName => student.full_name.clone(),
            FrontField::Birth => {
                format_birth_info(&student.birth_place, &student.birth_date, self.profile.locale)
            }
            FrontField::StudentNumber => student.student_number.clone(),
            FrontField::Faculty => student.faculty.clone(),
            FrontField::Program => student.program.clone(),
            FrontField::Level => student.level.clone(),
            FrontField::AcademicYear if student.academic_year.is_empty() => {
                self.profile.default_academic_year.clone()
            }
            FrontField::AcademicYear => student.academic_year.clone(),
            FrontField::ValidityPeriod => student.validity_period.clone(),
            FrontField::Status => self.profile.front_text.status_value.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetPool, ImageRef};
    use crate::format::{BARCODE_PLACEHOLDER, KNOWN_LONG_NAME, KNOWN_SHORT_NAME};
    use crate::model::RenderContext;
    use crate::profile::LayoutProfile;
    use crate::theme::ThemeSet;

    fn student() -> StudentRecord {
        StudentRecord {
            full_name: "Rina Kartika Sari".into(),
            student_number: "21/480915/PA/20822".into(),
            card_number: "KTM2024000123".into(),
            birth_place: "Temanggung".into(),
            birth_date: "10/11/2005".into(),
            faculty: "Teknik".into(),
            program: "Teknik Informatika".into(),
            level: "S1".into(),
            academic_year: "2023 - 2027".into(),
            validity_period: "31 Agustus 2027".into(),
            status: "Aktif".into(),
            serial_number: String::new(),
            photo: None,
            advisor_name: "Dr. Siti Aminah, M.Pd.".into(),
            signature_index: 7,
            issue_date: "01 September 2023".into(),
        }
    }

    fn university() -> UniversityRecord {
        UniversityRecord {
            name: KNOWN_LONG_NAME.into(),
            address: "Jl. Colombo No. 1, Karangmalang, Yogyakarta 55281".into(),
            logo: None,
        }
    }

    fn render(student: &StudentRecord, university: &UniversityRecord) -> LayoutTree {
        let profile = LayoutProfile::standard();
        let themes = ThemeSet::builtin();
        let assets = AssetPool::builtin();
        let renderer = CardRenderer::new(&profile, &themes, &assets, RenderContext::new(2026));
        renderer.render_front(student, university, None).unwrap()
    }

    #[test]
    fn test_table_has_nine_rows_in_order() {
        let tree = render(&student(), &university());
        let table = tree.find("data_table").unwrap();
        let keys: Vec<_> = table.children.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "row.full_name",
                "row.birth",
                "row.student_number",
                "row.faculty",
                "row.program",
                "row.level",
                "row.academic_year",
                "row.validity_period",
                "row.status",
            ]
        );
        assert_eq!(tree.text_of("row.birth.value"), Some("Temanggung, 10 November 2005"));
        assert_eq!(tree.text_of("row.status.value"), Some("Mahasiswa Aktif"));
        assert_eq!(tree.text_of("row.full_name.label"), Some("Nama Lengkap"));
    }

    #[test]
    fn test_rows_follow_table_geometry() {
        let profile = LayoutProfile::standard();
        let tree = render(&student(), &university());
        for (i, field) in FrontField::ALL.iter().enumerate() {
            let row = tree.find(&format!("row.{}", field.key())).unwrap();
            assert_eq!(row.frame, profile.front.table.row_frame(i));
        }
    }

    #[test]
    fn test_barcode_height_from_profile() {
        let mut profile = LayoutProfile::standard();
        profile.front.barcode_height = 20.0;
        let themes = ThemeSet::builtin();
        let assets = AssetPool::builtin();
        let renderer = CardRenderer::new(&profile, &themes, &assets, RenderContext::new(2026));
        let tree = renderer.render_front(&student(), &university(), None).unwrap();
        match &tree.find("barcode").unwrap().content {
            NodeContent::Barcode(spec) => assert_eq!(spec.height, 20.0),
            other => panic!("expected barcode, got {other:?}"),
        }
    }

    #[test]
    fn test_university_name_normalized() {
        let tree = render(&student(), &university());
        assert_eq!(tree.text_of("university"), Some(KNOWN_SHORT_NAME));

        let other = UniversityRecord { name: "Universitas Gadjah Mada".into(), ..university() };
        let tree = render(&student(), &other);
        assert_eq!(tree.text_of("university"), Some("Universitas Gadjah Mada"));
    }

    #[test]
    fn test_barcode_from_nim_digits() {
        let tree = render(&student(), &university());
        match &tree.find("barcode").unwrap().content {
            NodeContent::Barcode(spec) => {
                assert_eq!(spec.value, "2148091520822");
                assert_eq!(spec.symbology, Symbology::Code128);
                assert!(!spec.display_value);
            }
            other => panic!("expected barcode, got {other:?}"),
        }
        assert_eq!(tree.text_of("serial"), Some("Serial: 2148091520822"));
    }

    #[test]
    fn test_barcode_prefers_serial_number() {
        let s = StudentRecord { serial_number: "SN-0042-77".into(), ..student() };
        let tree = render(&s, &university());
        match &tree.find("barcode").unwrap().content {
            NodeContent::Barcode(spec) => assert_eq!(spec.value, "004277"),
            other => panic!("expected barcode, got {other:?}"),
        }
        assert_eq!(tree.text_of("serial"), Some("Serial: SN-0042-77"));
    }

    #[test]
    fn test_barcode_placeholder_without_digits() {
        let s = StudentRecord { student_number: String::new(), ..student() };
        let tree = render(&s, &university());
        match &tree.find("barcode").unwrap().content {
            NodeContent::Barcode(spec) => assert_eq!(spec.value, BARCODE_PLACEHOLDER),
            other => panic!("expected barcode, got {other:?}"),
        }
    }

    #[test]
    fn test_qr_payload_fallback() {
        let s = StudentRecord { card_number: String::new(), ..student() };
        let tree = render(&s, &university());
        match &tree.find("qr").unwrap().content {
            NodeContent::QrCode(spec) => {
                assert_eq!(spec.payload, "KTM-21/480915/PA/20822-2026");
                assert_eq!(spec.level, EcLevel::M);
                assert_eq!(spec.size, 55.0);
            }
            other => panic!("expected qr, got {other:?}"),
        }
    }

    #[test]
    fn test_photo_placeholder_same_frame() {
        let without = render(&student(), &university());
        let with_photo = StudentRecord { photo: Some(ImageRef::new("photos/rina.jpg")), ..student() };
        let with = render(&with_photo, &university());

        let a = without.find("photo").unwrap();
        let b = with.find("photo").unwrap();
        assert_eq!(a.frame, b.frame);
        match &a.content {
            NodeContent::ImagePlaceholder { label, .. } => {
                assert_eq!(label.as_ref().map(|l| l.text.as_str()), Some("No Photo"));
            }
            other => panic!("expected placeholder, got {other:?}"),
        }
        assert!(matches!(b.content, NodeContent::Image(_)));
    }

    #[test]
    fn test_signature_rotates_by_index() {
        let tree = render(&student(), &university());
        let pool = AssetPool::builtin();
        match &tree.find("signature").unwrap().content {
            NodeContent::Image(img) => assert_eq!(img.source, pool.signatures[7 % pool.signatures.len()]),
            other => panic!("expected image, got {other:?}"),
        }
        assert_eq!(tree.text_of("advisor"), Some("Dr. Siti Aminah, M.Pd."));
    }

    #[test]
    fn test_logo_only_when_present() {
        let tree = render(&student(), &university());
        assert!(tree.find("logo").is_none());

        let with_logo = UniversityRecord { logo: Some("logos/uny.png".into()), ..university() };
        let tree = render(&student(), &with_logo);
        assert!(tree.find("logo").is_some());
    }

    #[test]
    fn test_academic_year_default() {
        let s = StudentRecord { academic_year: String::new(), ..student() };
        let tree = render(&s, &university());
        assert_eq!(tree.text_of("row.academic_year.value"), Some("2024 - 2028"));
    }

    #[test]
    fn test_long_value_truncated_not_reflowed() {
        let s = StudentRecord {
            program: "Pendidikan Teknik Informatika dan Komputer Konsentrasi Rekayasa Perangkat Lunak".into(),
            ..student()
        };
        let short = render(&student(), &university());
        let long = render(&s, &university());
        let node = long.find("row.program.value").unwrap();
        assert_eq!(node.frame, short.find("row.program.value").unwrap().frame);
        match &node.content {
            NodeContent::Text(run) => assert!(run.truncated),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_pool_is_fatal() {
        let profile = LayoutProfile::standard();
        let themes = ThemeSet::builtin();
        let assets = AssetPool::new(vec![], None);
        let renderer = CardRenderer::new(&profile, &themes, &assets, RenderContext::new(2026));
        let err = renderer.render_front(&student(), &university(), None).unwrap_err();
        assert_eq!(err, ConfigError::EmptySignaturePool);
    }
}
