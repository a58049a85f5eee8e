//! Back face: terms banner, numbered terms, card metadata, signature, seal.

use crate::error::ConfigError;
use crate::format::barcode_value;
use crate::layout::{
    BarcodeSpec, Border, CardFace, ImageContent, LayoutFrame, LayoutNode, LayoutTree, NodeContent,
    ObjectFit, Symbology, TextAlign,
};
use crate::model::{StudentRecord, UniversityRecord};
use crate::profile::{TextSlot, UNIVERSITY_PLACEHOLDER};
use crate::render::{text_node, text_node_at, text_run, CardRenderer};
use crate::theme::{resolve_theme, with_alpha, CardTheme, Fill};

const SEAL_LOGO_OPACITY: f32 = 0.5;
const SEAL_PLACEHOLDER_OPACITY: f32 = 0.6;
const SEAL_BORDER_ALPHA: u8 = 0x33;

impl<'a> CardRenderer<'a> {
    pub fn render_back(
        &self,
        student: &StudentRecord,
        university: &UniversityRecord,
        theme: Option<&CardTheme>,
    ) -> Result<LayoutTree, ConfigError> {
        let theme = resolve_theme(theme, self.themes.as_slice())?;
        let signature = self.assets.signature_for(student.signature_index)?;
        let layout = &self.profile.back;
        let text = &self.profile.back_text;
        tracing::debug!(nim = %student.student_number, theme = %theme.id, "rendering back face");

        let mut nodes = Vec::with_capacity(10);

        nodes.push(
            LayoutNode::new(
                "banner",
                layout.banner,
                NodeContent::Block {
                    fill: Some(Fill::Gradient(theme.gradient.clone())),
                    border: None,
                    corner_radius: 0.0,
                    opacity: 1.0,
                },
            )
            .with_children(vec![text_node("banner_title", &layout.banner_title, &text.title)]),
        );

        nodes.push(self.back_terms(university));

        nodes.push(LayoutNode::new(
            "footer_rule",
            layout.footer_rule,
            NodeContent::Rule { color: "#e5e7eb".into(), thickness: layout.footer_rule.height },
        ));
        nodes.push(text_node(
            "card_number",
            &layout.card_number,
            &format!("{}: {}", text.card_number, student.card_number),
        ));
        nodes.push(text_node(
            "issued",
            &layout.issued,
            &format!("{}: {}", text.issued, student.issue_date),
        ));
        nodes.push(LayoutNode::new(
            "barcode",
            layout.barcode,
            NodeContent::Barcode(BarcodeSpec {
                value: barcode_value(&student.card_number),
                symbology: Symbology::Code128,
                bar_width: layout.barcode_bar_width,
                height: layout.barcode_height.min(layout.barcode.height),
                display_value: false,
            }),
        ));

        let block = LayoutFrame::new(
            layout.advisor_caption.frame.left,
            layout.advisor_caption.frame.top,
            layout.advisor_caption.frame.width,
            layout.advisor.frame.bottom() - layout.advisor_caption.frame.top,
        );
        nodes.push(LayoutNode::block("signature_block", block).with_children(vec![
            text_node("advisor_caption", &layout.advisor_caption, &text.advisor_caption),
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
            LayoutNode::new(
                "signature_rule",
                layout.signature_rule,
                NodeContent::Rule { color: "#333333".into(), thickness: layout.signature_rule.height },
            ),
            text_node("advisor", &layout.advisor, &student.advisor_name),
        ]));

        nodes.push(self.back_seal(university, theme));

        nodes.push(LayoutNode::new(
            "bottom_bar",
            layout.bottom_bar,
            NodeContent::Block {
                fill: Some(theme.bottom_bar.clone()),
                border: None,
                corner_radius: 0.0,
                opacity: 1.0,
            },
        ));

        let canvas = LayoutFrame::new(0.0, 0.0, layout.canvas.width, layout.canvas.height);
        let r = layout.corner_radius;
        Ok(LayoutTree {
            face: CardFace::Back,
            theme_id: theme.id.clone(),
            canvas: layout.canvas,
            frame: canvas.inset(r, r, r, r),
            corner_radius: layout.corner_radius,
            font_family: layout.font_family.clone(),
            background: Fill::solid(&layout.background_color),
            background_image: None,
            nodes,
        })
    }

    fn back_terms(&self, university: &UniversityRecord) -> LayoutNode {
        let layout = &self.profile.back;
        let slot = TextSlot {
            frame: layout.terms,
            font_size: layout.term_font_size,
            font_weight: 400,
            align: TextAlign::Left,
            letter_spacing: 0.0,
            uppercase: false,
            color: layout.term_color.clone(),
        };
        let marker_slot = TextSlot { align: TextAlign::Right, ..slot.clone() };
        let text_left = layout.terms.left + layout.term_marker_width;
        let text_width = (layout.terms.width - layout.term_marker_width).max(0.0);

        let items = self
            .profile
            .back_text
            .terms
            .iter()
            .enumerate()
            .map(|(i, term)| {
                let row = layout.term_frame(i);
                let top = row.top;
                let n = i + 1;
                let statement = if i == 0 {
                    term.replace(UNIVERSITY_PLACEHOLDER, &university.name)
                } else {
                    term.clone()
                };
                let marker = LayoutFrame::new(layout.terms.left, top, layout.term_marker_width, layout.term_height);
                let body = LayoutFrame::new(text_left, top, text_width, layout.term_height);
                LayoutNode::block(format!("term.{}", n), row).with_children(vec![
                    text_node_at(&format!("term.{}.marker", n), marker, &marker_slot, &format!("{}.", n)),
                    text_node_at(&format!("term.{}.text", n), body, &slot, &statement),
                ])
            })
            .collect();

        LayoutNode::block("terms", layout.terms).with_children(items)
    }

    fn back_seal(&self, university: &UniversityRecord, theme: &CardTheme) -> LayoutNode {
        let layout = &self.profile.back;
        if let Some(logo) = &university.logo {
            return LayoutNode::new(
                "seal",
                layout.seal,
                NodeContent::Image(ImageContent {
                    source: logo.clone(),
                    fit: ObjectFit::Cover,
                    opacity: SEAL_LOGO_OPACITY,
                    circular: true,
                }),
            );
        }

        let label = TextSlot {
            frame: layout.seal,
            font_size: layout.seal_font_size,
            font_weight: 600,
            align: TextAlign::Center,
            letter_spacing: 0.0,
            uppercase: false,
            color: theme.accent_color.clone(),
        };
        let placeholder = LayoutNode::new(
            "seal",
            layout.seal,
            NodeContent::ImagePlaceholder {
                label: Some(text_run(&label, &self.profile.back_text.logo_placeholder)),
                fill: Fill::solid(&theme.photo_bg),
                border: Some(Border {
                    width: 1.0,
                    color: with_alpha(&theme.photo_border, SEAL_BORDER_ALPHA),
                }),
                circular: true,
            },
        );
        LayoutNode::block("seal_group", layout.seal)
            .with_opacity(SEAL_PLACEHOLDER_OPACITY)
            .with_children(vec![placeholder])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetPool;
    use crate::format::BARCODE_PLACEHOLDER;
    use crate::model::RenderContext;
    use crate::profile::{LayoutProfile, TERM_COUNT};
    use crate::theme::ThemeSet;

    fn student() -> StudentRecord {
        StudentRecord {
            full_name: "Budi Santoso".into(),
            student_number: "22105241033".into(),
            card_number: "KTM-2022-0815".into(),
            advisor_name: "Drs. Hartono, M.T.".into(),
            signature_index: 3,
            issue_date: "12 September 2022".into(),
            ..StudentRecord::default()
        }
    }

    fn university() -> UniversityRecord {
        UniversityRecord {
            name: "Universitas Negeri Yogyakarta".into(),
            address: "Jl. Colombo No. 1".into(),
            logo: None,
        }
    }

    fn render_with(theme: Option<&CardTheme>, student: &StudentRecord, university: &UniversityRecord) -> LayoutTree {
        let profile = LayoutProfile::standard();
        let themes = ThemeSet::builtin();
        let assets = AssetPool::builtin();
        let renderer = CardRenderer::new(&profile, &themes, &assets, RenderContext::new(2026));
        renderer.render_back(student, university, theme).unwrap()
    }

    #[test]
    fn test_six_terms_with_university_in_first() {
        let tree = render_with(None, &student(), &university());
        let terms = tree.find("terms").unwrap();
        assert_eq!(terms.children.len(), 6);
        assert_eq!(
            tree.text_of("term.1.text"),
            Some("Kartu ini merupakan identitas resmi mahasiswa Universitas Negeri Yogyakarta.")
        );
        assert_eq!(tree.text_of("term.6.marker"), Some("6."));
        assert_eq!(
            tree.text_of("term.2.text"),
            Some("Kartu ini tidak dapat dipindahtangankan kepada pihak lain.")
        );
    }

    #[test]
    fn test_terms_follow_profile_geometry() {
        let profile = LayoutProfile::standard();
        let tree = render_with(None, &student(), &university());
        for i in 0..TERM_COUNT {
            let term = tree.find(&format!("term.{}", i + 1)).unwrap();
            assert_eq!(term.frame, profile.back.term_frame(i));
        }
        match &tree.find("barcode").unwrap().content {
            NodeContent::Barcode(spec) => assert_eq!(spec.height, profile.back.barcode_height),
            other => panic!("expected barcode, got {other:?}"),
        }
    }

    #[test]
    fn test_footer_metadata() {
        let tree = render_with(None, &student(), &university());
        assert_eq!(tree.text_of("card_number"), Some("No. Kartu: KTM-2022-0815"));
        assert_eq!(tree.text_of("issued"), Some("Diterbitkan: 12 September 2022"));
        match &tree.find("barcode").unwrap().content {
            NodeContent::Barcode(spec) => assert_eq!(spec.value, "20220815"),
            other => panic!("expected barcode, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_card_number_placeholder_barcode() {
        let s = StudentRecord { card_number: String::new(), ..student() };
        let tree = render_with(None, &s, &university());
        match &tree.find("barcode").unwrap().content {
            NodeContent::Barcode(spec) => assert_eq!(spec.value, BARCODE_PLACEHOLDER),
            other => panic!("expected barcode, got {other:?}"),
        }
    }

    #[test]
    fn test_theme_drives_banner_and_bar() {
        let themes = ThemeSet::builtin();
        let green = themes.find("green").unwrap();
        let tree = render_with(Some(green), &student(), &university());
        assert_eq!(tree.theme_id, "green");
        match &tree.find("banner").unwrap().content {
            NodeContent::Block { fill: Some(Fill::Gradient(g)), .. } => assert_eq!(g, &green.gradient),
            other => panic!("expected gradient banner, got {other:?}"),
        }
        match &tree.find("bottom_bar").unwrap().content {
            NodeContent::Block { fill: Some(fill), .. } => assert_eq!(fill, &green.bottom_bar),
            other => panic!("expected bar, got {other:?}"),
        }
    }

    #[test]
    fn test_seal_placeholder_uses_theme() {
        let tree = render_with(None, &student(), &university());
        let blue = ThemeSet::builtin().as_slice()[0].clone();
        match &tree.find("seal").unwrap().content {
            NodeContent::ImagePlaceholder { label, fill, border, circular } => {
                let label = label.as_ref().unwrap();
                assert_eq!(label.text, "LOGO");
                assert_eq!(label.color, blue.accent_color);
                assert_eq!(fill, &Fill::solid(&blue.photo_bg));
                assert_eq!(border.as_ref().unwrap().color, format!("{}33", blue.photo_border));
                assert!(circular);
            }
            other => panic!("expected placeholder, got {other:?}"),
        }
    }

    #[test]
    fn test_seal_logo_when_present() {
        let u = UniversityRecord { logo: Some("logos/uny.png".into()), ..university() };
        let tree = render_with(None, &student(), &u);
        assert!(tree.find("seal_group").is_none());
        match &tree.find("seal").unwrap().content {
            NodeContent::Image(img) => {
                assert!(img.circular);
                assert_eq!(img.opacity, 0.5);
            }
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[test]
    fn test_signature_block() {
        let tree = render_with(None, &student(), &university());
        assert_eq!(tree.text_of("advisor_caption"), Some("Dosen Wali,"));
        assert_eq!(tree.text_of("advisor"), Some("Drs. Hartono, M.T."));
        assert!(tree.find("signature_rule").is_some());
    }
}
