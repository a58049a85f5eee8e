//! Layout Tree - Positioned Regions Prior to Rasterization
//!
//! The tree is plain data. A presentation layer turns it into pixels.

use serde::{Deserialize, Serialize};

use crate::assets::ImageRef;
use crate::theme::Fill;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardFace {
    Front,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height
    }
}

/// Pixel rectangle in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutFrame {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl LayoutFrame {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Shrink by per-edge insets.
    pub fn inset(&self, top: f32, right: f32, bottom: f32, left: f32) -> LayoutFrame {
        LayoutFrame {
            left: self.left + left,
            top: self.top + top,
            width: (self.width - left - right).max(0.0),
            height: (self.height - top - bottom).max(0.0),
        }
    }

    /// True when `self` lies fully inside a canvas of `size`.
    pub fn fits_within(&self, size: Size) -> bool {
        self.left >= 0.0
            && self.top >= 0.0
            && self.width >= 0.0
            && self.height >= 0.0
            && self.right() <= size.width
            && self.bottom() <= size.height
    }

    /// Whether `other` lies entirely inside this frame.
    pub fn contains(&self, other: &LayoutFrame) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    pub text: String,
    pub font_size: f32,
    pub font_weight: u16,
    pub color: String,
    pub align: TextAlign,
    pub uppercase: bool,
    pub letter_spacing: f32,
    /// Set when the text was cut to fit its frame.
    pub truncated: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectFit {
    #[default]
    Contain,
    Cover,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageContent {
    pub source: ImageRef,
    pub fit: ObjectFit,
    pub opacity: f32,
    pub circular: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Symbology {
    Code128,
}

/// Input for the barcode encoding service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarcodeSpec {
    pub value: String,
    pub symbology: Symbology,
    pub bar_width: f32,
    pub height: f32,
    pub display_value: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EcLevel {
    L,
    M,
    Q,
    H,
}

/// Input for the QR encoding service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrSpec {
    pub payload: String,
    pub size: f32,
    pub level: EcLevel,
    pub foreground: String,
    pub background: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Border {
    pub width: f32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeContent {
    /// Grouping region, optionally painted.
    Block {
        fill: Option<Fill>,
        border: Option<Border>,
        corner_radius: f32,
        opacity: f32,
    },
    Text(TextRun),
    Image(ImageContent),
    /// Stand-in for an absent image, occupying the same frame.
    ImagePlaceholder { label: Option<TextRun>, fill: Fill, border: Option<Border>, circular: bool },
    Barcode(BarcodeSpec),
    QrCode(QrSpec),
    Rule { color: String, thickness: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    pub id: String,
    pub frame: LayoutFrame,
    pub content: NodeContent,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayoutNode>,
}

impl LayoutNode {
    pub fn new(id: impl Into<String>, frame: LayoutFrame, content: NodeContent) -> Self {
        Self { id: id.into(), frame, content, children: vec![] }
    }

    pub fn block(id: impl Into<String>, frame: LayoutFrame) -> Self {
        Self::new(
            id,
            frame,
            NodeContent::Block { fill: None, border: None, corner_radius: 0.0, opacity: 1.0 },
        )
    }

    pub fn with_children(mut self, children: Vec<LayoutNode>) -> Self {
        self.children = children;
        self
    }

    /// Set the opacity of a block. Other content is left unchanged.
    pub fn with_opacity(mut self, value: f32) -> Self {
        if let NodeContent::Block { opacity, .. } = &mut self.content {
            *opacity = value;
        }
        self
    }

    /// Depth-first search by region id.
    pub fn find(&self, id: &str) -> Option<&LayoutNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn text(&self) -> Option<&str> {
        match &self.content {
            NodeContent::Text(run) => Some(&run.text),
            _ => None,
        }
    }

    /// Visit this node and all descendants in document order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a LayoutNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutTree {
    pub face: CardFace,
    pub theme_id: String,
    pub canvas: Size,
    /// Printable card-face region within the canvas.
    pub frame: LayoutFrame,
    pub corner_radius: f32,
    pub font_family: String,
    pub background: Fill,
    #[serde(default)]
    pub background_image: Option<ImageRef>,
    pub nodes: Vec<LayoutNode>,
}

impl LayoutTree {
    pub fn find(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.iter().find_map(|n| n.find(id))
    }

    pub fn text_of(&self, id: &str) -> Option<&str> {
        self.find(id).and_then(LayoutNode::text)
    }

    /// Every node of the tree in document order.
    pub fn flatten(&self) -> Vec<&LayoutNode> {
        let mut out = vec![];
        for node in &self.nodes {
            node.walk(&mut |n| out.push(n));
        }
        out
    }
}
