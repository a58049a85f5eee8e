//! Card Rendering - Shared Renderer State and Node Builders
//!
//! Face-specific passes live in `front` and `back`.

use crate::assets::AssetPool;
use crate::format::truncate_to_width;
use crate::layout::{LayoutFrame, LayoutNode, NodeContent, TextRun};
use crate::model::RenderContext;
use crate::profile::{LayoutProfile, TextSlot};
use crate::theme::ThemeSet;

/// Renders both card faces against one fixed configuration.
///
/// Holds only borrowed, immutable configuration. Every render is a pure
/// function of its arguments and this state.
#[derive(Debug, Clone, Copy)]
pub struct CardRenderer<'a> {
    pub profile: &'a LayoutProfile,
    pub themes: &'a ThemeSet,
    pub assets: &'a AssetPool,
    pub ctx: RenderContext,
}

impl<'a> CardRenderer<'a> {
    pub fn new(
        profile: &'a LayoutProfile,
        themes: &'a ThemeSet,
        assets: &'a AssetPool,
        ctx: RenderContext,
    ) -> Self {
        Self { profile, themes, assets, ctx }
    }
}

pub(crate) fn text_run(slot: &TextSlot, text: &str) -> TextRun {
    let (text, truncated) = truncate_to_width(text, slot.frame.width, slot.font_size);
    if truncated {
        tracing::debug!(text = %text, width = slot.frame.width, "text truncated to region");
    }
    TextRun {
        text,
        font_size: slot.font_size,
        font_weight: slot.font_weight,
        color: slot.color.clone(),
        align: slot.align,
        uppercase: slot.uppercase,
        letter_spacing: slot.letter_spacing,
        truncated,
    }
}

pub(crate) fn text_node(id: &str, slot: &TextSlot, text: &str) -> LayoutNode {
    LayoutNode::new(id, slot.frame, NodeContent::Text(text_run(slot, text)))
}

/// Text node at an explicit frame, inheriting typography from `slot`.
pub(crate) fn text_node_at(id: &str, frame: LayoutFrame, slot: &TextSlot, text: &str) -> LayoutNode {
    let slot = TextSlot { frame, ..slot.clone() };
    text_node(id, &slot, text)
}
