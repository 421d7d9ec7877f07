//! Image hover preview
//!
//! Hovering an image while the link modifier is held shows a bounded preview
//! above it. The modifier state comes in as a [`ModifierState`] capability,
//! usually a [`KeyStateObserver`](super::KeyStateObserver) owned by the view.

use log::debug;

use super::link_url::strip_angle_brackets;
use super::ModifierState;
use crate::config::Settings;
use crate::markdown::{NodeKind, SyntaxTree};

/// Tooltip the host should show for a hovered image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTooltip {
    /// Document offset the tooltip is positioned against (the image start)
    pub anchor: usize,
    /// Image source, without `<...>` wrapping
    pub url: String,
    /// Alt text between `![` and `]`
    pub alt: String,
    /// Place the tooltip above the anchor
    pub above: bool,
    pub max_width: f32,
    pub max_height: f32,
}

/// Resolve the hover preview for `pos`, if any.
///
/// Returns `None` when the modifier is not held, when `pos` is not inside an
/// image, or when the image has no inline destination.
pub fn image_hover(
    tree: &SyntaxTree,
    text: &str,
    pos: usize,
    modifier: &dyn ModifierState,
    settings: &Settings,
) -> Option<ImageTooltip> {
    if !modifier.is_modifier_pressed() {
        return None;
    }
    let image = tree.ancestor_at(pos, |kind| *kind == NodeKind::Image)?;
    let url = image.child(&NodeKind::Url)?;
    let raw = text.get(url.span())?;
    let source = strip_angle_brackets(raw).trim();
    if source.is_empty() {
        return None;
    }

    // Alt text runs from after `![` to the `](` mark
    let alt = image
        .children_of(&NodeKind::LinkMark)
        .nth(1)
        .and_then(|mark| text.get(image.start + 2..mark.start))
        .unwrap_or("")
        .to_string();

    debug!("Image preview for {} at {}", source, image.start);
    Some(ImageTooltip {
        anchor: image.start,
        url: source.to_string(),
        alt,
        above: true,
        max_width: settings.image_preview_max_width,
        max_height: settings.image_preview_max_height,
    })
}
