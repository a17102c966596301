//! Editor tuning knobs.

use bt_core::wire::UNTAGGED;

/// Minimum on-screen width and height of a drawn box, in CSS pixels.
pub const MIN_BOX_SCREEN_PX: f64 = 5.0;

/// Settings shared by the annotator and the workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Boxes narrower or shorter than this on screen are rejected.
    pub min_box_px: f64,
    /// Tag sent for batch drafts that were never tagged.
    pub fallback_tag: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_box_px: MIN_BOX_SCREEN_PX,
            fallback_tag: UNTAGGED.to_string(),
        }
    }
}
