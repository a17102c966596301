//! Annotation overlay: working set + coordinate mapper → drawable boxes.
//!
//! Pure function of its inputs. Hover is presentation state owned by the
//! caller; it only changes styling and reveals the edit/delete buttons and
//! never feeds back into the annotation data.

use bt_core::coords::CoordinateMapper;
use bt_core::id::DraftId;
use bt_core::model::{Annotation, PixelRect};
use kurbo::Rect;
use smallvec::SmallVec;

/// Size of one affordance button (square), in container pixels.
pub const AFFORDANCE_SIZE: f64 = 24.0;
/// Gap between the box edge and its affordance bar.
pub const AFFORDANCE_GAP: f64 = 4.0;

/// Theme-dependent colors for the overlay.
#[derive(Debug, Clone)]
pub struct OverlayTheme {
    pub box_stroke: &'static str,
    pub hover_stroke: &'static str,
    pub hover_fill: &'static str,
    pub drawing_stroke: &'static str,
    pub pending_stroke: &'static str,
    pub label_bg: &'static str,
    pub label_text: &'static str,
    pub affordance_bg: &'static str,
    pub edit_icon: &'static str,
    pub delete_icon: &'static str,
    pub stroke_width: f64,
}

impl OverlayTheme {
    /// High-contrast palette for photos on a light page.
    pub fn light() -> Self {
        Self {
            box_stroke: "#32CD32",
            hover_stroke: "#FF3B30",
            hover_fill: "rgba(255, 59, 48, 0.08)",
            drawing_stroke: "#FFD60A",
            pending_stroke: "#FFD60A",
            label_bg: "rgba(0, 0, 0, 0.5)",
            label_text: "#FFFFFF",
            affordance_bg: "rgba(0, 0, 0, 0.7)",
            edit_icon: "#FFFFFF",
            delete_icon: "#FF3B30",
            stroke_width: 2.0,
        }
    }

    /// Same semantics, slightly muted for dark surroundings.
    pub fn dark() -> Self {
        Self {
            box_stroke: "#30D158",
            hover_stroke: "#FF453A",
            hover_fill: "rgba(255, 69, 58, 0.10)",
            drawing_stroke: "#FFD60A",
            pending_stroke: "#FFD60A",
            label_bg: "rgba(28, 28, 30, 0.75)",
            label_text: "#F2F2F7",
            affordance_bg: "rgba(28, 28, 30, 0.85)",
            edit_icon: "#F2F2F7",
            delete_icon: "#FF453A",
            stroke_width: 2.0,
        }
    }
}

impl Default for OverlayTheme {
    fn default() -> Self {
        Self::light()
    }
}

/// Buttons revealed on the hovered box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    Edit,
    Delete,
}

impl Affordance {
    pub fn as_str(self) -> &'static str {
        match self {
            Affordance::Edit => "edit",
            Affordance::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AffordanceButton {
    pub kind: Affordance,
    pub rect: Rect,
}

/// One committed annotation, positioned in container pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayBox {
    pub id: DraftId,
    pub rect: Rect,
    pub label: String,
    pub hovered: bool,
    pub stroke: &'static str,
    pub fill: Option<&'static str>,
    pub affordances: SmallVec<[AffordanceButton; 2]>,
}

/// Transient rectangles that are not (yet) annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GhostKind {
    /// Rubber band while the pointer is held down (dashed).
    Drawing,
    /// Finished candidate waiting for a tag (solid).
    PendingTag,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayGhost {
    pub kind: GhostKind,
    pub rect: Rect,
    pub stroke: &'static str,
    pub dashed: bool,
}

/// Everything the host needs to draw one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayFrame {
    /// In paint order: later entries are on top.
    pub boxes: Vec<OverlayBox>,
    pub ghost: Option<OverlayGhost>,
}

impl OverlayFrame {
    pub fn hovered(&self) -> Option<&OverlayBox> {
        self.boxes.iter().find(|b| b.hovered)
    }
}

/// Inputs to [`render_overlay`].
#[derive(Debug, Clone, Copy)]
pub struct OverlayInput<'a> {
    pub annotations: &'a [Annotation],
    pub mapper: &'a CoordinateMapper,
    pub hovered: Option<DraftId>,
    /// Candidate rectangle in *image* pixels, if one is being drawn or tagged.
    pub ghost: Option<(GhostKind, PixelRect)>,
}

/// Lay out the overlay for the current working set.
///
/// Returns an empty frame while the natural image size is unknown: there is
/// nothing meaningful to position yet.
pub fn render_overlay(input: OverlayInput<'_>, theme: &OverlayTheme) -> OverlayFrame {
    let mapper = input.mapper;
    if !mapper.is_ready() {
        return OverlayFrame::default();
    }

    let boxes = input
        .annotations
        .iter()
        .map(|a| {
            let rect = to_kurbo(&mapper.to_overlay_rect(&a.bbox));
            let hovered = input.hovered == Some(a.local_id);
            OverlayBox {
                id: a.local_id,
                rect,
                label: a.tag.clone(),
                hovered,
                stroke: if hovered {
                    theme.hover_stroke
                } else {
                    theme.box_stroke
                },
                fill: hovered.then_some(theme.hover_fill),
                affordances: if hovered {
                    affordance_bar(rect)
                } else {
                    SmallVec::new()
                },
            }
        })
        .collect();

    let ghost = input.ghost.map(|(kind, image_rect)| {
        let rect = to_kurbo(&mapper.image_rect_to_container(&image_rect));
        match kind {
            GhostKind::Drawing => OverlayGhost {
                kind,
                rect,
                stroke: theme.drawing_stroke,
                dashed: true,
            },
            GhostKind::PendingTag => OverlayGhost {
                kind,
                rect,
                stroke: theme.pending_stroke,
                dashed: false,
            },
        }
    });

    OverlayFrame { boxes, ghost }
}

/// Edit + delete buttons anchored to the top-right corner, above the box
/// when there is room and inside it otherwise.
fn affordance_bar(rect: Rect) -> SmallVec<[AffordanceButton; 2]> {
    let top = if rect.y0 >= AFFORDANCE_SIZE + AFFORDANCE_GAP {
        rect.y0 - AFFORDANCE_SIZE - AFFORDANCE_GAP
    } else {
        rect.y0 + AFFORDANCE_GAP
    };
    let delete_x = rect.x1 - AFFORDANCE_SIZE;
    let edit_x = delete_x - AFFORDANCE_SIZE;

    let mut bar = SmallVec::new();
    bar.push(AffordanceButton {
        kind: Affordance::Edit,
        rect: Rect::from_origin_size((edit_x, top), (AFFORDANCE_SIZE, AFFORDANCE_SIZE)),
    });
    bar.push(AffordanceButton {
        kind: Affordance::Delete,
        rect: Rect::from_origin_size((delete_x, top), (AFFORDANCE_SIZE, AFFORDANCE_SIZE)),
    });
    bar
}

pub fn to_kurbo(r: &PixelRect) -> Rect {
    Rect::from_origin_size((r.x, r.y), (r.w, r.h))
}
