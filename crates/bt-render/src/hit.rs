//! Hit testing: container point → box or affordance lookup.
//!
//! Walks the overlay front-to-back (reverse paint order) so the topmost box
//! wins when boxes overlap.

use crate::overlay::{Affordance, OverlayFrame};
use bt_core::id::DraftId;
use kurbo::Point;

/// What a container-space point landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayHit {
    /// One of the hovered box's buttons.
    Affordance { id: DraftId, kind: Affordance },
    /// The body of a box.
    Box(DraftId),
}

impl OverlayHit {
    pub fn id(&self) -> DraftId {
        match self {
            OverlayHit::Affordance { id, .. } | OverlayHit::Box(id) => *id,
        }
    }
}

/// Find what is under `(x, y)` in container pixels.
///
/// Affordance buttons are checked first: they float outside their box and
/// must stay clickable even where they overlap a neighbour.
pub fn hit_test(frame: &OverlayFrame, x: f64, y: f64) -> Option<OverlayHit> {
    let p = Point::new(x, y);

    for b in frame.boxes.iter().rev() {
        if let Some(button) = b.affordances.iter().find(|btn| contains(btn.rect, p)) {
            return Some(OverlayHit::Affordance {
                id: b.id,
                kind: button.kind,
            });
        }
    }

    frame
        .boxes
        .iter()
        .rev()
        .find(|b| contains(b.rect, p))
        .map(|b| OverlayHit::Box(b.id))
}

/// Topmost box under the point, ignoring affordances (used for hover).
pub fn hit_test_box(frame: &OverlayFrame, x: f64, y: f64) -> Option<DraftId> {
    let p = Point::new(x, y);
    frame
        .boxes
        .iter()
        .rev()
        .find(|b| contains(b.rect, p))
        .map(|b| b.id)
}

/// Edge-inclusive containment, so a pointer resting on a 2px stroke counts.
fn contains(rect: kurbo::Rect, p: Point) -> bool {
    p.x >= rect.x0 && p.x <= rect.x1 && p.y >= rect.y0 && p.y <= rect.y1
}
