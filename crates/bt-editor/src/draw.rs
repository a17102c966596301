//! Rubber-band drawing of a candidate box.
//!
//! ```text
//!   Idle ──down──▶ Drawing ──move──▶ Drawing
//!                    │
//!                    └──up──▶ PendingTag        (on screen ≥ min × min)
//!                          ▶ Idle + Notice    (too small)
//!                          ▶ Idle             (click without a drag)
//!   Drawing | PendingTag ──cancel──▶ Idle
//! ```
//!
//! Geometry is tracked in image pixels; the size rule is applied to the
//! same rectangle projected back onto the screen.

use bt_core::coords::{CoordinateMapper, NaturalSize, normalize_rect};
use bt_core::model::{BoundingBox, PixelRect};
use bt_render::overlay::GhostKind;

pub const TOO_SMALL_MESSAGE: &str = "Bounding box is too small.";

/// A transient, dismissible message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn too_small() -> Self {
        Self::new(TOO_SMALL_MESSAGE)
    }
}

/// A finished drag waiting for a tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingBox {
    /// Un-normalized candidate in image pixels.
    pub rect: PixelRect,
    /// Natural size at the time the box was drawn.
    pub natural: NaturalSize,
    /// The same rectangle in container pixels, for anchoring the prompt.
    pub screen: PixelRect,
}

impl PendingBox {
    pub fn normalized(&self) -> BoundingBox {
        normalize_rect(&self.rect, self.natural)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DrawState {
    #[default]
    Idle,
    Drawing {
        /// Press position in image pixels.
        anchor: (f64, f64),
        /// `None` until the pointer has moved.
        current: Option<PixelRect>,
    },
    PendingTag(PendingBox),
}

/// What a pointer event did to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOutcome {
    /// Event had no effect in the current state.
    Ignored,
    Started,
    Updated(PixelRect),
    Pending(PendingBox),
    Rejected(Notice),
    /// Back to idle with nothing to report.
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct DrawController {
    state: DrawState,
    min_box_px: f64,
}

impl Default for DrawController {
    fn default() -> Self {
        Self::new(crate::config::MIN_BOX_SCREEN_PX)
    }
}

impl DrawController {
    pub fn new(min_box_px: f64) -> Self {
        Self {
            state: DrawState::Idle,
            min_box_px,
        }
    }

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, DrawState::Idle)
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, DrawState::Drawing { .. })
    }

    pub fn pending(&self) -> Option<&PendingBox> {
        match &self.state {
            DrawState::PendingTag(p) => Some(p),
            _ => None,
        }
    }

    /// The rectangle to show as a ghost, in image pixels.
    pub fn candidate(&self) -> Option<(GhostKind, PixelRect)> {
        match &self.state {
            DrawState::Drawing {
                current: Some(rect),
                ..
            } => Some((GhostKind::Drawing, *rect)),
            DrawState::PendingTag(p) => Some((GhostKind::PendingTag, p.rect)),
            _ => None,
        }
    }

    pub fn pointer_down(&mut self, mapper: &CoordinateMapper, x: f64, y: f64) -> DrawOutcome {
        if matches!(self.state, DrawState::PendingTag(_)) {
            return DrawOutcome::Ignored;
        }
        let Some(anchor) = mapper.to_image_space(x, y) else {
            log::debug!("pointer down before the image has a size");
            return DrawOutcome::Ignored;
        };
        self.state = DrawState::Drawing {
            anchor,
            current: None,
        };
        DrawOutcome::Started
    }

    pub fn pointer_move(&mut self, mapper: &CoordinateMapper, x: f64, y: f64) -> DrawOutcome {
        let DrawState::Drawing { anchor, current } = &mut self.state else {
            return DrawOutcome::Ignored;
        };
        let Some((px, py)) = mapper.to_image_space(x, y) else {
            return DrawOutcome::Ignored;
        };
        let rect = PixelRect::from_corners(anchor.0, anchor.1, px, py);
        *current = Some(rect);
        DrawOutcome::Updated(rect)
    }

    pub fn pointer_up(&mut self, mapper: &CoordinateMapper, x: f64, y: f64) -> DrawOutcome {
        let DrawState::Drawing { anchor, current } = self.state else {
            return DrawOutcome::Ignored;
        };

        // Fold in the release point when it differs from the last move.
        let current = match mapper.to_image_space(x, y) {
            Some((px, py)) if (px, py) != anchor => {
                Some(PixelRect::from_corners(anchor.0, anchor.1, px, py))
            }
            _ => current,
        };

        self.state = DrawState::Idle;
        let Some(rect) = current else {
            return DrawOutcome::Cancelled;
        };

        let screen = mapper.image_rect_to_container(&rect);
        if screen.w < self.min_box_px || screen.h < self.min_box_px {
            log::warn!(
                "rejected {:.1}x{:.1}px box (minimum {}px)",
                screen.w,
                screen.h,
                self.min_box_px
            );
            return DrawOutcome::Rejected(Notice::too_small());
        }

        let pending = PendingBox {
            rect,
            natural: mapper.natural(),
            screen,
        };
        log::debug!("box pending tag: {:?}", pending.rect);
        self.state = DrawState::PendingTag(pending);
        DrawOutcome::Pending(pending)
    }

    /// Abort drawing or discard the pending candidate.
    /// Returns `false` if there was nothing to cancel.
    pub fn cancel(&mut self) -> bool {
        if self.is_idle() {
            return false;
        }
        self.state = DrawState::Idle;
        true
    }

    /// Hand the pending candidate over to tagging and return to idle.
    pub fn take_pending(&mut self) -> Option<PendingBox> {
        match std::mem::take(&mut self.state) {
            DrawState::PendingTag(p) => Some(p),
            other => {
                self.state = other;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bt_core::coords::ContainerRect;
    use pretty_assertions::assert_eq;

    /// 1000×500 image shown at 500×250, container at (50, 10).
    fn mapper() -> CoordinateMapper {
        CoordinateMapper::new(
            ContainerRect {
                left: 50.0,
                top: 10.0,
                width: 500.0,
                height: 250.0,
            },
            NaturalSize::new(1000.0, 500.0),
        )
    }

    #[test]
    fn drag_produces_pending_box() {
        let m = mapper();
        let mut d = DrawController::default();
        assert_eq!(d.pointer_down(&m, 100.0, 60.0), DrawOutcome::Started);
        assert_eq!(
            d.pointer_move(&m, 300.0, 160.0),
            DrawOutcome::Updated(PixelRect::new(100.0, 100.0, 400.0, 200.0))
        );
        let DrawOutcome::Pending(p) = d.pointer_up(&m, 300.0, 160.0) else {
            panic!("expected a pending box");
        };
        assert_eq!(p.screen, PixelRect::new(50.0, 50.0, 200.0, 100.0));
        assert_eq!(p.natural, NaturalSize::new(1000.0, 500.0));
        assert!(d.pending().is_some());
        assert_eq!(d.candidate().map(|c| c.0), Some(GhostKind::PendingTag));
    }

    #[test]
    fn drag_up_and_left_is_normalized() {
        let m = mapper();
        let mut d = DrawController::default();
        d.pointer_down(&m, 300.0, 160.0);
        d.pointer_move(&m, 100.0, 60.0);
        let DrawOutcome::Pending(p) = d.pointer_up(&m, 100.0, 60.0) else {
            panic!("expected a pending box");
        };
        assert_eq!(p.rect, PixelRect::new(100.0, 100.0, 400.0, 200.0));
    }

    #[test]
    fn three_pixel_box_is_rejected() {
        let m = mapper();
        let mut d = DrawController::default();
        d.pointer_down(&m, 100.0, 60.0);
        d.pointer_move(&m, 103.0, 63.0);
        // 6×6 image pixels, but only 3×3 on screen.
        assert_eq!(
            d.pointer_up(&m, 103.0, 63.0),
            DrawOutcome::Rejected(Notice::too_small())
        );
        assert!(d.is_idle());
        assert_eq!(d.candidate(), None);
    }

    #[test]
    fn thin_box_is_rejected_on_either_axis() {
        let m = mapper();
        let mut d = DrawController::default();
        d.pointer_down(&m, 100.0, 60.0);
        assert!(matches!(
            d.pointer_up(&m, 300.0, 62.0),
            DrawOutcome::Rejected(_)
        ));
    }

    #[test]
    fn click_without_drag_is_silent() {
        let m = mapper();
        let mut d = DrawController::default();
        d.pointer_down(&m, 100.0, 60.0);
        assert_eq!(d.pointer_up(&m, 100.0, 60.0), DrawOutcome::Cancelled);
        assert!(d.is_idle());
    }

    #[test]
    fn pending_blocks_new_drags() {
        let m = mapper();
        let mut d = DrawController::default();
        d.pointer_down(&m, 100.0, 60.0);
        d.pointer_up(&m, 200.0, 160.0);
        assert_eq!(d.pointer_down(&m, 10.0, 10.0), DrawOutcome::Ignored);
        assert!(d.pending().is_some());
    }

    #[test]
    fn unknown_size_ignores_pointer() {
        let mut d = DrawController::default();
        let m = CoordinateMapper::default();
        assert_eq!(d.pointer_down(&m, 1.0, 1.0), DrawOutcome::Ignored);
        assert!(d.is_idle());
    }

    #[test]
    fn cancel_and_take_pending() {
        let m = mapper();
        let mut d = DrawController::default();
        assert!(!d.cancel());

        d.pointer_down(&m, 100.0, 60.0);
        assert!(d.cancel());
        assert!(d.is_idle());

        d.pointer_down(&m, 100.0, 60.0);
        d.pointer_up(&m, 200.0, 160.0);
        assert!(d.take_pending().is_some());
        assert!(d.is_idle());
        assert_eq!(d.take_pending(), None);
    }
}
