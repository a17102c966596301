//! Per-image interaction: drawing, tagging, hover and the overlay.
//!
//! The annotator owns only presentation and in-progress state. Committed
//! annotations live in the caller's working set and are passed in.

use crate::config::EditorConfig;
use crate::draw::{DrawController, DrawOutcome, Notice};
use crate::tagging::{self, TagOutcome, TagPrompt, TagTarget};
use bt_core::coords::{ContainerRect, CoordinateMapper, NaturalSize};
use bt_core::id::{DraftId, ImageId};
use bt_core::model::Annotation;
use bt_core::tags::TagVocabulary;
use bt_core::working_set::AnnotationWorkingSet;
use bt_render::hit::{OverlayHit, hit_test, hit_test_box};
use bt_render::overlay::{Affordance, OverlayFrame, OverlayInput, OverlayTheme, render_overlay};

/// What a pointer event asks of the host.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerResponse {
    /// Nothing visible changed.
    Unchanged,
    /// Repaint the overlay.
    Redraw,
    /// A hover button was pressed; the caller performs the action.
    Affordance { id: DraftId, kind: Affordance },
    /// A box is waiting for a tag; show the prompt.
    PromptOpened,
    Rejected(Notice),
}

#[derive(Debug, Clone)]
pub struct Annotator {
    image_id: Option<ImageId>,
    mapper: CoordinateMapper,
    draw: DrawController,
    prompt: Option<TagPrompt>,
    hovered: Option<DraftId>,
    notice: Option<Notice>,
    theme: OverlayTheme,
}

impl Annotator {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            image_id: None,
            mapper: CoordinateMapper::default(),
            draw: DrawController::new(config.min_box_px),
            prompt: None,
            hovered: None,
            notice: None,
            theme: OverlayTheme::default(),
        }
    }

    pub fn image_id(&self) -> Option<ImageId> {
        self.image_id
    }

    /// Switch to another image. Everything transient is dropped and the
    /// natural size is forgotten until the new image reports it.
    pub fn set_image(&mut self, image_id: Option<ImageId>) {
        if self.image_id == image_id {
            return;
        }
        self.image_id = image_id;
        self.mapper.reset_natural_size();
        self.draw.cancel();
        self.prompt = None;
        self.hovered = None;
        self.notice = None;
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn set_container(&mut self, container: ContainerRect) {
        self.mapper.set_container(container);
    }

    pub fn set_natural_size(&mut self, natural: NaturalSize) -> bool {
        self.mapper.set_natural_size(natural)
    }

    pub fn set_theme(&mut self, theme: OverlayTheme) {
        self.theme = theme;
    }

    pub fn draw(&self) -> &DrawController {
        &self.draw
    }

    pub fn prompt(&self) -> Option<&TagPrompt> {
        self.prompt.as_ref()
    }

    pub fn hovered(&self) -> Option<DraftId> {
        self.hovered
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn dismiss_notice(&mut self) -> bool {
        self.notice.take().is_some()
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    pub fn pointer_down(&mut self, annotations: &[Annotation], x: f64, y: f64) -> PointerResponse {
        if self.hovered.is_some() {
            let (cx, cy) = self.mapper.to_container_space(x, y);
            let frame = self.overlay(annotations);
            if let Some(OverlayHit::Affordance { id, kind }) = hit_test(&frame, cx, cy) {
                return PointerResponse::Affordance { id, kind };
            }
        }

        match self.draw.pointer_down(&self.mapper, x, y) {
            DrawOutcome::Started => {
                self.notice = None;
                PointerResponse::Redraw
            }
            _ => PointerResponse::Unchanged,
        }
    }

    pub fn pointer_move(&mut self, annotations: &[Annotation], x: f64, y: f64) -> PointerResponse {
        if self.draw.is_drawing() {
            return match self.draw.pointer_move(&self.mapper, x, y) {
                DrawOutcome::Updated(_) => PointerResponse::Redraw,
                _ => PointerResponse::Unchanged,
            };
        }

        let (cx, cy) = self.mapper.to_container_space(x, y);
        let frame = self.overlay(annotations);
        // Keep the current hover while the pointer is over its buttons,
        // which may sit outside the box.
        let over_buttons = match (frame.hovered(), hit_test(&frame, cx, cy)) {
            (Some(b), Some(OverlayHit::Affordance { id, .. })) => id == b.id,
            _ => false,
        };
        let hovered = if over_buttons {
            self.hovered
        } else {
            hit_test_box(&frame, cx, cy)
        };
        self.set_hovered(hovered)
    }

    pub fn pointer_up(&mut self, vocabulary: &TagVocabulary, x: f64, y: f64) -> PointerResponse {
        match self.draw.pointer_up(&self.mapper, x, y) {
            DrawOutcome::Pending(pending) => {
                self.prompt = Some(TagPrompt::open(&pending, vocabulary));
                PointerResponse::PromptOpened
            }
            DrawOutcome::Rejected(notice) => {
                self.notice = Some(notice.clone());
                PointerResponse::Rejected(notice)
            }
            DrawOutcome::Cancelled => PointerResponse::Redraw,
            _ => PointerResponse::Unchanged,
        }
    }

    /// Pointer left the container: abandon an unfinished drag, drop hover.
    pub fn pointer_leave(&mut self) -> PointerResponse {
        let cancelled = self.draw.is_drawing() && self.draw.cancel();
        let unhovered = self.hovered.take().is_some();
        if cancelled || unhovered {
            PointerResponse::Redraw
        } else {
            PointerResponse::Unchanged
        }
    }

    fn set_hovered(&mut self, hovered: Option<DraftId>) -> PointerResponse {
        if self.hovered == hovered {
            return PointerResponse::Unchanged;
        }
        self.hovered = hovered;
        PointerResponse::Redraw
    }

    /// Forget the hover if it pointed at `id` (after a removal).
    pub fn forget(&mut self, id: DraftId) {
        if self.hovered == Some(id) {
            self.hovered = None;
        }
    }

    // ─── Tagging ─────────────────────────────────────────────────────────

    pub fn set_prompt_input(&mut self, input: &str, vocabulary: &TagVocabulary) -> bool {
        match &mut self.prompt {
            Some(prompt) => {
                prompt.set_input(input, vocabulary);
                true
            }
            None => false,
        }
    }

    /// Confirm the pending box. `None` uses what was typed into the prompt.
    pub fn confirm_tag(
        &mut self,
        tag: Option<&str>,
        vocabulary: &mut TagVocabulary,
        working_set: &mut AnnotationWorkingSet,
    ) -> TagOutcome {
        let prompt = self.prompt.take();
        let Some(image_id) = self.image_id else {
            return tagging::cancel(&mut self.draw);
        };
        let typed = prompt.as_ref().map(|p| p.input.as_str());
        tagging::confirm(
            &mut self.draw,
            tag.or(typed),
            TagTarget {
                image_id,
                vocabulary,
                working_set,
            },
        )
    }

    pub fn cancel_tag(&mut self) -> TagOutcome {
        self.prompt = None;
        tagging::cancel(&mut self.draw)
    }

    /// Escape: close the prompt or abandon the drag.
    pub fn cancel(&mut self) -> bool {
        self.prompt = None;
        self.draw.cancel()
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    pub fn overlay(&self, annotations: &[Annotation]) -> OverlayFrame {
        render_overlay(
            OverlayInput {
                annotations,
                mapper: &self.mapper,
                hovered: self.hovered,
                ghost: self.draw.candidate(),
            },
            &self.theme,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bt_core::model::BoundingBox;
    use pretty_assertions::assert_eq;

    fn annotator() -> Annotator {
        let mut a = Annotator::new(&EditorConfig::default());
        a.set_image(Some(ImageId(1)));
        a.set_container(ContainerRect {
            left: 0.0,
            top: 0.0,
            width: 400.0,
            height: 400.0,
        });
        a.set_natural_size(NaturalSize::new(800.0, 800.0));
        a
    }

    #[test]
    fn full_draw_and_tag_cycle() {
        let mut a = annotator();
        let mut vocab = TagVocabulary::new();
        let mut ws = AnnotationWorkingSet::for_image(ImageId(1), vec![]);

        assert_eq!(a.pointer_down(&[], 40.0, 40.0), PointerResponse::Redraw);
        assert_eq!(a.pointer_move(&[], 140.0, 120.0), PointerResponse::Redraw);
        assert_eq!(a.overlay(&[]).ghost.map(|g| g.dashed), Some(true));
        assert_eq!(a.pointer_up(&vocab, 140.0, 120.0), PointerResponse::PromptOpened);
        assert!(a.prompt().is_some());

        a.set_prompt_input("person", &vocab);
        let out = a.confirm_tag(None, &mut vocab, &mut ws);
        assert!(matches!(out, TagOutcome::Committed { .. }));
        assert!(a.prompt().is_none());
        assert_eq!(ws.annotations(ImageId(1))[0].tag, "person");
        let b = ws.annotations(ImageId(1))[0].bbox;
        let expected = BoundingBox::new(0.1, 0.1, 0.25, 0.2);
        assert!((b.x - expected.x).abs() < 1e-9);
        assert!((b.y - expected.y).abs() < 1e-9);
        assert!((b.w - expected.w).abs() < 1e-9);
        assert!((b.h - expected.h).abs() < 1e-9);
    }

    #[test]
    fn rejection_sets_notice_until_next_drag() {
        let mut a = annotator();
        let vocab = TagVocabulary::new();
        a.pointer_down(&[], 10.0, 10.0);
        let resp = a.pointer_up(&vocab, 12.0, 12.0);
        assert_eq!(resp, PointerResponse::Rejected(Notice::too_small()));
        assert!(a.notice().is_some());

        a.pointer_down(&[], 10.0, 10.0);
        assert!(a.notice().is_none());
    }

    #[test]
    fn hover_tracks_pointer_and_exposes_affordances() {
        let mut a = annotator();
        let anns = vec![Annotation::draft(
            ImageId(1),
            BoundingBox::new(0.25, 0.25, 0.5, 0.5),
            "cat",
        )];
        let id = anns[0].local_id;

        assert_eq!(a.pointer_move(&anns, 200.0, 200.0), PointerResponse::Redraw);
        assert_eq!(a.hovered(), Some(id));

        // Buttons float above the box (y 72..96), outside it.
        assert_eq!(a.pointer_move(&anns, 290.0, 80.0), PointerResponse::Unchanged);
        assert_eq!(a.hovered(), Some(id));
        assert_eq!(
            a.pointer_down(&anns, 290.0, 80.0),
            PointerResponse::Affordance {
                id,
                kind: Affordance::Delete
            }
        );

        assert_eq!(a.pointer_move(&anns, 10.0, 10.0), PointerResponse::Redraw);
        assert_eq!(a.hovered(), None);
    }

    #[test]
    fn switching_image_drops_transient_state() {
        let mut a = annotator();
        let vocab = TagVocabulary::new();
        a.pointer_down(&[], 40.0, 40.0);
        a.pointer_up(&vocab, 140.0, 140.0);
        assert!(a.prompt().is_some());

        a.set_image(Some(ImageId(2)));
        assert!(a.prompt().is_none());
        assert!(a.draw().is_idle());
        assert!(!a.mapper().is_ready());
    }

    #[test]
    fn pointer_leave_abandons_drag() {
        let mut a = annotator();
        a.pointer_down(&[], 40.0, 40.0);
        a.pointer_move(&[], 100.0, 100.0);
        assert_eq!(a.pointer_leave(), PointerResponse::Redraw);
        assert!(a.draw().is_idle());
        assert_eq!(a.pointer_leave(), PointerResponse::Unchanged);
    }
}
