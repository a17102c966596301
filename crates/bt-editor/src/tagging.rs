//! Tag assignment for a pending box.
//!
//! Confirming with a non-blank tag normalizes the candidate, appends it to
//! the working set and grows the vocabulary. A blank tag is a cancel.

use crate::draw::{DrawController, PendingBox};
use bt_core::id::{DraftId, ImageId};
use bt_core::model::Annotation;
use bt_core::tags::TagVocabulary;
use bt_core::working_set::{AnnotationWorkingSet, WorkingSetMutation};
use bt_render::kurbo::Point;

/// The tag input shown next to a pending box.
///
/// Positioned declaratively: `anchor` is the bottom-left corner of the
/// drawn rectangle in container pixels and the host places its input there.
#[derive(Debug, Clone, PartialEq)]
pub struct TagPrompt {
    pub anchor: Point,
    pub input: String,
    pub suggestions: Vec<String>,
}

impl TagPrompt {
    pub fn open(pending: &PendingBox, vocabulary: &TagVocabulary) -> Self {
        let s = pending.screen;
        Self {
            anchor: Point::new(s.x, s.y + s.h),
            input: String::new(),
            suggestions: suggestions(vocabulary, ""),
        }
    }

    /// Update the typed value and refresh autocomplete.
    pub fn set_input(&mut self, input: &str, vocabulary: &TagVocabulary) {
        self.input = input.to_string();
        self.suggestions = suggestions(vocabulary, input);
    }
}

fn suggestions(vocabulary: &TagVocabulary, input: &str) -> Vec<String> {
    vocabulary
        .suggest(input)
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Emitted when a confirmed tag was not yet in the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagEvent {
    NewTag(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TagOutcome {
    /// There was no pending box.
    NothingPending,
    /// Blank tag or explicit cancel; the candidate is gone.
    Cancelled,
    Committed {
        id: DraftId,
        tag: String,
        event: Option<TagEvent>,
    },
}

impl TagOutcome {
    pub fn committed_id(&self) -> Option<DraftId> {
        match self {
            TagOutcome::Committed { id, .. } => Some(*id),
            _ => None,
        }
    }
}

/// Mutable state touched by a confirmation.
pub struct TagTarget<'a> {
    pub image_id: ImageId,
    pub vocabulary: &'a mut TagVocabulary,
    pub working_set: &'a mut AnnotationWorkingSet,
}

/// Confirm the pending box with `tag`.
pub fn confirm(draw: &mut DrawController, tag: Option<&str>, target: TagTarget<'_>) -> TagOutcome {
    let Some(pending) = draw.take_pending() else {
        return TagOutcome::NothingPending;
    };

    let tag = tag.map(str::trim).unwrap_or_default();
    if tag.is_empty() {
        log::debug!("blank tag, candidate discarded");
        return TagOutcome::Cancelled;
    }

    let event = target
        .vocabulary
        .insert(tag)
        .then(|| TagEvent::NewTag(tag.to_string()));

    let annotation = Annotation::draft(target.image_id, pending.normalized(), tag);
    let id = annotation.local_id;
    target
        .working_set
        .apply(WorkingSetMutation::Add { annotation });
    log::info!("tagged {} as {:?} on image {}", id, tag, target.image_id);

    TagOutcome::Committed {
        id,
        tag: tag.to_string(),
        event,
    }
}

/// Discard the pending box without side effects.
pub fn cancel(draw: &mut DrawController) -> TagOutcome {
    match draw.take_pending() {
        Some(_) => TagOutcome::Cancelled,
        None => TagOutcome::NothingPending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bt_core::coords::{ContainerRect, CoordinateMapper, NaturalSize};
    use pretty_assertions::assert_eq;

    fn pending_draw() -> DrawController {
        let m = CoordinateMapper::new(
            ContainerRect {
                left: 50.0,
                top: 10.0,
                width: 500.0,
                height: 250.0,
            },
            NaturalSize::new(1000.0, 500.0),
        );
        let mut d = DrawController::default();
        d.pointer_down(&m, 100.0, 60.0);
        d.pointer_move(&m, 300.0, 160.0);
        d.pointer_up(&m, 300.0, 160.0);
        d
    }

    #[test]
    fn confirm_appends_normalized_annotation() {
        let mut d = pending_draw();
        let mut vocab = TagVocabulary::seeded(["dog"]);
        let mut ws = AnnotationWorkingSet::for_image(ImageId(1), vec![]);

        let out = confirm(
            &mut d,
            Some("cat"),
            TagTarget {
                image_id: ImageId(1),
                vocabulary: &mut vocab,
                working_set: &mut ws,
            },
        );

        assert_eq!(
            out,
            TagOutcome::Committed {
                id: out.committed_id().unwrap(),
                tag: "cat".into(),
                event: Some(TagEvent::NewTag("cat".into())),
            }
        );
        let anns = ws.annotations(ImageId(1));
        assert_eq!(anns.len(), 1);
        let b = anns[0].bbox;
        assert!((b.x - 0.1).abs() < 1e-9 && (b.w - 0.4).abs() < 1e-9);
        assert!(anns[0].needs_create());
        assert_eq!(vocab.len(), 2);
        assert!(d.is_idle());
    }

    #[test]
    fn known_tag_emits_no_event() {
        let mut d = pending_draw();
        let mut vocab = TagVocabulary::seeded(["dog"]);
        let mut ws = AnnotationWorkingSet::new();
        let out = confirm(
            &mut d,
            Some("  dog "),
            TagTarget {
                image_id: ImageId(1),
                vocabulary: &mut vocab,
                working_set: &mut ws,
            },
        );
        assert!(matches!(out, TagOutcome::Committed { event: None, .. }));
        assert_eq!(vocab.len(), 1);
        assert_eq!(ws.annotations(ImageId(1))[0].tag, "dog");
    }

    #[test]
    fn blank_tag_cancels() {
        for tag in [None, Some(""), Some("   ")] {
            let mut d = pending_draw();
            let mut vocab = TagVocabulary::new();
            let mut ws = AnnotationWorkingSet::new();
            let out = confirm(
                &mut d,
                tag,
                TagTarget {
                    image_id: ImageId(1),
                    vocabulary: &mut vocab,
                    working_set: &mut ws,
                },
            );
            assert_eq!(out, TagOutcome::Cancelled);
            assert!(ws.is_empty());
            assert!(vocab.is_empty());
            assert!(d.is_idle());
        }
    }

    #[test]
    fn prompt_anchors_at_bottom_left() {
        let d = pending_draw();
        let vocab = TagVocabulary::seeded(["cat", "car", "dog"]);
        let mut prompt = TagPrompt::open(d.pending().unwrap(), &vocab);
        assert_eq!(prompt.anchor, Point::new(50.0, 150.0));
        assert_eq!(prompt.suggestions, vec!["cat", "car", "dog"]);

        prompt.set_input("CA", &vocab);
        assert_eq!(prompt.suggestions, vec!["cat", "car"]);
        assert_eq!(prompt.input, "CA");
    }

    #[test]
    fn cancel_without_pending() {
        let mut d = DrawController::default();
        assert_eq!(cancel(&mut d), TagOutcome::NothingPending);
        let mut d = pending_draw();
        assert_eq!(cancel(&mut d), TagOutcome::Cancelled);
    }
}
