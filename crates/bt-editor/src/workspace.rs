//! Page-level controller.
//!
//! Owns the working set, the tag vocabulary and (in batch mode) the image
//! queue, and routes input to the [`Annotator`] of the image on screen.
//! Network I/O happens elsewhere: every request is issued with a
//! [`RequestTicket`] from this controller and its result is applied back
//! through one of the `apply_*` / `finish_*` methods, which drop results
//! whose ticket went stale.

use crate::annotator::{Annotator, PointerResponse};
use crate::config::EditorConfig;
use crate::confirm::Confirmation;
use crate::draw::Notice;
use crate::input::InputEvent;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::tagging::TagOutcome;
use bt_core::generation::{GenerationCounter, RequestTicket};
use bt_core::id::{DraftId, ImageId, RemoteId};
use bt_core::model::{Annotation, ImageRecord};
use bt_core::queue::ImageQueue;
use bt_core::tags::TagVocabulary;
use bt_core::working_set::{AnnotationWorkingSet, WorkingSetMutation};
use bt_render::overlay::{Affordance, OverlayFrame};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Edit the annotations of one image and commit them.
    Single,
    /// Draft boxes across the unannotated queue and submit them together.
    Batch,
}

/// Irreversible actions gated behind a confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    ClearImage(ImageId),
    DiscardDrafts,
}

/// What an input event asks of the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Unchanged,
    Redraw,
    PromptOpened,
    Rejected(Notice),
    Tagged(TagOutcome),
    /// The edit button was pressed; ask for a new tag and call `retag`.
    RetagRequested(DraftId),
    Removed(DraftId),
    /// The image on screen changed; load its URL.
    Navigated(ImageId),
    ConfirmRequested(PendingAction),
    SubmitRequested,
}

impl From<PointerResponse> for Response {
    fn from(r: PointerResponse) -> Self {
        match r {
            PointerResponse::Unchanged => Response::Unchanged,
            PointerResponse::Redraw => Response::Redraw,
            PointerResponse::PromptOpened => Response::PromptOpened,
            PointerResponse::Rejected(n) => Response::Rejected(n),
            PointerResponse::Affordance { id, kind } => match kind {
                Affordance::Edit => Response::RetagRequested(id),
                Affordance::Delete => Response::Removed(id),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Workspace {
    mode: Mode,
    config: EditorConfig,
    /// Single mode: the image being edited, once loaded.
    image: Option<ImageRecord>,
    queue: ImageQueue,
    working_set: AnnotationWorkingSet,
    vocabulary: TagVocabulary,
    annotator: Annotator,
    generation: GenerationCounter,
    submitting: bool,
    /// Annotations captured by the submission in flight. Edits made
    /// meanwhile are not in it and survive `finish_batch`.
    in_flight: HashSet<DraftId>,
    confirmation: Confirmation<PendingAction>,
}

impl Workspace {
    pub fn new(mode: Mode, config: EditorConfig) -> Self {
        Self {
            mode,
            annotator: Annotator::new(&config),
            config,
            image: None,
            queue: ImageQueue::default(),
            working_set: AnnotationWorkingSet::new(),
            vocabulary: TagVocabulary::new(),
            generation: GenerationCounter::new(),
            submitting: false,
            in_flight: HashSet::new(),
            confirmation: Confirmation::default(),
        }
    }

    pub fn single(config: EditorConfig) -> Self {
        Self::new(Mode::Single, config)
    }

    pub fn batch(config: EditorConfig) -> Self {
        Self::new(Mode::Batch, config)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn working_set(&self) -> &AnnotationWorkingSet {
        &self.working_set
    }

    pub fn vocabulary(&self) -> &TagVocabulary {
        &self.vocabulary
    }

    pub fn annotator(&self) -> &Annotator {
        &self.annotator
    }

    /// Layout and theme updates go straight to the annotator.
    pub fn annotator_mut(&mut self) -> &mut Annotator {
        &mut self.annotator
    }

    pub fn queue(&self) -> &ImageQueue {
        &self.queue
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn current_image_id(&self) -> Option<ImageId> {
        match self.mode {
            Mode::Single => self.annotator.image_id(),
            Mode::Batch => self.queue.current_id(),
        }
    }

    pub fn current_image(&self) -> Option<&ImageRecord> {
        match self.mode {
            Mode::Single => self.image.as_ref(),
            Mode::Batch => self.queue.current(),
        }
    }

    /// Annotations of the image on screen.
    pub fn annotations(&self) -> &[Annotation] {
        match self.current_image_id() {
            Some(id) => self.working_set.annotations(id),
            None => &[],
        }
    }

    /// `(i, n)` for the "i of n" heading; `(0, 0)` with nothing queued.
    pub fn position(&self) -> (usize, usize) {
        match self.mode {
            Mode::Single => {
                let n = usize::from(self.image.is_some());
                (n, n)
            }
            Mode::Batch => self.queue.position(),
        }
    }

    pub fn overlay(&self) -> OverlayFrame {
        self.annotator.overlay(self.annotations())
    }

    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.generation.is_current(ticket)
    }

    // ─── Loading ─────────────────────────────────────────────────────────

    /// Start editing `image_id`. Fetch the image and its annotations with
    /// the returned ticket.
    pub fn open_image(&mut self, image_id: ImageId) -> RequestTicket {
        self.generation.advance(Some(image_id));
        self.annotator.set_image(Some(image_id));
        self.working_set.reset();
        self.image = None;
        self.confirmation.dismiss();
        self.generation.ticket()
    }

    pub fn apply_image_load(
        &mut self,
        ticket: RequestTicket,
        image: ImageRecord,
        annotations: Vec<Annotation>,
    ) -> bool {
        if !self.accept(&ticket, "image load") {
            return false;
        }
        log::debug!(
            "loaded image {} with {} annotations",
            image.id,
            annotations.len()
        );
        self.working_set.load_image(image.id, annotations);
        self.image = Some(image);
        true
    }

    /// Merge tags fetched from the remote store. Returns how many were new.
    pub fn seed_tags<I, S>(&mut self, tags: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vocabulary.extend(tags)
    }

    /// Start (re)loading the unannotated queue.
    pub fn begin_queue_load(&mut self) -> RequestTicket {
        self.generation.advance(None);
        self.annotator.set_image(None);
        self.generation.ticket()
    }

    /// Reload unless that would throw away drafts, in which case a
    /// confirmation is requested and `None` returned.
    pub fn request_reload(&mut self) -> Option<RequestTicket> {
        if self.mode == Mode::Batch && !self.working_set.is_empty() {
            self.confirmation.request(PendingAction::DiscardDrafts);
            return None;
        }
        Some(self.begin_queue_load())
    }

    pub fn apply_queue(&mut self, ticket: RequestTicket, images: Vec<ImageRecord>) -> bool {
        if !self.accept(&ticket, "queue load") {
            return false;
        }
        log::info!("queue loaded: {} images", images.len());
        self.queue.replace(images);
        self.working_set = AnnotationWorkingSet::for_queue(self.queue.ids());
        self.show_current();
        true
    }

    fn accept(&self, ticket: &RequestTicket, what: &str) -> bool {
        let ok = self.generation.is_current(ticket);
        if !ok {
            log::warn!(
                "discarding stale {what} (generation {} != {})",
                ticket.generation.0,
                self.generation.current().0
            );
        }
        ok
    }

    // ─── Navigation ──────────────────────────────────────────────────────

    /// Move to the next queued image. Locked while a submission is running.
    pub fn next(&mut self) -> Option<ImageId> {
        if self.mode != Mode::Batch || self.submitting || !self.queue.next() {
            return None;
        }
        self.show_current()
    }

    pub fn prev(&mut self) -> Option<ImageId> {
        if self.mode != Mode::Batch || self.submitting || !self.queue.prev() {
            return None;
        }
        self.show_current()
    }

    pub fn select(&mut self, image_id: ImageId) -> Option<ImageId> {
        if self.mode != Mode::Batch || self.submitting || !self.queue.select(image_id) {
            return None;
        }
        self.show_current()
    }

    fn show_current(&mut self) -> Option<ImageId> {
        let current = self.queue.current_id();
        self.generation.advance(current);
        self.annotator.set_image(current);
        current
    }

    // ─── Input ───────────────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: &InputEvent) -> Response {
        match event {
            InputEvent::PointerDown { x, y } => self.pointer_down(*x, *y),
            InputEvent::PointerMove { x, y } => self.pointer_move(*x, *y),
            InputEvent::PointerUp { x, y } => self.pointer_up(*x, *y),
            InputEvent::PointerLeave => self.annotator.pointer_leave().into(),
            InputEvent::Key {
                key,
                ctrl,
                shift,
                alt,
                meta,
            } => self.handle_key(key, *ctrl, *shift, *alt, *meta),
        }
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) -> Response {
        let Some(image_id) = self.current_image_id() else {
            return Response::Unchanged;
        };
        let anns = self.working_set.annotations(image_id);
        match Response::from(self.annotator.pointer_down(anns, x, y)) {
            Response::Removed(id) => {
                if self.remove(id) {
                    Response::Removed(id)
                } else {
                    Response::Unchanged
                }
            }
            other => other,
        }
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> Response {
        let Some(image_id) = self.current_image_id() else {
            return Response::Unchanged;
        };
        let anns = self.working_set.annotations(image_id);
        self.annotator.pointer_move(anns, x, y).into()
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) -> Response {
        self.annotator.pointer_up(&self.vocabulary, x, y).into()
    }

    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> Response {
        let Some(action) = ShortcutMap::resolve(key, ctrl, shift, alt, meta) else {
            return Response::Unchanged;
        };

        // The prompt has focus: only confirm and cancel apply.
        if self.annotator.prompt().is_some() {
            return match action {
                ShortcutAction::ConfirmTag => Response::Tagged(self.confirm_tag(None)),
                ShortcutAction::Cancel => Response::Tagged(self.cancel_tag()),
                _ => Response::Unchanged,
            };
        }

        if self.confirmation.is_awaiting() {
            return match action {
                ShortcutAction::ConfirmTag => {
                    self.confirm_pending();
                    Response::Redraw
                }
                ShortcutAction::Cancel => {
                    self.confirmation.dismiss();
                    Response::Redraw
                }
                _ => Response::Unchanged,
            };
        }

        match action {
            ShortcutAction::Cancel => {
                if self.annotator.cancel() {
                    Response::Redraw
                } else {
                    Response::Unchanged
                }
            }
            ShortcutAction::ConfirmTag => Response::Unchanged,
            ShortcutAction::DeleteHovered => match self.annotator.hovered() {
                Some(id) if self.remove(id) => Response::Removed(id),
                _ => Response::Unchanged,
            },
            ShortcutAction::ClearImage => match self.request_clear_image() {
                Some(action) => Response::ConfirmRequested(action),
                None => Response::Unchanged,
            },
            ShortcutAction::NextImage => self.next().map_or(Response::Unchanged, Response::Navigated),
            ShortcutAction::PrevImage => self.prev().map_or(Response::Unchanged, Response::Navigated),
            ShortcutAction::Submit => {
                if self.can_submit() {
                    Response::SubmitRequested
                } else {
                    Response::Unchanged
                }
            }
        }
    }

    // ─── Editing ─────────────────────────────────────────────────────────

    pub fn set_prompt_input(&mut self, input: &str) -> bool {
        self.annotator.set_prompt_input(input, &self.vocabulary)
    }

    /// Confirm the pending box; `None` uses the prompt's typed value.
    pub fn confirm_tag(&mut self, tag: Option<&str>) -> TagOutcome {
        self.annotator
            .confirm_tag(tag, &mut self.vocabulary, &mut self.working_set)
    }

    pub fn cancel_tag(&mut self) -> TagOutcome {
        self.annotator.cancel_tag()
    }

    /// Change the tag of a committed box. Blank tags are ignored.
    pub fn retag(&mut self, id: DraftId, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() {
            return false;
        }
        let changed = self.working_set.apply(WorkingSetMutation::Retag {
            id,
            tag: tag.to_string(),
        });
        if changed {
            self.vocabulary.insert(tag);
        }
        changed
    }

    pub fn remove(&mut self, id: DraftId) -> bool {
        self.annotator.forget(id);
        self.working_set.apply(WorkingSetMutation::Remove { id })
    }

    /// Ask before removing every box on the image on screen.
    pub fn request_clear_image(&mut self) -> Option<PendingAction> {
        let image_id = self.current_image_id()?;
        let action = PendingAction::ClearImage(image_id);
        self.confirmation.request(action);
        Some(action)
    }

    pub fn pending_confirmation(&self) -> Option<&PendingAction> {
        self.confirmation.pending()
    }

    /// Carry out the parked action. The caller reloads the queue after
    /// `DiscardDrafts`.
    pub fn confirm_pending(&mut self) -> Option<PendingAction> {
        let action = self.confirmation.confirm()?;
        match action {
            PendingAction::ClearImage(image_id) => {
                let n = self.working_set.clear_image(image_id);
                log::info!("cleared {n} annotations on image {image_id}");
            }
            PendingAction::DiscardDrafts => {
                log::info!("discarding {} drafts", self.working_set.total());
                self.working_set = AnnotationWorkingSet::for_queue(self.queue.ids());
            }
        }
        self.annotator.cancel();
        Some(action)
    }

    pub fn dismiss_pending(&mut self) -> bool {
        self.confirmation.dismiss()
    }

    // ─── Submitting ──────────────────────────────────────────────────────

    /// Single mode commits whatever is loaded (an empty set clears the
    /// image); batch mode needs at least one draft.
    pub fn can_submit(&self) -> bool {
        if self.submitting {
            return false;
        }
        match self.mode {
            Mode::Single => self.image.is_some(),
            Mode::Batch => !self.working_set.is_empty(),
        }
    }

    /// Mark a commit/submission in flight and return its ticket. The
    /// request must be planned from the working set as it is now.
    pub fn begin_submit(&mut self) -> Option<RequestTicket> {
        if !self.can_submit() {
            return None;
        }
        self.submitting = true;
        self.in_flight = self
            .working_set
            .iter()
            .flat_map(|(_, anns)| anns.iter().map(|a| a.local_id))
            .collect();
        Some(self.generation.ticket())
    }

    fn end_submit(&mut self) -> HashSet<DraftId> {
        self.submitting = false;
        std::mem::take(&mut self.in_flight)
    }

    /// Single-image commit succeeded: record the remote ids.
    pub fn finish_commit(&mut self, ticket: RequestTicket, assigned: &[(DraftId, RemoteId)]) -> bool {
        self.end_submit();
        if !self.accept(&ticket, "commit result") {
            return false;
        }
        let n = self.working_set.assign_remote_ids(assigned);
        log::info!("commit applied: {n} remote ids assigned");
        true
    }

    /// Batch submission succeeded: drop the submitted drafts, swap in the
    /// reloaded queue and tags, and start again from the first remaining
    /// image.
    ///
    /// `images` is `None` when the creates went through but the queue
    /// reload failed. The submitted images are then dropped from the
    /// current queue, since they are annotated now.
    ///
    /// Drafts drawn after `begin_submit` are carried over when their image
    /// is still queued.
    pub fn finish_batch(
        &mut self,
        ticket: RequestTicket,
        images: Option<Vec<ImageRecord>>,
        tags: Vec<String>,
    ) -> bool {
        let submitted = self.end_submit();
        if !self.accept(&ticket, "batch result") {
            return false;
        }
        self.vocabulary.extend(tags);

        let previous = std::mem::take(&mut self.working_set);
        let reloaded = images.is_some();
        match images {
            Some(images) => self.queue.replace(images),
            None => {
                let done: HashSet<ImageId> = previous
                    .iter()
                    .filter(|(_, anns)| anns.iter().any(|a| submitted.contains(&a.local_id)))
                    .map(|(image_id, _)| image_id)
                    .collect();
                let remaining = self
                    .queue
                    .images()
                    .iter()
                    .filter(|img| !done.contains(&img.id))
                    .cloned()
                    .collect();
                self.queue.replace(remaining);
            }
        }

        self.working_set = AnnotationWorkingSet::for_queue(self.queue.ids());
        let mut carried = 0;
        for (image_id, anns) in previous.iter() {
            if !self.queue.contains(image_id) {
                continue;
            }
            for a in anns.iter().filter(|a| !submitted.contains(&a.local_id)) {
                self.working_set.add(a.clone());
                carried += 1;
            }
        }
        if carried > 0 {
            log::info!("kept {carried} drafts made during submission");
        }
        self.show_current();
        if !reloaded {
            self.annotator.set_notice(Notice::new(
                "Annotations saved, but the image list could not be reloaded.",
            ));
        }
        true
    }

    /// A commit or submission failed; the working set is left as it was.
    pub fn fail_submit(&mut self, ticket: RequestTicket, message: impl Into<String>) -> bool {
        self.end_submit();
        if !self.accept(&ticket, "failure") {
            return false;
        }
        self.annotator.set_notice(Notice::new(message));
        true
    }
}
