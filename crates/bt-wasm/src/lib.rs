//! WASM bridge for BoxTag: exposes the annotation workspace to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The host page owns the
//! `<img>`, the overlay `<canvas>`, the tag `<input>` and all network
//! requests; every request is issued with a ticket from this bridge and its
//! result is handed back with that ticket so stale results are dropped.

mod json;
mod render2d;

use bt_core::coords::{ContainerRect, NaturalSize};
use bt_core::generation::RequestTicket;
use bt_core::id::{DraftId, ImageId};
use bt_core::model::ImageRecord;
use bt_core::wire::RemoteAnnotation;
use bt_editor::config::EditorConfig;
use bt_editor::workspace::{Mode, Response, Workspace};
use bt_render::overlay::OverlayTheme;
use bt_sync::config::CommitStrategy;
use bt_sync::plan::{plan_batch, plan_reconcile, plan_replace_all};
use json::{AssignedId, BatchPlanView, CommitPlanView, OverlayView};
use serde_json::{Value, json};
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

/// The WASM-facing annotation controller.
///
/// One instance per page: single mode edits one image, batch mode walks
/// the unannotated queue.
#[wasm_bindgen]
pub struct BtCanvas {
    workspace: Workspace,
    strategy: CommitStrategy,
    /// Overlay canvas size, for clearing.
    width: f64,
    height: f64,
    dark_mode: bool,
}

#[wasm_bindgen]
impl BtCanvas {
    #[wasm_bindgen(constructor)]
    pub fn new(batch: bool) -> Self {
        console_error_panic_hook_setup();

        let mode = if batch { Mode::Batch } else { Mode::Single };
        Self {
            workspace: Workspace::new(mode, EditorConfig::default()),
            strategy: CommitStrategy::default(),
            width: 0.0,
            height: 0.0,
            dark_mode: false,
        }
    }

    // ─── Layout ──────────────────────────────────────────────────────────

    /// The image container's bounding client rect. The overlay canvas is
    /// expected to cover it exactly.
    pub fn set_container(&mut self, left: f64, top: f64, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.workspace.annotator_mut().set_container(ContainerRect {
            left,
            top,
            width,
            height,
        });
    }

    /// The `<img>` finished loading. Returns `false` for a zero size.
    pub fn set_natural_size(&mut self, width: f64, height: f64) -> bool {
        self.workspace
            .annotator_mut()
            .set_natural_size(NaturalSize::new(width, height))
    }

    pub fn set_theme(&mut self, is_dark: bool) {
        self.dark_mode = is_dark;
        let theme = if is_dark {
            OverlayTheme::dark()
        } else {
            OverlayTheme::light()
        };
        self.workspace.annotator_mut().set_theme(theme);
    }

    /// `"reconcile"` or `"replace-all"`. Returns `false` for anything else.
    pub fn set_strategy(&mut self, name: &str) -> bool {
        match name.parse::<CommitStrategy>() {
            Ok(strategy) => {
                self.strategy = strategy;
                true
            }
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    // ─── Pointer & keyboard ──────────────────────────────────────────────

    /// Client coordinates. Returns a response JSON (see `handle_key`).
    pub fn handle_pointer_down(&mut self, x: f64, y: f64) -> String {
        respond(&self.workspace.pointer_down(x, y))
    }

    pub fn handle_pointer_move(&mut self, x: f64, y: f64) -> String {
        respond(&self.workspace.pointer_move(x, y))
    }

    pub fn handle_pointer_up(&mut self, x: f64, y: f64) -> String {
        respond(&self.workspace.pointer_up(x, y))
    }

    pub fn handle_pointer_leave(&mut self) -> String {
        let response: Response = self.workspace.annotator_mut().pointer_leave().into();
        respond(&response)
    }

    /// Handle a keyboard event. Returns a JSON string:
    /// `{"kind":"<response>", "changed":bool, ...}`
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> String {
        respond(&self.workspace.handle_key(key, ctrl, shift, alt, meta))
    }

    // ─── Tagging ─────────────────────────────────────────────────────────

    /// The user typed into the tag input. Returns `false` with no prompt.
    pub fn set_prompt_input(&mut self, input: &str) -> bool {
        self.workspace.set_prompt_input(input)
    }

    /// `{"anchor":{"x","y"},"input","suggestions":[...]}` or `null`.
    pub fn prompt_json(&self) -> String {
        self.workspace
            .annotator()
            .prompt()
            .map_or_else(|| "null".to_string(), |p| json::prompt_json(p).to_string())
    }

    /// Confirm the pending box with `tag`, or with the typed input when
    /// `tag` is absent.
    pub fn confirm_tag(&mut self, tag: Option<String>) -> String {
        let outcome = self.workspace.confirm_tag(tag.as_deref());
        json::tag_outcome_json(&outcome).to_string()
    }

    pub fn cancel_tag(&mut self) -> String {
        json::tag_outcome_json(&self.workspace.cancel_tag()).to_string()
    }

    pub fn retag(&mut self, id: &str, tag: &str) -> bool {
        id.parse::<DraftId>()
            .is_ok_and(|id| self.workspace.retag(id, tag))
    }

    pub fn remove(&mut self, id: &str) -> bool {
        id.parse::<DraftId>()
            .is_ok_and(|id| self.workspace.remove(id))
    }

    /// Tags matching `input`, for an input opened outside the draw flow
    /// (retagging).
    pub fn suggest(&self, input: &str) -> String {
        json::to_json(&self.workspace.vocabulary().suggest(input))
    }

    pub fn tags_json(&self) -> String {
        json::to_json(&self.workspace.vocabulary().iter().collect::<Vec<_>>())
    }

    // ─── Confirmations & notices ─────────────────────────────────────────

    /// Ask before clearing the image on screen. Returns the parked action
    /// JSON or `null`.
    pub fn request_clear_image(&mut self) -> String {
        self.workspace
            .request_clear_image()
            .map_or_else(|| "null".to_string(), |a| json::pending_action_json(&a).to_string())
    }

    pub fn pending_confirmation(&self) -> String {
        self.workspace
            .pending_confirmation()
            .map_or_else(|| "null".to_string(), |a| json::pending_action_json(a).to_string())
    }

    /// Carry out the parked action. After `discardDrafts` the host reloads
    /// the queue with `begin_queue_load`.
    pub fn confirm_pending(&mut self) -> String {
        self.workspace
            .confirm_pending()
            .map_or_else(|| "null".to_string(), |a| json::pending_action_json(&a).to_string())
    }

    pub fn dismiss_pending(&mut self) -> bool {
        self.workspace.dismiss_pending()
    }

    pub fn notice(&self) -> Option<String> {
        self.workspace
            .annotator()
            .notice()
            .map(|n| n.message.clone())
    }

    pub fn dismiss_notice(&mut self) -> bool {
        self.workspace.annotator_mut().dismiss_notice()
    }

    // ─── Views ───────────────────────────────────────────────────────────

    /// The overlay frame as JSON, for hosts that draw with the DOM.
    pub fn overlay_json(&self) -> String {
        json::to_json(&OverlayView::from(&self.workspace.overlay()))
    }

    /// Annotations of the image on screen.
    pub fn annotations_json(&self) -> String {
        serde_json::to_string(self.workspace.annotations()).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn current_image_json(&self) -> String {
        json::to_json(&self.workspace.current_image())
    }

    /// `{"index":i,"total":n}` for the "i of n" heading.
    pub fn position(&self) -> String {
        let (index, total) = self.workspace.position();
        json!({ "index": index, "total": total }).to_string()
    }

    /// Render the overlay to a Canvas2D context.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) {
        let theme = if self.dark_mode {
            OverlayTheme::dark()
        } else {
            OverlayTheme::light()
        };
        render2d::render_overlay(ctx, &self.workspace.overlay(), &theme, self.width, self.height);
    }

    // ─── Loading ─────────────────────────────────────────────────────────

    /// Start editing an image. Returns the ticket JSON to hand back with
    /// the fetched image and annotations.
    pub fn open_image(&mut self, image_id: i32) -> String {
        json::to_json(&self.workspace.open_image(ImageId(i64::from(image_id))))
    }

    /// Apply `GET /images/{id}` and `GET /annotations/{id}` results.
    /// Returns `{"ok":true,"applied":bool}` or `{"ok":false,"error":"..."}`.
    pub fn apply_image_load(&mut self, ticket: &str, image: &str, annotations: &str) -> String {
        json::result_json(self.try_apply_image_load(ticket, image, annotations))
    }

    /// Merge a JSON array of tag strings. Returns how many were new.
    pub fn seed_tags(&mut self, tags: &str) -> u32 {
        match json::parse::<Vec<String>>(tags, "tags") {
            Ok(tags) => self.workspace.seed_tags(tags) as u32,
            Err(e) => {
                // Tags only feed autocomplete.
                log::warn!("{e}");
                0
            }
        }
    }

    pub fn begin_queue_load(&mut self) -> String {
        json::to_json(&self.workspace.begin_queue_load())
    }

    /// A ticket, or `null` when drafts would be lost and a confirmation
    /// was requested instead.
    pub fn request_reload(&mut self) -> String {
        json::to_json(&self.workspace.request_reload())
    }

    /// Apply the accumulated `GET /images/mine` pages.
    pub fn apply_queue(&mut self, ticket: &str, images: &str) -> String {
        json::result_json(self.try_apply_queue(ticket, images))
    }

    // ─── Navigation ──────────────────────────────────────────────────────

    pub fn next(&mut self) -> String {
        let response = self
            .workspace
            .next()
            .map_or(Response::Unchanged, Response::Navigated);
        respond(&response)
    }

    pub fn prev(&mut self) -> String {
        let response = self
            .workspace
            .prev()
            .map_or(Response::Unchanged, Response::Navigated);
        respond(&response)
    }

    pub fn select(&mut self, image_id: i32) -> String {
        let response = self
            .workspace
            .select(ImageId(i64::from(image_id)))
            .map_or(Response::Unchanged, Response::Navigated);
        respond(&response)
    }

    // ─── Submitting ──────────────────────────────────────────────────────

    pub fn can_submit(&self) -> bool {
        self.workspace.can_submit()
    }

    pub fn is_submitting(&self) -> bool {
        self.workspace.is_submitting()
    }

    /// Mark a submission in flight. Returns its ticket JSON or `null`.
    pub fn begin_submit(&mut self) -> String {
        json::to_json(&self.workspace.begin_submit())
    }

    /// Requests for committing the image on screen, given its current
    /// remote annotations (`GET /annotations/{id}`).
    pub fn plan_commit(&self, remote: &str) -> String {
        json::result_json(self.try_plan_commit(remote))
    }

    /// Create requests for every draft in the batch.
    pub fn plan_batch(&self) -> String {
        let fallback = &self.workspace.config().fallback_tag;
        json::result_json(
            plan_batch(self.workspace.working_set(), fallback)
                .map_err(|e| e.user_message())
                .and_then(|plan| plan_value(&BatchPlanView::from(plan))),
        )
    }

    /// A commit succeeded. `assigned` is `[{"localId","remoteId"}]` for
    /// kept and created annotations.
    pub fn finish_commit(&mut self, ticket: &str, assigned: &str) -> String {
        json::result_json(self.try_finish_commit(ticket, assigned))
    }

    /// A batch succeeded; `images` is the reloaded queue (`null` if that
    /// fetch failed after the creates went through) and `tags` the
    /// refreshed listing (`[]` if that fetch failed).
    pub fn finish_batch(&mut self, ticket: &str, images: &str, tags: &str) -> String {
        json::result_json(self.try_finish_batch(ticket, images, tags))
    }

    /// A commit or batch failed; `message` is shown as a notice.
    pub fn fail_submit(&mut self, ticket: &str, message: &str) -> String {
        json::result_json(
            json::parse::<RequestTicket>(ticket, "ticket")
                .map(|t| json!({ "applied": self.workspace.fail_submit(t, message) })),
        )
    }
}

impl BtCanvas {
    fn try_apply_image_load(
        &mut self,
        ticket: &str,
        image: &str,
        annotations: &str,
    ) -> Result<Value, String> {
        let ticket: RequestTicket = json::parse(ticket, "ticket")?;
        let image: ImageRecord = json::parse(image, "image")?;
        let remote: Vec<RemoteAnnotation> = json::parse(annotations, "annotations")?;
        let annotations = remote
            .into_iter()
            .map(|r| r.into_annotation(image.id, true))
            .collect();
        let applied = self.workspace.apply_image_load(ticket, image, annotations);
        Ok(json!({ "applied": applied }))
    }

    fn try_apply_queue(&mut self, ticket: &str, images: &str) -> Result<Value, String> {
        let ticket: RequestTicket = json::parse(ticket, "ticket")?;
        let images: Vec<ImageRecord> = json::parse(images, "images")?;
        let applied = self.workspace.apply_queue(ticket, images);
        Ok(json!({ "applied": applied, "current": self.workspace.current_image_id() }))
    }

    fn try_plan_commit(&self, remote: &str) -> Result<Value, String> {
        let image_id = self
            .workspace
            .current_image_id()
            .ok_or_else(|| "no image loaded".to_string())?;
        let remote: Vec<RemoteAnnotation> = json::parse(remote, "annotations")?;
        let local = self.workspace.annotations();
        let fallback = &self.workspace.config().fallback_tag;
        let plan = match self.strategy {
            CommitStrategy::ReplaceAll => plan_replace_all(image_id, local, &remote, fallback),
            CommitStrategy::Reconcile => plan_reconcile(image_id, local, &remote, fallback),
        };
        plan_value(&CommitPlanView::from(plan))
    }

    fn try_finish_commit(&mut self, ticket: &str, assigned: &str) -> Result<Value, String> {
        let ticket: RequestTicket = json::parse(ticket, "ticket")?;
        let assigned: Vec<AssignedId> = json::parse(assigned, "assigned ids")?;
        let pairs: Vec<_> = assigned.iter().map(|a| (a.local_id, a.remote_id)).collect();
        Ok(json!({ "applied": self.workspace.finish_commit(ticket, &pairs) }))
    }

    fn try_finish_batch(&mut self, ticket: &str, images: &str, tags: &str) -> Result<Value, String> {
        let ticket: RequestTicket = json::parse(ticket, "ticket")?;
        let images: Option<Vec<ImageRecord>> = json::parse(images, "images")?;
        let tags: Vec<String> = json::parse(tags, "tags")?;
        let applied = self.workspace.finish_batch(ticket, images, tags);
        Ok(json!({ "applied": applied, "current": self.workspace.current_image_id() }))
    }
}

fn respond(response: &Response) -> String {
    json::response_json(response).to_string()
}

fn plan_value<T: serde::Serialize>(plan: &T) -> Result<Value, String> {
    serde_json::to_value(plan).map_err(|e| e.to_string())
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("BoxTag WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
