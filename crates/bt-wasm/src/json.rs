//! JSON shapes exchanged with the JavaScript host.
//!
//! Everything crossing the bridge is a JSON string: responses to input
//! events, the overlay frame, request tickets and commit plans going out,
//! fetched records and assigned ids coming back in.

use bt_core::id::{DraftId, ImageId, RemoteId};
use bt_core::wire::CreateAnnotationRequest;
use bt_editor::tagging::{TagEvent, TagOutcome, TagPrompt};
use bt_editor::workspace::{PendingAction, Response};
use bt_render::kurbo::Rect;
use bt_render::overlay::{GhostKind, OverlayFrame};
use bt_sync::plan::{BatchPlan, CommitPlan};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Parse a JSON argument, naming it in the error.
pub fn parse<T: DeserializeOwned>(source: &str, what: &str) -> Result<T, String> {
    serde_json::from_str(source).map_err(|e| format!("invalid {what}: {e}"))
}

/// `{"ok":true,...}` or `{"ok":false,"error":"..."}`.
pub fn result_json(result: Result<Value, String>) -> String {
    let value = match result {
        Ok(Value::Object(mut map)) => {
            map.insert("ok".into(), Value::Bool(true));
            Value::Object(map)
        }
        Ok(other) => json!({ "ok": true, "value": other }),
        Err(error) => json!({ "ok": false, "error": error }),
    };
    value.to_string()
}

pub fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

// ─── Input responses ─────────────────────────────────────────────────────

/// `changed` tells the host whether to repaint.
pub fn response_json(response: &Response) -> Value {
    match response {
        Response::Unchanged => json!({ "kind": "unchanged", "changed": false }),
        Response::Redraw => json!({ "kind": "redraw", "changed": true }),
        Response::PromptOpened => json!({ "kind": "promptOpened", "changed": true }),
        Response::Rejected(notice) => json!({
            "kind": "rejected",
            "changed": true,
            "message": notice.message,
        }),
        Response::Tagged(outcome) => json!({
            "kind": "tagged",
            "changed": true,
            "outcome": tag_outcome_json(outcome),
        }),
        Response::RetagRequested(id) => json!({
            "kind": "retagRequested",
            "changed": false,
            "id": id.to_string(),
        }),
        Response::Removed(id) => json!({ "kind": "removed", "changed": true, "id": id.to_string() }),
        Response::Navigated(image_id) => json!({
            "kind": "navigated",
            "changed": true,
            "imageId": image_id,
        }),
        Response::ConfirmRequested(action) => json!({
            "kind": "confirmRequested",
            "changed": true,
            "action": pending_action_json(action),
        }),
        Response::SubmitRequested => json!({ "kind": "submitRequested", "changed": false }),
    }
}

pub fn tag_outcome_json(outcome: &TagOutcome) -> Value {
    match outcome {
        TagOutcome::NothingPending => json!({ "status": "nothingPending" }),
        TagOutcome::Cancelled => json!({ "status": "cancelled" }),
        TagOutcome::Committed { id, tag, event } => json!({
            "status": "committed",
            "id": id.to_string(),
            "tag": tag,
            "newTag": matches!(event, Some(TagEvent::NewTag(_))),
        }),
    }
}

pub fn pending_action_json(action: &PendingAction) -> Value {
    match action {
        PendingAction::ClearImage(image_id) => json!({ "type": "clearImage", "imageId": image_id }),
        PendingAction::DiscardDrafts => json!({ "type": "discardDrafts" }),
    }
}

// ─── Overlay ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RectView {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl From<Rect> for RectView {
    fn from(r: Rect) -> Self {
        Self {
            x: r.x0,
            y: r.y0,
            w: r.width(),
            h: r.height(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AffordanceView {
    pub kind: &'static str,
    #[serde(flatten)]
    pub rect: RectView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxView {
    pub id: DraftId,
    #[serde(flatten)]
    pub rect: RectView,
    pub label: String,
    pub hovered: bool,
    pub affordances: Vec<AffordanceView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GhostView {
    pub kind: &'static str,
    #[serde(flatten)]
    pub rect: RectView,
    pub dashed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayView {
    pub boxes: Vec<BoxView>,
    pub ghost: Option<GhostView>,
}

impl From<&OverlayFrame> for OverlayView {
    fn from(frame: &OverlayFrame) -> Self {
        let boxes = frame
            .boxes
            .iter()
            .map(|b| BoxView {
                id: b.id,
                rect: b.rect.into(),
                label: b.label.clone(),
                hovered: b.hovered,
                affordances: b
                    .affordances
                    .iter()
                    .map(|a| AffordanceView {
                        kind: a.kind.as_str(),
                        rect: a.rect.into(),
                    })
                    .collect(),
            })
            .collect();
        let ghost = frame.ghost.as_ref().map(|g| GhostView {
            kind: match g.kind {
                GhostKind::Drawing => "drawing",
                GhostKind::PendingTag => "pendingTag",
            },
            rect: g.rect.into(),
            dashed: g.dashed,
        });
        Self { boxes, ghost }
    }
}

/// Where the host should place its tag input, and what to suggest.
pub fn prompt_json(prompt: &TagPrompt) -> Value {
    json!({
        "anchor": { "x": prompt.anchor.x, "y": prompt.anchor.y },
        "input": prompt.input,
        "suggestions": prompt.suggestions,
    })
}

// ─── Commit plans ────────────────────────────────────────────────────────

/// A local annotation and the remote id it is (or will be) stored under.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedId {
    pub local_id: DraftId,
    pub remote_id: RemoteId,
}

impl From<(DraftId, RemoteId)> for AssignedId {
    fn from((local_id, remote_id): (DraftId, RemoteId)) -> Self {
        Self {
            local_id,
            remote_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedCreate {
    pub local_id: DraftId,
    pub request: CreateAnnotationRequest,
}

fn planned(creates: Vec<(DraftId, CreateAnnotationRequest)>) -> Vec<PlannedCreate> {
    creates
        .into_iter()
        .map(|(local_id, request)| PlannedCreate { local_id, request })
        .collect()
}

/// The requests a host must issue for a single-image commit. Deletes go
/// first; the host reports created ids back together with `kept`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitPlanView {
    pub image_id: Option<ImageId>,
    pub deletes: Vec<RemoteId>,
    pub creates: Vec<PlannedCreate>,
    pub kept: Vec<AssignedId>,
}

impl From<CommitPlan> for CommitPlanView {
    fn from(plan: CommitPlan) -> Self {
        Self {
            image_id: plan.image_id,
            deletes: plan.deletes,
            creates: planned(plan.creates),
            kept: plan.kept.into_iter().map(AssignedId::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPlanView {
    pub images: Vec<ImageId>,
    pub creates: Vec<PlannedCreate>,
}

impl From<BatchPlan> for BatchPlanView {
    fn from(plan: BatchPlan) -> Self {
        Self {
            images: plan.images,
            creates: planned(plan.creates),
        }
    }
}
