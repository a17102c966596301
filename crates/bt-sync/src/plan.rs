//! Turning a working set into remote create/delete requests.
//!
//! Planning is pure: it looks at local and remote state and decides what
//! to send. The engine executes plans.

use crate::error::SyncError;
use bt_core::id::{DraftId, ImageId, RemoteId};
use bt_core::model::{Annotation, ContentKey};
use bt_core::wire::{CreateAnnotationRequest, RemoteAnnotation};
use bt_core::working_set::AnnotationWorkingSet;
use std::collections::{HashMap, HashSet};

/// Requests needed to make one image's remote set match the local one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitPlan {
    pub image_id: Option<ImageId>,
    pub deletes: Vec<RemoteId>,
    pub creates: Vec<(DraftId, CreateAnnotationRequest)>,
    /// Local annotations already stored remotely as-is.
    pub kept: Vec<(DraftId, RemoteId)>,
}

impl CommitPlan {
    pub fn request_count(&self) -> usize {
        self.deletes.len() + self.creates.len()
    }

    pub fn is_noop(&self) -> bool {
        self.request_count() == 0
    }
}

fn create(annotation: &Annotation, fallback_tag: &str) -> (DraftId, CreateAnnotationRequest) {
    (
        annotation.local_id,
        CreateAnnotationRequest::from_annotation(annotation, fallback_tag),
    )
}

/// Delete everything remote, recreate everything local. An empty local
/// set clears the image.
pub fn plan_replace_all(
    image_id: ImageId,
    local: &[Annotation],
    remote: &[RemoteAnnotation],
    fallback_tag: &str,
) -> CommitPlan {
    CommitPlan {
        image_id: Some(image_id),
        deletes: remote.iter().map(|r| r.id).collect(),
        creates: local.iter().map(|a| create(a, fallback_tag)).collect(),
        kept: Vec::new(),
    }
}

/// Keep what is unchanged, delete what is stale, create what is new.
///
/// Local annotations are matched by remote id first (when the id was kept
/// on load) and otherwise by content key. A retagged annotation still
/// carries its old remote id but no longer matches its content, so it is
/// recreated and the old row deleted.
pub fn plan_reconcile(
    image_id: ImageId,
    local: &[Annotation],
    remote: &[RemoteAnnotation],
    fallback_tag: &str,
) -> CommitPlan {
    let remote_keys: HashMap<RemoteId, ContentKey> =
        remote.iter().map(|r| (r.id, r.content_key())).collect();
    let mut matched: HashSet<RemoteId> = HashSet::new();
    let mut kept = Vec::new();
    let mut unresolved: Vec<&Annotation> = Vec::new();

    // Pass 1: identity.
    for a in local {
        match a.remote_id {
            Some(rid)
                if !matched.contains(&rid)
                    && remote_keys.get(&rid) == Some(&a.content_key()) =>
            {
                matched.insert(rid);
                kept.push((a.local_id, rid));
            }
            _ => unresolved.push(a),
        }
    }

    // Pass 2: content, against what is left.
    let mut by_content: HashMap<ContentKey, Vec<RemoteId>> = HashMap::new();
    for r in remote.iter().filter(|r| !matched.contains(&r.id)) {
        by_content.entry(r.content_key()).or_default().push(r.id);
    }
    let mut creates = Vec::new();
    for a in unresolved {
        let candidate = by_content
            .get_mut(&a.content_key())
            .and_then(|ids| (!ids.is_empty()).then(|| ids.remove(0)));
        match candidate {
            Some(rid) => {
                matched.insert(rid);
                kept.push((a.local_id, rid));
            }
            None => creates.push(create(a, fallback_tag)),
        }
    }

    let deletes = remote
        .iter()
        .map(|r| r.id)
        .filter(|id| !matched.contains(id))
        .collect();

    CommitPlan {
        image_id: Some(image_id),
        deletes,
        creates,
        kept,
    }
}

/// Creates for every draft of every queued image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchPlan {
    pub creates: Vec<(DraftId, CreateAnnotationRequest)>,
    /// Images with at least one draft, in queue order.
    pub images: Vec<ImageId>,
}

/// Untagged drafts are sent with `fallback_tag`. An empty plan is a user
/// error.
pub fn plan_batch(
    working_set: &AnnotationWorkingSet,
    fallback_tag: &str,
) -> Result<BatchPlan, SyncError> {
    let mut plan = BatchPlan::default();
    for (image_id, annotations) in working_set.iter() {
        if annotations.is_empty() {
            continue;
        }
        plan.images.push(image_id);
        plan.creates
            .extend(annotations.iter().map(|a| create(a, fallback_tag)));
    }
    if plan.creates.is_empty() {
        return Err(SyncError::NothingToSubmit);
    }
    Ok(plan)
}
