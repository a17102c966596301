//! Sync engine: drains a working set against the remote store.
//!
//! The engine never mutates the working set. It borrows it, talks to the
//! backend, and returns a report that the caller applies only when the
//! whole operation succeeded (and its ticket is still current).
//!
//! Requests inside one phase are issued together with `join_all`: none is
//! cancelled when a sibling fails, so the failure count is exact.

use crate::backend::{AnnotationBackend, fetch_all_unannotated};
use crate::config::{CommitStrategy, SyncConfig};
use crate::error::{BackendError, SyncError};
use crate::plan::{BatchPlan, CommitPlan, plan_batch, plan_reconcile, plan_replace_all};
use bt_core::id::{DraftId, ImageId, RemoteId};
use bt_core::model::{Annotation, ImageRecord};
use bt_core::wire::{CreateAnnotationRequest, UNTAGGED};
use bt_core::working_set::AnnotationWorkingSet;
use futures::future::join_all;

/// An image and its annotations, ready for the working set.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    pub image: ImageRecord,
    pub annotations: Vec<Annotation>,
}

/// Result of a successful single-image commit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitReport {
    pub image_id: Option<ImageId>,
    pub created: Vec<(DraftId, RemoteId)>,
    pub kept: Vec<(DraftId, RemoteId)>,
    pub deleted: usize,
}

impl CommitReport {
    /// Remote identity of every local annotation after the commit.
    pub fn assigned(&self) -> Vec<(DraftId, RemoteId)> {
        self.kept.iter().chain(&self.created).copied().collect()
    }
}

/// Result of a successful batch submission.
///
/// Success means every create went through. The reloads that follow are
/// best effort: the drafts must be dropped either way, or a retry would
/// store them twice.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub created: usize,
    /// The reloaded unannotated queue, `None` if that fetch failed.
    pub images: Option<Vec<ImageRecord>>,
    /// The refreshed tag listing (empty if that fetch failed).
    pub tags: Vec<String>,
}

pub struct SyncEngine<B> {
    backend: B,
    strategy: CommitStrategy,
    page_size: u32,
    fallback_tag: String,
}

impl<B: AnnotationBackend> SyncEngine<B> {
    pub fn new(backend: B, config: &SyncConfig) -> Self {
        Self {
            backend,
            strategy: config.strategy,
            page_size: config.page_size,
            fallback_tag: UNTAGGED.to_string(),
        }
    }

    pub fn with_strategy(mut self, strategy: CommitStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_fallback_tag(mut self, tag: impl Into<String>) -> Self {
        self.fallback_tag = tag.into();
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn strategy(&self) -> CommitStrategy {
        self.strategy
    }

    // ─── Loading ─────────────────────────────────────────────────────────

    /// Fetch an image and its annotations. Remote ids are kept on the
    /// loaded annotations so a later reconcile can diff by identity.
    pub async fn load_image(&self, image_id: ImageId) -> Result<LoadedImage, SyncError> {
        let (image, remote) = futures::join!(
            self.backend.fetch_image(image_id),
            self.backend.fetch_annotations(image_id)
        );
        let image = image.map_err(SyncError::fetch("image"))?;
        let annotations = remote
            .map_err(SyncError::fetch("annotations"))?
            .into_iter()
            .map(|r| r.into_annotation(image_id, true))
            .collect();
        Ok(LoadedImage { image, annotations })
    }

    pub async fn fetch_tags(&self) -> Result<Vec<String>, SyncError> {
        self.backend
            .fetch_tags()
            .await
            .map_err(SyncError::fetch("tags"))
    }

    /// Every unannotated image, walking all pages.
    pub async fn fetch_queue(&self) -> Result<Vec<ImageRecord>, SyncError> {
        fetch_all_unannotated(&self.backend, self.page_size)
            .await
            .map_err(SyncError::fetch("images for annotation"))
    }

    // ─── Single-image commit ─────────────────────────────────────────────

    /// Decide what a commit of `local` would send, without sending it.
    pub async fn plan_image(
        &self,
        image_id: ImageId,
        local: &[Annotation],
    ) -> Result<CommitPlan, SyncError> {
        let remote = self
            .backend
            .fetch_annotations(image_id)
            .await
            .map_err(SyncError::fetch("annotations"))?;

        Ok(match self.strategy {
            CommitStrategy::ReplaceAll => {
                plan_replace_all(image_id, local, &remote, &self.fallback_tag)
            }
            CommitStrategy::Reconcile => {
                plan_reconcile(image_id, local, &remote, &self.fallback_tag)
            }
        })
    }

    /// Make the remote annotations of `image_id` match `local`.
    pub async fn commit_image(
        &self,
        image_id: ImageId,
        local: &[Annotation],
    ) -> Result<CommitReport, SyncError> {
        let plan = self.plan_image(image_id, local).await?;
        log::info!(
            "commit image {image_id} ({}): {} deletes, {} creates, {} kept",
            self.strategy,
            plan.deletes.len(),
            plan.creates.len(),
            plan.kept.len()
        );
        self.execute(image_id, plan).await
    }

    async fn execute(&self, image_id: ImageId, plan: CommitPlan) -> Result<CommitReport, SyncError> {
        let total = plan.request_count();

        // Deletes first; any failure skips the creates.
        let deletes = join_all(
            plan.deletes
                .iter()
                .map(|id| self.backend.delete_annotation(image_id, *id)),
        )
        .await;
        let failures: Vec<BackendError> = deletes.into_iter().filter_map(Result::err).collect();
        if !failures.is_empty() {
            return Err(commit_error(failures, total));
        }

        let created = self.create_all(&plan.creates, total).await?;
        Ok(CommitReport {
            image_id: Some(image_id),
            created,
            kept: plan.kept,
            deleted: plan.deletes.len(),
        })
    }

    async fn create_all(
        &self,
        creates: &[(DraftId, CreateAnnotationRequest)],
        total: usize,
    ) -> Result<Vec<(DraftId, RemoteId)>, SyncError> {
        let results = join_all(
            creates
                .iter()
                .map(|(_, request)| self.backend.create_annotation(request)),
        )
        .await;

        let mut created = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for ((local_id, _), result) in creates.iter().zip(results) {
            match result {
                Ok(stored) => created.push((*local_id, stored.id)),
                Err(e) => failures.push(e),
            }
        }
        if !failures.is_empty() {
            return Err(commit_error(failures, total));
        }
        Ok(created)
    }

    // ─── Batch submission ────────────────────────────────────────────────

    /// Create every draft in the working set, then reload the queue and
    /// the tag listing.
    pub async fn submit_batch(
        &self,
        working_set: &AnnotationWorkingSet,
    ) -> Result<BatchOutcome, SyncError> {
        let BatchPlan { creates, images } = plan_batch(working_set, &self.fallback_tag)?;
        log::info!(
            "submitting {} annotations across {} images",
            creates.len(),
            images.len()
        );
        let created = self.create_all(&creates, creates.len()).await?.len();

        let (queue, tags) = futures::join!(self.fetch_queue(), self.fetch_tags());
        let images = queue
            .inspect_err(|e| log::warn!("queue reload after submit failed: {e}"))
            .ok();
        let tags = tags.unwrap_or_else(|e| {
            // Tags only feed autocomplete.
            log::warn!("tag refresh failed: {e}");
            Vec::new()
        });
        Ok(BatchOutcome {
            created,
            images,
            tags,
        })
    }
}

fn commit_error(failures: Vec<BackendError>, total: usize) -> SyncError {
    for e in &failures {
        log::warn!("sync request failed: {e}");
    }
    SyncError::Commit {
        failed: failures.len(),
        total,
        first: failures
            .first()
            .map(ToString::to_string)
            .unwrap_or_default(),
    }
}
