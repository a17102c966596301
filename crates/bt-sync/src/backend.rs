//! The remote collaborator contract.
//!
//! Only create and delete mutate remote state; there is no update.

use crate::error::BackendError;
use async_trait::async_trait;
use bt_core::id::{ImageId, RemoteId};
use bt_core::model::ImageRecord;
use bt_core::wire::{CreateAnnotationRequest, ImagePage, RemoteAnnotation};

#[async_trait]
pub trait AnnotationBackend: Send + Sync {
    /// `GET /images/{image_id}`
    async fn fetch_image(&self, image_id: ImageId) -> Result<ImageRecord, BackendError>;

    /// `GET /annotations/{image_id}`
    async fn fetch_annotations(
        &self,
        image_id: ImageId,
    ) -> Result<Vec<RemoteAnnotation>, BackendError>;

    /// `POST /annotations`. Returns the stored annotation with its id.
    async fn create_annotation(
        &self,
        request: &CreateAnnotationRequest,
    ) -> Result<RemoteAnnotation, BackendError>;

    /// `DELETE /annotations/delete/{annotation_id}/{image_id}`.
    /// Deleting something already gone succeeds.
    async fn delete_annotation(
        &self,
        image_id: ImageId,
        annotation_id: RemoteId,
    ) -> Result<(), BackendError>;

    /// `GET /annotations/tags`
    async fn fetch_tags(&self) -> Result<Vec<String>, BackendError>;

    /// `GET /images/mine?page&page_size` (1-based pages of unannotated
    /// images).
    async fn fetch_image_page(&self, page: u32, page_size: u32) -> Result<ImagePage, BackendError>;
}

/// Walk every page of the unannotated queue.
///
/// Stops once the accumulated count reaches the reported total, or on an
/// empty page so a shrinking total can't loop forever.
pub async fn fetch_all_unannotated<B>(
    backend: &B,
    page_size: u32,
) -> Result<Vec<ImageRecord>, BackendError>
where
    B: AnnotationBackend + ?Sized,
{
    let page_size = page_size.max(1);
    let mut images = Vec::new();
    let mut page = 1;
    loop {
        let batch = backend.fetch_image_page(page, page_size).await?;
        let received = batch.images.len();
        images.extend(batch.images);
        log::debug!(
            "queue page {page}: {received} images ({} of {})",
            images.len(),
            batch.total
        );
        if received == 0 || images.len() as u64 >= batch.total {
            break;
        }
        page += 1;
    }
    Ok(images)
}
