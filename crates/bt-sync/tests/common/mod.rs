//! In-memory `AnnotationBackend` for engine tests.
//!
//! Mirrors the REST store closely enough to check sync behavior: ids are
//! sequential, an image leaves the unannotated queue as soon as it has an
//! annotation, and deleting a missing annotation succeeds like a 404 does.

#![allow(dead_code)]

use async_trait::async_trait;
use bt_core::id::{ImageId, RemoteId};
use bt_core::model::ImageRecord;
use bt_core::wire::{CreateAnnotationRequest, ImagePage, RemoteAnnotation};
use bt_sync::{AnnotationBackend, BackendError};
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
struct State {
    images: BTreeMap<ImageId, ImageRecord>,
    annotations: BTreeMap<RemoteId, RemoteAnnotation>,
    next_id: i64,
    failing_tags: HashSet<String>,
    fail_deletes: bool,
    fail_tags: bool,
    fail_pages: bool,
    create_calls: usize,
    delete_calls: usize,
    page_calls: usize,
}

#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

pub fn image(id: i64) -> ImageRecord {
    ImageRecord {
        id: ImageId(id),
        filepath: format!("user_1/{id}.png"),
        storage_url: format!("https://cdn.test/{id}.png"),
        uploaded_at: "2024-05-01T12:00:00".into(),
    }
}

fn server_error(body: &str) -> BackendError {
    BackendError::Api {
        status: 500,
        body: body.to_string(),
    }
}

impl MemoryBackend {
    pub fn with_images(ids: impl IntoIterator<Item = i64>) -> Self {
        let backend = Self::default();
        {
            let mut s = backend.state.lock().unwrap();
            for id in ids {
                s.images.insert(ImageId(id), image(id));
            }
        }
        backend
    }

    /// Store an annotation directly, bypassing call counters.
    pub fn seed(&self, image_id: i64, x: f64, tag: &str) -> RemoteId {
        let mut s = self.state.lock().unwrap();
        s.next_id += 1;
        let id = RemoteId(s.next_id);
        s.annotations.insert(
            id,
            RemoteAnnotation {
                id,
                image_id: Some(ImageId(image_id)),
                x,
                y: 0.1,
                w: 0.2,
                h: 0.2,
                tag: tag.into(),
            },
        );
        id
    }

    /// Creates carrying this tag fail with a 500.
    pub fn fail_creates_tagged(&self, tag: &str) {
        self.state.lock().unwrap().failing_tags.insert(tag.into());
    }

    pub fn fail_deletes(&self) {
        self.state.lock().unwrap().fail_deletes = true;
    }

    pub fn fail_tags(&self) {
        self.state.lock().unwrap().fail_tags = true;
    }

    /// Image page fetches fail with a 503.
    pub fn fail_pages(&self) {
        self.state.lock().unwrap().fail_pages = true;
    }

    pub fn remote(&self, image_id: i64) -> Vec<RemoteAnnotation> {
        let s = self.state.lock().unwrap();
        s.annotations
            .values()
            .filter(|a| a.image_id == Some(ImageId(image_id)))
            .cloned()
            .collect()
    }

    pub fn total_annotations(&self) -> usize {
        self.state.lock().unwrap().annotations.len()
    }

    pub fn unannotated_ids(&self) -> Vec<ImageId> {
        let s = self.state.lock().unwrap();
        unannotated(&s).map(|i| i.id).collect()
    }

    pub fn create_calls(&self) -> usize {
        self.state.lock().unwrap().create_calls
    }

    pub fn delete_calls(&self) -> usize {
        self.state.lock().unwrap().delete_calls
    }

    pub fn page_calls(&self) -> usize {
        self.state.lock().unwrap().page_calls
    }
}

fn unannotated(s: &State) -> impl Iterator<Item = &ImageRecord> {
    let annotated: HashSet<ImageId> = s.annotations.values().filter_map(|a| a.image_id).collect();
    s.images
        .values()
        .filter(move |img| !annotated.contains(&img.id))
}

#[async_trait]
impl AnnotationBackend for MemoryBackend {
    async fn fetch_image(&self, image_id: ImageId) -> Result<ImageRecord, BackendError> {
        let s = self.state.lock().unwrap();
        s.images.get(&image_id).cloned().ok_or(BackendError::Api {
            status: 404,
            body: "Image not found".into(),
        })
    }

    async fn fetch_annotations(
        &self,
        image_id: ImageId,
    ) -> Result<Vec<RemoteAnnotation>, BackendError> {
        Ok(self.remote(image_id.0))
    }

    async fn create_annotation(
        &self,
        request: &CreateAnnotationRequest,
    ) -> Result<RemoteAnnotation, BackendError> {
        let mut s = self.state.lock().unwrap();
        s.create_calls += 1;
        if s.failing_tags.contains(&request.annotation.tag) {
            return Err(server_error("create failed"));
        }
        s.next_id += 1;
        let a = &request.annotation;
        let stored = RemoteAnnotation {
            id: RemoteId(s.next_id),
            image_id: Some(request.image_id),
            x: a.x,
            y: a.y,
            w: a.w,
            h: a.h,
            tag: a.tag.clone(),
        };
        s.annotations.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn delete_annotation(
        &self,
        _image_id: ImageId,
        annotation_id: RemoteId,
    ) -> Result<(), BackendError> {
        let mut s = self.state.lock().unwrap();
        s.delete_calls += 1;
        if s.fail_deletes {
            return Err(server_error("delete failed"));
        }
        s.annotations.remove(&annotation_id);
        Ok(())
    }

    async fn fetch_tags(&self) -> Result<Vec<String>, BackendError> {
        let s = self.state.lock().unwrap();
        if s.fail_tags {
            return Err(server_error("tags unavailable"));
        }
        let mut seen = HashSet::new();
        Ok(s.annotations
            .values()
            .filter(|a| seen.insert(a.tag.clone()))
            .map(|a| a.tag.clone())
            .collect())
    }

    async fn fetch_image_page(&self, page: u32, page_size: u32) -> Result<ImagePage, BackendError> {
        let mut s = self.state.lock().unwrap();
        s.page_calls += 1;
        if s.fail_pages {
            return Err(BackendError::Api {
                status: 503,
                body: "queue unavailable".into(),
            });
        }
        let all: Vec<ImageRecord> = unannotated(&s).cloned().collect();
        let start = ((page.max(1) - 1) * page_size) as usize;
        Ok(ImagePage {
            total: all.len() as u64,
            images: all.into_iter().skip(start).take(page_size as usize).collect(),
        })
    }
}
