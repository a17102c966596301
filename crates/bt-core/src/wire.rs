//! JSON shapes exchanged with the annotation and image collaborators.

use crate::id::{DraftId, ImageId, RemoteId};
use crate::model::{Annotation, BoundingBox, ContentKey, ImageRecord};
use serde::{Deserialize, Serialize};

/// Tag sent for drafts submitted without one.
pub const UNTAGGED: &str = "untagged";

/// One annotation as stored remotely (`GET /annotations/{image_id}`).
///
/// The server also returns bookkeeping fields (`user_id`, `created_at`)
/// which are ignored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteAnnotation {
    pub id: RemoteId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<ImageId>,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub tag: String,
}

impl RemoteAnnotation {
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.y, self.w, self.h)
    }

    pub fn content_key(&self) -> ContentKey {
        ContentKey::new(&self.bbox(), &self.tag)
    }

    /// Convert into a working-set annotation.
    ///
    /// With `retain_id` the remote id is kept, letting a later commit diff
    /// by identity; without it the annotation looks like a fresh draft and
    /// only content matching applies.
    pub fn into_annotation(self, image_id: ImageId, retain_id: bool) -> Annotation {
        Annotation {
            local_id: DraftId::next(),
            image_id,
            remote_id: retain_id.then_some(self.id),
            bbox: BoundingBox::new(self.x, self.y, self.w, self.h),
            tag: self.tag,
        }
    }
}

/// `{ x, y, w, h, tag }` body of a create request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationPayload {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub tag: String,
}

/// `POST /annotations` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAnnotationRequest {
    pub image_id: ImageId,
    pub annotation: AnnotationPayload,
}

impl CreateAnnotationRequest {
    /// Build a create request; blank tags are replaced by `fallback_tag`.
    pub fn from_annotation(annotation: &Annotation, fallback_tag: &str) -> Self {
        let tag = if annotation.tag.trim().is_empty() {
            fallback_tag.to_string()
        } else {
            annotation.tag.clone()
        };
        let b = annotation.bbox;
        Self {
            image_id: annotation.image_id,
            annotation: AnnotationPayload {
                x: b.x,
                y: b.y,
                w: b.w,
                h: b.h,
                tag,
            },
        }
    }
}

/// One page of the image listing (`GET /images/mine?page&page_size`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePage {
    pub images: Vec<ImageRecord>,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn remote_annotation_ignores_extra_fields() {
        let json = r#"{
            "id": 5, "image_id": 2, "user_id": 9,
            "x": 0.1, "y": 0.2, "w": 0.3, "h": 0.4,
            "tag": "cat", "created_at": "2024-01-01T00:00:00"
        }"#;
        let r: RemoteAnnotation = serde_json::from_str(json).unwrap();
        assert_eq!(r.id, RemoteId(5));
        assert_eq!(r.image_id, Some(ImageId(2)));
        assert_eq!(r.tag, "cat");
    }

    #[test]
    fn create_request_shape() {
        let a = Annotation::draft(ImageId(3), BoundingBox::new(0.1, 0.2, 0.3, 0.4), "");
        let req = CreateAnnotationRequest::from_annotation(&a, UNTAGGED);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "image_id": 3,
                "annotation": { "x": 0.1, "y": 0.2, "w": 0.3, "h": 0.4, "tag": "untagged" }
            })
        );
    }

    #[test]
    fn into_annotation_respects_retain_flag() {
        let r = RemoteAnnotation {
            id: RemoteId(11),
            image_id: None,
            x: 0.0,
            y: 0.0,
            w: 0.5,
            h: 0.5,
            tag: "dog".into(),
        };
        assert_eq!(
            r.clone().into_annotation(ImageId(1), true).remote_id,
            Some(RemoteId(11))
        );
        assert_eq!(r.into_annotation(ImageId(1), false).remote_id, None);
    }
}
