//! Annotation data model.
//!
//! Geometry lives in one of two spaces depending on lifecycle stage:
//!
//! - [`PixelRect`] — pixel space (client, container, or image-natural
//!   pixels). Used while a box is being drawn.
//! - [`BoundingBox`] — normalized image space `[0,1]×[0,1]`. Used once a box
//!   is finalized, and on the wire.

use crate::id::{DraftId, ImageId, RemoteId};
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in some pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl PixelRect {
    pub const ZERO: PixelRect = PixelRect {
        x: 0.0,
        y: 0.0,
        w: 0.0,
        h: 0.0,
    };

    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Build a well-formed rectangle from two corners, regardless of drag
    /// direction.
    pub fn from_corners(ax: f64, ay: f64, bx: f64, by: f64) -> Self {
        let x0 = ax.min(bx);
        let y0 = ay.min(by);
        let x1 = ax.max(bx);
        let y1 = ay.max(by);
        Self {
            x: x0,
            y: y0,
            w: x1 - x0,
            h: y1 - y0,
        }
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.w && py >= self.y && py <= self.y + self.h
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }
}

/// A finalized box in normalized image space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// `0 ≤ x ≤ x+w ≤ 1` and `0 ≤ y ≤ y+h ≤ 1`, with a small tolerance for
    /// float error accumulated through scaling.
    pub fn is_finalized(&self) -> bool {
        const EPS: f64 = 1e-9;
        let in_unit = |v: f64| (-EPS..=1.0 + EPS).contains(&v);
        self.w >= 0.0
            && self.h >= 0.0
            && in_unit(self.x)
            && in_unit(self.y)
            && in_unit(self.x + self.w)
            && in_unit(self.y + self.h)
    }

    /// Clamp into the unit square, shrinking width/height so the far edge
    /// never exceeds 1.
    pub fn clamped(&self) -> Self {
        let x = self.x.clamp(0.0, 1.0);
        let y = self.y.clamp(0.0, 1.0);
        let w = self.w.max(0.0).min(1.0 - x);
        let h = self.h.max(0.0).min(1.0 - y);
        Self { x, y, w, h }
    }
}

/// Quantized `(x, y, w, h, tag)` used to match local annotations against
/// remote ones when no remote id is retained.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentKey {
    geometry: [i64; 4],
    tag: String,
}

impl ContentKey {
    /// Geometry is compared at 1e-6 resolution (sub-pixel for any image
    /// under a megapixel per axis).
    const SCALE: f64 = 1_000_000.0;

    pub fn new(bbox: &BoundingBox, tag: &str) -> Self {
        let q = |v: f64| (v * Self::SCALE).round() as i64;
        Self {
            geometry: [q(bbox.x), q(bbox.y), q(bbox.w), q(bbox.h)],
            tag: tag.to_string(),
        }
    }
}

/// A tagged box on one image, persisted or pending persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub local_id: DraftId,
    pub image_id: ImageId,
    /// Absent for client-only drafts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<RemoteId>,
    pub bbox: BoundingBox,
    pub tag: String,
}

impl Annotation {
    /// Create a fresh client-side draft.
    pub fn draft(image_id: ImageId, bbox: BoundingBox, tag: impl Into<String>) -> Self {
        Self {
            local_id: DraftId::next(),
            image_id,
            remote_id: None,
            bbox,
            tag: tag.into(),
        }
    }

    /// Whether this annotation has never been persisted.
    pub fn needs_create(&self) -> bool {
        self.remote_id.is_none()
    }

    pub fn content_key(&self) -> ContentKey {
        ContentKey::new(&self.bbox, &self.tag)
    }
}

/// Image metadata as returned by the image collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: ImageId,
    #[serde(default)]
    pub filepath: String,
    pub storage_url: String,
    #[serde(default)]
    pub uploaded_at: String,
}

impl ImageRecord {
    /// File name component of `filepath`, for headings.
    pub fn display_name(&self) -> &str {
        self.filepath.rsplit('/').next().unwrap_or(&self.filepath)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_corners_is_direction_independent() {
        let a = PixelRect::from_corners(10.0, 20.0, 50.0, 80.0);
        let b = PixelRect::from_corners(50.0, 80.0, 10.0, 20.0);
        let c = PixelRect::from_corners(50.0, 20.0, 10.0, 80.0);
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a, PixelRect::new(10.0, 20.0, 40.0, 60.0));
    }

    #[test]
    fn finalized_invariant() {
        assert!(BoundingBox::new(0.0, 0.0, 1.0, 1.0).is_finalized());
        assert!(BoundingBox::new(0.25, 0.5, 0.5, 0.5).is_finalized());
        assert!(!BoundingBox::new(0.8, 0.0, 0.3, 0.1).is_finalized());
        assert!(!BoundingBox::new(-0.1, 0.0, 0.3, 0.1).is_finalized());
    }

    #[test]
    fn clamped_keeps_far_edge_inside() {
        let b = BoundingBox::new(0.8, -0.2, 0.5, 0.4).clamped();
        assert!(b.is_finalized());
        assert!((b.x - 0.8).abs() < 1e-12);
        assert!((b.w - 0.2).abs() < 1e-12);
        assert_eq!(b.y, 0.0);
    }

    #[test]
    fn content_key_ignores_float_noise() {
        let a = ContentKey::new(&BoundingBox::new(0.1, 0.2, 0.4, 0.4), "cat");
        let b = ContentKey::new(
            &BoundingBox::new(0.1 + 1e-12, 0.2, 0.4 - 1e-12, 0.4),
            "cat",
        );
        let c = ContentKey::new(&BoundingBox::new(0.1, 0.2, 0.4, 0.4), "Cat");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn display_name_strips_directories() {
        let rec = ImageRecord {
            id: ImageId(1),
            filepath: "user_3/2024/dog.png".into(),
            storage_url: "https://cdn/dog.png".into(),
            uploaded_at: String::new(),
        };
        assert_eq!(rec.display_name(), "dog.png");
    }
}
