//! Coordinate mapping between client pixels, the rendered container, and
//! the image's natural pixel space.
//!
//! ```text
//!   client (viewport) px ──(− container origin)──▶ container px
//!   container px ──(× natural / container)──▶ image px
//!   image px ──(÷ natural, clamp)──▶ normalized [0,1]
//! ```
//!
//! Every conversion is pure. Until the natural size is known (the image has
//! not finished loading) conversions return `None` or a zero rectangle.

use crate::model::{BoundingBox, PixelRect};

/// The container's bounding rectangle in viewport (client) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContainerRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Intrinsic pixel size of the loaded image. `0×0` while unknown.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NaturalSize {
    pub width: f64,
    pub height: f64,
}

impl NaturalSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_known(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Clamp `px / axis_size` into `[0, 1]`. Zero-sized axes map to 0.
pub fn normalize(px: f64, axis_size: f64) -> f64 {
    if axis_size <= 0.0 {
        return 0.0;
    }
    (px / axis_size).clamp(0.0, 1.0)
}

/// Normalize an image-pixel rectangle against a natural size.
///
/// The far edge is clamped too, so a drag that leaves the image still
/// yields a finalized box.
pub fn normalize_rect(rect: &PixelRect, natural: NaturalSize) -> BoundingBox {
    let x = normalize(rect.x, natural.width);
    let y = normalize(rect.y, natural.height);
    let x1 = normalize(rect.x + rect.w, natural.width);
    let y1 = normalize(rect.y + rect.h, natural.height);
    BoundingBox {
        x,
        y,
        w: (x1 - x).max(0.0),
        h: (y1 - y).max(0.0),
    }
}

/// Converts between the three coordinate spaces for one rendered image.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CoordinateMapper {
    container: ContainerRect,
    natural: NaturalSize,
}

impl CoordinateMapper {
    pub fn new(container: ContainerRect, natural: NaturalSize) -> Self {
        Self { container, natural }
    }

    pub fn container(&self) -> ContainerRect {
        self.container
    }

    pub fn natural(&self) -> NaturalSize {
        self.natural
    }

    /// Update the container geometry (layout change, scroll, zoom).
    pub fn set_container(&mut self, container: ContainerRect) {
        self.container = container;
    }

    /// Record the natural size. Called from both the image `load` event and
    /// on mount for already-cached images; returns whether the size changed
    /// so the second call is a cheap no-op.
    pub fn set_natural_size(&mut self, natural: NaturalSize) -> bool {
        if self.natural == natural {
            return false;
        }
        log::debug!(
            "natural size {}x{} -> {}x{}",
            self.natural.width,
            self.natural.height,
            natural.width,
            natural.height
        );
        self.natural = natural;
        true
    }

    /// Forget the natural size (a new image URL is loading).
    pub fn reset_natural_size(&mut self) {
        self.natural = NaturalSize::default();
    }

    /// Both the image and the container have a non-zero size.
    pub fn is_ready(&self) -> bool {
        self.natural.is_known() && self.container.width > 0.0 && self.container.height > 0.0
    }

    /// Image px per container px on each axis.
    fn image_per_container(&self) -> Option<(f64, f64)> {
        self.is_ready().then(|| {
            (
                self.natural.width / self.container.width,
                self.natural.height / self.container.height,
            )
        })
    }

    /// Container px per image px on each axis.
    pub fn container_per_image(&self) -> Option<(f64, f64)> {
        self.is_ready().then(|| {
            (
                self.container.width / self.natural.width,
                self.container.height / self.natural.height,
            )
        })
    }

    /// Client (viewport) coordinates relative to the container origin.
    pub fn to_container_space(&self, client_x: f64, client_y: f64) -> (f64, f64) {
        (client_x - self.container.left, client_y - self.container.top)
    }

    /// Client coordinates → natural image pixels.
    pub fn to_image_space(&self, client_x: f64, client_y: f64) -> Option<(f64, f64)> {
        let (sx, sy) = self.image_per_container()?;
        let (cx, cy) = self.to_container_space(client_x, client_y);
        Some((cx * sx, cy * sy))
    }

    /// Image-pixel rectangle → container-relative CSS pixels.
    pub fn image_rect_to_container(&self, rect: &PixelRect) -> PixelRect {
        match self.container_per_image() {
            Some((sx, sy)) => PixelRect {
                x: rect.x * sx,
                y: rect.y * sy,
                w: rect.w * sx,
                h: rect.h * sy,
            },
            None => PixelRect::ZERO,
        }
    }

    /// Normalized box → container-relative CSS pixels, for rendering only.
    pub fn to_overlay_rect(&self, bbox: &BoundingBox) -> PixelRect {
        if !self.is_ready() {
            return PixelRect::ZERO;
        }
        PixelRect {
            x: bbox.x * self.container.width,
            y: bbox.y * self.container.height,
            w: bbox.w * self.container.width,
            h: bbox.h * self.container.height,
        }
    }

    /// Normalize an image-pixel rectangle using the current natural size.
    pub fn normalize_rect(&self, rect: &PixelRect) -> BoundingBox {
        normalize_rect(rect, self.natural)
    }
}
