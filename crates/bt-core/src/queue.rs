//! Image queue with a navigation cursor, for batch annotation.

use crate::id::ImageId;
use crate::model::ImageRecord;

/// An ordered list of images to annotate and the index of the one on
/// screen. Navigation clamps at both ends.
#[derive(Debug, Clone, Default)]
pub struct ImageQueue {
    images: Vec<ImageRecord>,
    cursor: usize,
}

impl ImageQueue {
    pub fn new(images: Vec<ImageRecord>) -> Self {
        Self { images, cursor: 0 }
    }

    /// Replace the contents (after a reload) and rewind to the first image.
    pub fn replace(&mut self, images: Vec<ImageRecord>) {
        self.images = images;
        self.cursor = 0;
    }

    pub fn current(&self) -> Option<&ImageRecord> {
        self.images.get(self.cursor)
    }

    pub fn current_id(&self) -> Option<ImageId> {
        self.current().map(|img| img.id)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Advance one image. Returns `false` at the end of the queue.
    pub fn next(&mut self) -> bool {
        if self.cursor + 1 < self.images.len() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Go back one image. Returns `false` at the start of the queue.
    pub fn prev(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    pub fn can_next(&self) -> bool {
        self.cursor + 1 < self.images.len()
    }

    pub fn can_prev(&self) -> bool {
        self.cursor > 0
    }

    /// Jump to an image by id. Returns `false` if it is not queued.
    pub fn select(&mut self, id: ImageId) -> bool {
        match self.images.iter().position(|img| img.id == id) {
            Some(pos) => {
                self.cursor = pos;
                true
            }
            None => false,
        }
    }

    /// 1-based position and length, for "(i of n)" headings.
    pub fn position(&self) -> (usize, usize) {
        if self.images.is_empty() {
            (0, 0)
        } else {
            (self.cursor + 1, self.images.len())
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = ImageId> + '_ {
        self.images.iter().map(|img| img.id)
    }

    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    pub fn contains(&self, id: ImageId) -> bool {
        self.images.iter().any(|img| img.id == id)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
