//! The client-side annotation working set.
//!
//! Holds the annotations of every image currently open (one image in the
//! single-image editor, the whole queue in batch mode). It is the source of
//! truth for the overlay renderer and the input to synchronization.
//!
//! All mutation is synchronous, so readers always observe a consistent
//! snapshot between events.

use crate::id::{DraftId, ImageId, RemoteId};
use crate::model::Annotation;
use std::collections::HashMap;

/// A mutation triggered from the draw/tag workflow or hover affordances.
#[derive(Debug, Clone)]
pub enum WorkingSetMutation {
    Add { annotation: Annotation },
    Retag { id: DraftId, tag: String },
    Remove { id: DraftId },
    /// Drop every annotation of one image.
    ClearImage { image_id: ImageId },
}

/// Ordered `ImageId → [Annotation]` mapping.
#[derive(Debug, Clone, Default)]
pub struct AnnotationWorkingSet {
    /// Image order (load order, i.e. queue order in batch mode).
    order: Vec<ImageId>,
    entries: HashMap<ImageId, Vec<Annotation>>,
}

impl AnnotationWorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A working set scoped to one image, seeded with its annotations.
    pub fn for_image(image_id: ImageId, annotations: Vec<Annotation>) -> Self {
        let mut ws = Self::new();
        ws.load_image(image_id, annotations);
        ws
    }

    /// A working set scoped to a queue of images, all initially empty.
    pub fn for_queue<I: IntoIterator<Item = ImageId>>(images: I) -> Self {
        let mut ws = Self::new();
        for id in images {
            ws.ensure_image(id);
        }
        ws
    }

    /// Register an image with no annotations if it is not yet present.
    pub fn ensure_image(&mut self, image_id: ImageId) {
        if !self.entries.contains_key(&image_id) {
            self.order.push(image_id);
            self.entries.insert(image_id, Vec::new());
        }
    }

    /// Replace the annotations of one image (e.g. after fetching them).
    pub fn load_image(&mut self, image_id: ImageId, annotations: Vec<Annotation>) {
        self.ensure_image(image_id);
        self.entries.insert(image_id, annotations);
    }

    /// Apply a mutation. Returns `true` if anything changed.
    pub fn apply(&mut self, mutation: WorkingSetMutation) -> bool {
        match mutation {
            WorkingSetMutation::Add { annotation } => {
                self.add(annotation);
                true
            }
            WorkingSetMutation::Retag { id, tag } => self.retag(id, tag),
            WorkingSetMutation::Remove { id } => self.remove(id).is_some(),
            WorkingSetMutation::ClearImage { image_id } => self.clear_image(image_id) > 0,
        }
    }

    /// Append an annotation to its image's list.
    pub fn add(&mut self, annotation: Annotation) -> DraftId {
        let id = annotation.local_id;
        self.ensure_image(annotation.image_id);
        log::debug!(
            "add {} on image {} tag={:?}",
            id,
            annotation.image_id,
            annotation.tag
        );
        if let Some(list) = self.entries.get_mut(&annotation.image_id) {
            list.push(annotation);
        }
        id
    }

    /// Change the tag of an annotation in place. The remote id is kept so a
    /// later commit knows which remote row to replace.
    pub fn retag(&mut self, id: DraftId, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if tag.is_empty() {
            return false;
        }
        match self.get_mut(id) {
            Some(a) if a.tag != tag => {
                a.tag = tag;
                true
            }
            _ => false,
        }
    }

    /// Remove an annotation by local id.
    pub fn remove(&mut self, id: DraftId) -> Option<Annotation> {
        for list in self.entries.values_mut() {
            if let Some(pos) = list.iter().position(|a| a.local_id == id) {
                return Some(list.remove(pos));
            }
        }
        None
    }

    /// Drop every annotation on one image. Returns how many were removed.
    pub fn clear_image(&mut self, image_id: ImageId) -> usize {
        self.entries
            .get_mut(&image_id)
            .map(|list| {
                let n = list.len();
                list.clear();
                n
            })
            .unwrap_or(0)
    }

    /// Forget everything (navigation away, or after a batch commit).
    pub fn reset(&mut self) {
        self.order.clear();
        self.entries.clear();
    }

    /// Record server identities for freshly created drafts.
    /// Returns how many annotations were updated.
    pub fn assign_remote_ids(&mut self, assigned: &[(DraftId, RemoteId)]) -> usize {
        let mut n = 0;
        for (local, remote) in assigned {
            if let Some(a) = self.get_mut(*local) {
                a.remote_id = Some(*remote);
                n += 1;
            }
        }
        n
    }

    pub fn get(&self, id: DraftId) -> Option<&Annotation> {
        self.entries
            .values()
            .flat_map(|list| list.iter())
            .find(|a| a.local_id == id)
    }

    fn get_mut(&mut self, id: DraftId) -> Option<&mut Annotation> {
        self.entries
            .values_mut()
            .flat_map(|list| list.iter_mut())
            .find(|a| a.local_id == id)
    }

    /// Annotations of one image in insertion order (empty if unknown).
    pub fn annotations(&self, image_id: ImageId) -> &[Annotation] {
        self.entries
            .get(&image_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains_image(&self, image_id: ImageId) -> bool {
        self.entries.contains_key(&image_id)
    }

    /// Images in load order.
    pub fn image_ids(&self) -> impl Iterator<Item = ImageId> + '_ {
        self.order.iter().copied()
    }

    /// `(image, annotations)` pairs in load order.
    pub fn iter(&self) -> impl Iterator<Item = (ImageId, &[Annotation])> + '_ {
        self.order
            .iter()
            .map(|id| (*id, self.annotations(*id)))
    }

    /// Total annotations across all images.
    pub fn total(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoundingBox;

    fn bbox() -> BoundingBox {
        BoundingBox::new(0.1, 0.1, 0.2, 0.2)
    }

    #[test]
    fn add_retag_remove() {
        let img = ImageId(1);
        let mut ws = AnnotationWorkingSet::for_image(img, Vec::new());
        let id = ws.add(Annotation::draft(img, bbox(), "cat"));
        assert_eq!(ws.annotations(img).len(), 1);

        assert!(ws.retag(id, "dog"));
        assert!(!ws.retag(id, "dog"), "same tag is not a change");
        assert!(!ws.retag(id, ""), "blank tag rejected");
        assert_eq!(ws.get(id).map(|a| a.tag.as_str()), Some("dog"));

        let removed = ws.remove(id).unwrap();
        assert_eq!(removed.local_id, id);
        assert!(ws.is_empty());
        assert!(ws.remove(id).is_none());
    }

    #[test]
    fn queue_preserves_image_order() {
        let ws = AnnotationWorkingSet::for_queue([ImageId(3), ImageId(1), ImageId(2)]);
        assert_eq!(
            ws.image_ids().collect::<Vec<_>>(),
            vec![ImageId(3), ImageId(1), ImageId(2)]
        );
        assert_eq!(ws.total(), 0);
    }

    #[test]
    fn add_to_unknown_image_registers_it() {
        let mut ws = AnnotationWorkingSet::new();
        ws.add(Annotation::draft(ImageId(9), bbox(), "x"));
        assert!(ws.contains_image(ImageId(9)));
    }

    #[test]
    fn assign_remote_ids_marks_persisted() {
        let img = ImageId(1);
        let mut ws = AnnotationWorkingSet::new();
        let id = ws.add(Annotation::draft(img, bbox(), "cat"));
        assert!(ws.get(id).unwrap().needs_create());
        assert_eq!(ws.assign_remote_ids(&[(id, RemoteId(77))]), 1);
        assert_eq!(ws.get(id).unwrap().remote_id, Some(RemoteId(77)));
    }

    #[test]
    fn apply_clear_image() {
        let img = ImageId(1);
        let mut ws = AnnotationWorkingSet::new();
        ws.add(Annotation::draft(img, bbox(), "a"));
        ws.add(Annotation::draft(img, bbox(), "b"));
        assert!(ws.apply(WorkingSetMutation::ClearImage { image_id: img }));
        assert!(!ws.apply(WorkingSetMutation::ClearImage { image_id: img }));
        assert!(ws.contains_image(img));
    }
}
