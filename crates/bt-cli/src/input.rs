//! Box files read by `push` and `submit`.
//!
//! `push` takes a JSON array of `{x, y, w, h, tag}` in normalized image
//! coordinates; `submit` takes the same objects with an `image_id` each.

use anyhow::{Context, Result, bail};
use bt_core::id::ImageId;
use bt_core::model::{Annotation, BoundingBox};
use bt_core::working_set::AnnotationWorkingSet;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BoxEntry {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    /// Blank tags are sent as the fallback tag.
    #[serde(default)]
    pub tag: String,
}

impl BoxEntry {
    fn bbox(&self, index: usize) -> Result<BoundingBox> {
        let bbox = BoundingBox::new(self.x, self.y, self.w, self.h);
        if !bbox.is_finalized() {
            bail!(
                "box {index}: ({}, {}, {}, {}) is not inside the unit square",
                self.x,
                self.y,
                self.w,
                self.h
            );
        }
        Ok(bbox)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DraftEntry {
    pub image_id: ImageId,
    #[serde(flatten)]
    pub entry: BoxEntry,
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub fn read_boxes(path: &Path, image_id: ImageId) -> Result<Vec<Annotation>> {
    let source = read(path)?;
    parse_boxes(&source, image_id).with_context(|| format!("invalid box file {}", path.display()))
}

pub fn read_drafts(path: &Path) -> Result<AnnotationWorkingSet> {
    let source = read(path)?;
    parse_drafts(&source).with_context(|| format!("invalid draft file {}", path.display()))
}

/// Annotations for one image, as fresh drafts.
pub fn parse_boxes(source: &str, image_id: ImageId) -> Result<Vec<Annotation>> {
    let entries: Vec<BoxEntry> =
        serde_json::from_str(source).context("expected a JSON array of {x, y, w, h, tag}")?;
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| Ok(Annotation::draft(image_id, e.bbox(i)?, e.tag.trim())))
        .collect()
}

/// A working set spanning every image named in the file, in first-seen
/// order.
pub fn parse_drafts(source: &str) -> Result<AnnotationWorkingSet> {
    let entries: Vec<DraftEntry> = serde_json::from_str(source)
        .context("expected a JSON array of {image_id, x, y, w, h, tag}")?;
    let mut working_set = AnnotationWorkingSet::new();
    for (i, draft) in entries.iter().enumerate() {
        let bbox = draft.entry.bbox(i)?;
        working_set.add(Annotation::draft(draft.image_id, bbox, draft.entry.tag.trim()));
    }
    Ok(working_set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn boxes_become_drafts() {
        let anns = parse_boxes(
            r#"[{"x":0.1,"y":0.2,"w":0.4,"h":0.4,"tag":" person "},{"x":0,"y":0,"w":1,"h":1}]"#,
            ImageId(9),
        )
        .unwrap();
        assert_eq!(anns.len(), 2);
        assert_eq!(anns[0].tag, "person");
        assert_eq!(anns[0].bbox, BoundingBox::new(0.1, 0.2, 0.4, 0.4));
        assert_eq!(anns[1].tag, "");
        assert!(anns.iter().all(|a| a.image_id == ImageId(9) && a.remote_id.is_none()));
    }

    #[test]
    fn out_of_range_box_is_rejected() {
        let err = parse_boxes(r#"[{"x":0.8,"y":0.1,"w":0.4,"h":0.1,"tag":"cat"}]"#, ImageId(1))
            .unwrap_err();
        assert!(err.to_string().contains("box 0"));
    }

    #[test]
    fn not_an_array_is_rejected() {
        let err = parse_boxes(r#"{"x":0.1}"#, ImageId(1)).unwrap_err();
        assert!(format!("{err:#}").contains("expected a JSON array"));
    }

    #[test]
    fn drafts_group_by_image_in_file_order() {
        let ws = parse_drafts(
            r#"[
                {"image_id": 3, "x": 0.1, "y": 0.1, "w": 0.2, "h": 0.2, "tag": "cat"},
                {"image_id": 1, "x": 0.5, "y": 0.5, "w": 0.1, "h": 0.1},
                {"image_id": 3, "x": 0.6, "y": 0.6, "w": 0.2, "h": 0.2, "tag": "dog"}
            ]"#,
        )
        .unwrap();
        assert_eq!(ws.image_ids().collect::<Vec<_>>(), vec![ImageId(3), ImageId(1)]);
        assert_eq!(ws.annotations(ImageId(3)).len(), 2);
        assert_eq!(ws.total(), 3);
    }
}
