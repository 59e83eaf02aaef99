// SwimPose Tools 🏊 AGPL-3.0 License

//! YOLO-pose text to COCO pose JSON conversion.
//!
//! Builds a minimal COCO file: one image entry, one annotation per label
//! line, and the standard 17-keypoint person category. Normalized YOLO
//! coordinates are converted to absolute pixels and the `(cx, cy, bw, bh)`
//! box becomes COCO's `[x_min, y_min, width, height]`.

use std::fs;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::annotation::Annotation;
use crate::error::{DatasetError, Result};

/// Standard COCO 17-keypoint names, in layout order.
pub const COCO_KEYPOINT_NAMES: [&str; 17] = [
    "nose",
    "left_eye",
    "right_eye",
    "left_ear",
    "right_ear",
    "left_shoulder",
    "right_shoulder",
    "left_elbow",
    "right_elbow",
    "left_wrist",
    "right_wrist",
    "left_hip",
    "right_hip",
    "left_knee",
    "right_knee",
    "left_ankle",
    "right_ankle",
];

/// COCO skeleton limb pairs, 1-based as the JSON format requires.
pub const COCO_SKELETON: [[u32; 2]; 16] = [
    [1, 2],
    [1, 3],
    [2, 4],
    [3, 5],
    [1, 6],
    [1, 7],
    [6, 8],
    [7, 9],
    [8, 10],
    [9, 11],
    [6, 12],
    [7, 13],
    [12, 14],
    [13, 15],
    [14, 16],
    [15, 17],
];

/// COCO `info` block.
#[derive(Debug, Serialize, Deserialize)]
pub struct CocoInfo {
    pub description: String,
    pub url: String,
    pub version: String,
    pub year: i32,
    pub contributor: String,
    pub date_created: String,
}

/// COCO `images` entry.
#[derive(Debug, Serialize, Deserialize)]
pub struct CocoImage {
    pub id: u32,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

/// COCO `annotations` entry for a pose subject.
#[derive(Debug, Serialize, Deserialize)]
pub struct CocoAnnotation {
    pub id: u32,
    pub image_id: u32,
    pub category_id: u32,
    /// `[x_min, y_min, width, height]` in absolute pixels.
    pub bbox: [f64; 4],
    pub area: f64,
    pub iscrowd: u8,
    /// Flattened `[x1, y1, v1, ...]` in absolute pixels.
    pub keypoints: Vec<f64>,
    pub num_keypoints: usize,
}

/// COCO `categories` entry.
#[derive(Debug, Serialize, Deserialize)]
pub struct CocoCategory {
    pub id: u32,
    pub name: String,
    pub supercategory: String,
    pub keypoints: Vec<String>,
    pub skeleton: Vec<[u32; 2]>,
}

/// A complete minimal COCO pose file.
#[derive(Debug, Serialize, Deserialize)]
pub struct CocoFile {
    pub info: CocoInfo,
    pub licenses: Vec<serde_json::Value>,
    pub images: Vec<CocoImage>,
    pub annotations: Vec<CocoAnnotation>,
    pub categories: Vec<CocoCategory>,
}

/// Convert one parsed annotation into a COCO annotation entry.
#[must_use]
pub fn to_coco_annotation(
    annotation: &Annotation,
    id: u32,
    image_id: u32,
    image_width: u32,
    image_height: u32,
) -> CocoAnnotation {
    let (wf, hf) = (f64::from(image_width), f64::from(image_height));
    let box_ = &annotation.box_;

    let abs_w = box_.bw * wf;
    let abs_h = box_.bh * hf;
    let x_min = (box_.cx - box_.bw / 2.0) * wf;
    let y_min = (box_.cy - box_.bh / 2.0) * hf;

    let mut keypoints = Vec::with_capacity(annotation.keypoints.len() * 3);
    for kpt in &annotation.keypoints {
        keypoints.push(kpt.x * wf);
        keypoints.push(kpt.y * hf);
        keypoints.push(f64::from(kpt.v.as_int()));
    }

    CocoAnnotation {
        id,
        image_id,
        category_id: 1,
        bbox: [x_min, y_min, abs_w, abs_h],
        area: abs_w * abs_h,
        iscrowd: 0,
        keypoints,
        num_keypoints: annotation.keypoints.len(),
    }
}

/// Build a complete COCO file for one image and its annotations.
///
/// # Errors
///
/// Returns `MalformedAnnotation` when `annotations` is empty: an empty COCO
/// file is never useful downstream.
pub fn build_coco_file(
    annotations: &[Annotation],
    image_filename: &str,
    image_width: u32,
    image_height: u32,
) -> Result<CocoFile> {
    if annotations.is_empty() {
        return Err(DatasetError::MalformedAnnotation(
            "no annotation lines to convert".to_string(),
        ));
    }

    let coco_annotations = annotations
        .iter()
        .enumerate()
        .map(|(i, ann)| to_coco_annotation(ann, i as u32 + 1, 1, image_width, image_height))
        .collect();

    Ok(CocoFile {
        info: CocoInfo {
            description: "Swimming pose annotations".to_string(),
            url: String::new(),
            version: "1.0".to_string(),
            year: Utc::now().format("%Y").to_string().parse().unwrap_or(2024),
            contributor: String::new(),
            date_created: Utc::now().to_rfc3339(),
        },
        licenses: Vec::new(),
        images: vec![CocoImage {
            id: 1,
            file_name: image_filename.to_string(),
            width: image_width,
            height: image_height,
        }],
        annotations: coco_annotations,
        categories: vec![CocoCategory {
            id: 1,
            name: "person".to_string(),
            supercategory: "person".to_string(),
            keypoints: COCO_KEYPOINT_NAMES.iter().map(ToString::to_string).collect(),
            skeleton: COCO_SKELETON.to_vec(),
        }],
    })
}

/// Convert a YOLO label file to a COCO JSON file on disk.
///
/// # Errors
///
/// Fails on unreadable input, empty label files, or unwritable output.
pub fn convert_label_file(
    label_path: &Path,
    output_path: &Path,
    image_filename: &str,
    image_width: u32,
    image_height: u32,
) -> Result<()> {
    let (annotations, _) = crate::annotation::read_label_file(label_path)?;
    let coco = build_coco_file(&annotations, image_filename, image_width, image_height)?;

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&coco)?;
    fs::write(output_path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Annotation {
        let mut line = "0 0.500000 0.500000 0.200000 0.400000".to_string();
        for _ in 0..17 {
            line.push_str(" 0.100000 0.200000 2");
        }
        Annotation::parse_line(&line).unwrap()
    }

    #[test]
    fn test_box_conversion() {
        let coco = to_coco_annotation(&sample(), 1, 1, 1280, 720);
        // (0.5, 0.5, 0.2, 0.4) in 1280x720: x_min = (0.5 - 0.1) * 1280.
        assert!((coco.bbox[0] - 512.0).abs() < 1e-9);
        assert!((coco.bbox[1] - 216.0).abs() < 1e-9);
        assert!((coco.bbox[2] - 256.0).abs() < 1e-9);
        assert!((coco.bbox[3] - 288.0).abs() < 1e-9);
        assert!((coco.area - 256.0 * 288.0).abs() < 1e-6);
    }

    #[test]
    fn test_keypoints_absolute() {
        let coco = to_coco_annotation(&sample(), 1, 1, 1000, 500);
        assert_eq!(coco.keypoints.len(), 51);
        assert_eq!(coco.num_keypoints, 17);
        assert!((coco.keypoints[0] - 100.0).abs() < 1e-9);
        assert!((coco.keypoints[1] - 100.0).abs() < 1e-9);
        assert!((coco.keypoints[2] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_file_rejected() {
        assert!(build_coco_file(&[], "a.jpg", 640, 480).is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let coco = build_coco_file(&[sample()], "frame.jpg", 640, 480).unwrap();
        let json = serde_json::to_string(&coco).unwrap();
        let parsed: CocoFile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.images[0].file_name, "frame.jpg");
        assert_eq!(parsed.categories[0].keypoints.len(), 17);
        assert_eq!(parsed.categories[0].skeleton.len(), 16);
        assert_eq!(parsed.annotations.len(), 1);
    }
}
