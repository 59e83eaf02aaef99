// SwimPose Tools 🏊 AGPL-3.0 License

//! Remap the custom 14-keypoint swimming scheme onto the COCO 17 layout.
//!
//! Each of the 14 source joints has a fixed slot in the COCO order; the
//! three COCO joints the swimming scheme never labels (nose and both ears)
//! stay at the `(0, 0, 0)` sentinel.

use crate::annotation::{
    Annotation, COCO_KEYPOINT_COUNT, Keypoint, SWIM_KEYPOINT_COUNT,
};
use crate::error::{DatasetError, Result};

/// COCO index for each swimming-scheme keypoint, in source order.
///
/// Source order: right ankle, right knee, right hip, left ankle, left knee,
/// left eye, right shoulder, right elbow, right wrist, left shoulder,
/// left elbow, left wrist, left hip, right eye.
pub const SWIM_TO_COCO: [usize; SWIM_KEYPOINT_COUNT] =
    [16, 14, 12, 15, 13, 1, 6, 8, 10, 5, 7, 9, 11, 2];

/// Remap an annotation from the 14-keypoint scheme to the COCO 17 layout.
///
/// The box and class pass through unchanged; COCO slots with no source
/// joint are emitted as `(0, 0, 0)`.
///
/// # Errors
///
/// Returns `MalformedAnnotation` unless the input carries exactly 14
/// keypoints.
pub fn remap_to_coco(annotation: &Annotation) -> Result<Annotation> {
    if annotation.keypoints.len() != SWIM_KEYPOINT_COUNT {
        return Err(DatasetError::MalformedAnnotation(format!(
            "expected {SWIM_KEYPOINT_COUNT} keypoints, got {}",
            annotation.keypoints.len()
        )));
    }

    let mut keypoints = vec![Keypoint::absent(); COCO_KEYPOINT_COUNT];
    for (swim_idx, &coco_idx) in SWIM_TO_COCO.iter().enumerate() {
        keypoints[coco_idx] = annotation.keypoints[swim_idx];
    }

    Ok(Annotation {
        class_id: annotation.class_id,
        box_: annotation.box_,
        keypoints,
    })
}
