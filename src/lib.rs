// SwimPose Tools 🏊 AGPL-3.0 License

//! # SwimPose Tools
//!
//! Dataset tooling for swimming-action pose estimation. The toolkit covers
//! the label-side half of a pose dataset pipeline: rotating image/label
//! pairs with geometrically consistent re-projection of bounding boxes and
//! keypoints, converting YOLO-pose text annotations to COCO pose JSON,
//! remapping a custom 14-keypoint scheme onto the COCO 17-keypoint layout,
//! splitting datasets into train/val/test, verifying image↔label pairing,
//! normalizing invisible keypoints, and rendering annotation overlays.
//!
//! ## Quick Start (Library)
//!
//! ```no_run
//! use swimpose_tools::{Direction, RotateConfig, RotationSpec, run_batch};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RotateConfig {
//!         image_dir: "data/images".into(),
//!         label_dir: "data/labels".into(),
//!         output_image_dir: "data/rotated/images".into(),
//!         output_label_dir: "data/rotated/labels".into(),
//!         spec: RotationSpec::new(90, Direction::Cw)?,
//!     };
//!
//!     for outcome in run_batch(&config)? {
//!         println!("{outcome:?}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Rotate every pair in a dataset 90 degrees clockwise
//! swimpose-tools rotate --image-dir data/images --label-dir data/labels \
//!     --output-image-dir data/rotated/images --output-label-dir data/rotated/labels \
//!     --degrees 90 --direction CW
//!
//! # Split into train/val/test
//! swimpose-tools split --root datasets/swim --split 70,25,5 --seed 42
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`annotation`] | YOLO-pose label parsing and fixed-precision serialization |
//! | [`rotation`] | The rotation re-projector: affine map, canvas bounds, label transform |
//! | [`batch`] | Directory driver with explicit per-item outcomes |
//! | [`coco`] | YOLO-pose text → COCO pose JSON conversion |
//! | [`remap`] | 14-keypoint swimming scheme → COCO 17 layout |
//! | [`split`] | Seeded train/val/test distribution |
//! | [`verify`] | Pairing checks and invisible-keypoint normalization |
//! | [`annotate`] | Overlay rendering for visual verification |
//! | [`error`] | Error types ([`DatasetError`], [`Result`]) |

// Modules
pub mod annotate;
pub mod annotation;
pub mod batch;
pub mod cli;
pub mod coco;
pub mod error;
pub mod remap;
pub mod rotation;
pub mod split;
pub mod verify;
pub mod visualizer;

// Re-export main types for convenience
pub use annotation::{Annotation, BoundingBox, Keypoint, Visibility};
pub use batch::{BatchSummary, ItemOutcome, RotateConfig, SkipReason, run_batch};
pub use error::{DatasetError, Result};
pub use rotation::{
    AffineMap, Direction, Reprojection, RotationSpec, reproject_annotation, rotate_image,
};
pub use split::{SplitConfig, SplitSummary, split_dataset};
pub use verify::{UnmatchedReport, clean_invisible_keypoints, find_unmatched};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "swimpose-tools");
    }
}
