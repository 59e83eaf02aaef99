// SwimPose Tools 🏊 AGPL-3.0 License

//! Batch rotation driver.
//!
//! Walks an images directory, pairs each image with its same-stem label
//! file, and runs the rotation re-projector over every pair. Each pair is
//! processed fully (read → transform → write) before the next begins, and
//! every per-item failure is contained: it becomes an explicit
//! [`ItemOutcome`] instead of aborting the run.

use std::path::{Path, PathBuf};

use crate::annotation::read_label_file;
use crate::error::{DatasetError, Result};
use crate::rotation::{RotationSpec, reproject_annotation, rotate_image};

/// Explicit configuration for one batch rotation run.
///
/// Constructed by the caller (CLI or orchestrator) and passed by value; no
/// process-wide mutable state.
#[derive(Debug, Clone)]
pub struct RotateConfig {
    /// Directory of input images.
    pub image_dir: PathBuf,
    /// Directory of input label files (same stems as the images).
    pub label_dir: PathBuf,
    /// Directory for rotated images.
    pub output_image_dir: PathBuf,
    /// Directory for rotated label files.
    pub output_label_dir: PathBuf,
    /// The rotation to apply.
    pub spec: RotationSpec,
}

/// Why an image/label pair produced no (or partial) output.
#[derive(Debug)]
pub enum SkipReason {
    /// The image could not be decoded; the pair was skipped entirely.
    ImageRead(String),
    /// The label file exists but could not be read. The rotated image was
    /// already written by then; no label output is produced.
    LabelRead(String),
    /// Writing an output file failed.
    Write(String),
}

/// Outcome of processing a single image.
#[derive(Debug)]
pub enum ItemOutcome {
    /// Image and label both rotated and written.
    Processed {
        /// Image stem.
        stem: String,
        /// Label lines written.
        lines: usize,
        /// Malformed label lines dropped along the way.
        dropped_lines: usize,
    },
    /// No label file existed; only the rotated image was written.
    ImageOnly {
        /// Image stem.
        stem: String,
    },
    /// The pair produced no label output; the reason says how far it got.
    Skipped {
        /// Image stem.
        stem: String,
        /// Why the pair was skipped.
        reason: SkipReason,
    },
}

/// Aggregated counts for a finished batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Pairs with both outputs written.
    pub processed: usize,
    /// Images rotated without a label.
    pub image_only: usize,
    /// Pairs skipped entirely.
    pub skipped: usize,
    /// Malformed label lines dropped across the run.
    pub dropped_lines: usize,
}

impl BatchSummary {
    /// Fold one outcome into the counts.
    pub fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Processed { dropped_lines, .. } => {
                self.processed += 1;
                self.dropped_lines += dropped_lines;
            }
            ItemOutcome::ImageOnly { .. } => self.image_only += 1,
            ItemOutcome::Skipped { .. } => self.skipped += 1,
        }
    }
}

/// Check if a path is an image file based on extension.
#[must_use]
pub fn is_image_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        let ext = ext.to_string_lossy().to_lowercase();
        matches!(ext.as_str(), "jpg" | "jpeg" | "png" | "bmp" | "webp")
    })
}

/// Collect image paths from a directory, sorted by name.
///
/// # Errors
///
/// Returns an error if the path is not a readable directory.
pub fn collect_images(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(DatasetError::Config(format!(
            "not a directory: {}",
            dir.display()
        )));
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| DatasetError::IoError(format!("failed to read {}: {e}", dir.display())))?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| is_image_file(path))
        .collect();

    paths.sort();
    Ok(paths)
}

/// Rotate one image/label pair.
///
/// The label path is derived from the image stem. A missing label is not a
/// failure: the rotated image is still written and the outcome reports
/// `ImageOnly`. Malformed label lines are dropped and counted; they never
/// appear in the output file.
#[must_use]
pub fn rotate_pair(config: &RotateConfig, image_path: &Path) -> ItemOutcome {
    let stem = image_path
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let ext = image_path
        .extension()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let suffix = config.spec.suffix();

    let image = match image::open(image_path) {
        Ok(img) => img,
        Err(e) => {
            return ItemOutcome::Skipped {
                stem,
                reason: SkipReason::ImageRead(e.to_string()),
            };
        }
    };
    let (w, h) = (image.width(), image.height());

    let rotated = rotate_image(&image, config.spec);
    let out_image_path = config
        .output_image_dir
        .join(format!("{stem}{suffix}.{ext}"));
    if let Err(e) = save_image(&rotated, &out_image_path) {
        return ItemOutcome::Skipped {
            stem,
            reason: SkipReason::Write(e.to_string()),
        };
    }

    let label_path = config.label_dir.join(format!("{stem}.txt"));
    if !label_path.exists() {
        return ItemOutcome::ImageOnly { stem };
    }

    let (annotations, malformed) = match read_label_file(&label_path) {
        Ok(parsed) => parsed,
        Err(e) => {
            return ItemOutcome::Skipped {
                stem,
                reason: SkipReason::LabelRead(e.to_string()),
            };
        }
    };

    let rotated_annotations: Vec<_> = annotations
        .iter()
        .map(|ann| reproject_annotation(ann, w, h, config.spec))
        .collect();

    let out_label_path = config.output_label_dir.join(format!("{stem}{suffix}.txt"));
    match crate::annotation::write_label_file(&out_label_path, &rotated_annotations) {
        Ok(()) => ItemOutcome::Processed {
            stem,
            lines: rotated_annotations.len(),
            dropped_lines: malformed.len(),
        },
        Err(e) => ItemOutcome::Skipped {
            stem,
            reason: SkipReason::Write(e.to_string()),
        },
    }
}

/// Run the rotation over every image in the configured directory.
///
/// Returns the per-item outcomes in directory order; the caller is expected
/// to log skips and fold a [`BatchSummary`].
///
/// # Errors
///
/// Only configuration-level failures (unreadable input directory, failure to
/// create the output directories) abort the run.
pub fn run_batch(config: &RotateConfig) -> Result<Vec<ItemOutcome>> {
    std::fs::create_dir_all(&config.output_image_dir)?;
    std::fs::create_dir_all(&config.output_label_dir)?;

    let images = collect_images(&config.image_dir)?;
    Ok(images
        .iter()
        .map(|path| rotate_pair(config, path))
        .collect())
}

fn save_image(image: &image::DynamicImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    image
        .save(path)
        .map_err(|e| DatasetError::IoError(format!("failed to save {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotation::Direction;
    use image::DynamicImage;

    fn test_config(root: &Path) -> RotateConfig {
        RotateConfig {
            image_dir: root.join("images"),
            label_dir: root.join("labels"),
            output_image_dir: root.join("rotated/images"),
            output_label_dir: root.join("rotated/labels"),
            spec: RotationSpec::new(90, Direction::Cw).unwrap(),
        }
    }

    fn write_pair(config: &RotateConfig, stem: &str, label: &str) {
        std::fs::create_dir_all(&config.image_dir).unwrap();
        std::fs::create_dir_all(&config.label_dir).unwrap();
        let img = DynamicImage::new_rgb8(100, 200);
        img.save(config.image_dir.join(format!("{stem}.png"))).unwrap();
        std::fs::write(config.label_dir.join(format!("{stem}.txt")), label).unwrap();
    }

    #[test]
    fn test_batch_produces_suffixed_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        write_pair(
            &config,
            "frame001",
            "0 0.500000 0.500000 0.200000 0.400000 0.100000 0.200000 2\n",
        );

        let outcomes = run_batch(&config).unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0], ItemOutcome::Processed { lines: 1, .. }));

        assert!(config.output_image_dir.join("frame001_90CW.png").exists());
        let label = std::fs::read_to_string(config.output_label_dir.join("frame001_90CW.txt"))
            .unwrap();
        // 100x200 rotated 90CW: centered box swaps extents.
        assert!(label.starts_with("0 0.500000 0.500000 0.400000 0.200000"));
    }

    #[test]
    fn test_missing_label_rotates_image_only() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        std::fs::create_dir_all(&config.image_dir).unwrap();
        std::fs::create_dir_all(&config.label_dir).unwrap();
        DynamicImage::new_rgb8(64, 64)
            .save(config.image_dir.join("lonely.png"))
            .unwrap();

        let outcomes = run_batch(&config).unwrap();
        assert!(matches!(outcomes[0], ItemOutcome::ImageOnly { .. }));
        assert!(config.output_image_dir.join("lonely_90CW.png").exists());
        assert!(!config.output_label_dir.join("lonely_90CW.txt").exists());
    }

    #[test]
    fn test_undecodable_image_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        std::fs::create_dir_all(&config.image_dir).unwrap();
        std::fs::create_dir_all(&config.label_dir).unwrap();
        std::fs::write(config.image_dir.join("broken.jpg"), b"not an image").unwrap();

        let outcomes = run_batch(&config).unwrap();
        assert!(matches!(
            outcomes[0],
            ItemOutcome::Skipped {
                reason: SkipReason::ImageRead(_),
                ..
            }
        ));
    }

    #[test]
    fn test_unreadable_label_still_writes_image() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        std::fs::create_dir_all(&config.image_dir).unwrap();
        std::fs::create_dir_all(&config.label_dir).unwrap();
        DynamicImage::new_rgb8(64, 64)
            .save(config.image_dir.join("frame003.png"))
            .unwrap();
        // A label path that exists but cannot be read as a file.
        std::fs::create_dir_all(config.label_dir.join("frame003.txt")).unwrap();

        let outcomes = run_batch(&config).unwrap();
        assert!(matches!(
            outcomes[0],
            ItemOutcome::Skipped {
                reason: SkipReason::LabelRead(_),
                ..
            }
        ));
        assert!(config.output_image_dir.join("frame003_90CW.png").exists());
        assert!(!config.output_label_dir.join("frame003_90CW.txt").exists());
    }

    #[test]
    fn test_malformed_lines_are_dropped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        write_pair(
            &config,
            "frame002",
            "0 0.5 0.5 0.2\n0 0.500000 0.500000 0.200000 0.400000\n",
        );

        let outcomes = run_batch(&config).unwrap();
        match &outcomes[0] {
            ItemOutcome::Processed {
                lines,
                dropped_lines,
                ..
            } => {
                assert_eq!(*lines, 1);
                assert_eq!(*dropped_lines, 1);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let label = std::fs::read_to_string(config.output_label_dir.join("frame002_90CW.txt"))
            .unwrap();
        assert_eq!(label.lines().count(), 1);
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = BatchSummary::default();
        summary.record(&ItemOutcome::Processed {
            stem: "a".into(),
            lines: 1,
            dropped_lines: 2,
        });
        summary.record(&ItemOutcome::ImageOnly { stem: "b".into() });
        summary.record(&ItemOutcome::Skipped {
            stem: "c".into(),
            reason: SkipReason::ImageRead("bad".into()),
        });
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.image_only, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.dropped_lines, 2);
    }
}
