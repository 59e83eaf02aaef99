// SwimPose Tools 🏊 AGPL-3.0 License

//! Dataset hygiene checks.
//!
//! Two small passes over a dataset directory: reporting images and labels
//! that lack a partner file, and normalizing label files so every unlabeled
//! keypoint is exactly the `(0, 0, 0)` sentinel.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::annotation::{read_label_file, write_label_file};
use crate::batch::is_image_file;
use crate::error::{DatasetError, Result};

/// Stems present on one side of the image/label pairing but not the other.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct UnmatchedReport {
    /// Image stems with no label file.
    pub images_without_labels: BTreeSet<String>,
    /// Label stems with no image file.
    pub labels_without_images: BTreeSet<String>,
}

impl UnmatchedReport {
    /// True when every image has a label and vice versa.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.images_without_labels.is_empty() && self.labels_without_images.is_empty()
    }
}

/// Compare image stems against label stems in two parallel directories.
///
/// # Errors
///
/// Returns an error if either directory cannot be read.
pub fn find_unmatched(image_dir: &Path, label_dir: &Path) -> Result<UnmatchedReport> {
    let image_stems = collect_stems(image_dir, |p| is_image_file(p))?;
    let label_stems = collect_stems(label_dir, |p| p.extension().is_some_and(|e| e == "txt"))?;

    Ok(UnmatchedReport {
        images_without_labels: image_stems.difference(&label_stems).cloned().collect(),
        labels_without_images: label_stems.difference(&image_stems).cloned().collect(),
    })
}

fn collect_stems<F>(dir: &Path, keep: F) -> Result<BTreeSet<String>>
where
    F: Fn(&Path) -> bool,
{
    let mut stems = BTreeSet::new();
    for entry in fs::read_dir(dir)
        .map_err(|e| DatasetError::IoError(format!("failed to read {}: {e}", dir.display())))?
    {
        let path = entry?.path();
        if path.is_file()
            && keep(&path)
            && let Some(stem) = path.file_stem()
        {
            stems.insert(stem.to_string_lossy().to_string());
        }
    }
    Ok(stems)
}

/// Counts for one cleaning run.
#[derive(Debug, Default)]
pub struct CleanSummary {
    /// Label files rewritten.
    pub files: usize,
    /// Parseable lines carried over.
    pub lines: usize,
    /// Malformed lines dropped.
    pub dropped_lines: usize,
}

/// Rewrite label files so unlabeled keypoints are exactly `0 0 0`.
///
/// Reserializing through [`crate::annotation::Annotation`] zeroes the
/// coordinates of every `v == 0` keypoint (the parser keeps whatever the
/// file had; the writer emits the sentinel) and normalizes all floats to 6
/// decimals. Cleaned files are written under `output_dir`, the originals
/// stay untouched.
///
/// # Errors
///
/// Returns an error if the label directory cannot be read or an output file
/// cannot be written.
pub fn clean_invisible_keypoints(label_dir: &Path, output_dir: &Path) -> Result<CleanSummary> {
    fs::create_dir_all(output_dir)?;

    let mut summary = CleanSummary::default();
    let mut paths: Vec<_> = fs::read_dir(label_dir)
        .map_err(|e| {
            DatasetError::IoError(format!("failed to read {}: {e}", label_dir.display()))
        })?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|e| e == "txt"))
        .collect();
    paths.sort();

    for path in paths {
        let (mut annotations, malformed) = read_label_file(&path)?;
        for ann in &mut annotations {
            for kpt in &mut ann.keypoints {
                if kpt.v == crate::annotation::Visibility::NotLabeled {
                    kpt.x = 0.0;
                    kpt.y = 0.0;
                }
            }
        }

        let name = path.file_name().unwrap_or_default();
        write_label_file(&output_dir.join(name), &annotations)?;
        summary.files += 1;
        summary.lines += annotations.len();
        summary.dropped_lines += malformed.len();
    }

    Ok(summary)
}
