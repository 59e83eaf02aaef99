// SwimPose Tools 🏊 AGPL-3.0 License

//! Train/val/test dataset splitting.
//!
//! Recursively pairs images with their same-stem label files, shuffles the
//! pairs with a seeded RNG, and moves them into `images/{train,val,test}`
//! and `labels/{train,val,test}` under the dataset root. Originals are
//! moved, not copied, so the split is a one-shot reorganization.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::batch::is_image_file;
use crate::error::{DatasetError, Result};

/// The three dataset subsets.
pub const SUBSETS: [&str; 3] = ["train", "val", "test"];

/// Configuration for one split run.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Dataset root containing the images and labels to redistribute.
    pub root: PathBuf,
    /// Percentages for train/val/test; must sum to 100.
    pub percentages: [u32; 3],
    /// RNG seed; `None` derives one from the clock (reported for reruns).
    pub seed: Option<u64>,
}

impl SplitConfig {
    /// Validate the split percentages up front.
    ///
    /// # Errors
    ///
    /// Returns `Config` unless the percentages sum to exactly 100.
    pub fn validate(&self) -> Result<()> {
        let total: u32 = self.percentages.iter().sum();
        if total != 100 {
            return Err(DatasetError::Config(format!(
                "split percentages must sum to 100, got {total}"
            )));
        }
        Ok(())
    }
}

/// Counts and seed for a finished split.
#[derive(Debug)]
pub struct SplitSummary {
    /// Seed actually used for the shuffle.
    pub seed: u64,
    /// Pairs moved into each of train/val/test.
    pub counts: [usize; 3],
}

impl SplitSummary {
    /// Total pairs distributed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Recursively collect image/label pairs under `root`.
///
/// Images without a same-stem `.txt` anywhere under the root are ignored;
/// the `verify` module exists to surface those.
///
/// # Errors
///
/// Returns an error if a directory cannot be read.
pub fn collect_pairs(root: &Path) -> Result<Vec<(PathBuf, PathBuf)>> {
    let mut images = Vec::new();
    let mut labels: std::collections::HashMap<String, PathBuf> = std::collections::HashMap::new();
    walk(root, &mut images, &mut labels)?;

    images.sort();
    let pairs = images
        .into_iter()
        .filter_map(|img| {
            let stem = img.file_stem()?.to_string_lossy().to_string();
            labels.get(&stem).map(|lbl| (img, lbl.clone()))
        })
        .collect();
    Ok(pairs)
}

fn walk(
    dir: &Path,
    images: &mut Vec<PathBuf>,
    labels: &mut std::collections::HashMap<String, PathBuf>,
) -> Result<()> {
    for entry in fs::read_dir(dir)
        .map_err(|e| DatasetError::IoError(format!("failed to read {}: {e}", dir.display())))?
    {
        let path = entry?.path();
        if path.is_dir() {
            walk(&path, images, labels)?;
        } else if is_image_file(&path) {
            images.push(path);
        } else if path.extension().is_some_and(|e| e == "txt") {
            if let Some(stem) = path.file_stem() {
                labels.insert(stem.to_string_lossy().to_string(), path);
            }
        }
    }
    Ok(())
}

/// Split the dataset in place.
///
/// Subset sizes follow the original truncation rule: train and val get
/// `floor(total * pct / 100)` pairs each and test receives the remainder,
/// so every pair lands somewhere.
///
/// # Errors
///
/// Fails fast on invalid percentages; otherwise only IO failures while
/// moving files propagate.
pub fn split_dataset(config: &SplitConfig) -> Result<SplitSummary> {
    config.validate()?;

    let mut pairs = collect_pairs(&config.root)?;
    let seed = config.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    });
    let mut rng = StdRng::seed_from_u64(seed);
    pairs.shuffle(&mut rng);

    let total = pairs.len();
    let train_end = total * config.percentages[0] as usize / 100;
    let val_end = train_end + total * config.percentages[1] as usize / 100;
    let bounds = [(0, train_end), (train_end, val_end), (val_end, total)];

    let image_base = config.root.join("images");
    let label_base = config.root.join("labels");
    let mut counts = [0usize; 3];

    for (subset_idx, (subset, (start, end))) in SUBSETS.iter().zip(bounds).enumerate() {
        let image_dir = image_base.join(subset);
        let label_dir = label_base.join(subset);
        fs::create_dir_all(&image_dir)?;
        fs::create_dir_all(&label_dir)?;

        for (img, lbl) in &pairs[start..end] {
            move_file(img, &image_dir)?;
            move_file(lbl, &label_dir)?;
            counts[subset_idx] += 1;
        }
    }

    Ok(SplitSummary { seed, counts })
}

fn move_file(src: &Path, dest_dir: &Path) -> Result<()> {
    let name = src
        .file_name()
        .ok_or_else(|| DatasetError::IoError(format!("no file name: {}", src.display())))?;
    let dest = dest_dir.join(name);
    // rename fails across filesystems; fall back to copy + remove.
    if fs::rename(src, &dest).is_err() {
        fs::copy(src, &dest)?;
        fs::remove_file(src)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;

    fn seed_dataset(root: &Path, count: usize) {
        let raw = root.join("raw");
        fs::create_dir_all(&raw).unwrap();
        for i in 0..count {
            DynamicImage::new_rgb8(4, 4)
                .save(raw.join(format!("frame{i:03}.png")))
                .unwrap();
            fs::write(
                raw.join(format!("frame{i:03}.txt")),
                "0 0.500000 0.500000 0.200000 0.200000\n",
            )
            .unwrap();
        }
    }

    #[test]
    fn test_percentages_must_sum_to_100() {
        let config = SplitConfig {
            root: PathBuf::from("."),
            percentages: [70, 25, 4],
            seed: Some(1),
        };
        assert!(matches!(
            config.validate(),
            Err(DatasetError::Config(_))
        ));
    }

    #[test]
    fn test_split_moves_all_pairs() {
        let dir = tempfile::tempdir().unwrap();
        seed_dataset(dir.path(), 20);

        let config = SplitConfig {
            root: dir.path().to_path_buf(),
            percentages: [70, 25, 5],
            seed: Some(42),
        };
        let summary = split_dataset(&config).unwrap();

        assert_eq!(summary.total(), 20);
        assert_eq!(summary.counts[0], 14);
        assert_eq!(summary.counts[1], 5);
        assert_eq!(summary.counts[2], 1);
        assert_eq!(summary.seed, 42);

        for (subset, expected) in SUBSETS.iter().zip(summary.counts) {
            let images = fs::read_dir(dir.path().join("images").join(subset))
                .unwrap()
                .count();
            let labels = fs::read_dir(dir.path().join("labels").join(subset))
                .unwrap()
                .count();
            assert_eq!(images, expected);
            assert_eq!(labels, expected);
        }

        // Originals were moved, not copied.
        let leftovers = fs::read_dir(dir.path().join("raw")).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_split_is_seed_deterministic() {
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();
        seed_dataset(dir_a.path(), 10);
        seed_dataset(dir_b.path(), 10);

        for root in [dir_a.path(), dir_b.path()] {
            let config = SplitConfig {
                root: root.to_path_buf(),
                percentages: [50, 30, 20],
                seed: Some(7),
            };
            split_dataset(&config).unwrap();
        }

        for subset in SUBSETS {
            let names = |root: &Path| -> Vec<String> {
                let mut v: Vec<String> = fs::read_dir(root.join("images").join(subset))
                    .unwrap()
                    .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
                    .collect();
                v.sort();
                v
            };
            assert_eq!(names(dir_a.path()), names(dir_b.path()));
        }
    }

    #[test]
    fn test_unpaired_images_are_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        seed_dataset(dir.path(), 4);
        DynamicImage::new_rgb8(4, 4)
            .save(dir.path().join("raw/orphan.png"))
            .unwrap();

        let config = SplitConfig {
            root: dir.path().to_path_buf(),
            percentages: [50, 25, 25],
            seed: Some(3),
        };
        let summary = split_dataset(&config).unwrap();
        assert_eq!(summary.total(), 4);
        assert!(dir.path().join("raw/orphan.png").exists());
    }
}
