// SwimPose Tools 🏊 AGPL-3.0 License

//! Run functions for the dataset maintenance commands: coco, remap, split,
//! verify, clean, and annotate.

use std::path::PathBuf;
use std::process;

use crate::annotation::{read_label_file, write_label_file};
use crate::cli::args::{AnnotateArgs, CleanArgs, CocoArgs, RemapArgs, SplitArgs, VerifyArgs};
use crate::error::DatasetError;
use crate::split::{SUBSETS, SplitConfig, split_dataset};
use crate::verify::{clean_invisible_keypoints, find_unmatched};
use crate::{error, info, success, verbose, warn};

/// Run the YOLO → COCO conversion command.
pub fn run_coco(args: &CocoArgs) {
    let (width, height) = match image::image_dimensions(&args.image) {
        Ok(dims) => dims,
        Err(e) => {
            error!("Failed to read {}: {e}", args.image.display());
            process::exit(1);
        }
    };

    let image_filename = args
        .image
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let output = args.output.clone().unwrap_or_else(|| {
        let stem = args.label.file_stem().unwrap_or_default().to_string_lossy();
        args.label.with_file_name(format!("{stem}_coco.json"))
    });

    match crate::coco::convert_label_file(&args.label, &output, &image_filename, width, height) {
        Ok(()) => {
            success!("Saved COCO pose JSON to {}", output.display());
        }
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    }
}

/// Run the 14 → 17 keypoint remap command over a label directory.
pub fn run_remap(args: &RemapArgs) {
    let mut paths: Vec<PathBuf> = match std::fs::read_dir(&args.label_dir) {
        Ok(entries) => entries
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|p| p.extension().is_some_and(|e| e == "txt"))
            .collect(),
        Err(e) => {
            error!("Failed to read {}: {e}", args.label_dir.display());
            process::exit(1);
        }
    };
    paths.sort();

    let mut written = 0usize;
    let mut skipped = 0usize;
    for path in &paths {
        let stem = path.file_stem().unwrap_or_default().to_string_lossy();
        let (annotations, malformed) = match read_label_file(path) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("{stem}: {e}");
                skipped += 1;
                continue;
            }
        };
        if !malformed.is_empty() {
            warn!("{stem}: dropped {} malformed line(s)", malformed.len());
        }

        let mut remapped = Vec::with_capacity(annotations.len());
        for ann in &annotations {
            match crate::remap::remap_to_coco(ann) {
                Ok(out) => remapped.push(out),
                Err(e) => {
                    warn!("{stem}: skipping line: {e}");
                }
            }
        }
        if remapped.is_empty() {
            skipped += 1;
            continue;
        }

        let out_path = args.output_dir.join(path.file_name().unwrap_or_default());
        match write_label_file(&out_path, &remapped) {
            Ok(()) => {
                verbose!("Wrote {}", out_path.display());
                written += 1;
            }
            Err(e) => {
                warn!("{stem}: {e}");
                skipped += 1;
            }
        }
    }

    success!("Remapped {written} file(s), skipped {skipped}");
}

/// Run the dataset split command.
pub fn run_split(args: &SplitArgs) {
    let percentages = match parse_split(&args.split) {
        Ok(p) => p,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    let config = SplitConfig {
        root: args.root.clone(),
        percentages,
        seed: args.seed,
    };

    match split_dataset(&config) {
        Ok(summary) => {
            if summary.total() == 0 {
                warn!("No matching image-label pairs found.");
                return;
            }
            info!("🔀 Using random seed: {}", summary.seed);
            info!("📊 Split summary:");
            for (subset, count) in SUBSETS.iter().zip(summary.counts) {
                info!(" - {subset}: {count} samples");
            }
            success!("Split {} pairs", summary.total());
        }
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    }
}

fn parse_split(s: &str) -> crate::error::Result<[u32; 3]> {
    let parts: Vec<u32> = s
        .split(',')
        .map(|p| {
            p.trim()
                .parse::<u32>()
                .map_err(|_| DatasetError::Config(format!("bad split value: {p}")))
        })
        .collect::<crate::error::Result<_>>()?;
    if parts.len() != 3 {
        return Err(DatasetError::Config(format!(
            "split must be three comma-separated values, got {}",
            parts.len()
        )));
    }
    Ok([parts[0], parts[1], parts[2]])
}

/// Run the image/label pairing check.
pub fn run_verify(args: &VerifyArgs) {
    match find_unmatched(&args.image_dir, &args.label_dir) {
        Ok(report) => {
            if report.is_clean() {
                success!("Every image has a label and every label has an image");
                return;
            }
            if !report.images_without_labels.is_empty() {
                info!("🟥 Images without labels:");
                for stem in &report.images_without_labels {
                    info!("  {stem}");
                }
            }
            if !report.labels_without_images.is_empty() {
                info!("🟦 Labels without images:");
                for stem in &report.labels_without_images {
                    info!("  {stem}");
                }
            }
            process::exit(2);
        }
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    }
}

/// Run the invisible-keypoint cleaning command.
pub fn run_clean(args: &CleanArgs) {
    match clean_invisible_keypoints(&args.label_dir, &args.output_dir) {
        Ok(summary) => {
            if summary.dropped_lines > 0 {
                warn!("Dropped {} malformed line(s)", summary.dropped_lines);
            }
            success!(
                "Cleaned {} file(s) ({} line(s)) into {}",
                summary.files,
                summary.lines,
                args.output_dir.display()
            );
        }
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    }
}

/// Run the overlay rendering command.
pub fn run_annotate(args: &AnnotateArgs) {
    let image = match image::open(&args.image) {
        Ok(img) => img,
        Err(e) => {
            error!("Failed to read {}: {e}", args.image.display());
            process::exit(1);
        }
    };

    let label_path = args.label.clone().unwrap_or_else(|| {
        let stem = args.image.file_stem().unwrap_or_default().to_string_lossy();
        args.image.with_file_name(format!("{stem}.txt"))
    });
    if !label_path.exists() {
        error!(
            "{}",
            DatasetError::AnnotationMissing(label_path.display().to_string())
        );
        process::exit(1);
    }

    let (annotations, malformed) = match read_label_file(&label_path) {
        Ok(parsed) => parsed,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };
    if !malformed.is_empty() {
        warn!("Dropped {} malformed line(s)", malformed.len());
    }
    if annotations.is_empty() {
        warn!("No parseable annotations in {}", label_path.display());
    }

    let annotated = crate::annotate::annotate_image(&image, &annotations);
    match annotated.save(&args.output) {
        Ok(()) => {
            success!("Saved annotated image to {}", args.output.display());
        }
        Err(e) => {
            error!("Failed to save {}: {e}", args.output.display());
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_split() {
        assert_eq!(parse_split("70,25,5").unwrap(), [70, 25, 5]);
        assert_eq!(parse_split(" 75 , 21 , 4 ").unwrap(), [75, 21, 4]);
        assert!(parse_split("70,30").is_err());
        assert!(parse_split("70,25,x").is_err());
    }
}
