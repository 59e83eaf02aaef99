// SwimPose Tools 🏊 AGPL-3.0 License

use std::process;
use std::str::FromStr;

use crate::batch::{BatchSummary, ItemOutcome, RotateConfig, SkipReason, run_batch};
use crate::cli::args::RotateArgs;
use crate::rotation::{Direction, RotationSpec};
use crate::{error, section, success, verbose, warn};

/// Run the batch rotation command.
pub fn run_rotate(args: &RotateArgs) {
    crate::cli::logging::set_verbose(args.verbose);

    // Fail fast on configuration before touching any files.
    let direction = match Direction::from_str(&args.direction) {
        Ok(d) => d,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };
    let spec = match RotationSpec::new(args.degrees, direction) {
        Ok(s) => s,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    let config = RotateConfig {
        image_dir: args.image_dir.clone(),
        label_dir: args.label_dir.clone(),
        output_image_dir: args.output_image_dir.clone(),
        output_label_dir: args.output_label_dir.clone(),
        spec,
    };

    section!("🔄 Rotating {}{}", spec.degrees(), spec.direction().as_str());
    verbose!("Input: {}", config.image_dir.display());

    let outcomes = match run_batch(&config) {
        Ok(outcomes) => outcomes,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    let mut summary = BatchSummary::default();
    for outcome in &outcomes {
        summary.record(outcome);
        match outcome {
            ItemOutcome::Processed {
                stem,
                lines,
                dropped_lines,
            } => {
                if *dropped_lines > 0 {
                    warn!("{stem}: dropped {dropped_lines} malformed label line(s)");
                }
                verbose!("{stem}: rotated image + {lines} label line(s)");
            }
            ItemOutcome::ImageOnly { stem } => {
                warn!("{stem}: label file not found, rotated image only");
            }
            ItemOutcome::Skipped { stem, reason } => match reason {
                SkipReason::ImageRead(msg) => {
                    warn!("{stem}: skipped, image unreadable: {msg}");
                }
                SkipReason::LabelRead(msg) => {
                    warn!("{stem}: label unreadable, rotated image only: {msg}");
                }
                SkipReason::Write(msg) => {
                    warn!("{stem}: skipped, write failed: {msg}");
                }
            },
        }
    }

    success!(
        "Rotation complete: {} processed, {} image-only, {} skipped, {} malformed line(s) dropped",
        summary.processed,
        summary.image_only,
        summary.skipped,
        summary.dropped_lines
    );
}
