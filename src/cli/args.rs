// SwimPose Tools 🏊 AGPL-3.0 License

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Examples:
    swimpose-tools rotate --image-dir data/images --label-dir data/labels \
        --output-image-dir data/rotated/images --output-label-dir data/rotated/labels \
        --degrees 90 --direction CW
    swimpose-tools coco --label labels/frame001.txt --image images/frame001.jpg --output frame001_coco.json
    swimpose-tools remap --label-dir labels --output-dir labels_coco
    swimpose-tools split --root datasets/swim --split 70,25,5 --seed 42
    swimpose-tools verify --image-dir data/images --label-dir data/labels
    swimpose-tools clean --label-dir data/labels --output-dir data/labels_clean
    swimpose-tools annotate --image images/frame001.jpg --label labels/frame001.txt --output preview.jpg"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rotate image/label pairs with consistent box and keypoint re-projection
    Rotate(RotateArgs),
    /// Convert a YOLO-pose label file to COCO pose JSON
    Coco(CocoArgs),
    /// Remap 14-keypoint labels onto the COCO 17-keypoint layout
    Remap(RemapArgs),
    /// Split a dataset into train/val/test subsets
    Split(SplitArgs),
    /// Report images without labels and labels without images
    Verify(VerifyArgs),
    /// Normalize invisible keypoints to the (0, 0, 0) sentinel
    Clean(CleanArgs),
    /// Render a label overlay onto its image for inspection
    Annotate(AnnotateArgs),
}

/// Arguments for the rotate command.
#[derive(Args, Debug)]
pub struct RotateArgs {
    /// Directory of input images
    #[arg(long)]
    pub image_dir: PathBuf,

    /// Directory of input label files
    #[arg(long)]
    pub label_dir: PathBuf,

    /// Directory for rotated images
    #[arg(long)]
    pub output_image_dir: PathBuf,

    /// Directory for rotated label files
    #[arg(long)]
    pub output_label_dir: PathBuf,

    /// Rotation angle in degrees (multiple of 90)
    #[arg(long, default_value_t = 90)]
    pub degrees: u32,

    /// Rotation direction (CW or CCW)
    #[arg(long, default_value = "CW")]
    pub direction: String,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

/// Arguments for the coco command.
#[derive(Args, Debug)]
pub struct CocoArgs {
    /// YOLO-pose label file to convert
    #[arg(long)]
    pub label: PathBuf,

    /// Image the label belongs to (provides file name and dimensions)
    #[arg(long)]
    pub image: PathBuf,

    /// Output JSON path (defaults to the label stem + "_coco.json")
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the remap command.
#[derive(Args, Debug)]
pub struct RemapArgs {
    /// Directory of 14-keypoint label files
    #[arg(long)]
    pub label_dir: PathBuf,

    /// Directory for remapped 17-keypoint label files
    #[arg(long)]
    pub output_dir: PathBuf,
}

/// Arguments for the split command.
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Dataset root containing images and labels
    #[arg(long)]
    pub root: PathBuf,

    /// Train,val,test percentages (must sum to 100)
    #[arg(long, default_value = "70,25,5")]
    pub split: String,

    /// Shuffle seed for reproducible splits
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for the verify command.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Directory of images
    #[arg(long)]
    pub image_dir: PathBuf,

    /// Directory of label files
    #[arg(long)]
    pub label_dir: PathBuf,
}

/// Arguments for the clean command.
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Directory of label files to normalize
    #[arg(long)]
    pub label_dir: PathBuf,

    /// Directory for cleaned label files
    #[arg(long)]
    pub output_dir: PathBuf,
}

/// Arguments for the annotate command.
#[derive(Args, Debug)]
pub struct AnnotateArgs {
    /// Image to draw onto
    #[arg(long)]
    pub image: PathBuf,

    /// Label file to render (defaults to the image stem + ".txt" alongside it)
    #[arg(long)]
    pub label: Option<PathBuf>,

    /// Output image path
    #[arg(long, default_value = "annotated.jpg")]
    pub output: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_rotate_args_defaults() {
        let args = Cli::parse_from([
            "app",
            "rotate",
            "--image-dir",
            "a",
            "--label-dir",
            "b",
            "--output-image-dir",
            "c",
            "--output-label-dir",
            "d",
        ]);
        match args.command {
            Commands::Rotate(rotate) => {
                assert_eq!(rotate.degrees, 90);
                assert_eq!(rotate.direction, "CW");
                assert!(rotate.verbose);
            }
            _ => panic!("expected rotate"),
        }
    }

    #[test]
    fn test_split_args_custom() {
        let args = Cli::parse_from([
            "app", "split", "--root", "data", "--split", "75,21,4", "--seed", "7",
        ]);
        match args.command {
            Commands::Split(split) => {
                assert_eq!(split.split, "75,21,4");
                assert_eq!(split.seed, Some(7));
            }
            _ => panic!("expected split"),
        }
    }
}
