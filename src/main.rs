// SwimPose Tools 🏊 AGPL-3.0 License

use clap::Parser;

use swimpose_tools::cli::args::{Cli, Commands};
use swimpose_tools::cli::{dataset, rotate};

fn main() {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Rotate(args) => rotate::run_rotate(args),
        Commands::Coco(args) => dataset::run_coco(args),
        Commands::Remap(args) => dataset::run_remap(args),
        Commands::Split(args) => dataset::run_split(args),
        Commands::Verify(args) => dataset::run_verify(args),
        Commands::Clean(args) => dataset::run_clean(args),
        Commands::Annotate(args) => dataset::run_annotate(args),
    }
}
