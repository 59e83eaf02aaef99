// SwimPose Tools 🏊 AGPL-3.0 License

//! Command-line interface: argument parsing, logging macros, and the run
//! function for each subcommand.

// Modules
/// CLI arguments.
pub mod args;

/// Dataset maintenance commands.
pub mod dataset;

/// Logging macros and verbosity flag.
pub mod logging;

/// Batch rotation command.
pub mod rotate;
