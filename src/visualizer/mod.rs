// SwimPose Tools 🏊 AGPL-3.0 License

//! Color palettes and skeleton layout for annotation overlays.

/// Color palettes.
pub mod color;

/// Pose skeleton structure.
pub mod skeleton;

pub use color::{COLORS, Color, POSE_COLORS};
pub use skeleton::{KPT_COLOR_INDICES, LIMB_COLOR_INDICES, SKELETON};
