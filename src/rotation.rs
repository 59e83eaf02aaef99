// SwimPose Tools 🏊 AGPL-3.0 License

//! Rotation re-projection of images and their pose labels.
//!
//! Given an image and its normalized box + keypoint annotation, produce the
//! image rotated by a multiple of 90° and an annotation consistent with the
//! rotated frame: a point at anatomical location L in the original maps to
//! the pixel where L appears after rotation. Keypoint identities, order,
//! and visibility codes are preserved.

use image::DynamicImage;

use crate::annotation::{Annotation, BoundingBox, Keypoint, Visibility};
use crate::error::{DatasetError, Result};

/// Rotation direction in image coordinates (y-axis pointing down).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Clockwise.
    Cw,
    /// Counter-clockwise.
    Ccw,
}

impl Direction {
    /// Upper-case wire form used in output file suffixes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cw => "CW",
            Self::Ccw => "CCW",
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "CW" => Ok(Self::Cw),
            "CCW" => Ok(Self::Ccw),
            other => Err(DatasetError::Config(format!(
                "direction must be CW or CCW, got {other}"
            ))),
        }
    }
}

/// A validated rotation: a multiple of 90° plus a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationSpec {
    degrees: u32,
    direction: Direction,
}

impl RotationSpec {
    /// Create a rotation spec, rejecting angles that are not multiples of 90.
    ///
    /// Bounding-box re-fitting is only exact at multiples of 90°, so other
    /// angles are a configuration error caught before any processing begins.
    ///
    /// # Errors
    ///
    /// Returns `Config` if `degrees` is not a multiple of 90.
    pub fn new(degrees: u32, direction: Direction) -> Result<Self> {
        if degrees % 90 != 0 {
            return Err(DatasetError::Config(format!(
                "rotation angle must be a multiple of 90, got {degrees}"
            )));
        }
        Ok(Self { degrees, direction })
    }

    /// Rotation magnitude in degrees.
    #[must_use]
    pub const fn degrees(self) -> u32 {
        self.degrees
    }

    /// Rotation direction.
    #[must_use]
    pub const fn direction(self) -> Direction {
        self.direction
    }

    /// Signed angle: clockwise is negative, counter-clockwise positive
    /// (y-down image coordinate convention).
    #[must_use]
    pub fn signed_degrees(self) -> f64 {
        match self.direction {
            Direction::Cw => -f64::from(self.degrees),
            Direction::Ccw => f64::from(self.degrees),
        }
    }

    /// The opposite rotation, which undoes this one.
    #[must_use]
    pub const fn inverse(self) -> Self {
        let direction = match self.direction {
            Direction::Cw => Direction::Ccw,
            Direction::Ccw => Direction::Cw,
        };
        Self {
            degrees: self.degrees,
            direction,
        }
    }

    /// Whether width/height swap under this rotation (90° or 270°).
    #[must_use]
    pub const fn swaps_axes(self) -> bool {
        self.degrees % 180 != 0
    }

    /// File name suffix encoding angle and direction, e.g. `_90CW`.
    #[must_use]
    pub fn suffix(self) -> String {
        format!("_{}{}", self.degrees, self.direction.as_str())
    }
}

/// A 2×3 affine map from old pixel coordinates to new pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineMap {
    m: [[f64; 3]; 2],
}

impl AffineMap {
    /// Rotation about `center` by `angle_deg` (positive = counter-clockwise
    /// in y-down coordinates), unit scale.
    #[must_use]
    pub fn rotation_about(center: (f64, f64), angle_deg: f64) -> Self {
        let radians = angle_deg.to_radians();
        let (sin, cos) = radians.sin_cos();
        let (cx, cy) = center;
        Self {
            m: [
                [cos, sin, (1.0 - cos) * cx - sin * cy],
                [-sin, cos, sin * cx + (1.0 - cos) * cy],
            ],
        }
    }

    /// Add `(dx, dy)` to the translation terms.
    #[must_use]
    pub fn translated(mut self, dx: f64, dy: f64) -> Self {
        self.m[0][2] += dx;
        self.m[1][2] += dy;
        self
    }

    /// Apply the map to a point.
    #[must_use]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.m[0][0] * x + self.m[0][1] * y + self.m[0][2],
            self.m[1][0] * x + self.m[1][1] * y + self.m[1][2],
        )
    }

    /// Absolute cosine and sine of the embedded rotation.
    #[must_use]
    pub fn abs_cos_sin(&self) -> (f64, f64) {
        (self.m[0][0].abs(), self.m[0][1].abs())
    }
}

/// The affine map and canvas bounds for rotating a `w`×`h` image.
#[derive(Debug, Clone, Copy)]
pub struct Reprojection {
    /// Old-pixel to new-pixel affine map.
    pub map: AffineMap,
    /// New canvas width in pixels.
    pub new_w: u32,
    /// New canvas height in pixels.
    pub new_h: u32,
}

impl Reprojection {
    /// Build the re-projection for rotating a `w`×`h` image by `spec`.
    ///
    /// The map rotates about the image center and is translated so the old
    /// center lands on the center of the smallest axis-aligned canvas that
    /// contains the rotated corners.
    #[must_use]
    pub fn new(w: u32, h: u32, spec: RotationSpec) -> Self {
        let (wf, hf) = (f64::from(w), f64::from(h));
        let center = (wf / 2.0, hf / 2.0);
        let map = AffineMap::rotation_about(center, spec.signed_degrees());

        let (abs_cos, abs_sin) = map.abs_cos_sin();
        let new_w = hf.mul_add(abs_sin, wf * abs_cos).round() as u32;
        let new_h = hf.mul_add(abs_cos, wf * abs_sin).round() as u32;

        let map = map.translated(
            f64::from(new_w) / 2.0 - center.0,
            f64::from(new_h) / 2.0 - center.1,
        );

        Self { map, new_w, new_h }
    }
}

/// Re-project an annotation from a `w`×`h` frame into the rotated frame.
///
/// The box center and every labeled keypoint are converted to absolute pixel
/// coordinates, pushed through the affine map, and re-normalized by the new
/// canvas. Box half-extents swap at 90°/270° and are unchanged at 0°/180°
/// (exact for axis-aligned boxes at multiples of 90). Keypoints with `v == 0`
/// pass through untouched so the `(0, 0)` sentinel survives; visibility is
/// never altered.
#[must_use]
pub fn reproject_annotation(
    annotation: &Annotation,
    w: u32,
    h: u32,
    spec: RotationSpec,
) -> Annotation {
    let proj = Reprojection::new(w, h, spec);
    let (wf, hf) = (f64::from(w), f64::from(h));
    let (new_wf, new_hf) = (f64::from(proj.new_w), f64::from(proj.new_h));

    let box_ = &annotation.box_;
    let (abs_cx, abs_cy) = proj.map.apply(box_.cx * wf, box_.cy * hf);
    let (abs_bw, abs_bh) = (box_.bw * wf, box_.bh * hf);
    let (new_bw, new_bh) = if spec.swaps_axes() {
        (abs_bh / new_wf, abs_bw / new_hf)
    } else {
        (abs_bw / new_wf, abs_bh / new_hf)
    };

    let keypoints = annotation
        .keypoints
        .iter()
        .map(|kpt| {
            if kpt.v == Visibility::NotLabeled {
                *kpt
            } else {
                let (x, y) = proj.map.apply(kpt.x * wf, kpt.y * hf);
                Keypoint {
                    x: x / new_wf,
                    y: y / new_hf,
                    v: kpt.v,
                }
            }
        })
        .collect();

    Annotation {
        class_id: annotation.class_id,
        box_: BoundingBox {
            cx: abs_cx / new_wf,
            cy: abs_cy / new_hf,
            bw: new_bw,
            bh: new_bh,
        },
        keypoints,
    }
}

/// Rotate the image raster.
///
/// Multiples of 90° warp onto an exact pixel grid, so the resample reduces
/// to a lossless quarter-turn rotation.
#[must_use]
pub fn rotate_image(image: &DynamicImage, spec: RotationSpec) -> DynamicImage {
    let quarter_turns_ccw = match spec.direction() {
        Direction::Ccw => (spec.degrees() / 90) % 4,
        Direction::Cw => (4 - (spec.degrees() / 90) % 4) % 4,
    };
    match quarter_turns_ccw {
        1 => image.rotate270(),
        2 => image.rotate180(),
        3 => image.rotate90(),
        _ => image.clone(),
    }
}
