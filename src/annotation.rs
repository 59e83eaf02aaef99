// SwimPose Tools 🏊 AGPL-3.0 License

//! YOLO-pose label parsing and serialization.
//!
//! A label file holds one subject per line:
//!
//! ```text
//! <class_id> <cx> <cy> <bw> <bh> <x1> <y1> <v1> ... <xK> <yK> <vK>
//! ```
//!
//! All coordinates are normalized to `[0, 1]`. Floats are serialized with
//! fixed 6-decimal precision; visibility codes are serialized as bare
//! integers.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{DatasetError, Result};

/// Number of keypoints in the custom swimming scheme.
pub const SWIM_KEYPOINT_COUNT: usize = 14;

/// Number of keypoints in the COCO pose layout.
pub const COCO_KEYPOINT_COUNT: usize = 17;

/// Three-level keypoint visibility code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Not labeled / not visible. Coordinates are the `(0, 0)` sentinel.
    NotLabeled,
    /// Labeled but low-confidence or occluded.
    Occluded,
    /// Confidently visible.
    Visible,
}

impl Visibility {
    /// Parse a visibility code from its integer form.
    ///
    /// The source data occasionally stores codes as floats (`"2.000000"`),
    /// so the fractional part is truncated before matching.
    ///
    /// # Errors
    ///
    /// Returns `MalformedAnnotation` for codes outside `{0, 1, 2}`.
    pub fn parse(field: &str) -> Result<Self> {
        let value = field
            .parse::<f64>()
            .map_err(|_| DatasetError::MalformedAnnotation(format!("bad visibility: {field}")))?;
        match value as i64 {
            0 => Ok(Self::NotLabeled),
            1 => Ok(Self::Occluded),
            2 => Ok(Self::Visible),
            other => Err(DatasetError::MalformedAnnotation(format!(
                "visibility out of range: {other}"
            ))),
        }
    }

    /// Integer wire form of the code.
    #[must_use]
    pub const fn as_int(self) -> u8 {
        match self {
            Self::NotLabeled => 0,
            Self::Occluded => 1,
            Self::Visible => 2,
        }
    }
}

/// One anatomical landmark: normalized location plus visibility code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    /// Normalized x coordinate.
    pub x: f64,
    /// Normalized y coordinate.
    pub y: f64,
    /// Visibility code.
    pub v: Visibility,
}

impl Keypoint {
    /// The `(0, 0, 0)` sentinel for an unlabeled keypoint.
    #[must_use]
    pub const fn absent() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            v: Visibility::NotLabeled,
        }
    }
}

/// Bounding box as center and size, normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Normalized center x.
    pub cx: f64,
    /// Normalized center y.
    pub cy: f64,
    /// Normalized width.
    pub bw: f64,
    /// Normalized height.
    pub bh: f64,
}

/// One subject: category, bounding box, and an ordered keypoint sequence.
///
/// Keypoint order is significant: position `i` always denotes the same
/// anatomical joint.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Integer category label.
    pub class_id: u32,
    /// Normalized bounding box.
    pub box_: BoundingBox,
    /// Ordered keypoint triples.
    pub keypoints: Vec<Keypoint>,
}

impl Annotation {
    /// Parse one label line.
    ///
    /// # Errors
    ///
    /// Returns `MalformedAnnotation` when the line has fewer than 5 fields,
    /// a field fails to parse, or the keypoint tail is not a multiple of 3.
    pub fn parse_line(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 5 {
            return Err(DatasetError::MalformedAnnotation(format!(
                "expected at least 5 fields, got {}",
                fields.len()
            )));
        }

        // Class may be stored as "0" or "0.0" depending on the exporter.
        let class_id = fields[0]
            .parse::<f64>()
            .map_err(|_| DatasetError::MalformedAnnotation(format!("bad class id: {}", fields[0])))?
            as u32;

        let mut box_fields = [0.0f64; 4];
        for (slot, field) in box_fields.iter_mut().zip(&fields[1..5]) {
            *slot = field.parse::<f64>().map_err(|_| {
                DatasetError::MalformedAnnotation(format!("bad box field: {field}"))
            })?;
        }

        let tail = &fields[5..];
        if tail.len() % 3 != 0 {
            return Err(DatasetError::MalformedAnnotation(format!(
                "keypoint fields not a multiple of 3: {}",
                tail.len()
            )));
        }

        let mut keypoints = Vec::with_capacity(tail.len() / 3);
        for triple in tail.chunks_exact(3) {
            let x = triple[0].parse::<f64>().map_err(|_| {
                DatasetError::MalformedAnnotation(format!("bad keypoint x: {}", triple[0]))
            })?;
            let y = triple[1].parse::<f64>().map_err(|_| {
                DatasetError::MalformedAnnotation(format!("bad keypoint y: {}", triple[1]))
            })?;
            let v = Visibility::parse(triple[2])?;
            keypoints.push(Keypoint { x, y, v });
        }

        Ok(Self {
            class_id,
            box_: BoundingBox {
                cx: box_fields[0],
                cy: box_fields[1],
                bw: box_fields[2],
                bh: box_fields[3],
            },
            keypoints,
        })
    }

    /// Serialize to one label line (no trailing newline).
    #[must_use]
    pub fn format_line(&self) -> String {
        let mut line = format!(
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class_id, self.box_.cx, self.box_.cy, self.box_.bw, self.box_.bh
        );
        for kpt in &self.keypoints {
            line.push_str(&format!(" {:.6} {:.6} {}", kpt.x, kpt.y, kpt.v.as_int()));
        }
        line
    }
}

/// Read all parseable annotations from a label file.
///
/// Malformed lines are skipped and reported back so the caller can log them;
/// they never abort the read.
///
/// # Errors
///
/// Returns an IO error if the file cannot be read at all.
pub fn read_label_file(path: &Path) -> Result<(Vec<Annotation>, Vec<DatasetError>)> {
    let content = fs::read_to_string(path).map_err(|e| {
        DatasetError::IoError(format!("failed to read {}: {e}", path.display()))
    })?;

    let mut annotations = Vec::new();
    let mut skipped = Vec::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match Annotation::parse_line(line) {
            Ok(ann) => annotations.push(ann),
            Err(e) => skipped.push(e),
        }
    }
    Ok((annotations, skipped))
}

/// Write annotations to a label file, one line per subject.
///
/// # Errors
///
/// Returns an IO error if the file or its parent directory cannot be created.
pub fn write_label_file(path: &Path, annotations: &[Annotation]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            DatasetError::IoError(format!("failed to create {}: {e}", parent.display()))
        })?;
    }

    let mut file = fs::File::create(path).map_err(|e| {
        DatasetError::IoError(format!("failed to create {}: {e}", path.display()))
    })?;
    for ann in annotations {
        writeln!(file, "{}", ann.format_line())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "0 0.500000 0.400000 0.200000 0.300000 \
         0.100000 0.200000 2 0.000000 0.000000 0 0.300000 0.400000 1";

    #[test]
    fn test_parse_line() {
        let ann = Annotation::parse_line(SAMPLE).unwrap();
        assert_eq!(ann.class_id, 0);
        assert!((ann.box_.cx - 0.5).abs() < 1e-9);
        assert!((ann.box_.bh - 0.3).abs() < 1e-9);
        assert_eq!(ann.keypoints.len(), 3);
        assert_eq!(ann.keypoints[0].v, Visibility::Visible);
        assert_eq!(ann.keypoints[1], Keypoint::absent());
        assert_eq!(ann.keypoints[2].v, Visibility::Occluded);
    }

    #[test]
    fn test_parse_rejects_short_line() {
        assert!(matches!(
            Annotation::parse_line("0 0.5 0.5 0.2"),
            Err(DatasetError::MalformedAnnotation(_))
        ));
    }

    #[test]
    fn test_parse_rejects_ragged_keypoints() {
        assert!(matches!(
            Annotation::parse_line("0 0.5 0.5 0.2 0.2 0.1 0.1"),
            Err(DatasetError::MalformedAnnotation(_))
        ));
    }

    #[test]
    fn test_parse_rejects_bad_visibility() {
        assert!(Annotation::parse_line("0 0.5 0.5 0.2 0.2 0.1 0.1 7").is_err());
    }

    #[test]
    fn test_float_class_id() {
        // Some exporters write the class as "0.0".
        let ann = Annotation::parse_line("0.0 0.5 0.5 0.2 0.2").unwrap();
        assert_eq!(ann.class_id, 0);
    }

    #[test]
    fn test_format_line_round_trip() {
        let ann = Annotation::parse_line(SAMPLE).unwrap();
        assert_eq!(ann.format_line(), SAMPLE.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    #[test]
    fn test_format_fixed_precision() {
        let ann = Annotation {
            class_id: 3,
            box_: BoundingBox {
                cx: 0.5,
                cy: 0.25,
                bw: 0.125,
                bh: 1.0 / 3.0,
            },
            keypoints: vec![Keypoint {
                x: 0.1,
                y: 0.9,
                v: Visibility::Visible,
            }],
        };
        assert_eq!(
            ann.format_line(),
            "3 0.500000 0.250000 0.125000 0.333333 0.100000 0.900000 2"
        );
    }
}
