// SwimPose Tools 🏊 AGPL-3.0 License

//! Annotation overlay rendering for visual verification.
//!
//! Draws the bounding box, per-keypoint markers, skeleton limbs (for
//! 17-keypoint labels), and keypoint index text onto a copy of the image so
//! label files can be eyeballed against their frames.

use ab_glyph::{FontRef, PxScale};
use image::{DynamicImage, Rgb};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut,
};
use imageproc::rect::Rect;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::annotation::{Annotation, COCO_KEYPOINT_COUNT, Visibility};
use crate::visualizer::{Color, KPT_COLOR_INDICES, LIMB_COLOR_INDICES, SKELETON};

/// Assets URL for downloading fonts.
const ASSETS_URL: &str = "https://github.com/ultralytics/assets/releases/download/v0.0.0";

/// Marker radius in pixels.
const KPT_RADIUS: i32 = 5;

/// Fixed color for occluded (`v == 1`) keypoints.
const OCCLUDED_COLOR: Color = Color(255, 165, 0);

/// Check if the font exists locally or download it.
pub fn check_font(font: &str) -> Option<PathBuf> {
    let font_name = Path::new(font).file_name()?.to_string_lossy();
    let config_dir = dirs::config_dir()?.join("SwimPose");
    let font_path = config_dir.join(font_name.as_ref());

    if font_path.exists() {
        return Some(font_path);
    }

    if let Err(e) = fs::create_dir_all(&config_dir) {
        eprintln!("Failed to create config directory: {e}");
        return None;
    }

    let url = format!("{ASSETS_URL}/{font_name}");
    println!("Downloading {url} to {}", font_path.display());

    match ureq::get(&url).call() {
        Ok(response) => {
            let mut file = match File::create(&font_path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Failed to create font file: {e}");
                    return None;
                }
            };

            let mut reader = response.into_body().into_reader();
            if let Err(e) = io::copy(&mut reader, &mut file) {
                eprintln!("Failed to download font: {e}");
                let _ = fs::remove_file(&font_path);
                return None;
            }

            Some(font_path)
        }
        Err(e) => {
            eprintln!("Failed to download font from {url}: {e}");
            None
        }
    }
}

fn load_font_data() -> Option<Vec<u8>> {
    let font_path = check_font("Arial.ttf")?;
    let mut file = File::open(font_path).ok()?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer).ok()?;
    Some(buffer)
}

/// Render box, keypoints, and skeleton for each subject onto the image.
///
/// Text labels degrade gracefully: if no font can be loaded the overlay is
/// drawn shapes-only.
#[must_use]
pub fn annotate_image(image: &DynamicImage, annotations: &[Annotation]) -> DynamicImage {
    let mut img = image.to_rgb8();
    let (width, height) = img.dimensions();
    let (wf, hf) = (f64::from(width), f64::from(height));

    let font_data = load_font_data();
    let font = font_data
        .as_ref()
        .and_then(|data| FontRef::try_from_slice(data).ok());

    for ann in annotations {
        draw_box(&mut img, ann, wf, hf, font.as_ref());
        if ann.keypoints.len() == COCO_KEYPOINT_COUNT {
            draw_skeleton(&mut img, ann, wf, hf);
        }
        draw_keypoints(&mut img, ann, wf, hf, font.as_ref());
    }

    DynamicImage::ImageRgb8(img)
}

fn draw_box(
    img: &mut image::RgbImage,
    ann: &Annotation,
    wf: f64,
    hf: f64,
    font: Option<&FontRef<'_>>,
) {
    let (width, height) = img.dimensions();
    let box_ = &ann.box_;

    let mut x1 = ((box_.cx - box_.bw / 2.0) * wf).round() as i32;
    let mut y1 = ((box_.cy - box_.bh / 2.0) * hf).round() as i32;
    let mut x2 = ((box_.cx + box_.bw / 2.0) * wf).round() as i32;
    let mut y2 = ((box_.cy + box_.bh / 2.0) * hf).round() as i32;

    if x1 > x2 {
        std::mem::swap(&mut x1, &mut x2);
    }
    if y1 > y2 {
        std::mem::swap(&mut y1, &mut y2);
    }

    x1 = x1.max(0).min(width as i32 - 1);
    y1 = y1.max(0).min(height as i32 - 1);
    x2 = x2.max(0).min(width as i32 - 1);
    y2 = y2.max(0).min(height as i32 - 1);

    if x2 <= x1 || y2 <= y1 {
        return;
    }

    let color = Color::from_index(ann.class_id as usize).to_rgb();

    let thickness = 3;
    for t in 0..thickness {
        let tx1 = (x1 + t).min(x2);
        let ty1 = (y1 + t).min(y2);
        let tx2 = (x2 - t).max(tx1);
        let ty2 = (y2 - t).max(ty1);
        if tx2 > tx1 && ty2 > ty1 {
            let rect = Rect::at(tx1, ty1).of_size((tx2 - tx1) as u32, (ty2 - ty1) as u32);
            draw_hollow_rect_mut(img, rect, color);
        }
    }

    if let Some(f) = font {
        let label = format!("class {}", ann.class_id);
        let scale = PxScale::from(16.0);
        let text_y = if y1 > 20 { y1 - 20 } else { y2 + 5 };
        let text_x = x1.max(0);
        if text_x < width as i32 && text_y >= 0 && text_y < height as i32 {
            draw_text_mut(img, color, text_x, text_y, scale, f, &label);
        }
    }
}

fn draw_skeleton(img: &mut image::RgbImage, ann: &Annotation, wf: f64, hf: f64) {
    for (limb, &color_idx) in SKELETON.iter().zip(&LIMB_COLOR_INDICES) {
        let a = &ann.keypoints[limb[0]];
        let b = &ann.keypoints[limb[1]];
        // A limb is only drawn when both endpoints are labeled.
        if a.v == Visibility::NotLabeled || b.v == Visibility::NotLabeled {
            continue;
        }
        let start = ((a.x * wf) as f32, (a.y * hf) as f32);
        let end = ((b.x * wf) as f32, (b.y * hf) as f32);
        draw_line_segment_mut(img, start, end, Color::from_pose_index(color_idx).to_rgb());
    }
}

fn draw_keypoints(
    img: &mut image::RgbImage,
    ann: &Annotation,
    wf: f64,
    hf: f64,
    font: Option<&FontRef<'_>>,
) {
    let (width, height) = img.dimensions();
    let coco_layout = ann.keypoints.len() == COCO_KEYPOINT_COUNT;

    for (i, kpt) in ann.keypoints.iter().enumerate() {
        if kpt.v == Visibility::NotLabeled {
            continue;
        }

        let px = (kpt.x * wf).round() as i32;
        let py = (kpt.y * hf).round() as i32;
        if px < 0 || py < 0 || px >= width as i32 || py >= height as i32 {
            continue;
        }

        let color = match kpt.v {
            Visibility::Occluded => OCCLUDED_COLOR,
            _ if coco_layout => Color::from_pose_index(KPT_COLOR_INDICES[i]),
            _ => Color::GREEN,
        };
        draw_filled_circle_mut(img, (px, py), KPT_RADIUS, color.to_rgb());

        if let Some(f) = font {
            let scale = PxScale::from(12.0);
            let (tx, ty) = (px + KPT_RADIUS + 1, (py - KPT_RADIUS - 1).max(0));
            if tx < width as i32 {
                draw_text_mut(img, Rgb([255, 255, 255]), tx, ty, scale, f, &i.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coco_sample() -> Annotation {
        let mut line = "0 0.500000 0.500000 0.500000 0.500000".to_string();
        for i in 0..COCO_KEYPOINT_COUNT {
            if i % 5 == 0 {
                line.push_str(" 0.000000 0.000000 0");
            } else {
                line.push_str(&format!(" 0.{:02}0000 0.400000 2", 10 + i));
            }
        }
        Annotation::parse_line(&line).unwrap()
    }

    #[test]
    fn test_annotate_preserves_dimensions() {
        let img = DynamicImage::new_rgb8(320, 240);
        let out = annotate_image(&img, &[coco_sample()]);
        assert_eq!((out.width(), out.height()), (320, 240));
    }

    #[test]
    fn test_annotate_draws_on_blank_image() {
        let img = DynamicImage::new_rgb8(320, 240);
        let out = annotate_image(&img, &[coco_sample()]).to_rgb8();
        let touched = out.pixels().filter(|p| p.0 != [0, 0, 0]).count();
        assert!(touched > 0, "overlay drew nothing");
    }

    #[test]
    fn test_annotate_empty_annotations_is_identity() {
        let img = DynamicImage::new_rgb8(32, 32);
        let out = annotate_image(&img, &[]).to_rgb8();
        assert!(out.pixels().all(|p| p.0 == [0, 0, 0]));
    }
}
