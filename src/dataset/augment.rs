use anyhow::{Context, Result};
use rand::Rng;
use std::fs;
use std::path::Path;

/// Offline augmentation settings for the external training tool, rendered
/// as its protobuf-text spec file.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentSpec {
    pub rotation_angle: u32,
    pub flip_vertical: bool,
    pub flip_horizontal: bool,
    pub shear_ratio_x: f64,
    pub shear_ratio_y: f64,
    pub translate_x: u32,
    pub translate_y: u32,
    pub hue_rotation_angle: u32,
    pub saturation_shift: f64,
    pub contrast: f64,
    pub center: f64,
    pub brightness_offset: u32,
    pub blur_std: f64,
    pub blur_size: u32,
    pub output_width: u32,
    pub output_height: u32,
    pub image_extension: String,
}

impl AugmentSpec {
    /// A spec that leaves images unchanged.
    pub fn identity(width: u32, height: u32, ext: &str) -> Self {
        Self {
            rotation_angle: 0,
            flip_vertical: false,
            flip_horizontal: false,
            shear_ratio_x: 0.0,
            shear_ratio_y: 0.0,
            translate_x: 0,
            translate_y: 0,
            hue_rotation_angle: 0,
            saturation_shift: 1.0,
            contrast: 0.0,
            center: 127.5,
            brightness_offset: 0,
            blur_std: 1.0,
            blur_size: 0,
            output_width: width,
            output_height: height,
            image_extension: ext.to_string(),
        }
    }

    /// Each augmentation group is switched on by a fair coin flip and then
    /// drawn from its range. Contrast and center stay at their neutral values.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, width: u32, height: u32, ext: &str) -> Self {
        let enable_rotation = rng.gen_bool(0.5);
        let enable_translation = rng.gen_bool(0.5);
        let enable_shear = rng.gen_bool(0.5);
        let enable_color = rng.gen_bool(0.5);
        let enable_brightness = rng.gen_bool(0.5);
        let enable_blur = rng.gen_bool(0.5);

        let mut spec = Self::identity(width, height, ext);

        if enable_rotation {
            spec.rotation_angle = rng.gen_range(0..=180);
        }
        if enable_translation {
            spec.translate_x = rng.gen_range(0..=width / 4);
            spec.translate_y = rng.gen_range(0..=height / 4);
        }
        if enable_shear {
            spec.shear_ratio_x = rng.gen_range(0.0..0.5);
            spec.shear_ratio_y = rng.gen_range(0.0..0.5);
        }
        if enable_color {
            spec.hue_rotation_angle = rng.gen_range(0..=359);
            spec.saturation_shift = rng.gen_range(0.3..1.0);
        }
        if enable_brightness {
            // much past 75 washes the image out
            spec.brightness_offset = rng.gen_range(0..=75);
        }
        if enable_blur {
            // kernel size must be odd
            spec.blur_size = rng.gen_range(0..10) * 2 + 1;
            spec.blur_std = rng.gen_range(0.8..1.2);
        }

        spec.flip_vertical = rng.gen_bool(0.5);
        spec.flip_horizontal = rng.gen_bool(0.5);
        spec
    }

    pub fn render(&self) -> String {
        format!(
            r#"spatial_config {{
  rotation_config {{
    angle: {rotation}
    units: "degrees"
  }}
  flip_config {{
    flip_vertical: {flip_v}
    flip_horizontal: {flip_h}
  }}
  shear_config {{
    shear_ratio_x: {shear_x}
    shear_ratio_y: {shear_y}
  }}
  translation_config {{
    translate_x: {translate_x}
    translate_y: {translate_y}
  }}
}}
color_config {{
  hue_saturation_config {{
    hue_rotation_angle: {hue}
    saturation_shift: {saturation}
  }}
  contrast_config {{
    contrast: {contrast}
    center: {center}
  }}
  brightness_config {{
    offset: {brightness}
  }}
}}
blur_config {{
  std: {blur_std}
  size: {blur_size}
}}
# Setting up dataset config.
dataset_config {{
  image_path: "images"
  label_path: "labels"
}}
output_image_width: {width}
output_image_height: {height}
output_image_channel: 3
image_extension: "{ext}"
"#,
            rotation = self.rotation_angle,
            flip_v = self.flip_vertical,
            flip_h = self.flip_horizontal,
            shear_x = self.shear_ratio_x,
            shear_y = self.shear_ratio_y,
            translate_x = self.translate_x,
            translate_y = self.translate_y,
            hue = self.hue_rotation_angle,
            saturation = self.saturation_shift,
            contrast = self.contrast,
            center = self.center,
            brightness = self.brightness_offset,
            blur_std = self.blur_std,
            blur_size = self.blur_size,
            width = self.output_width,
            height = self.output_height,
            ext = self.image_extension,
        )
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render())
            .with_context(|| format!("Failed to write augmentation spec {}", path.display()))
    }
}
