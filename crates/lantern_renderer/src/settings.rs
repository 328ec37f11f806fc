//! User-facing render settings.
//!
//! Settings are plain data: build them in code with the `with_*` methods or
//! load them from a JSON file, then hand them to [`Renderer::new`], which
//! validates them before any worker starts.
//!
//! [`Renderer::new`]: crate::Renderer::new

use std::fs;
use std::path::Path;

use lantern_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::{Color, RenderError, RenderResult};

/// Largest accepted image width or height in pixels.
pub const MAX_IMAGE_DIMENSION: u32 = 1 << 15;

/// Largest accepted pixel count.
pub const MAX_IMAGE_PIXELS: u64 = 1 << 28;

/// Camera, sampling and image settings for one render.
///
/// Missing fields in a JSON file take their default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Ratio of image width over height
    pub aspect_ratio: f32,
    /// Rendered image width in pixels
    pub image_width: u32,
    /// Requested samples per pixel.
    ///
    /// Pixels are sampled on a square stratification grid, so only the
    /// largest perfect square not above this value is used: 10 requested
    /// samples render 9, 16 render 16.
    pub samples_per_pixel: u32,
    /// Maximum number of ray bounces into the scene
    pub max_depth: u32,
    /// Radiance returned by rays that escape the scene
    pub background: Color,

    /// Vertical field of view in degrees
    pub vfov: f32,
    pub look_from: Vec3,
    pub look_at: Vec3,
    /// Camera-relative "up" direction
    pub vup: Vec3,

    /// Variation angle of rays through each pixel, in degrees (0 = pinhole)
    pub defocus_angle: f32,
    /// Distance from camera to plane of perfect focus
    pub focus_dist: f32,

    /// Seed for the per-row random generators. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            aspect_ratio: 1.0,
            image_width: 100,
            samples_per_pixel: 10,
            max_depth: 10,
            background: Color::ZERO,
            vfov: 90.0,
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            defocus_angle: 0.0,
            focus_dist: 10.0,
            seed: None,
        }
    }
}

impl RenderSettings {
    /// Set image width and aspect ratio.
    pub fn with_resolution(mut self, image_width: u32, aspect_ratio: f32) -> Self {
        self.image_width = image_width;
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples_per_pixel: u32, max_depth: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self.max_depth = max_depth;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, defocus_angle: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.defocus_angle = defocus_angle;
        self.focus_dist = focus_dist;
        self
    }

    /// Set background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    /// Fix the random seed, making renders reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse settings from a JSON document.
    pub fn from_json_str(json: &str) -> RenderResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> RenderResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Image height derived from width and aspect ratio, never below 1.
    pub fn image_height(&self) -> u32 {
        ((self.image_width as f32 / self.aspect_ratio) as u32).max(1)
    }

    /// Side length of the per-pixel stratification grid.
    pub fn sqrt_spp(&self) -> u32 {
        (self.samples_per_pixel as f64).sqrt() as u32
    }

    /// Number of samples actually traced per pixel.
    pub fn effective_samples_per_pixel(&self) -> u32 {
        let n = self.sqrt_spp();
        n * n
    }

    /// Reject settings that cannot produce an image.
    pub fn validate(&self) -> RenderResult<()> {
        if self.image_width == 0 {
            return Err(invalid("image width must be at least 1"));
        }
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(invalid(format!(
                "aspect ratio must be positive and finite, got {}",
                self.aspect_ratio
            )));
        }
        let (width, height) = (self.image_width, self.image_height());
        if width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
            return Err(invalid(format!(
                "image size {width}x{height} exceeds {MAX_IMAGE_DIMENSION} pixels per side"
            )));
        }
        if width as u64 * height as u64 > MAX_IMAGE_PIXELS {
            return Err(invalid(format!(
                "image size {width}x{height} exceeds {MAX_IMAGE_PIXELS} pixels"
            )));
        }
        if self.samples_per_pixel == 0 {
            return Err(invalid("samples per pixel must be at least 1"));
        }
        if !(self.vfov > 0.0 && self.vfov < 180.0) {
            return Err(invalid(format!(
                "vertical field of view must be in (0, 180) degrees, got {}",
                self.vfov
            )));
        }
        if !(self.focus_dist.is_finite() && self.focus_dist > 0.0) {
            return Err(invalid(format!(
                "focus distance must be positive, got {}",
                self.focus_dist
            )));
        }
        if !(self.defocus_angle >= 0.0 && self.defocus_angle < 180.0) {
            return Err(invalid(format!(
                "defocus angle must be in [0, 180) degrees, got {}",
                self.defocus_angle
            )));
        }

        let view = self.look_from - self.look_at;
        if !view.is_finite() || view.length_squared() == 0.0 {
            return Err(invalid("look_from and look_at must be distinct points"));
        }
        if self.vup.cross(view).length_squared() <= f32::EPSILON * view.length_squared() {
            return Err(invalid("vup must not be parallel to the view direction"));
        }
        if !self.background.is_finite() {
            return Err(invalid("background color must be finite"));
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> RenderError {
    RenderError::InvalidSettings(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stratification_truncates_to_perfect_square() {
        let settings = RenderSettings::default().with_quality(10, 5);
        assert_eq!(settings.sqrt_spp(), 3);
        assert_eq!(settings.effective_samples_per_pixel(), 9);

        let settings = RenderSettings::default().with_quality(16, 5);
        assert_eq!(settings.sqrt_spp(), 4);
        assert_eq!(settings.effective_samples_per_pixel(), 16);

        let settings = RenderSettings::default().with_quality(1, 5);
        assert_eq!(settings.effective_samples_per_pixel(), 1);
    }

    #[test]
    fn test_image_height_is_clamped() {
        let settings = RenderSettings::default().with_resolution(400, 16.0 / 9.0);
        assert_eq!(settings.image_height(), 225);

        let settings = RenderSettings::default().with_resolution(10, 100.0);
        assert_eq!(settings.image_height(), 1);
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(RenderSettings::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_dimensions_and_samples() {
        let zero_width = RenderSettings::default().with_resolution(0, 1.0);
        assert!(matches!(
            zero_width.validate(),
            Err(RenderError::InvalidSettings(_))
        ));

        let zero_spp = RenderSettings::default().with_quality(0, 10);
        assert!(matches!(
            zero_spp.validate(),
            Err(RenderError::InvalidSettings(_))
        ));

        let bad_aspect = RenderSettings::default().with_resolution(100, 0.0);
        assert!(bad_aspect.validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_images() {
        let tall = RenderSettings::default().with_resolution(100, 1e-7);
        assert!(matches!(tall.validate(), Err(RenderError::InvalidSettings(_))));

        let wide = RenderSettings::default().with_resolution(u32::MAX, 1e9);
        assert!(wide.validate().is_err());

        let square = RenderSettings::default().with_resolution(MAX_IMAGE_DIMENSION, 1.0);
        assert!(square.validate().is_err());

        let largest = RenderSettings::default().with_resolution(MAX_IMAGE_DIMENSION, 4.0);
        assert!(largest.validate().is_ok());
    }

    #[test]
    fn test_rejects_degenerate_view() {
        let same_point = RenderSettings::default().with_position(Vec3::ONE, Vec3::ONE, Vec3::Y);
        assert!(same_point.validate().is_err());

        let parallel_up =
            RenderSettings::default().with_position(Vec3::ZERO, Vec3::new(0.0, 5.0, 0.0), Vec3::Y);
        assert!(parallel_up.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_lens() {
        assert!(RenderSettings::default().with_lens(0.0, 0.0, 1.0).validate().is_err());
        assert!(RenderSettings::default().with_lens(90.0, -1.0, 1.0).validate().is_err());
        assert!(RenderSettings::default().with_lens(90.0, 0.0, 0.0).validate().is_err());
    }

    #[test]
    fn test_json_uses_defaults_for_missing_fields() {
        let settings = RenderSettings::from_json_str(
            r#"{ "image_width": 64, "samples_per_pixel": 4, "background": [0.5, 0.7, 1.0] }"#,
        )
        .unwrap();

        assert_eq!(settings.image_width, 64);
        assert_eq!(settings.samples_per_pixel, 4);
        assert_eq!(settings.background, Color::new(0.5, 0.7, 1.0));
        assert_eq!(settings.max_depth, RenderSettings::default().max_depth);
        assert_eq!(settings.seed, None);
    }

    #[test]
    fn test_json_rejects_negative_counts() {
        let result = RenderSettings::from_json_str(r#"{ "samples_per_pixel": -4 }"#);
        assert!(matches!(result, Err(RenderError::Settings(_))));
    }

    #[test]
    fn test_json_file_round_trip() {
        let settings = RenderSettings::default()
            .with_resolution(32, 2.0)
            .with_seed(7);
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), serde_json::to_string(&settings).unwrap()).unwrap();

        let loaded = RenderSettings::from_json_file(file.path()).unwrap();
        assert_eq!(loaded, settings);
    }
}
