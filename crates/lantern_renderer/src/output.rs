//! Tonemapping and image output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use lantern_math::Interval;

use crate::{Color, RenderResult};

/// 8-bit display color.
pub type Rgb = [u8; 3];

/// Apply gamma correction (gamma = 2.0).
///
/// Non-positive and NaN inputs map to 0.
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to 8-bit RGB.
pub fn color_to_rgb(color: Color) -> Rgb {
    let to_byte = |c: f32| (255.0 * Interval::UNIT.clamp(linear_to_gamma(c))) as u8;
    [to_byte(color.x), to_byte(color.y), to_byte(color.z)]
}

/// A rendered image, stored row-major from the top row down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl Image {
    /// Create a black image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 3]; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Rgb {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Disjoint mutable rows, top to bottom.
    pub(crate) fn rows_mut(&mut self) -> std::slice::ChunksMut<'_, Rgb> {
        self.pixels.chunks_mut(self.width as usize)
    }

    /// Write the image as plain-text PPM (P3).
    pub fn write_ppm<W: Write>(&self, writer: &mut W) -> RenderResult<()> {
        write!(writer, "P3\n{} {}\n255\n", self.width, self.height)?;
        for [r, g, b] in &self.pixels {
            writeln!(writer, "{r} {g} {b}")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Save to `path`.
    ///
    /// `.ppm` files are written as P3 text, every other extension is
    /// handed to the `image` crate, which picks the encoder.
    pub fn save(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        let path = path.as_ref();
        let is_ppm = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ppm"));

        if is_ppm {
            let mut writer = BufWriter::new(File::create(path)?);
            self.write_ppm(&mut writer)?;
        } else {
            image::save_buffer(
                path,
                &self.pixels.concat(),
                self.width,
                self.height,
                image::ColorType::Rgb8,
            )?;
        }

        log::info!("Saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}
