//! Rating badge rendering.
//!
//! [`BadgeAnnotator`] draws one horizontal bar per rating across the bottom
//! of the poster, filled in proportion to the score and coloured per
//! provider, and returns the result as a PNG `data:` URI.

use std::io::Cursor;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use rp_core::config::AnnotationConfig;
use rp_core::rating::{IMDB, METACRITIC, ROTTEN_TOMATOES};
use rp_core::{Error, RatingMapping, RatingValue, Result};
use tracing::debug;

use super::PosterAnnotator;

const TRACK: Rgba<u8> = Rgba([64, 64, 64, 255]);
const OTHER: Rgba<u8> = Rgba([200, 200, 200, 255]);

/// Fraction of the original brightness kept under the badge strip.
const SHADE: f32 = 0.35;

fn provider_colour(provider: &str) -> Rgba<u8> {
    match provider {
        IMDB => Rgba([245, 197, 24, 255]),
        METACRITIC => Rgba([102, 204, 51, 255]),
        ROTTEN_TOMATOES => Rgba([250, 50, 10, 255]),
        _ => OTHER,
    }
}

/// Score as a fraction of its scale. Scores up to 10 are read as 10-point,
/// anything larger as 100-point.
fn score_fraction(value: &RatingValue) -> f32 {
    let Some(score) = value.as_f64() else {
        return 0.0;
    };
    let scale = if score <= 10.0 { 10.0 } else { 100.0 };
    (score / scale).clamp(0.0, 1.0) as f32
}

/// Renders rating bars onto poster images with the `image` crate.
#[derive(Debug, Clone, Copy)]
pub struct BadgeAnnotator {
    bar_height: u32,
    padding: u32,
}

impl BadgeAnnotator {
    pub fn new(config: &AnnotationConfig) -> Self {
        Self {
            bar_height: config.bar_height,
            padding: config.padding,
        }
    }

    /// Decode `data`, draw the bars, and return PNG bytes.
    pub fn render(&self, data: &[u8], ratings: &RatingMapping) -> Result<Vec<u8>> {
        let mut canvas = image::load_from_memory(data)
            .map_err(|e| Error::Image(format!("failed to decode poster: {e}")))?
            .to_rgba8();

        self.draw_bars(&mut canvas, ratings)?;

        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(canvas)
            .write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| Error::Image(format!("failed to encode poster: {e}")))?;
        Ok(buf.into_inner())
    }

    fn draw_bars(&self, canvas: &mut RgbaImage, ratings: &RatingMapping) -> Result<()> {
        let (width, height) = canvas.dimensions();
        let count = ratings.len() as u32;
        let strip = count * self.bar_height + (count + 1) * self.padding;

        if strip >= height || width <= 2 * self.padding {
            return Err(Error::Image(format!(
                "poster {width}x{height} too small for {count} rating bars"
            )));
        }

        let top = height - strip;
        for y in top..height {
            for x in 0..width {
                let px = canvas.get_pixel_mut(x, y);
                for channel in &mut px.0[..3] {
                    *channel = (*channel as f32 * SHADE) as u8;
                }
            }
        }

        let track = width - 2 * self.padding;
        for (i, (provider, value)) in ratings.iter().enumerate() {
            let y0 = top + self.padding + i as u32 * (self.bar_height + self.padding);
            let filled = (track as f32 * score_fraction(value)).round() as u32;
            let colour = provider_colour(provider);

            for y in y0..y0 + self.bar_height {
                for dx in 0..track {
                    let px = if dx < filled { colour } else { TRACK };
                    canvas.put_pixel(self.padding + dx, y, px);
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl PosterAnnotator for BadgeAnnotator {
    async fn annotate(&self, image_base64: &str, ratings: &RatingMapping) -> Result<String> {
        let data = STANDARD
            .decode(image_base64)
            .map_err(|e| Error::Image(format!("invalid base64 poster: {e}")))?;

        let renderer = *self;
        let ratings = ratings.clone();
        let png = tokio::task::spawn_blocking(move || renderer.render(&data, &ratings))
            .await
            .map_err(|e| Error::Internal(format!("render task failed: {e}")))??;

        debug!(bytes = png.len(), "Rendered rating badges");
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
    }
}
