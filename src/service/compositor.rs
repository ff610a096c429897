use crate::config::thumbnail::ThumbnailConfig;
use crate::utils::error::{Result, ThumbnailError};
use crate::utils::file::atomic_save_file;
use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{imageops, DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SHADOW: Rgba<u8> = Rgba([0, 0, 0, 255]);
const TEXT: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BACKDROP: Rgba<u8> = Rgba([0, 0, 0, 128]);
const SHRINK_STEP: f32 = 0.9;

/// Greedy word wrap at `width` characters. Words are never split, so a word
/// longer than `width` ends up alone on its own line.
pub fn wrap_title(title: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in title.split_whitespace() {
        let word_len = word.chars().count();
        if current_len == 0 {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Encoding chosen from the destination extension, PNG when unknown.
pub fn output_format(dest: &Path) -> ImageFormat {
    ImageFormat::from_path(dest).unwrap_or(ImageFormat::Png)
}

/// Pixel placement of a wrapped title.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBlock {
    pub scale: f32,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub line_height: u32,
}

impl TextBlock {
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }
}

fn measure(font: &impl Font, scale: f32, lines: &[String]) -> (u32, u32, u32) {
    let scaled = font.as_scaled(PxScale::from(scale));
    let line_height = (scaled.height() + scaled.line_gap()).ceil().max(1.0) as u32;
    let width = lines
        .iter()
        .map(|line| text_size(scale, font, line).0)
        .max()
        .unwrap_or(0);
    (width, line_height * lines.len() as u32, line_height)
}

/// Places `lines` left-aligned at the margin with the block's bottom edge one
/// margin above the image bottom. The scale shrinks until the block fits
/// inside the margins; whatever remains is clamped into the image.
pub fn layout_block(
    font: &impl Font,
    lines: &[String],
    image_width: u32,
    image_height: u32,
    config: &ThumbnailConfig,
) -> TextBlock {
    let margin = config.margin;
    let max_width = image_width.saturating_sub(margin.saturating_mul(2));
    let max_height = image_height.saturating_sub(margin.saturating_mul(2));

    let mut scale = config.font_size;
    let (mut width, mut height, mut line_height) = measure(font, scale, lines);
    while (width > max_width || height > max_height) && scale > config.min_font_size {
        scale = (scale * SHRINK_STEP).max(config.min_font_size);
        (width, height, line_height) = measure(font, scale, lines);
    }

    let x = margin.min(image_width.saturating_sub(width));
    let y = (image_height as i64 - margin as i64 - height as i64).max(0);
    TextBlock {
        scale,
        x: i32::try_from(x).unwrap_or(i32::MAX),
        y: i32::try_from(y).unwrap_or(i32::MAX),
        width,
        height,
        line_height,
    }
}

/// The padded block clipped to the image, or `None` when nothing of it is visible.
fn backdrop_rect(block: &TextBlock, padding: u32, image_width: u32, image_height: u32) -> Option<Rect> {
    let pad = i64::from(padding);
    let left = (i64::from(block.x) - pad).max(0);
    let top = (i64::from(block.y) - pad).max(0);
    let right = (block.right() + pad).min(i64::from(image_width));
    let bottom = (block.bottom() + pad).min(i64::from(image_height));
    if right <= left || bottom <= top {
        return None;
    }
    // All four edges lie within the image, so they fit in i32/u32.
    Some(Rect::at(left as i32, top as i32).of_size((right - left) as u32, (bottom - top) as u32))
}

/// Draws titles onto base images.
#[derive(Debug, Clone)]
pub struct TextCompositor {
    config: ThumbnailConfig,
}

impl TextCompositor {
    pub fn new(config: ThumbnailConfig) -> Self {
        Self { config }
    }

    pub fn load_font(&self) -> Result<FontVec> {
        let path = &self.config.font_path;
        let data = std::fs::read(path).map_err(|e| {
            ThumbnailError::AssetUnavailable(format!("font {}: {}", path.display(), e))
        })?;
        FontVec::try_from_vec(data).map_err(|e| {
            ThumbnailError::AssetUnavailable(format!("font {}: {}", path.display(), e))
        })
    }

    /// Renders `title` onto the image at `source` and writes the result to
    /// `dest`. Nothing is written unless every step succeeds.
    pub fn composite(&self, source: &Path, title: &str, dest: &Path) -> Result<PathBuf> {
        let encoded = self.encode(source, title, output_format(dest))?;
        atomic_save_file(dest, &encoded)?;
        info!("Final thumbnail saved to {}", dest.display());
        Ok(dest.to_path_buf())
    }

    /// Renders `title` onto the image at `source` and returns it encoded as
    /// `format`, without touching the filesystem beyond reading the inputs.
    pub fn encode(&self, source: &Path, title: &str, format: ImageFormat) -> Result<Vec<u8>> {
        info!("Adding text to {}", source.display());
        let base = image::open(source).map_err(|e| {
            ThumbnailError::AssetUnavailable(format!("image {}: {}", source.display(), e))
        })?;
        let font = self.load_font()?;

        let rendered = self.render(base, title, &font);

        let mut encoded = Vec::new();
        DynamicImage::ImageRgb8(rendered)
            .write_to(&mut Cursor::new(&mut encoded), format)
            .map_err(|e| ThumbnailError::WriteFailed(format!("encode {:?}: {}", format, e)))?;
        Ok(encoded)
    }

    /// Draws the backdrop, shadow and title on a transparent layer, blends it
    /// over `base` and flattens the result.
    pub fn render(&self, base: DynamicImage, title: &str, font: &impl Font) -> image::RgbImage {
        let mut canvas = base.to_rgba8();
        let (width, height) = canvas.dimensions();
        let lines = wrap_title(title, self.config.wrap_width);
        if lines.is_empty() {
            return DynamicImage::ImageRgba8(canvas).to_rgb8();
        }

        let block = layout_block(font, &lines, width, height, &self.config);
        debug!(?block, lines = lines.len(), "laid out title");

        let mut layer = RgbaImage::new(width, height);
        if self.config.draw_backdrop {
            if let Some(rect) = backdrop_rect(&block, self.config.box_padding, width, height) {
                draw_filled_rect_mut(&mut layer, rect, BACKDROP);
            }
        }

        // A shadow further away than the image extent is off-canvas anyway.
        let limit = i32::try_from(width.max(height)).unwrap_or(i32::MAX / 4);
        let offset = self.config.shadow_offset.clamp(-limit, limit);
        for (color, dx) in [(SHADOW, offset), (TEXT, 0)] {
            for (i, line) in lines.iter().enumerate() {
                let row = i64::from(block.y) + i as i64 * i64::from(block.line_height);
                let y = i32::try_from(row).unwrap_or(i32::MAX);
                draw_text_mut(
                    &mut layer,
                    color,
                    block.x.saturating_add(dx),
                    y.saturating_add(dx),
                    block.scale,
                    font,
                    line,
                );
            }
        }

        imageops::overlay(&mut canvas, &layer, 0, 0);
        DynamicImage::ImageRgba8(canvas).to_rgb8()
    }
}
