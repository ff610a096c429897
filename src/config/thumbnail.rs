use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Layout and asset settings shared by the compositor and the workflow.
#[derive(Clone, Debug)]
pub struct ThumbnailConfig {
    pub width: u32,
    pub height: u32,
    pub font_path: PathBuf,
    pub font_size: f32,
    /// Smallest scale the layout may shrink to when a title does not fit.
    pub min_font_size: f32,
    pub margin: u32,
    /// Maximum characters per wrapped line.
    pub wrap_width: usize,
    pub box_padding: u32,
    pub shadow_offset: i32,
    pub draw_backdrop: bool,
    pub temp_dir: PathBuf,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 512,
            font_path: PathBuf::from("assets/fonts/DejaVuSans-Bold.ttf"),
            font_size: 60.0,
            min_font_size: 20.0,
            margin: 60,
            wrap_width: 30,
            box_padding: 20,
            shadow_offset: 2,
            draw_backdrop: true,
            temp_dir: env::temp_dir(),
        }
    }
}

fn parse_env<T: FromStr>(key: &str, target: &mut T) -> Result<(), String> {
    if let Ok(value) = env::var(key) {
        *target = value
            .trim()
            .parse::<T>()
            .map_err(|_| format!("{} has an invalid value '{}'", key, value))?;
    }
    Ok(())
}

impl ThumbnailConfig {
    pub fn init_from_env(&mut self) -> Result<(), String> {
        parse_env("THUMBNAIL_WIDTH", &mut self.width)?;
        parse_env("THUMBNAIL_HEIGHT", &mut self.height)?;
        parse_env("THUMBNAIL_FONT", &mut self.font_path)?;
        parse_env("THUMBNAIL_FONT_SIZE", &mut self.font_size)?;
        parse_env("THUMBNAIL_MARGIN", &mut self.margin)?;
        parse_env("THUMBNAIL_WRAP_WIDTH", &mut self.wrap_width)?;
        parse_env("THUMBNAIL_BOX_PADDING", &mut self.box_padding)?;
        parse_env("THUMBNAIL_SHADOW_OFFSET", &mut self.shadow_offset)?;
        parse_env("THUMBNAIL_BACKDROP", &mut self.draw_backdrop)?;
        parse_env("THUMBNAIL_TEMP_DIR", &mut self.temp_dir)?;

        if self.width == 0 || self.height == 0 {
            return Err("THUMBNAIL_WIDTH and THUMBNAIL_HEIGHT must be positive".to_string());
        }
        if self.wrap_width == 0 {
            return Err("THUMBNAIL_WRAP_WIDTH must be positive".to_string());
        }
        if self.font_size <= 0.0 {
            return Err("THUMBNAIL_FONT_SIZE must be positive".to_string());
        }
        self.min_font_size = self.min_font_size.min(self.font_size);

        Ok(())
    }
}
