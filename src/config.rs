// Configuration management
//
// Display settings, persisted as TOML next to the binary.

use crate::backend::BackendKind;
use crate::surface::{
    Rect, BUFFER_HEIGHT, BUFFER_WIDTH, SCREEN_HEIGHT, SCREEN_WIDTH, SCREEN_X, SCREEN_Y,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

/// Default configuration file path
pub const CONFIG_FILE: &str = "display_config.toml";

/// Display configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Presentation settings
    pub video: VideoConfig,

    /// Back buffer geometry
    pub buffer: BufferConfig,
}

/// Video configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Render target kind
    pub backend: BackendKind,

    /// Window scale (1-8)
    pub scale: u32,

    /// Enable VSync
    pub vsync: bool,

    /// Target FPS
    pub fps: u32,
}

/// Back buffer geometry
///
/// The visible screen is a window into the larger buffer; the margins let
/// drawing code clip sprites by overdrawing instead of testing bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferConfig {
    pub width: usize,
    pub height: usize,
    pub screen_x: usize,
    pub screen_y: usize,
    pub screen_width: usize,
    pub screen_height: usize,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Texture,
            scale: 1,
            vsync: true,
            fps: 60,
        }
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            width: BUFFER_WIDTH,
            height: BUFFER_HEIGHT,
            screen_x: SCREEN_X,
            screen_y: SCREEN_Y,
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayConfig {
    /// Create a configuration with default values
    ///
    /// Default: texture backend, 1x scale, 60 FPS, VSync enabled,
    /// 768x656 buffer with a 640x480 screen at (64, 160)
    pub fn new() -> Self {
        Self {
            video: VideoConfig::default(),
            buffer: BufferConfig::default(),
        }
    }

    /// Set the render target kind
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.video.backend = backend;
        self
    }

    /// Set the scale factor
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.video.scale = scale.clamp(1, 8);
        self
    }

    /// Set the target frame rate
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.video.fps = fps.max(1);
        self
    }

    /// Set VSync enabled or disabled
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.video.vsync = vsync;
        self
    }

    /// Get the window width in pixels
    pub fn window_width(&self) -> u32 {
        scaled(self.buffer.screen_width, self.video.scale)
    }

    /// Get the window height in pixels
    pub fn window_height(&self) -> u32 {
        scaled(self.buffer.screen_height, self.video.scale)
    }

    /// Get the frame duration for the target FPS
    pub fn frame_duration(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.video.fps.max(1) as u64)
    }

    /// Visible screen area in back buffer coordinates
    pub fn screen_rect(&self) -> Rect {
        Rect::from_origin_size(
            self.buffer.screen_x,
            self.buffer.screen_y,
            self.buffer.screen_width,
            self.buffer.screen_height,
        )
    }

    /// Load configuration from file or fall back to defaults
    ///
    /// If the file can't be read, the defaults are written to `path` so the
    /// user has something to edit.
    ///
    /// # Arguments
    ///
    /// * `path` - Configuration file path
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|e| {
            log::info!("Using default display config ({}): {}", path.display(), e);
            let config = Self::default();
            if let Err(e) = config.save(path) {
                log::warn!("Failed to write {}: {}", path.display(), e);
            }
            config
        })
    }

    /// Load configuration from file
    ///
    /// Out-of-range scale and fps are clamped like the builders do; an empty
    /// buffer or a screen that doesn't fit inside it is rejected.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, io::Error> {
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        config.validate()
    }

    fn validate(self) -> Result<Self, io::Error> {
        let buffer = &self.buffer;
        if buffer.width == 0
            || buffer.height == 0
            || buffer.screen_width == 0
            || buffer.screen_height == 0
        {
            return Err(invalid("buffer and screen dimensions must be non-zero"));
        }

        let fits = |origin: usize, size: usize, limit: usize| {
            origin.checked_add(size).is_some_and(|end| end <= limit)
        };
        if !fits(buffer.screen_x, buffer.screen_width, buffer.width)
            || !fits(buffer.screen_y, buffer.screen_height, buffer.height)
        {
            return Err(invalid("screen area lies outside the buffer"));
        }

        let scale = self.video.scale;
        let fps = self.video.fps;
        Ok(self.with_scale(scale).with_fps(fps))
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), io::Error> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, contents)
    }
}

fn scaled(size: usize, scale: u32) -> u32 {
    u32::try_from(size)
        .unwrap_or(u32::MAX)
        .saturating_mul(scale)
}

fn invalid(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DisplayConfig::default();
        assert_eq!(config.video.backend, BackendKind::Texture);
        assert_eq!(config.video.fps, 60);
        assert_eq!(config.buffer.width, 768);
        assert_eq!(config.buffer.height, 656);
        assert_eq!(config.screen_rect(), Rect::new(64, 160, 703, 639));
    }

    #[test]
    fn test_builders_clamp() {
        let config = DisplayConfig::new().with_scale(20).with_fps(0);
        assert_eq!(config.video.scale, 8);
        assert_eq!(config.video.fps, 1);
        assert_eq!(config.window_width(), 640 * 8);
        assert_eq!(config.frame_duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_config_serialization() {
        let config = DisplayConfig::new()
            .with_backend(BackendKind::Window)
            .with_vsync(false);
        let toml_str = toml::to_string(&config).expect("Failed to serialize");
        assert!(toml_str.contains("backend = \"window\""));

        let deserialized: DisplayConfig =
            toml::from_str(&toml_str).expect("Failed to deserialize");
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!(
            "palette_display_config_{}.toml",
            std::process::id()
        ));
        let config = DisplayConfig::new().with_scale(2);
        config.save(&path).unwrap();

        let loaded = DisplayConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        fs::remove_file(&path).ok();
    }

    fn temp_config(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "palette_display_{}_{}.toml",
            name,
            std::process::id()
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    fn config_text(config: &DisplayConfig) -> String {
        toml::to_string(config).expect("Failed to serialize")
    }

    #[test]
    fn test_load_clamps_scale_and_fps() {
        let mut config = DisplayConfig::new();
        config.video.scale = 100_000_000;
        config.video.fps = 0;
        let path = temp_config("clamp", &config_text(&config));

        let loaded = DisplayConfig::load(&path).unwrap();
        assert_eq!(loaded.video.scale, 8);
        assert_eq!(loaded.video.fps, 1);
        assert_eq!(loaded.window_width(), 640 * 8);
        assert_eq!(loaded.window_height(), 480 * 8);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_rejects_zero_dimensions() {
        let mut config = DisplayConfig::new();
        config.buffer.screen_width = 0;
        let path = temp_config("zero_screen", &config_text(&config));
        let err = DisplayConfig::load(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        fs::remove_file(&path).ok();

        let mut config = DisplayConfig::new();
        config.buffer.height = 0;
        let path = temp_config("zero_buffer", &config_text(&config));
        let err = DisplayConfig::load(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_rejects_screen_outside_buffer() {
        let mut config = DisplayConfig::new();
        config.buffer.screen_x = 700;
        let path = temp_config("outside", &config_text(&config));

        let err = DisplayConfig::load(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_window_size_saturates() {
        let mut config = DisplayConfig::new();
        config.buffer.screen_width = usize::MAX;
        config.video.scale = 8;
        assert_eq!(config.window_width(), u32::MAX);
    }

    #[test]
    fn test_load_invalid_toml() {
        let path = std::env::temp_dir().join(format!(
            "palette_display_bad_{}.toml",
            std::process::id()
        ));
        fs::write(&path, "video = 3").unwrap();

        let err = DisplayConfig::load(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        fs::remove_file(&path).ok();
    }
}
