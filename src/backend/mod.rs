// Backend module - Render targets the composited frame is presented to
//
// Two structurally different targets exist:
// - Texture: a GPU texture drawn by a renderer (upload, clear, draw, submit)
// - Window: the window's own pixel surface, pushed in one step
//
// The target is chosen once when the surfaces are created and stays fixed
// until teardown.

pub mod headless;
#[cfg(feature = "window")]
pub mod texture;
#[cfg(feature = "window")]
pub mod window;
#[cfg(feature = "window")]
pub mod window_surface;

use crate::error::BackendError;
use crate::surface::TrueColorSurface;
use log::error;
use serde::{Deserialize, Serialize};

/// Color the texture target is cleared to before drawing
pub const CLEAR_COLOR: [u8; 4] = [0, 0, 0, 0xFF];

/// Which render target a backend creates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// GPU texture + renderer
    #[default]
    Texture,
    /// Window surface only
    Window,
}

/// Hardware-accelerated texture renderer primitives
pub trait TextureRenderer {
    /// Size of the renderer output in pixels
    fn output_size(&self) -> Result<(u32, u32), BackendError>;

    /// Replace the texture contents with RGBA rows `pitch` bytes apart
    fn update_texture(&mut self, pixels: &[u8], pitch: usize) -> Result<(), BackendError>;

    /// Color used by `clear`
    fn set_draw_color(&mut self, rgba: [u8; 4]) -> Result<(), BackendError>;

    /// Clear the whole render target
    fn clear(&mut self) -> Result<(), BackendError>;

    /// Draw the texture stretched over the whole render target
    fn copy_texture(&mut self) -> Result<(), BackendError>;

    /// Submit the frame
    fn present(&mut self) -> Result<(), BackendError>;
}

/// Direct window surface primitives
pub trait WindowSurface {
    /// Size of the window surface in pixels
    fn size(&self) -> Result<(u32, u32), BackendError>;

    /// Push the surface contents to the window
    fn update(&mut self, surface: &TrueColorSurface) -> Result<(), BackendError>;
}

/// Active render target
pub enum RenderTarget<R, S> {
    Texture(R),
    Window(S),
}

impl<R: TextureRenderer, S: WindowSurface> RenderTarget<R, S> {
    pub fn kind(&self) -> BackendKind {
        match self {
            RenderTarget::Texture(_) => BackendKind::Texture,
            RenderTarget::Window(_) => BackendKind::Window,
        }
    }

    /// Push a frame to the screen
    ///
    /// Each backend call is attempted once; failures are logged and the
    /// remaining steps still run.
    pub fn present(&mut self, surface: &TrueColorSurface) {
        match self {
            RenderTarget::Texture(renderer) => {
                if let Err(e) = renderer.update_texture(surface.as_bytes(), surface.pitch()) {
                    error!("Texture upload failed: {}", e);
                }

                // A resized window leaves stale pixels outside the drawn area
                if let Err(e) = renderer.set_draw_color(CLEAR_COLOR) {
                    error!("Setting draw color failed: {}", e);
                }
                if let Err(e) = renderer.clear() {
                    error!("Render clear failed: {}", e);
                }

                if let Err(e) = renderer.copy_texture() {
                    error!("Texture copy failed: {}", e);
                }
                if let Err(e) = renderer.present() {
                    error!("Render present failed: {}", e);
                }
            }
            RenderTarget::Window(window) => {
                if let Err(e) = window.update(surface) {
                    error!("Window surface update failed: {}", e);
                }
            }
        }
    }
}

/// Source of render targets and owner of the window they draw into
pub trait Backend {
    type Renderer: TextureRenderer;
    type Surface: WindowSurface;

    /// Create a render target; called on every (re)initialization
    fn create_render_target(
        &mut self,
    ) -> Result<RenderTarget<Self::Renderer, Self::Surface>, BackendError>;

    /// Whether a window exists
    fn has_window(&self) -> bool {
        false
    }

    /// Show the window and bring it to the front
    fn show_window(&mut self) {}

    /// Hide the window
    fn hide_window(&mut self) {}
}
