// Winit backend - render targets for a real window
//
// Texture targets go through pixels (wgpu), window targets through softbuffer.
// The window itself outlives every render target, so a reinit only rebuilds
// the target.

use super::texture::PixelsRenderer;
use super::window_surface::SoftbufferSurface;
use super::{Backend, BackendKind, RenderTarget};
use crate::error::BackendError;
use log::info;
use std::sync::Arc;
use winit::window::Window;

/// Backend presenting into a winit window
pub struct WinitBackend {
    window: Arc<Window>,
    kind: BackendKind,
    texture_width: u32,
    texture_height: u32,
    vsync: bool,
}

impl WinitBackend {
    /// Create a backend for `window`
    ///
    /// # Arguments
    /// * `kind` - Render target to create
    /// * `texture_width`, `texture_height` - Logical frame size for texture targets
    /// * `vsync` - Synchronize texture presentation with the display
    pub fn new(
        window: Arc<Window>,
        kind: BackendKind,
        texture_width: u32,
        texture_height: u32,
        vsync: bool,
    ) -> Self {
        Self {
            window,
            kind,
            texture_width,
            texture_height,
            vsync,
        }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }
}

impl Backend for WinitBackend {
    type Renderer = PixelsRenderer;
    type Surface = SoftbufferSurface;

    fn create_render_target(
        &mut self,
    ) -> Result<RenderTarget<PixelsRenderer, SoftbufferSurface>, BackendError> {
        info!("WinitBackend: creating {:?} render target", self.kind);
        match self.kind {
            BackendKind::Texture => PixelsRenderer::new(
                self.window.clone(),
                self.texture_width,
                self.texture_height,
                self.vsync,
            )
            .map(RenderTarget::Texture),
            BackendKind::Window => {
                SoftbufferSurface::new(self.window.clone()).map(RenderTarget::Window)
            }
        }
    }

    fn has_window(&self) -> bool {
        true
    }

    fn show_window(&mut self) {
        self.window.set_visible(true);
        self.window.focus_window();
    }

    fn hide_window(&mut self) {
        self.window.set_visible(false);
    }
}
