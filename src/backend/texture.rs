// GPU texture renderer built on the pixels crate
//
// pixels owns a wgpu texture sized to the logical frame and a scaling pass
// that stretches it over the window. The scaling pass clears the target to the
// configured clear color before drawing, so `clear` and `copy_texture` only
// schedule work that `present` submits in one render pass.

use super::TextureRenderer;
use crate::error::BackendError;
use pixels::wgpu::Color;
use pixels::{Pixels, PixelsBuilder, SurfaceTexture};
use std::sync::Arc;
use winit::window::Window;

impl From<pixels::Error> for BackendError {
    fn from(e: pixels::Error) -> Self {
        BackendError::new(e.to_string())
    }
}

/// Texture renderer drawing into a winit window
pub struct PixelsRenderer {
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
    draw_pending: bool,
}

impl PixelsRenderer {
    /// Create a `width`×`height` texture stretched over `window`
    pub fn new(
        window: Arc<Window>,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<Self, BackendError> {
        check_texture_size(width, height)?;
        let window_size = window.inner_size();
        let surface_texture = SurfaceTexture::new(window_size.width, window_size.height, window);

        let pixels = PixelsBuilder::new(width, height, surface_texture)
            .enable_vsync(vsync)
            .clear_color(Color::BLACK)
            .build()?;

        Ok(Self {
            pixels,
            width,
            height,
            draw_pending: false,
        })
    }
}

impl TextureRenderer for PixelsRenderer {
    fn output_size(&self) -> Result<(u32, u32), BackendError> {
        Ok((self.width, self.height))
    }

    fn update_texture(&mut self, pixels: &[u8], pitch: usize) -> Result<(), BackendError> {
        let row_bytes = self.width as usize * 4;
        let covered =
            upload_span(self.width, self.height, pitch).is_some_and(|n| pixels.len() >= n);
        if !covered {
            return Err(BackendError::new(format!(
                "{} bytes with pitch {} do not cover a {}x{} texture",
                pixels.len(),
                pitch,
                self.width,
                self.height
            )));
        }

        let frame = self.pixels.frame_mut();
        for (dst, src) in frame.chunks_exact_mut(row_bytes).zip(pixels.chunks(pitch)) {
            dst.copy_from_slice(&src[..row_bytes]);
        }
        Ok(())
    }

    fn set_draw_color(&mut self, rgba: [u8; 4]) -> Result<(), BackendError> {
        let [r, g, b, a] = rgba.map(|c| c as f64 / 255.0);
        self.pixels.clear_color(Color { r, g, b, a });
        Ok(())
    }

    fn clear(&mut self) -> Result<(), BackendError> {
        // Performed by the scaling pass
        Ok(())
    }

    fn copy_texture(&mut self) -> Result<(), BackendError> {
        self.draw_pending = true;
        Ok(())
    }

    fn present(&mut self) -> Result<(), BackendError> {
        let draw = std::mem::take(&mut self.draw_pending);
        self.pixels
            .render_with(|encoder, render_target, context| {
                if draw {
                    context.scaling_renderer.render(encoder, render_target);
                }
                Ok(())
            })?;
        Ok(())
    }
}

/// Reject textures with no pixels
fn check_texture_size(width: u32, height: u32) -> Result<(), BackendError> {
    if width == 0 || height == 0 {
        return Err(BackendError::new(format!(
            "texture size {}x{} is empty",
            width, height
        )));
    }
    Ok(())
}

/// Bytes an upload with `pitch` must provide for a `width`x`height` texture
///
/// `None` when the pitch is shorter than a row, the texture is empty or the
/// size overflows.
fn upload_span(width: u32, height: u32, pitch: usize) -> Option<usize> {
    let row_bytes = (width as usize).checked_mul(4)?;
    if row_bytes == 0 || pitch < row_bytes {
        return None;
    }
    let rows = (height as usize).checked_sub(1)?;
    pitch.checked_mul(rows)?.checked_add(row_bytes)
}
