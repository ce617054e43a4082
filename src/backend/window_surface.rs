// Window surface built on softbuffer
//
// softbuffer hands out the window's own 0RGB pixel memory; a frame is pushed
// by converting the RGBA surface into it and presenting.

use super::WindowSurface;
use crate::error::BackendError;
use crate::surface::TrueColorSurface;
use softbuffer::{Context, SoftBufferError, Surface};
use std::num::NonZeroU32;
use std::sync::Arc;
use winit::window::Window;

impl From<SoftBufferError> for BackendError {
    fn from(e: SoftBufferError) -> Self {
        BackendError::new(e.to_string())
    }
}

/// Pixel surface of a winit window
///
/// Fields drop in declaration order: the surface goes before its context.
pub struct SoftbufferSurface {
    surface: Surface<Arc<Window>, Arc<Window>>,
    _context: Context<Arc<Window>>,
    window: Arc<Window>,
}

impl SoftbufferSurface {
    pub fn new(window: Arc<Window>) -> Result<Self, BackendError> {
        let context = Context::new(window.clone())?;
        let surface = Surface::new(&context, window.clone())?;

        Ok(Self {
            surface,
            _context: context,
            window,
        })
    }
}

impl WindowSurface for SoftbufferSurface {
    fn size(&self) -> Result<(u32, u32), BackendError> {
        let size = self.window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Err(BackendError::new("window has no drawable area"));
        }
        Ok((size.width, size.height))
    }

    fn update(&mut self, frame: &TrueColorSurface) -> Result<(), BackendError> {
        let (width, height) = (frame.width() as u32, frame.height() as u32);
        let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) else {
            return Err(BackendError::new("empty frame"));
        };
        self.surface.resize(w, h)?;

        let mut buffer = self.surface.buffer_mut()?;
        frame.to_xrgb(&mut buffer);

        self.window.pre_present_notify();
        buffer.present()?;
        Ok(())
    }
}
