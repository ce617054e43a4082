// Surface module - Pixel buffers and the resources that own them
//
// This module provides:
// - Indexed back buffer (palette indices drawn by game code)
// - True-color surface (RGBA frame handed to the render target)
// - Blitter converting rectangles between the two
// - SurfaceSet owning both plus the bound palette and the render target

pub mod blit;
pub mod indexed;
pub mod true_color;

pub use blit::blit;
pub use indexed::{
    IndexedBuffer, BUFFER_HEIGHT, BUFFER_WIDTH, SCREEN_HEIGHT, SCREEN_WIDTH, SCREEN_X, SCREEN_Y,
};
pub use true_color::{TrueColorSurface, BYTES_PER_PIXEL};

use crate::backend::{RenderTarget, TextureRenderer, WindowSurface};
use crate::error::DisplayError;
use crate::palette::{Palette, SystemPalette};
use std::fmt;

/// Rectangle with inclusive edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle covering `width`×`height` pixels starting at (x, y)
    ///
    /// Coordinates beyond `i32::MAX` saturate.
    pub fn from_origin_size(x: usize, y: usize, width: usize, height: usize) -> Self {
        let clamp = |v: usize| i32::try_from(v).unwrap_or(i32::MAX);
        let left = clamp(x);
        let top = clamp(y);
        Self {
            left,
            top,
            right: left.saturating_add(clamp(width)).saturating_sub(1),
            bottom: top.saturating_add(clamp(height)).saturating_sub(1),
        }
    }

    /// Width in pixels (zero or negative for an empty or inverted rectangle)
    pub fn width(&self) -> i64 {
        self.right as i64 - self.left as i64 + 1
    }

    /// Height in pixels (zero or negative for an empty or inverted rectangle)
    pub fn height(&self) -> i64 {
        self.bottom as i64 - self.top as i64 + 1
    }

    /// Whether the rectangle lies inside a `width`×`height` surface
    pub fn fits_within(&self, width: usize, height: usize) -> bool {
        self.left >= 0
            && self.top >= 0
            && self.width() > 0
            && self.height() > 0
            && (self.right as i64) < width as i64
            && (self.bottom as i64) < height as i64
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}, {}, {}, {}}}",
            self.left, self.top, self.right, self.bottom
        )
    }
}

/// Display resources, created together and released together
///
/// Every slot is optional: a failed creation leaves it empty, and operations
/// on an empty slot report `MissingResource` instead of panicking.
pub struct SurfaceSet<R, S> {
    render_target: Option<RenderTarget<R, S>>,
    primary: Option<TrueColorSurface>,
    back_buffer: Option<IndexedBuffer>,
    palette: Option<Palette>,
    /// Bumped on every successful back buffer allocation
    generation: u64,
}

impl<R: TextureRenderer, S: WindowSurface> SurfaceSet<R, S> {
    /// Empty set
    pub fn new() -> Self {
        Self {
            render_target: None,
            primary: None,
            back_buffer: None,
            palette: None,
            generation: 0,
        }
    }

    /// Take ownership of a freshly created render target
    pub fn set_render_target(&mut self, target: RenderTarget<R, S>) {
        self.render_target = Some(target);
    }

    /// Allocate the true-color surface
    ///
    /// A texture renderer is asked for its output size; a window surface is
    /// bound at the window's own size.
    pub fn create_primary_surface(&mut self) -> Result<(), DisplayError> {
        let target = self
            .render_target
            .as_ref()
            .ok_or(DisplayError::MissingResource("render target"))?;

        let (width, height) = match target {
            RenderTarget::Texture(renderer) => renderer.output_size()?,
            RenderTarget::Window(surface) => surface.size()?,
        };

        self.primary = Some(TrueColorSurface::new(width as usize, height as usize)?);
        Ok(())
    }

    /// Allocate the palette and install the system colors
    pub fn create_palette(&mut self, system: &SystemPalette) {
        let mut palette = Palette::new();
        palette.install(system);
        self.palette = Some(palette);
    }

    /// Allocate the back buffer and bind the palette to it
    ///
    /// The palette version restarts at 1. A missing palette is reported after
    /// the buffer itself has been allocated.
    pub fn create_back_buffer(&mut self, width: usize, height: usize) -> Result<(), DisplayError> {
        self.back_buffer = Some(IndexedBuffer::new(width, height)?);
        self.generation += 1;

        let palette = self
            .palette
            .as_mut()
            .ok_or(DisplayError::MissingResource("palette"))?;
        palette.reset_version(1);
        Ok(())
    }

    /// Release palette, back buffer, primary surface and render target, in
    /// that order
    ///
    /// Safe to call repeatedly.
    pub fn release(&mut self) {
        self.palette = None;
        self.back_buffer = None;
        self.primary = None;
        self.render_target = None;
    }

    pub fn render_target(&self) -> Option<&RenderTarget<R, S>> {
        self.render_target.as_ref()
    }

    pub fn primary(&self) -> Option<&TrueColorSurface> {
        self.primary.as_ref()
    }

    pub fn back_buffer(&self) -> Option<&IndexedBuffer> {
        self.back_buffer.as_ref()
    }

    pub fn back_buffer_mut(&mut self) -> Option<&mut IndexedBuffer> {
        self.back_buffer.as_mut()
    }

    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    pub fn palette_mut(&mut self) -> Option<&mut Palette> {
        self.palette.as_mut()
    }

    /// Generation of the current back buffer allocation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Convert `src_rect` of the back buffer to true color at (x, y)
    pub fn blit(&mut self, x: usize, y: usize, src_rect: Rect) -> Result<(), DisplayError> {
        let src = self
            .back_buffer
            .as_ref()
            .ok_or(DisplayError::MissingResource("back buffer"))?;
        let palette = self
            .palette
            .as_ref()
            .ok_or(DisplayError::MissingResource("palette"))?;
        let dst = self
            .primary
            .as_mut()
            .ok_or(DisplayError::MissingResource("true-color surface"))?;

        blit(src, palette, src_rect, dst, x, y)
    }

    /// Push the true-color surface through the render target
    ///
    /// # Returns
    /// `false` when either resource is missing and nothing was pushed
    pub fn present(&mut self) -> bool {
        match (self.render_target.as_mut(), self.primary.as_ref()) {
            (Some(target), Some(surface)) => {
                target.present(surface);
                true
            }
            _ => false,
        }
    }
}

impl<R: TextureRenderer, S: WindowSurface> Default for SurfaceSet<R, S> {
    fn default() -> Self {
        Self::new()
    }
}
