// Indexed back buffer - 8-bit palette indices that drawing code writes into
//
// The default layout is a 640×480 visible screen placed at (64, 160) inside a
// 768×656 buffer; the borders let sprite drawing run past the screen edges
// without clipping.

use crate::error::DisplayError;

/// Default back buffer width in pixels
pub const BUFFER_WIDTH: usize = 768;

/// Default back buffer height in pixels
pub const BUFFER_HEIGHT: usize = 656;

/// Visible screen width in pixels
pub const SCREEN_WIDTH: usize = 640;

/// Visible screen height in pixels
pub const SCREEN_HEIGHT: usize = 480;

/// Left edge of the visible screen inside the back buffer
pub const SCREEN_X: usize = 64;

/// Top edge of the visible screen inside the back buffer
pub const SCREEN_Y: usize = 160;

/// Back buffer of palette indices
pub struct IndexedBuffer {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl IndexedBuffer {
    /// Allocate a buffer cleared to index 0
    ///
    /// # Errors
    /// `InvalidDimensions` for an empty or overflowing size, `Allocation` when
    /// the pixel memory cannot be reserved.
    pub fn new(width: usize, height: usize) -> Result<Self, DisplayError> {
        let len = width
            .checked_mul(height)
            .filter(|&len| len > 0)
            .ok_or(DisplayError::InvalidDimensions { width, height })?;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| DisplayError::Allocation {
                what: "indexed back buffer",
                bytes: len,
            })?;
        pixels.resize(len, 0);

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes between the start of two rows
    pub fn pitch(&self) -> usize {
        self.width
    }

    /// Total size in bytes
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Address of the first pixel, used to identify the buffer
    pub fn base_address(&self) -> usize {
        self.pixels.as_ptr() as usize
    }

    /// Set a pixel at the given coordinates
    ///
    /// # Panics
    /// Panics if coordinates are out of bounds
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, index: u8) {
        assert!(x < self.width, "X coordinate {} out of bounds", x);
        assert!(y < self.height, "Y coordinate {} out of bounds", y);

        self.pixels[y * self.width + x] = index;
    }

    /// Get a pixel at the given coordinates
    ///
    /// # Panics
    /// Panics if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: usize, y: usize) -> u8 {
        assert!(x < self.width, "X coordinate {} out of bounds", x);
        assert!(y < self.height, "Y coordinate {} out of bounds", y);

        self.pixels[y * self.width + x]
    }

    /// Fill the whole buffer with one index
    pub fn clear(&mut self, index: u8) {
        self.pixels.fill(index);
    }

    /// Fill a rectangle, clipped to the buffer
    pub fn fill_rect(&mut self, x: usize, y: usize, width: usize, height: usize, index: u8) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        if x >= x_end {
            return;
        }
        for row in y..y_end {
            let start = row * self.width;
            self.pixels[start + x..start + x_end].fill(index);
        }
    }

    /// One row of pixels
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.width;
        &self.pixels[start..start + self.width]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.pixels
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Diagonal bands cycling through all 256 indices, shifted by `phase`
    pub fn test_pattern(&mut self, phase: u8) {
        for y in 0..self.height {
            for x in 0..self.width {
                let index = ((x / 8 + y / 8) as u8).wrapping_add(phase);
                self.pixels[y * self.width + x] = index;
            }
        }
    }
}

impl std::fmt::Debug for IndexedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexedBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}
