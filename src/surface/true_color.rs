// True-color surface - RGBA pixels composited for display
//
// Layout is fixed: 4 bytes per pixel in R, G, B, A order, rows packed with
// pitch = width * 4. This matches the texture format the pixels crate uploads.

use crate::error::DisplayError;

/// Bytes per true-color pixel
pub const BYTES_PER_PIXEL: usize = 4;

/// Composited RGBA frame
#[derive(Clone, PartialEq, Eq)]
pub struct TrueColorSurface {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl TrueColorSurface {
    /// Allocate a surface cleared to transparent black
    ///
    /// # Errors
    /// `InvalidDimensions` for an empty or overflowing size, `Allocation` when
    /// the pixel memory cannot be reserved.
    pub fn new(width: usize, height: usize) -> Result<Self, DisplayError> {
        let len = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
            .filter(|&len| len > 0)
            .ok_or(DisplayError::InvalidDimensions { width, height })?;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| DisplayError::Allocation {
                what: "true-color surface",
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
        self.width * BYTES_PER_PIXEL
    }

    /// RGBA bytes of the pixel at (x, y)
    ///
    /// # Panics
    /// Panics if coordinates are out of bounds
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        assert!(x < self.width && y < self.height, "({}, {}) out of bounds", x, y);
        let offset = y * self.pitch() + x * BYTES_PER_PIXEL;
        [
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
            self.pixels[offset + 3],
        ]
    }

    /// Mutable bytes of one row
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let pitch = self.pitch();
        &mut self.pixels[y * pitch..(y + 1) * pitch]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Convert to packed 0x00RRGGBB words, as window surfaces expect
    ///
    /// # Panics
    /// Panics if `out` holds fewer than width * height words
    pub fn to_xrgb(&self, out: &mut [u32]) {
        assert!(
            out.len() >= self.width * self.height,
            "Output buffer too small for XRGB conversion"
        );

        for (word, rgba) in out.iter_mut().zip(self.pixels.chunks_exact(BYTES_PER_PIXEL)) {
            *word = (rgba[0] as u32) << 16 | (rgba[1] as u32) << 8 | rgba[2] as u32;
        }
    }
}

impl std::fmt::Debug for TrueColorSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrueColorSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}
