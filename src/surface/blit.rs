// Blitter - indexed to true-color conversion of a rectangle
//
// Source rectangles use inclusive edges. Bounds are checked up front so a
// rejected blit leaves the destination untouched.

use super::{IndexedBuffer, Rect, TrueColorSurface, BYTES_PER_PIXEL};
use crate::error::DisplayError;
use crate::palette::Palette;

/// Copy `src_rect` of the back buffer to (x, y) on the surface, resolving each
/// index through `palette`
///
/// # Errors
/// `InvalidRect` for a negative extent, `OutOfBounds` when either rectangle
/// does not fit its surface.
pub fn blit(
    src: &IndexedBuffer,
    palette: &Palette,
    src_rect: Rect,
    dst: &mut TrueColorSurface,
    x: usize,
    y: usize,
) -> Result<(), DisplayError> {
    if src_rect.width() <= 0 || src_rect.height() <= 0 {
        return Err(DisplayError::InvalidRect(src_rect));
    }
    if !src_rect.fits_within(src.width(), src.height()) {
        return Err(DisplayError::OutOfBounds {
            surface: "back buffer",
            rect: src_rect,
        });
    }

    let width = src_rect.width() as usize;
    let height = src_rect.height() as usize;

    let fits_x = x.checked_add(width).is_some_and(|end| end <= dst.width());
    let fits_y = y.checked_add(height).is_some_and(|end| end <= dst.height());
    if !(fits_x && fits_y) {
        return Err(DisplayError::OutOfBounds {
            surface: "true-color surface",
            rect: Rect::from_origin_size(x, y, width, height),
        });
    }

    let left = src_rect.left as usize;
    let top = src_rect.top as usize;
    for row in 0..height {
        let indices = &src.row(top + row)[left..left + width];
        let out = &mut dst.row_mut(y + row)[x * BYTES_PER_PIXEL..(x + width) * BYTES_PER_PIXEL];
        for (pixel, &index) in out.chunks_exact_mut(BYTES_PER_PIXEL).zip(indices) {
            pixel.copy_from_slice(&palette.rgba(index));
        }
    }

    Ok(())
}
