// Palette Display Library
// Indexed-color back buffer, palette, frame lock and presentation backends

// Public modules
#[cfg(feature = "window")]
pub mod app;
pub mod backend;
pub mod config;
pub mod error;
pub mod palette;
pub mod session;
pub mod surface;

// Re-export main types for convenience
pub use backend::{Backend, BackendKind, RenderTarget, TextureRenderer, WindowSurface};
pub use config::{BufferConfig, DisplayConfig, VideoConfig};
pub use error::{BackendError, CallerId, DisplayError, LockViolation};
pub use palette::{Palette, PaletteEntry, SystemPalette, PALETTE_SIZE};
pub use session::{ActiveBuffer, DisplayHost, DisplaySession, NullHost};
pub use surface::{IndexedBuffer, Rect, SurfaceSet, TrueColorSurface};
