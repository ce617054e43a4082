// Host hooks - collaborators outside the display core
//
// The session calls these but never depends on what they do. None of them
// may call back into the session: they run while its state is borrowed.

use crate::palette::PaletteEntry;

/// Services the surrounding application provides to a display session
pub trait DisplayHost: Send + Sync {
    /// Show a modal error to the user
    fn show_error(&self, _title: &str, _message: &str) {}

    /// The system palette changed; `entries` is the full 256-entry table
    fn palette_updated(&self, _entries: &[PaletteEntry]) {}

    /// Drop any cursor or overlay drawn into the back buffer
    fn reset_cursor(&self) {}

    /// Redraw every part of the screen on the next frame
    fn request_full_redraw(&self) {}
}

/// Host that ignores every hook
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl DisplayHost for NullHost {}
