// Common test utilities for display session integration tests
//
// This module provides a host that records every hook call and helpers for
// opening sessions on the headless backend.

#![allow(dead_code)]

use palette_display::backend::headless::{HeadlessBackend, HeadlessStats};
use palette_display::{BackendKind, DisplayConfig, DisplayHost, DisplaySession, PaletteEntry};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Output size reported by headless render targets
pub const OUTPUT_WIDTH: u32 = 640;
pub const OUTPUT_HEIGHT: u32 = 480;

/// Host that counts hook calls and keeps the error messages it was shown
#[derive(Debug, Default)]
pub struct RecordingHost {
    errors: Mutex<Vec<String>>,
    palette_updates: AtomicUsize,
    last_palette: Mutex<Vec<PaletteEntry>>,
    cursor_resets: AtomicUsize,
    redraws: AtomicUsize,
}

impl RecordingHost {
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn palette_updates(&self) -> usize {
        self.palette_updates.load(Ordering::SeqCst)
    }

    pub fn last_palette(&self) -> Vec<PaletteEntry> {
        self.last_palette.lock().unwrap().clone()
    }

    pub fn cursor_resets(&self) -> usize {
        self.cursor_resets.load(Ordering::SeqCst)
    }

    pub fn redraws(&self) -> usize {
        self.redraws.load(Ordering::SeqCst)
    }
}

impl DisplayHost for RecordingHost {
    fn show_error(&self, title: &str, message: &str) {
        self.errors
            .lock()
            .unwrap()
            .push(format!("{}: {}", title, message));
    }

    fn palette_updated(&self, entries: &[PaletteEntry]) {
        *self.last_palette.lock().unwrap() = entries.to_vec();
        self.palette_updates.fetch_add(1, Ordering::SeqCst);
    }

    fn reset_cursor(&self) {
        self.cursor_resets.fetch_add(1, Ordering::SeqCst);
    }

    fn request_full_redraw(&self) {
        self.redraws.fetch_add(1, Ordering::SeqCst);
    }
}

/// RGBA bytes of pixel (x, y) in a frame recorded by the headless backend
pub fn pixel_at(frame: &[u8], x: usize, y: usize) -> [u8; 4] {
    let offset = (y * OUTPUT_WIDTH as usize + x) * 4;
    [
        frame[offset],
        frame[offset + 1],
        frame[offset + 2],
        frame[offset + 3],
    ]
}

/// A session under test plus handles to observe it
pub struct Fixture {
    pub session: DisplaySession<HeadlessBackend>,
    pub stats: Arc<HeadlessStats>,
    pub host: Arc<RecordingHost>,
}

/// Open a headless session with the default configuration
pub fn open_session(kind: BackendKind) -> Fixture {
    open_with(DisplayConfig::new().with_backend(kind), |_| {})
}

/// Open a headless session, letting `prepare` adjust the backend first
pub fn open_with(config: DisplayConfig, prepare: impl FnOnce(&HeadlessStats)) -> Fixture {
    let backend = HeadlessBackend::new(config.video.backend, OUTPUT_WIDTH, OUTPUT_HEIGHT);
    let stats = backend.stats();
    prepare(&stats);

    let host = Arc::new(RecordingHost::default());
    let session = DisplaySession::open(config, backend, host.clone());
    Fixture {
        session,
        stats,
        host,
    }
}
