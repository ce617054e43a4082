//! Headless backend.
//!
//! Keeps frames in memory and counts every backend call, so the frame lock and
//! presentation logic can run without a window (tests, benchmarks, CI).

use super::{Backend, BackendKind, RenderTarget, TextureRenderer, WindowSurface};
use crate::error::BackendError;
use crate::surface::TrueColorSurface;
use log::{info, trace};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Backend call that can be made to fail once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadlessStep {
    Upload,
    Clear,
    Draw,
    Present,
    WindowUpdate,
}

/// Call counters shared by a headless backend and everything it creates
#[derive(Debug, Default)]
pub struct HeadlessStats {
    creations: AtomicUsize,
    uploads: AtomicUsize,
    clears: AtomicUsize,
    draws: AtomicUsize,
    presents: AtomicUsize,
    window_updates: AtomicUsize,
    fail_next_creation: AtomicBool,
    fail_next_step: [AtomicBool; 5],
    window_visible: AtomicBool,
    clear_color: Mutex<Option<[u8; 4]>>,
    last_frame: Mutex<Vec<u8>>,
}

impl HeadlessStats {
    /// Render targets created so far
    pub fn creations(&self) -> usize {
        self.creations.load(Ordering::SeqCst)
    }

    /// Successful texture uploads
    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    /// Texture draws onto the render target
    pub fn draws(&self) -> usize {
        self.draws.load(Ordering::SeqCst)
    }

    /// Frames submitted by the texture renderer
    pub fn presents(&self) -> usize {
        self.presents.load(Ordering::SeqCst)
    }

    /// Frames pushed to the window surface
    pub fn window_updates(&self) -> usize {
        self.window_updates.load(Ordering::SeqCst)
    }

    /// Frames that reached the screen through either target
    pub fn frames_shown(&self) -> usize {
        self.presents() + self.window_updates()
    }

    /// Total backend calls made while presenting
    pub fn backend_calls(&self) -> usize {
        self.uploads() + self.clears() + self.draws() + self.presents() + self.window_updates()
    }

    /// Whether the backend's window is currently shown
    pub fn window_visible(&self) -> bool {
        self.window_visible.load(Ordering::SeqCst)
    }

    /// Make the next `create_render_target` call fail
    pub fn fail_next_creation(&self) {
        self.fail_next_creation.store(true, Ordering::SeqCst);
    }

    /// Make the next call of `step` fail without counting it
    pub fn fail_next(&self, step: HeadlessStep) {
        self.fail_next_step[step as usize].store(true, Ordering::SeqCst);
    }

    fn check(&self, step: HeadlessStep) -> Result<(), BackendError> {
        if self.fail_next_step[step as usize].swap(false, Ordering::SeqCst) {
            return Err(BackendError::new(format!("headless {:?} failed", step)));
        }
        Ok(())
    }

    /// Color most recently set with `set_draw_color`
    pub fn last_clear_color(&self) -> Option<[u8; 4]> {
        *self.clear_color.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// RGBA bytes of the most recent frame that reached the screen
    pub fn last_frame(&self) -> Vec<u8> {
        self.last_frame
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record_frame(&self, pixels: &[u8]) {
        let mut frame = self.last_frame.lock().unwrap_or_else(PoisonError::into_inner);
        frame.clear();
        frame.extend_from_slice(pixels);
    }
}

/// In-memory texture renderer
pub struct HeadlessRenderer {
    width: u32,
    height: u32,
    texture: Vec<u8>,
    stats: Arc<HeadlessStats>,
}

impl HeadlessRenderer {
    pub fn new(width: u32, height: u32, stats: Arc<HeadlessStats>) -> Self {
        Self {
            width,
            height,
            texture: vec![0; width as usize * height as usize * 4],
            stats,
        }
    }
}

impl TextureRenderer for HeadlessRenderer {
    fn output_size(&self) -> Result<(u32, u32), BackendError> {
        Ok((self.width, self.height))
    }

    fn update_texture(&mut self, pixels: &[u8], pitch: usize) -> Result<(), BackendError> {
        self.stats.check(HeadlessStep::Upload)?;
        let row_bytes = self.width as usize * 4;
        if pitch != row_bytes || pixels.len() != self.texture.len() {
            return Err(BackendError::new(format!(
                "texture is {}x{}, got {} bytes with pitch {}",
                self.width,
                self.height,
                pixels.len(),
                pitch
            )));
        }
        self.texture.copy_from_slice(pixels);
        self.stats.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn set_draw_color(&mut self, rgba: [u8; 4]) -> Result<(), BackendError> {
        *self
            .stats
            .clear_color
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(rgba);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), BackendError> {
        self.stats.check(HeadlessStep::Clear)?;
        self.stats.clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn copy_texture(&mut self) -> Result<(), BackendError> {
        self.stats.check(HeadlessStep::Draw)?;
        self.stats.draws.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn present(&mut self) -> Result<(), BackendError> {
        trace!("HeadlessRenderer: present");
        self.stats.check(HeadlessStep::Present)?;
        self.stats.record_frame(&self.texture);
        self.stats.presents.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// In-memory window surface
pub struct HeadlessWindowSurface {
    width: u32,
    height: u32,
    stats: Arc<HeadlessStats>,
}

impl HeadlessWindowSurface {
    pub fn new(width: u32, height: u32, stats: Arc<HeadlessStats>) -> Self {
        Self {
            width,
            height,
            stats,
        }
    }
}

impl WindowSurface for HeadlessWindowSurface {
    fn size(&self) -> Result<(u32, u32), BackendError> {
        Ok((self.width, self.height))
    }

    fn update(&mut self, surface: &TrueColorSurface) -> Result<(), BackendError> {
        trace!("HeadlessWindowSurface: update");
        self.stats.check(HeadlessStep::WindowUpdate)?;
        self.stats.record_frame(surface.as_bytes());
        self.stats.window_updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Backend that renders into memory
pub struct HeadlessBackend {
    kind: BackendKind,
    width: u32,
    height: u32,
    stats: Arc<HeadlessStats>,
}

impl HeadlessBackend {
    /// Create a backend whose targets report a `width`×`height` output
    pub fn new(kind: BackendKind, width: u32, height: u32) -> Self {
        Self {
            kind,
            width,
            height,
            stats: Arc::new(HeadlessStats::default()),
        }
    }

    /// Counters shared with every target this backend creates
    pub fn stats(&self) -> Arc<HeadlessStats> {
        self.stats.clone()
    }

    pub fn window_visible(&self) -> bool {
        self.stats.window_visible()
    }
}

impl Backend for HeadlessBackend {
    type Renderer = HeadlessRenderer;
    type Surface = HeadlessWindowSurface;

    fn create_render_target(
        &mut self,
    ) -> Result<RenderTarget<HeadlessRenderer, HeadlessWindowSurface>, BackendError> {
        if self.stats.fail_next_creation.swap(false, Ordering::SeqCst) {
            return Err(BackendError::new("headless render target creation failed"));
        }

        info!(
            "HeadlessBackend: creating {:?} target {}x{}",
            self.kind, self.width, self.height
        );
        self.stats.creations.fetch_add(1, Ordering::SeqCst);

        let stats = self.stats.clone();
        Ok(match self.kind {
            BackendKind::Texture => {
                RenderTarget::Texture(HeadlessRenderer::new(self.width, self.height, stats))
            }
            BackendKind::Window => {
                RenderTarget::Window(HeadlessWindowSurface::new(self.width, self.height, stats))
            }
        })
    }

    fn has_window(&self) -> bool {
        true
    }

    fn show_window(&mut self) {
        self.stats.window_visible.store(true, Ordering::SeqCst);
    }

    fn hide_window(&mut self) {
        self.stats.window_visible.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_failure_is_one_shot() {
        let mut backend = HeadlessBackend::new(BackendKind::Texture, 4, 4);
        let stats = backend.stats();
        stats.fail_next_creation();

        assert!(backend.create_render_target().is_err());
        assert!(backend.create_render_target().is_ok());
        assert_eq!(stats.creations(), 1);
    }

    #[test]
    fn test_window_visibility() {
        let mut backend = HeadlessBackend::new(BackendKind::Window, 4, 4);
        assert!(!backend.window_visible());
        backend.show_window();
        assert!(backend.window_visible());
        backend.hide_window();
        assert!(!backend.window_visible());
    }

    #[test]
    fn test_renderer_records_presented_frame() {
        let stats = Arc::new(HeadlessStats::default());
        let mut renderer = HeadlessRenderer::new(1, 1, stats.clone());
        renderer.update_texture(&[1, 2, 3, 4], 4).unwrap();
        renderer.present().unwrap();
        assert_eq!(stats.last_frame(), vec![1, 2, 3, 4]);
        assert!(renderer.update_texture(&[0; 8], 8).is_err());
    }

    #[test]
    fn test_step_failure_is_one_shot() {
        let stats = Arc::new(HeadlessStats::default());
        let mut renderer = HeadlessRenderer::new(1, 1, stats.clone());
        stats.fail_next(HeadlessStep::Clear);

        assert!(renderer.clear().is_err());
        assert_eq!(stats.clears(), 0);
        assert!(renderer.clear().is_ok());
        assert_eq!(stats.clears(), 1);
        assert!(renderer.present().is_ok());
    }
}
