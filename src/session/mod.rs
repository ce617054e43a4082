// Session module - Frame lock, presentation and surface lifecycle
//
// A DisplaySession owns every display resource and the lock protecting them:
// - lock/unlock nest freely; the outermost unlock presents the frame
// - blit converts back buffer rectangles into the true-color surface
// - cleanup tears everything down, reinit rebuilds it while keeping the
//   outstanding lock depth
//
// Locking model: one reentrant critical section (CritSect) is entered by every
// lock and left by every unlock, so the first lock of a frame keeps other
// threads out until the last unlock has presented. Session data sits behind a
// plain mutex that is only held for the duration of a single call.

mod crit;
mod frame_lock;
mod host;
mod tracker;

pub use crit::CritSect;
pub use frame_lock::{ActiveBuffer, FrameLock};
pub use host::{DisplayHost, NullHost};
pub use tracker::LockTracker;

use crate::backend::{Backend, BackendKind};
use crate::config::DisplayConfig;
use crate::error::{CallerId, DisplayError, LockViolation};
use crate::palette::{PaletteEntry, SystemPalette};
use crate::surface::{IndexedBuffer, Rect, SurfaceSet};
use log::{debug, error, info, trace, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Title used for user-visible error dialogs
const ERROR_TITLE: &str = "Display Error";

struct SessionState<B: Backend> {
    config: DisplayConfig,
    backend: B,
    host: Arc<dyn DisplayHost>,
    surfaces: SurfaceSet<B::Renderer, B::Surface>,
    system_palette: SystemPalette,
    frame_lock: FrameLock,
    tracker: LockTracker,
    dirty: bool,
}

impl<B: Backend> SessionState<B> {
    fn report(&self, err: &DisplayError) {
        error!("{}", err);
        self.host.show_error(ERROR_TITLE, &err.to_string());
    }

    /// Bring up render target, primary surface, palette and back buffer
    fn initialize(&mut self) {
        info!(
            "Initializing display: {:?} target, {}x{} back buffer",
            self.config.video.backend, self.config.buffer.width, self.config.buffer.height
        );
        self.backend.show_window();

        match self.backend.create_render_target() {
            Ok(target) => self.surfaces.set_render_target(target),
            Err(e) => self.report(&DisplayError::Backend(e)),
        }

        if let Err(e) = self.surfaces.create_primary_surface() {
            self.report(&e);
        }

        self.surfaces.create_palette(&self.system_palette);

        let (width, height) = (self.config.buffer.width, self.config.buffer.height);
        if let Err(e) = self.surfaces.create_back_buffer(width, height) {
            self.report(&e);
        }
    }

    /// Hide the window, forget every lock and release all surfaces
    ///
    /// # Returns
    /// The lock depth that was discarded
    fn teardown(&mut self) -> usize {
        if self.backend.has_window() {
            self.backend.hide_window();
        }

        let forced = self.frame_lock.reset();
        if forced > 0 {
            warn!("Display torn down with {} outstanding locks", forced);
        }

        self.surfaces.release();
        forced
    }

    fn lock_priv(&mut self) {
        let generation = self.surfaces.generation();
        self.frame_lock.acquire(self.surfaces.back_buffer(), generation);
    }

    fn unlock_priv(&mut self) -> Result<(), LockViolation> {
        if self.frame_lock.release()? {
            self.present();
        }
        Ok(())
    }

    fn present(&mut self) {
        if !self.dirty {
            return;
        }

        if !self.surfaces.present() {
            warn!("Present skipped: no render target or true-color surface");
        }
        self.dirty = false;
    }

    fn blit(&mut self, x: usize, y: usize, src_rect: Rect) -> Result<(), DisplayError> {
        match self.surfaces.blit(x, y, src_rect) {
            Ok(()) => {
                self.dirty = true;
                Ok(())
            }
            Err(e) => {
                self.report(&e);
                Err(e)
            }
        }
    }

    /// Install the system palette into the bound palette and tell the host
    fn update_palette(&mut self) {
        if let Some(palette) = self.surfaces.palette_mut() {
            palette.install(&self.system_palette);
        }
        self.host.palette_updated(self.system_palette.as_slice());
    }
}

/// Display surfaces and the frame lock guarding them
///
/// `DisplaySession` is `Sync` whenever its backend is `Send`, so drawing code
/// on several threads can share it by reference.
pub struct DisplaySession<B: Backend> {
    crit: CritSect,
    state: Mutex<SessionState<B>>,
}

impl<B: Backend> DisplaySession<B> {
    /// Open a session and create all display resources
    ///
    /// Creation failures are reported through the log and
    /// [`DisplayHost::show_error`]; the affected resource stays absent and
    /// later operations on it fail the same way.
    pub fn open(config: DisplayConfig, backend: B, host: Arc<dyn DisplayHost>) -> Self {
        let session = Self {
            crit: CritSect::new(),
            state: Mutex::new(SessionState {
                config,
                backend,
                host,
                surfaces: SurfaceSet::new(),
                system_palette: SystemPalette::new(),
                frame_lock: FrameLock::new(),
                tracker: LockTracker::new(),
                dirty: false,
            }),
        };

        session.crit.enter();
        session.state().initialize();
        session.crit.leave();
        session
    }

    fn state(&self) -> MutexGuard<'_, SessionState<B>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquire the frame lock on behalf of `caller`
    ///
    /// Blocks while another thread holds the lock or a reinit is running.
    /// Nested calls from the holding thread return immediately.
    pub fn lock(&self, caller: CallerId) {
        self.state().tracker.acquire(caller);
        self.crit.enter();

        let mut state = self.state();
        state.lock_priv();
        trace!("lock {} -> depth {}", caller, state.frame_lock.depth());
    }

    /// Release one frame lock taken by `caller`
    ///
    /// Releasing the outermost lock presents the frame before other threads
    /// may lock again.
    ///
    /// # Errors
    /// Any [`LockViolation`]; the session must not be used afterwards.
    pub fn unlock(&self, caller: CallerId) -> Result<(), LockViolation> {
        let mut state = self.state();
        state.tracker.release(caller)?;

        if state.frame_lock.depth() > 0 && !self.crit.held_by_current_thread() {
            return Err(LockViolation::ForeignThread);
        }

        state.unlock_priv()?;
        trace!("unlock {} -> depth {}", caller, state.frame_lock.depth());
        drop(state);

        self.crit.leave();
        Ok(())
    }

    /// Run `f` on the back buffer
    ///
    /// Requires the calling thread to hold the frame lock. `f` must not call
    /// back into the session.
    pub fn with_back_buffer<R>(
        &self,
        f: impl FnOnce(&mut IndexedBuffer) -> R,
    ) -> Result<R, DisplayError> {
        if !self.crit.held_by_current_thread() {
            return Err(DisplayError::NotLocked);
        }

        let mut state = self.state();
        if state.frame_lock.depth() == 0 {
            return Err(DisplayError::NotLocked);
        }

        let buffer = state
            .surfaces
            .back_buffer_mut()
            .ok_or(DisplayError::MissingResource("back buffer"))?;
        Ok(f(buffer))
    }

    /// Convert `src_rect` of the back buffer into the true-color surface at
    /// (x, y) and mark the frame dirty
    ///
    /// # Errors
    /// Bounds and missing-resource errors, which are also reported to the
    /// host. The dirty flag is left unchanged on error.
    pub fn blit(&self, x: usize, y: usize, src_rect: Rect) -> Result<(), DisplayError> {
        self.crit.enter();
        let result = self.state().blit(x, y, src_rect);
        self.crit.leave();
        result
    }

    /// Push the frame to the screen if anything changed since the last push
    pub fn present(&self) {
        self.crit.enter();
        self.state().present();
        self.crit.leave();
    }

    /// Copy up to `count` system palette entries into `out`
    ///
    /// # Returns
    /// Number of entries copied
    pub fn palette_entries(&self, count: usize, out: &mut [PaletteEntry]) -> usize {
        self.state().system_palette.get_entries(count, out)
    }

    /// Store up to `count` entries into the system palette, install them and
    /// notify the host
    ///
    /// # Returns
    /// Number of entries stored
    pub fn set_palette_entries(&self, count: usize, entries: &[PaletteEntry]) -> usize {
        let mut state = self.state();
        let stored = state.system_palette.set_entries(count, entries);
        state.update_palette();
        debug!("Palette updated ({} entries)", stored);
        stored
    }

    /// Tear down every display resource
    ///
    /// Outstanding locks are discarded without presenting. Safe to call
    /// repeatedly.
    pub fn cleanup(&self) {
        self.crit.enter();
        {
            let mut state = self.state();
            let forced = state.teardown();
            for _ in 0..forced {
                self.crit.leave();
            }
        }
        self.crit.leave();
        info!("Display cleaned up");
    }

    /// Rebuild every display resource, keeping the outstanding lock depth
    ///
    /// Outstanding locks are drained (presenting the frame), the surfaces are
    /// recreated and the same number of locks is taken again before any other
    /// thread can lock.
    ///
    /// # Errors
    /// A [`LockViolation`] while draining; the session must not be used
    /// afterwards.
    pub fn reinit(&self) -> Result<(), LockViolation> {
        self.crit.enter();
        let result = self.reinit_entered();
        self.crit.leave();
        result
    }

    fn reinit_entered(&self) -> Result<(), LockViolation> {
        let mut state = self.state();
        state.host.reset_cursor();

        let depth = state.frame_lock.depth();
        info!("Reinitializing display with {} outstanding locks", depth);

        while state.frame_lock.depth() != 0 {
            state.unlock_priv()?;
            self.crit.leave();
        }

        state.teardown();
        state.host.request_full_redraw();
        state.initialize();

        for _ in 0..depth {
            self.crit.enter();
            state.lock_priv();
        }
        Ok(())
    }

    /// Clean up and close the session
    pub fn close(self) {
        self.cleanup();
    }

    /// Number of outstanding locks
    pub fn lock_depth(&self) -> usize {
        self.state().frame_lock.depth()
    }

    /// Back buffer captured by the most recent outermost lock
    pub fn active_buffer(&self) -> Option<ActiveBuffer> {
        self.state().frame_lock.active()
    }

    /// Whether the true-color surface holds pixels not yet presented
    pub fn is_dirty(&self) -> bool {
        self.state().dirty
    }

    /// Version of the bound palette, if one exists
    pub fn palette_version(&self) -> Option<u32> {
        self.state().surfaces.palette().map(|p| p.version())
    }

    /// Kind of the active render target, if one exists
    pub fn backend_kind(&self) -> Option<BackendKind> {
        self.state().surfaces.render_target().map(|t| t.kind())
    }

    /// Locks held by `caller`; `None` when per-caller tracking is compiled out
    pub fn outstanding_locks(&self, caller: CallerId) -> Option<u32> {
        self.state().tracker.outstanding(caller)
    }

    /// Width and height of the true-color surface, if one exists
    pub fn primary_size(&self) -> Option<(usize, usize)> {
        self.state()
            .surfaces
            .primary()
            .map(|p| (p.width(), p.height()))
    }

    /// Configuration the session was opened with
    pub fn config(&self) -> DisplayConfig {
        self.state().config.clone()
    }
}

impl<B: Backend> Drop for DisplaySession<B> {
    fn drop(&mut self) {
        self.cleanup();
    }
}
