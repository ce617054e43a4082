// Demo application - Palette-cycling test pattern in a winit window
//
// Every frame goes through the full lock -> draw -> blit -> unlock cycle.
// The pattern itself is only redrawn when the host asks for it; animation
// comes from rotating the palette.
//
// Keys: F5 reinitializes the display, Escape exits.

use crate::backend::window::WinitBackend;
use crate::config::DisplayConfig;
use crate::error::{CallerId, LockViolation};
use crate::palette::{PaletteEntry, PALETTE_SIZE};
use crate::session::{DisplayHost, DisplaySession};
use log::{error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Call site id for the per-frame lock
const FRAME_CALLER: CallerId = CallerId(1);

/// Host that logs errors and remembers redraw requests
#[derive(Debug)]
struct DemoHost {
    redraw: AtomicBool,
}

impl DisplayHost for DemoHost {
    fn show_error(&self, title: &str, message: &str) {
        error!("{}: {}", title, message);
    }

    fn reset_cursor(&self) {
        info!("Cursor reset");
    }

    fn request_full_redraw(&self) {
        self.redraw.store(true, Ordering::SeqCst);
    }
}

/// Hue wheel rotated by `phase` entries
fn cycle_palette(phase: u8) -> Vec<PaletteEntry> {
    (0..PALETTE_SIZE)
        .map(|i| {
            let hue = (i as u8).wrapping_add(phase);
            let sector = hue / 43;
            let ramp = (hue % 43) * 6;
            match sector {
                0 => PaletteEntry::rgb(255, ramp, 0),
                1 => PaletteEntry::rgb(255 - ramp, 255, 0),
                2 => PaletteEntry::rgb(0, 255, ramp),
                3 => PaletteEntry::rgb(0, 255 - ramp, 255),
                4 => PaletteEntry::rgb(ramp, 0, 255),
                _ => PaletteEntry::rgb(255, 0, 255 - ramp),
            }
        })
        .collect()
}

struct DemoApp {
    config: DisplayConfig,
    host: Arc<DemoHost>,
    window: Option<Arc<Window>>,
    session: Option<DisplaySession<WinitBackend>>,
    last_frame_time: Instant,
    phase: u8,
    fatal: Option<LockViolation>,
    startup_error: Option<winit::error::OsError>,
}

impl DemoApp {
    fn new(config: DisplayConfig) -> Self {
        Self {
            config,
            host: Arc::new(DemoHost {
                redraw: AtomicBool::new(true),
            }),
            window: None,
            session: None,
            last_frame_time: Instant::now(),
            phase: 0,
            fatal: None,
            startup_error: None,
        }
    }

    /// Check if enough time has passed for the next frame
    fn should_render_frame(&mut self) -> bool {
        if self.last_frame_time.elapsed() >= self.config.frame_duration() {
            self.last_frame_time = Instant::now();
            true
        } else {
            false
        }
    }

    fn render_frame(&mut self) -> Result<(), LockViolation> {
        let Some(session) = &self.session else {
            return Ok(());
        };

        session.set_palette_entries(PALETTE_SIZE, &cycle_palette(self.phase));
        self.phase = self.phase.wrapping_add(1);

        session.lock(FRAME_CALLER);
        if self.host.redraw.swap(false, Ordering::SeqCst) {
            if let Err(e) = session.with_back_buffer(|buffer| buffer.test_pattern(0)) {
                warn!("Pattern not drawn: {}", e);
            }
        }
        // Errors are already reported through the host
        let _ = session.blit(0, 0, self.config.screen_rect());
        session.unlock(FRAME_CALLER)
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(session) = self.session.take() {
            session.close();
        }
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, violation: LockViolation) {
        error!("{}", violation);
        self.fatal = Some(violation);
        event_loop.exit();
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key: KeyCode) {
        match key {
            KeyCode::Escape => self.shutdown(event_loop),
            KeyCode::F5 => {
                let result = self.session.as_ref().map(|s| s.reinit());
                if let Some(Err(violation)) = result {
                    self.fail(event_loop, violation);
                }
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for DemoApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title(format!(
                "Palette Display - {}x{}",
                self.config.window_width(),
                self.config.window_height()
            ))
            .with_inner_size(LogicalSize::new(
                self.config.window_width(),
                self.config.window_height(),
            ))
            .with_resizable(false);

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {}", e);
                self.startup_error = Some(e);
                event_loop.exit();
                return;
            }
        };

        let backend = WinitBackend::new(
            window.clone(),
            self.config.video.backend,
            self.config.buffer.screen_width as u32,
            self.config.buffer.screen_height as u32,
            self.config.video.vsync,
        );
        let host: Arc<dyn DisplayHost> = self.host.clone();
        self.session = Some(DisplaySession::open(self.config.clone(), backend, host));
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, exiting...");
                self.shutdown(event_loop);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, key),
            WindowEvent::RedrawRequested => {
                if self.should_render_frame() {
                    if let Err(violation) = self.render_frame() {
                        self.fail(event_loop, violation);
                        return;
                    }
                }

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Create the window and run the demo until it is closed
///
/// # Returns
/// `Ok(Some(violation))` when the frame lock was misused; the caller must
/// terminate the process.
pub fn run_demo(
    config: DisplayConfig,
) -> Result<Option<LockViolation>, Box<dyn std::error::Error>> {
    let event_loop = EventLoop::new()?;

    if config.video.vsync {
        event_loop.set_control_flow(ControlFlow::Wait);
    } else {
        event_loop.set_control_flow(ControlFlow::Poll);
    }

    info!(
        "Starting display: {:?} backend, {}x{} window, {} FPS, vsync {}",
        config.video.backend,
        config.window_width(),
        config.window_height(),
        config.video.fps,
        config.video.vsync
    );

    let mut app = DemoApp::new(config);
    event_loop.run_app(&mut app)?;

    if let Some(e) = app.startup_error.take() {
        return Err(Box::new(e));
    }
    Ok(app.fatal)
}
