// Blit and present integration tests
//
// Pixel conversion through the palette, dirty tracking and the backend call
// sequence of each render target.

mod common;

use common::{open_session, pixel_at};
use palette_display::backend::headless::HeadlessStep;
use palette_display::backend::CLEAR_COLOR;
use palette_display::{BackendKind, CallerId, DisplayConfig, DisplayError, PaletteEntry, Rect};

#[test_log::test]
fn test_present_clears_dirty_once() {
    let f = open_session(BackendKind::Texture);

    f.session.blit(0, 0, Rect::new(0, 0, 63, 63)).unwrap();
    assert!(f.session.is_dirty());

    f.session.present();
    assert!(!f.session.is_dirty());
    let calls = f.stats.backend_calls();
    assert!(calls > 0);

    f.session.present();
    assert_eq!(f.stats.backend_calls(), calls);
}

#[test_log::test]
fn test_present_when_clean_does_nothing() {
    let f = open_session(BackendKind::Texture);
    f.session.present();
    f.session.lock(CallerId(1));
    f.session.unlock(CallerId(1)).unwrap();

    assert_eq!(f.stats.backend_calls(), 0);
}

#[test_log::test]
fn test_texture_present_sequence() {
    let f = open_session(BackendKind::Texture);
    f.session.blit(0, 0, Rect::new(0, 0, 9, 9)).unwrap();
    f.session.present();

    assert_eq!(f.stats.uploads(), 1);
    assert_eq!(f.stats.clears(), 1);
    assert_eq!(f.stats.draws(), 1);
    assert_eq!(f.stats.presents(), 1);
    assert_eq!(f.stats.window_updates(), 0);
    assert_eq!(f.stats.last_clear_color(), Some(CLEAR_COLOR));
}

#[test_log::test]
fn test_window_present_sequence() {
    let f = open_session(BackendKind::Window);
    f.session.blit(0, 0, Rect::new(0, 0, 9, 9)).unwrap();
    f.session.present();

    assert_eq!(f.stats.window_updates(), 1);
    assert_eq!(f.stats.uploads(), 0);
    assert_eq!(f.stats.presents(), 0);
}

#[test_log::test]
fn test_blit_resolves_palette() {
    let f = open_session(BackendKind::Window);
    let screen = DisplayConfig::new().screen_rect();

    let mut entries = vec![PaletteEntry::default(); 256];
    entries[5] = PaletteEntry::rgb(10, 20, 30);
    entries[6] = PaletteEntry::rgb(200, 100, 50);
    f.session.set_palette_entries(256, &entries);

    f.session.lock(CallerId(1));
    f.session
        .with_back_buffer(|buffer| {
            buffer.clear(6);
            buffer.set_pixel(screen.left as usize, screen.top as usize, 5);
        })
        .unwrap();
    f.session.blit(0, 0, screen).unwrap();
    f.session.unlock(CallerId(1)).unwrap();

    let frame = f.stats.last_frame();
    assert_eq!(frame.len(), 640 * 480 * 4);
    assert_eq!(&frame[0..4], &[10, 20, 30, 0xFF]);
    assert_eq!(&frame[4..8], &[200, 100, 50, 0xFF]);
}

#[test_log::test]
fn test_blit_at_offset() {
    let f = open_session(BackendKind::Texture);
    let mut entries = vec![PaletteEntry::default(); 256];
    entries[1] = PaletteEntry::rgb(0xFF, 0, 0);
    f.session.set_palette_entries(256, &entries);

    f.session.lock(CallerId(1));
    f.session
        .with_back_buffer(|buffer| buffer.fill_rect(0, 0, 4, 4, 1))
        .unwrap();
    f.session.blit(100, 50, Rect::new(0, 0, 3, 3)).unwrap();
    f.session.unlock(CallerId(1)).unwrap();

    let frame = f.stats.last_frame();
    assert_eq!(pixel_at(&frame, 100, 50), [0xFF, 0, 0, 0xFF]);
    assert_eq!(pixel_at(&frame, 103, 53), [0xFF, 0, 0, 0xFF]);
    assert_ne!(pixel_at(&frame, 104, 53), [0xFF, 0, 0, 0xFF]);
    assert_ne!(pixel_at(&frame, 99, 50), [0xFF, 0, 0, 0xFF]);
}

#[test_log::test]
fn test_destination_out_of_bounds() {
    let f = open_session(BackendKind::Texture);

    let err = f.session.blit(600, 0, Rect::new(0, 0, 63, 63)).unwrap_err();
    assert!(matches!(
        err,
        DisplayError::OutOfBounds {
            surface: "true-color surface",
            ..
        }
    ));
    assert!(!f.session.is_dirty());
    assert_eq!(f.host.errors().len(), 1);

    // The last column still fits
    f.session.blit(576, 416, Rect::new(0, 0, 63, 63)).unwrap();
    assert!(f.session.is_dirty());
}

#[test_log::test]
fn test_source_out_of_bounds() {
    let f = open_session(BackendKind::Texture);

    let err = f.session.blit(0, 0, Rect::new(700, 0, 799, 10)).unwrap_err();
    assert!(matches!(
        err,
        DisplayError::OutOfBounds {
            surface: "back buffer",
            ..
        }
    ));

    let err = f.session.blit(0, 0, Rect::new(-1, 0, 10, 10)).unwrap_err();
    assert!(matches!(err, DisplayError::OutOfBounds { .. }));
    assert!(!f.session.is_dirty());
}

#[test_log::test]
fn test_inverted_rect_rejected() {
    let f = open_session(BackendKind::Texture);

    let err = f.session.blit(0, 0, Rect::new(10, 10, 5, 5)).unwrap_err();
    assert!(matches!(err, DisplayError::InvalidRect(_)));
    assert!(!f.session.is_dirty());
    assert_eq!(f.host.errors().len(), 1);
}

#[test_log::test]
fn test_failed_blit_keeps_earlier_dirty_frame() {
    let f = open_session(BackendKind::Texture);
    f.session.blit(0, 0, Rect::new(0, 0, 7, 7)).unwrap();
    assert!(f.session.blit(639, 0, Rect::new(0, 0, 7, 7)).is_err());

    assert!(f.session.is_dirty());
    f.session.present();
    assert_eq!(f.stats.presents(), 1);
}

#[test_log::test]
fn test_failed_upload_still_presents_and_cleans() {
    let f = open_session(BackendKind::Texture);
    f.session.blit(0, 0, Rect::new(0, 0, 9, 9)).unwrap();
    f.stats.fail_next(HeadlessStep::Upload);

    f.session.present();
    assert!(!f.session.is_dirty());
    assert_eq!(f.stats.uploads(), 0);
    assert_eq!(f.stats.clears(), 1);
    assert_eq!(f.stats.draws(), 1);
    assert_eq!(f.stats.presents(), 1);
    assert!(f.host.errors().is_empty());

    let calls = f.stats.backend_calls();
    f.session.present();
    assert_eq!(f.stats.backend_calls(), calls);
}

#[test_log::test]
fn test_failed_clear_and_draw_do_not_stop_present() {
    let f = open_session(BackendKind::Texture);
    f.session.blit(0, 0, Rect::new(0, 0, 9, 9)).unwrap();
    f.stats.fail_next(HeadlessStep::Clear);
    f.stats.fail_next(HeadlessStep::Draw);

    f.session.present();
    assert!(!f.session.is_dirty());
    assert_eq!(f.stats.uploads(), 1);
    assert_eq!(f.stats.clears(), 0);
    assert_eq!(f.stats.draws(), 0);
    assert_eq!(f.stats.presents(), 1);
}

#[test_log::test]
fn test_failed_final_present_is_not_retried() {
    let f = open_session(BackendKind::Texture);
    f.session.blit(0, 0, Rect::new(0, 0, 9, 9)).unwrap();
    f.stats.fail_next(HeadlessStep::Present);

    f.session.present();
    assert!(!f.session.is_dirty());
    assert_eq!(f.stats.uploads(), 1);
    assert_eq!(f.stats.presents(), 0);

    let calls = f.stats.backend_calls();
    f.session.present();
    assert_eq!(f.stats.backend_calls(), calls);
    assert_eq!(f.stats.presents(), 0);
}

#[test_log::test]
fn test_failed_window_update_clears_dirty() {
    let f = open_session(BackendKind::Window);
    f.session.blit(0, 0, Rect::new(0, 0, 9, 9)).unwrap();
    f.stats.fail_next(HeadlessStep::WindowUpdate);

    f.session.present();
    assert!(!f.session.is_dirty());
    assert_eq!(f.stats.window_updates(), 0);

    f.session.present();
    assert_eq!(f.stats.backend_calls(), 0);

    // The next change goes out normally
    f.session.blit(0, 0, Rect::new(0, 0, 9, 9)).unwrap();
    f.session.present();
    assert_eq!(f.stats.window_updates(), 1);
}
