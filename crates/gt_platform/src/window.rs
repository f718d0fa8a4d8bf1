use std::sync::Arc;
use winit::dpi::PhysicalPosition;
use winit::event_loop::ActiveEventLoop;
use winit::window::{CursorGrabMode, Window, WindowAttributes};

pub struct PlatformConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            title: "Template!".to_string(),
            width: 800,
            height: 500,
        }
    }
}

pub fn create_window(event_loop: &ActiveEventLoop, config: &PlatformConfig) -> Arc<Window> {
    let attrs = WindowAttributes::default()
        .with_title(&config.title)
        .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height))
        .with_position(winit::dpi::LogicalPosition::new(50, 50));

    let window = event_loop
        .create_window(attrs)
        .expect("Failed to create window");
    Arc::new(window)
}

/// Hide and confine the cursor while locked, restore the arrow otherwise.
pub fn apply_cursor_lock(window: &Window, locked: bool) {
    window.set_cursor_visible(!locked);
    if !locked {
        if let Err(err) = window.set_cursor_grab(CursorGrabMode::None) {
            log::warn!("Failed to release cursor grab: {err}");
        }
        return;
    }

    if let Err(err) = window
        .set_cursor_grab(CursorGrabMode::Confined)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked))
    {
        log::warn!("Failed to grab cursor: {err}");
    }
    warp_cursor_to_center(window);
}

/// Called once per frame while locked; mouse deltas are then measured
/// against the window center.
pub fn warp_cursor_to_center(window: &Window) {
    let size = window.inner_size();
    let center = PhysicalPosition::new(size.width as f64 / 2.0, size.height as f64 / 2.0);
    if let Err(err) = window.set_cursor_position(center) {
        log::debug!("Failed to warp cursor to window center: {err}");
    }
}
