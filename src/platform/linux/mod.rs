//! Linux platform backend.
//!
//! Pointer access goes through X11: `QueryPointer` for the position and the
//! XTEST extension for injection, via `X11Pointer`. This covers native X11
//! sessions and Wayland sessions running XWayland.
//!
//! Startup detection:
//! 1. `DISPLAY` set (with or without `WAYLAND_DISPLAY`) → X11 backend
//! 2. `WAYLAND_DISPLAY` only → no pointer position API, clear error
//! 3. Neither variable set   → no display, clear error

mod detect;
mod x11;

use x11::X11Pointer;

use crate::platform::{PlatformError, Pointer};
use detect::{detect_display_server, DisplayServer};

// ---------------------------------------------------------------------------
// Factory: pointer
// ---------------------------------------------------------------------------

/// Returns the appropriate `Pointer` for the current session.
pub fn create_pointer() -> Result<Box<dyn Pointer>, PlatformError> {
    match detect_display_server() {
        Some(DisplayServer::X11) => {
            log::info!("platform: using X11/XTEST pointer backend");
            X11Pointer::connect().map(|p| Box::new(p) as Box<dyn Pointer>)
        }
        Some(DisplayServer::WaylandOnly) => Err(PlatformError::Unavailable(
            "Wayland session without XWayland: set DISPLAY or enable XWayland.".into(),
        )),
        None => Err(PlatformError::Unavailable(
            "No display server detected (neither DISPLAY nor WAYLAND_DISPLAY is set).".into(),
        )),
    }
}
