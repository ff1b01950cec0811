//! Display server detection for Linux.
//!
//! Determines which pointer backend can run by inspecting the environment
//! variables set by the session manager.
//!
//! Note: `DISPLAY` being set alongside `WAYLAND_DISPLAY` means XWayland is
//! running. XTEST motion injected through XWayland reaches the compositor as
//! real pointer activity, which is all that idle detection needs.

use std::env;

// ---------------------------------------------------------------------------
// Display server type
// ---------------------------------------------------------------------------

/// The display server reachable from this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayServer {
    /// An X server is reachable through `DISPLAY` (native X11 or XWayland).
    X11,
    /// Only `WAYLAND_DISPLAY` is set. Wayland exposes no global pointer
    /// position to clients, so no backend is available.
    WaylandOnly,
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Detects the display server from environment variables.
///
/// Returns `None` when neither `WAYLAND_DISPLAY` nor `DISPLAY` is set,
/// which indicates the process is running outside of any graphical session.
pub fn detect_display_server() -> Option<DisplayServer> {
    let has_wayland = is_set("WAYLAND_DISPLAY");
    let has_display = is_set("DISPLAY");
    classify_display(has_wayland, has_display)
}

fn is_set(var: &str) -> bool {
    env::var_os(var).map(|v| !v.is_empty()).unwrap_or(false)
}

/// Classifies the display server from boolean presence flags.
///
/// Kept separate from `detect_display_server` so it can be tested without
/// mutating process environment variables.
fn classify_display(has_wayland: bool, has_display: bool) -> Option<DisplayServer> {
    match (has_wayland, has_display) {
        (_, true) => Some(DisplayServer::X11),
        (true, false) => Some(DisplayServer::WaylandOnly),
        (false, false) => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
