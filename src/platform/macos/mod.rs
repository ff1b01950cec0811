//! macOS platform backend.
//!
//! Position: `CGEventCreate` + `CGEventGetLocation`.
//! Injection: `CGEventPost` of `kCGEventMouseMoved` events via `MacOSPointer`.
//!
//! Posting synthetic events requires Accessibility permission. The factory
//! calls `AXIsProcessTrusted()` and returns `PlatformError::PermissionDenied`
//! if permission has not been granted. Guide the user to:
//!   System Settings > Privacy & Security > Accessibility

mod pointer;

use pointer::MacOSPointer;

use crate::platform::{PlatformError, Pointer};

// ---------------------------------------------------------------------------
// Factory: pointer
// ---------------------------------------------------------------------------

/// Returns the CoreGraphics-based pointer backend.
///
/// Without Accessibility trust `CGEventPost` silently drops events, so the
/// check happens here instead of surfacing as a jiggler that does nothing.
pub fn create_pointer() -> Result<Box<dyn Pointer>, PlatformError> {
    if !pointer::is_process_trusted() {
        return Err(PlatformError::PermissionDenied(
            "Accessibility permission is required. Grant it in System Settings > \
             Privacy & Security > Accessibility, then restart the terminal."
                .into(),
        ));
    }
    log::info!("platform: using CoreGraphics pointer backend");
    Ok(Box::new(MacOSPointer::new()))
}
