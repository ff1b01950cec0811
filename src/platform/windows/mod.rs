//! Windows platform backend: `GetCursorPos` for position, `SendInput` for
//! injection, via `WindowsPointer`.
//!
//! No special permission is needed, but User Interface Privilege Isolation
//! (UIPI) blocks injection into a higher-integrity foreground process; that
//! case surfaces as `PlatformError::PermissionDenied` from `move_to`.

mod pointer;

use pointer::WindowsPointer;

use crate::platform::{PlatformError, Pointer};

/// Returns a `WindowsPointer` backed by `SendInput`.
pub fn create_pointer() -> Result<Box<dyn Pointer>, PlatformError> {
    log::info!("platform: using SendInput pointer backend");
    Ok(Box::new(WindowsPointer::new()))
}
