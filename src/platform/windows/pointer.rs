//! Windows pointer access via GetCursorPos and SendInput.
//!
//! `WindowsPointer` implements `Pointer`. Injection is synchronous:
//! `SendInput` returns after the event is queued. Moves are posted as
//! absolute motion over the whole virtual desktop, so targets on secondary
//! monitors (including negative coordinates) are reachable.

use windows_sys::Win32::Foundation::{GetLastError, ERROR_ACCESS_DENIED, POINT};
use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_MOUSE, MOUSEEVENTF_ABSOLUTE, MOUSEEVENTF_MOVE,
    MOUSEEVENTF_VIRTUALDESK, MOUSEINPUT,
};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    GetCursorPos, GetSystemMetrics, SM_CXVIRTUALSCREEN, SM_CYVIRTUALSCREEN, SM_XVIRTUALSCREEN,
    SM_YVIRTUALSCREEN,
};

use crate::platform::{PlatformError, Point, Pointer};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Absolute mouse coordinates are normalized to `0..=65535`.
const ABSOLUTE_MAX: i64 = 65_535;

// ---------------------------------------------------------------------------
// Public struct
// ---------------------------------------------------------------------------

/// Reads and injects pointer motion on Windows.
///
/// Stateless: every call queries the OS directly.
pub struct WindowsPointer;

impl WindowsPointer {
    pub fn new() -> Self {
        WindowsPointer
    }
}

// ---------------------------------------------------------------------------
// Pointer trait impl
// ---------------------------------------------------------------------------

impl Pointer for WindowsPointer {
    fn position(&self) -> Result<Point, PlatformError> {
        let mut point = POINT { x: 0, y: 0 };
        let ok = unsafe { GetCursorPos(&mut point) };
        if ok == 0 {
            let code = unsafe { GetLastError() };
            if code == ERROR_ACCESS_DENIED {
                return Err(PlatformError::PermissionDenied(
                    "GetCursorPos denied (secure desktop active?)".into(),
                ));
            }
            return Err(PlatformError::Other(format!(
                "GetCursorPos failed (error {code})"
            )));
        }
        Ok(Point::new(point.x, point.y))
    }

    fn move_to(&self, target: Point) -> Result<(), PlatformError> {
        let (left, top, width, height) = unsafe {
            (
                GetSystemMetrics(SM_XVIRTUALSCREEN),
                GetSystemMetrics(SM_YVIRTUALSCREEN),
                GetSystemMetrics(SM_CXVIRTUALSCREEN),
                GetSystemMetrics(SM_CYVIRTUALSCREEN),
            )
        };

        let input = INPUT {
            r#type: INPUT_MOUSE,
            Anonymous: INPUT_0 {
                mi: MOUSEINPUT {
                    dx: normalize(target.x, left, width),
                    dy: normalize(target.y, top, height),
                    mouseData: 0,
                    dwFlags: MOUSEEVENTF_MOVE | MOUSEEVENTF_ABSOLUTE | MOUSEEVENTF_VIRTUALDESK,
                    time: 0,
                    dwExtraInfo: 0,
                },
            },
        };

        let sent = unsafe { SendInput(1, &input, std::mem::size_of::<INPUT>() as i32) };

        if sent == 0 {
            let code = unsafe { GetLastError() };
            if code == ERROR_ACCESS_DENIED {
                return Err(PlatformError::PermissionDenied(
                    "SendInput blocked by UIPI; a higher-privilege window has focus".into(),
                ));
            }
            return Err(PlatformError::Other(format!(
                "SendInput returned 0 (error {code})"
            )));
        }

        log::trace!("windows: motion to {target}");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Maps a pixel coordinate on the virtual desktop to the normalized
/// `0..=65535` range expected by `MOUSEEVENTF_ABSOLUTE`.
fn normalize(value: i32, origin: i32, extent: i32) -> i32 {
    let span = i64::from(extent.max(2) - 1);
    let offset = (i64::from(value) - i64::from(origin)).clamp(0, span);
    // Round to nearest so the pointer lands on the requested pixel.
    ((offset * ABSOLUTE_MAX + span / 2) / span) as i32
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
