//! macOS pointer access via CoreGraphics.
//!
//! `MacOSPointer` implements `Pointer`. Injection is synchronous:
//! `CGEventPost` delivers the event before returning. Events are posted at
//! the HID level so the system treats them like hardware motion and resets
//! its idle timer.

use std::ffi::c_void;
use std::ptr;

use crate::platform::{PlatformError, Point, Pointer};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// CGEventTapLocation: kCGHIDEventTap -- inject where hardware events enter.
const CG_HID_EVENT_TAP: u32 = 0;

/// CGEventType: kCGEventMouseMoved.
const CG_EVENT_MOUSE_MOVED: u32 = 5;

/// CGMouseButton: kCGMouseButtonLeft (ignored for move events).
const CG_MOUSE_BUTTON_LEFT: u32 = 0;

// ---------------------------------------------------------------------------
// Raw FFI
// ---------------------------------------------------------------------------

type CGEventRef = *mut c_void;
type CGEventSourceRef = *mut c_void;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct CGPoint {
    x: f64,
    y: f64,
}

#[link(name = "ApplicationServices", kind = "framework")]
extern "C" {
    /// Returns true if this process has been granted Accessibility permission.
    fn AXIsProcessTrusted() -> bool;
    fn CGEventCreate(source: CGEventSourceRef) -> CGEventRef;
    fn CGEventGetLocation(event: CGEventRef) -> CGPoint;
    fn CGEventCreateMouseEvent(
        source: CGEventSourceRef,
        mouse_type: u32,
        mouse_cursor_position: CGPoint,
        mouse_button: u32,
    ) -> CGEventRef;
    fn CGEventPost(tap_location: u32, event: CGEventRef);
}

#[link(name = "CoreFoundation", kind = "framework")]
extern "C" {
    fn CFRelease(cf: *const c_void);
}

pub fn is_process_trusted() -> bool {
    unsafe { AXIsProcessTrusted() }
}

// ---------------------------------------------------------------------------
// Public struct
// ---------------------------------------------------------------------------

/// Reads and injects pointer motion via CoreGraphics on macOS.
///
/// Stateless: each call creates a `CGEvent`, uses it, and releases it
/// immediately.
pub struct MacOSPointer;

impl MacOSPointer {
    pub fn new() -> Self {
        MacOSPointer
    }
}

// ---------------------------------------------------------------------------
// Pointer trait impl
// ---------------------------------------------------------------------------

impl Pointer for MacOSPointer {
    fn position(&self) -> Result<Point, PlatformError> {
        let location = unsafe {
            let event = CGEventCreate(ptr::null_mut());
            if event.is_null() {
                return Err(PlatformError::Other("CGEventCreate returned null".into()));
            }
            let location = CGEventGetLocation(event);
            CFRelease(event.cast::<c_void>());
            location
        };
        Ok(Point::new(location.x as i32, location.y as i32))
    }

    fn move_to(&self, target: Point) -> Result<(), PlatformError> {
        let cursor = CGPoint {
            x: f64::from(target.x),
            y: f64::from(target.y),
        };

        unsafe {
            let event = CGEventCreateMouseEvent(
                ptr::null_mut(),
                CG_EVENT_MOUSE_MOVED,
                cursor,
                CG_MOUSE_BUTTON_LEFT,
            );
            if event.is_null() {
                return Err(PlatformError::Other(
                    "CGEventCreateMouseEvent returned null".into(),
                ));
            }
            CGEventPost(CG_HID_EVENT_TAP, event);
            CFRelease(event.cast::<c_void>());
        }

        log::trace!("macos: motion to {target}");
        Ok(())
    }
}
