//! X11 pointer backend via `QueryPointer` and the XTEST extension.
//!
//! `X11Pointer` implements `Pointer`. It holds one connection to the X
//! server for the life of the session. Moves are sent as XTEST `FakeInput`
//! `MotionNotify` requests with `detail = 0` (absolute coordinates on the
//! root window), which the server treats as real device motion and which
//! therefore resets the screensaver/idle timers.
//!
//! Each move is checked (one round trip) so that a server-side `Access`
//! error surfaces as `PlatformError::PermissionDenied` on the spot rather
//! than being discarded with the event queue.

use x11rb::connection::{Connection, RequestConnection};
use x11rb::errors::{ConnectionError, ReplyError};
use x11rb::protocol::xproto::{ConnectionExt as _, Window, MOTION_NOTIFY_EVENT};
use x11rb::protocol::xtest::{self, ConnectionExt as _};
use x11rb::protocol::ErrorKind;
use x11rb::rust_connection::RustConnection;
use x11rb::CURRENT_TIME;

use crate::platform::{PlatformError, Point, Pointer};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// `detail` value for `FakeInput(MotionNotify)`: 0 means absolute motion.
const MOTION_ABSOLUTE: u8 = 0;

/// XTEST device id 0: the core pointer.
const CORE_POINTER: u8 = 0;

// ---------------------------------------------------------------------------
// Public struct
// ---------------------------------------------------------------------------

/// Reads and injects pointer motion through an X server connection.
pub struct X11Pointer {
    conn: RustConnection,
    root: Window,
}

impl X11Pointer {
    /// Connects to the server named by `DISPLAY` and verifies that XTEST is
    /// available, so a missing extension fails at startup.
    pub fn connect() -> Result<Self, PlatformError> {
        let (conn, screen_num) = x11rb::connect(None).map_err(|e| {
            PlatformError::Unavailable(format!("cannot connect to X server: {e}"))
        })?;

        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .map(|screen| screen.root)
            .ok_or_else(|| PlatformError::Other(format!("X screen {screen_num} not found")))?;

        let has_xtest = conn
            .extension_information(xtest::X11_EXTENSION_NAME)
            .map_err(connection_error)?
            .is_some();
        if !has_xtest {
            return Err(PlatformError::Unavailable(
                "X server does not provide the XTEST extension".into(),
            ));
        }

        log::debug!("x11: connected to screen {screen_num}, root window {root:#x}");
        Ok(Self { conn, root })
    }
}

// ---------------------------------------------------------------------------
// Pointer trait impl
// ---------------------------------------------------------------------------

impl Pointer for X11Pointer {
    fn position(&self) -> Result<Point, PlatformError> {
        let reply = self
            .conn
            .query_pointer(self.root)
            .map_err(connection_error)?
            .reply()
            .map_err(reply_error)?;
        Ok(Point::new(i32::from(reply.root_x), i32::from(reply.root_y)))
    }

    fn move_to(&self, target: Point) -> Result<(), PlatformError> {
        self.conn
            .xtest_fake_input(
                MOTION_NOTIFY_EVENT,
                MOTION_ABSOLUTE,
                CURRENT_TIME,
                self.root,
                to_coord(target.x),
                to_coord(target.y),
                CORE_POINTER,
            )
            .map_err(connection_error)?
            .check()
            .map_err(reply_error)?;
        self.conn.flush().map_err(connection_error)?;
        log::trace!("x11: motion to {target}");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// X11 coordinates are 16-bit; clamp rather than wrap.
fn to_coord(value: i32) -> i16 {
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

fn connection_error(e: ConnectionError) -> PlatformError {
    PlatformError::Other(format!("X11 connection error: {e}"))
}

fn reply_error(e: ReplyError) -> PlatformError {
    match e {
        ReplyError::X11Error(err) if err.error_kind == ErrorKind::Access => {
            PlatformError::PermissionDenied(
                "X server refused synthetic pointer input (Access error)".into(),
            )
        }
        ReplyError::X11Error(err) => {
            PlatformError::Other(format!("X11 request failed: {:?}", err.error_kind))
        }
        ReplyError::ConnectionError(err) => connection_error(err),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_within_range_are_kept() {
        assert_eq!(to_coord(0), 0);
        assert_eq!(to_coord(1919), 1919);
        assert_eq!(to_coord(-5), -5);
    }

    #[test]
    fn coordinates_out_of_range_are_clamped() {
        assert_eq!(to_coord(100_000), i16::MAX);
        assert_eq!(to_coord(-100_000), i16::MIN);
    }

    #[test]
    fn broken_connection_maps_to_other() {
        let err = reply_error(ReplyError::ConnectionError(ConnectionError::UnknownError));
        assert!(matches!(err, PlatformError::Other(_)));
    }
}
