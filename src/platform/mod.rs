//! Platform abstraction layer.
//!
//! Defines the `Pointer` trait: the only two OS capabilities the jiggler
//! consumes (read the pointer position, synthesize an absolute pointer move).
//! Platform-specific implementations live in child modules; `create_pointer`
//! selects the one for the current target and session.

use std::fmt;

use thiserror::Error;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A pointer position in global screen coordinates (pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    /// Returns this point shifted by `(dx, dy)`, saturating at the `i32` bounds.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Point {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Errors raised by platform backends.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The OS refused pointer access or injection (security policy).
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// No usable backend exists for this session.
    #[error("platform unavailable: {0}")]
    Unavailable(String),
    #[error("{0}")]
    Other(String),
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Pointer access consumed by the jiggler loop.
///
/// Implementations are synchronous: `move_to` returns once the OS has
/// accepted the synthetic event.
pub trait Pointer {
    /// Current pointer position in global screen coordinates.
    fn position(&self) -> Result<Point, PlatformError>;

    /// Moves the pointer to `target` with a synthetic pointer-moved event
    /// (no buttons held).
    fn move_to(&self, target: Point) -> Result<(), PlatformError>;
}

impl<P: Pointer + ?Sized> Pointer for Box<P> {
    fn position(&self) -> Result<Point, PlatformError> {
        (**self).position()
    }

    fn move_to(&self, target: Point) -> Result<(), PlatformError> {
        (**self).move_to(target)
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Returns the pointer backend for the current platform.
///
/// Permission and availability problems surface here, before any session
/// starts, so the caller can fail fast instead of looping on errors.
pub fn create_pointer() -> Result<Box<dyn Pointer>, PlatformError> {
    #[cfg(target_os = "linux")]
    {
        linux::create_pointer()
    }
    #[cfg(target_os = "macos")]
    {
        macos::create_pointer()
    }
    #[cfg(target_os = "windows")]
    {
        windows::create_pointer()
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        Err(PlatformError::Unavailable(
            "pointer injection is not supported on this operating system".into(),
        ))
    }
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------

#[cfg(test)]
pub mod fake {
    //! In-memory pointer that records every move.

    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{PlatformError, Point, Pointer};

    #[derive(Debug, Default)]
    struct State {
        position: Point,
        moves: Vec<Point>,
        fail_moves: bool,
    }

    /// Cloning yields another handle to the same recorded state.
    #[derive(Debug, Clone, Default)]
    pub struct FakePointer {
        state: Rc<RefCell<State>>,
    }

    impl FakePointer {
        pub fn at(x: i32, y: i32) -> Self {
            let fake = FakePointer::default();
            fake.state.borrow_mut().position = Point::new(x, y);
            fake
        }

        /// Makes every subsequent `move_to` fail with `PermissionDenied`.
        pub fn deny_moves(&self) {
            self.state.borrow_mut().fail_moves = true;
        }

        pub fn current(&self) -> Point {
            self.state.borrow().position
        }

        pub fn moves(&self) -> Vec<Point> {
            self.state.borrow().moves.clone()
        }
    }

    impl Pointer for FakePointer {
        fn position(&self) -> Result<Point, PlatformError> {
            Ok(self.state.borrow().position)
        }

        fn move_to(&self, target: Point) -> Result<(), PlatformError> {
            let mut state = self.state.borrow_mut();
            if state.fail_moves {
                return Err(PlatformError::PermissionDenied("fake denied".into()));
            }
            state.position = target;
            state.moves.push(target);
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
