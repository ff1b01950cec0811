//! Cooperative stop request shared between the session loop and the
//! interrupt handler.
//!
//! The handler installed by `install_interrupt_handler` only flips the flag;
//! it never touches the pointer or writes output. The loop uses
//! `wait_timeout` as its inter-jiggle sleep, so a stop request wakes it
//! immediately instead of after the full interval.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

/// Cloneable handle to a one-way stop flag.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag and wakes every waiter. Idempotent.
    pub fn request_stop(&self) {
        let (lock, cvar) = &*self.inner;
        *lock_flag(lock) = true;
        cvar.notify_all();
    }

    pub fn is_stop_requested(&self) -> bool {
        *lock_flag(&self.inner.0)
    }

    /// Blocks for up to `timeout`. Returns `true` if a stop was requested
    /// before or during the wait.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let guard = lock_flag(lock);
        let (guard, _) = cvar
            .wait_timeout_while(guard, timeout, |stopped| !*stopped)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard
    }
}

/// A poisoned flag is still a valid bool; recover it.
fn lock_flag(lock: &Mutex<bool>) -> MutexGuard<'_, bool> {
    lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Routes SIGINT/SIGTERM (Ctrl+C / console close on Windows) to `signal`.
///
/// Can only be installed once per process.
pub fn install_interrupt_handler(signal: &StopSignal) -> Result<(), ctrlc::Error> {
    let signal = signal.clone();
    ctrlc::set_handler(move || {
        signal.request_stop();
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Instant;

    use super::*;

    #[test]
    fn starts_clear() {
        assert!(!StopSignal::new().is_stop_requested());
    }

    #[test]
    fn wait_times_out_without_request() {
        let signal = StopSignal::new();
        let start = Instant::now();
        assert!(!signal.wait_timeout(Duration::from_millis(30)));
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn request_is_visible_through_clones() {
        let signal = StopSignal::new();
        let handle = signal.clone();
        handle.request_stop();
        handle.request_stop();
        assert!(signal.is_stop_requested());
        assert!(signal.wait_timeout(Duration::from_secs(5)));
    }

    #[test]
    fn request_wakes_sleeping_waiter() {
        let signal = StopSignal::new();
        let handle = signal.clone();
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            handle.request_stop();
        });

        let start = Instant::now();
        assert!(signal.wait_timeout(Duration::from_secs(30)));
        assert!(start.elapsed() < Duration::from_secs(5));
        stopper.join().unwrap();
    }
}
