//! Cross-thread repaint requests.
//!
//! View data never leaves the UI thread. A worker that wants the window
//! repainted raises an [`InvalidateSignal`]; a relay thread waits on it and
//! forwards each raise to the event loop (the winit shell sends a user event
//! through its `EventLoopProxy`).

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

#[derive(Debug, Default)]
struct State {
    raised: bool,
    closed: bool,
}

#[derive(Debug, Default)]
struct Inner {
    state: Mutex<State>,
    wake: Condvar,
}

/// Cloneable, thread-safe "please repaint" flag
#[derive(Debug, Clone, Default)]
pub struct InvalidateSignal {
    inner: Arc<Inner>,
}

impl InvalidateSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a repaint. Raises coalesce until the relay takes them.
    pub fn raise(&self) {
        let mut state = self.inner.state.lock();
        if state.closed {
            return;
        }
        state.raised = true;
        self.inner.wake.notify_all();
    }

    /// Consume a pending raise without blocking
    pub fn take(&self) -> bool {
        std::mem::take(&mut self.inner.state.lock().raised)
    }

    /// Block until raised (returns true) or closed (returns false)
    pub fn wait(&self) -> bool {
        let mut state = self.inner.state.lock();
        loop {
            if state.closed {
                return false;
            }
            if std::mem::take(&mut state.raised) {
                return true;
            }
            self.inner.wake.wait(&mut state);
        }
    }

    /// Stop the signal; waiting relays return
    pub fn close(&self) {
        let mut state = self.inner.state.lock();
        state.closed = true;
        self.inner.wake.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().closed
    }

    /// Run `forward` on a background thread once per raise until the signal closes
    pub fn spawn_relay<F>(&self, mut forward: F) -> std::io::Result<JoinHandle<()>>
    where
        F: FnMut() + Send + 'static,
    {
        let signal = self.clone();
        thread::Builder::new()
            .name("arbor-invalidate".into())
            .spawn(move || {
                while signal.wait() {
                    forward();
                }
                log::trace!("invalidate relay stopped");
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn test_raises_coalesce() {
        let signal = InvalidateSignal::new();
        signal.raise();
        signal.raise();
        assert!(signal.take());
        assert!(!signal.take());
    }

    #[test]
    fn test_relay_forwards_and_stops_on_close() {
        let signal = InvalidateSignal::new();
        let (tx, rx) = mpsc::channel();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let relay = signal
            .spawn_relay(move || {
                seen.fetch_add(1, Ordering::SeqCst);
                let _ = tx.send(());
            })
            .unwrap();

        let worker = signal.clone();
        thread::spawn(move || worker.raise()).join().unwrap();
        rx.recv_timeout(Duration::from_secs(5)).unwrap();

        signal.close();
        relay.join().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(signal.is_closed());
    }

    #[test]
    fn test_raise_after_close_is_ignored() {
        let signal = InvalidateSignal::new();
        signal.close();
        signal.raise();
        assert!(!signal.take());
        assert!(!signal.wait());
    }
}
