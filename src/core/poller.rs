//! Fixed-interval status polling.
//!
//! The scheduler thread only emits tick events into the event loop; the
//! query itself is issued on the loop so that it goes through the same
//! single-flight runner as user actions. There is no backoff: a failing or
//! dropped poll is simply followed by the next one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Handle to the background polling thread.
///
/// Dropping the handle stops the thread after its current sleep. The thread
/// also exits on its own once the receiving side of the channel is gone.
pub struct PollingScheduler {
    stopped: Arc<AtomicBool>,
}

impl PollingScheduler {
    /// Spawns the scheduler. The first tick is sent immediately, then one
    /// every `interval`.
    pub fn spawn<T>(interval: Duration, sender: Sender<T>, tick: T) -> Self
    where
        T: Clone + Send + 'static,
    {
        let stopped = Arc::new(AtomicBool::new(false));
        let thread_stopped = Arc::clone(&stopped);

        let spawned = thread::Builder::new()
            .name("status-poller".to_string())
            .spawn(move || {
                while !thread_stopped.load(Ordering::SeqCst) {
                    if sender.send(tick.clone()).is_err() {
                        return;
                    }
                    thread::sleep(interval);
                }
            });

        if let Err(e) = spawned {
            crate::log_error!("POLL", "Could not start status poller: {e}");
        } else {
            crate::log_debug!("POLL", "Polling every {}s", interval.as_secs_f32());
        }

        Self { stopped }
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_ticks_repeat() {
        let (tx, rx) = mpsc::channel();
        let _poller = PollingScheduler::spawn(Duration::from_millis(10), tx, "poll");

        for _ in 0..3 {
            assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), "poll");
        }
    }

    #[test]
    fn test_first_tick_is_immediate() {
        let (tx, rx) = mpsc::channel();
        let _poller = PollingScheduler::spawn(Duration::from_secs(3600), tx, 1u8);
        assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), 1);
    }

    #[test]
    fn test_drop_stops_ticks() {
        let (tx, rx) = mpsc::channel();
        let poller = PollingScheduler::spawn(Duration::from_millis(10), tx, ());
        rx.recv_timeout(Duration::from_secs(2)).unwrap();

        drop(poller);
        // The thread notices after its current sleep, then drops the sender.
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        loop {
            match rx.recv_timeout(Duration::from_millis(100)) {
                Ok(()) => assert!(std::time::Instant::now() < deadline, "poller kept ticking"),
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
                Err(mpsc::RecvTimeoutError::Timeout) => panic!("sender still alive"),
            }
        }
    }

    #[test]
    fn test_thread_exits_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel::<()>();
        drop(rx);
        let poller = PollingScheduler::spawn(Duration::from_millis(1), tx, ());
        // Nothing to assert beyond not hanging or panicking.
        thread::sleep(Duration::from_millis(20));
        drop(poller);
    }
}
