//! Background polling thread ("state tracker").
//!
//! The thread calls a tick function, then sleeps for the polling interval.
//! The sleep waits on a channel so that [`Tracker::stop`] (or dropping the
//! tracker) wakes it immediately instead of waiting for the interval.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, Sender, bounded};
use tracing::debug;

use crate::errors::ControlPointError;

/// What the tracker loop does after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    Continue,
    Exit,
}

pub(crate) struct Tracker {
    stop_flag: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    wake: Option<Sender<()>>,
}

/// Clears the running flag when the thread ends, unwinding included.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Tracker {
    pub(crate) fn spawn<F>(
        name: &str,
        interval: Duration,
        mut tick: F,
    ) -> Result<Self, ControlPointError>
    where
        F: FnMut() -> TickOutcome + Send + 'static,
    {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let (wake, wake_rx) = bounded::<()>(1);
        let thread_name = format!("tracker-{}", name);
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&stop_flag);
        let guard = RunningGuard(Arc::clone(&running));
        let renderer = name.to_string();

        thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                let _guard = guard;
                while !flag.load(Ordering::SeqCst) {
                    if tick() == TickOutcome::Exit {
                        break;
                    }

                    match wake_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!(renderer = renderer.as_str(), "Tracker thread exiting");
            })
            .map_err(|e| ControlPointError::ThreadSpawn(thread_name, e.to_string()))?;

        Ok(Self {
            stop_flag,
            running,
            wake: Some(wake),
        })
    }

    /// False once the thread has returned or panicked.
    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Signals the thread to stop. Does not wait for an in-flight tick.
    pub(crate) fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(wake) = self.wake.take() {
            let _ = wake.try_send(());
        }
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        self.stop();
    }
}
