//! Background poll timer.
//!
//! The poller never touches provider state. It only raises a signal every
//! interval; the owning thread picks it up on its next tick and decides
//! whether to queue a fetch.

use crossbeam_channel as chan;
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub struct Poller {
    signal: chan::Receiver<()>,
    stop: Option<chan::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn start(interval: Duration) -> std::io::Result<Self> {
        // One pending signal is enough: missed intervals collapse into it
        let (signal_tx, signal) = chan::bounded(1);
        let (stop, stop_rx) = chan::bounded::<()>(0);

        let handle = thread::Builder::new()
            .name("vcs-poller".to_string())
            .spawn(move || loop {
                chan::select! {
                    recv(stop_rx) -> _ => break,
                    default(interval) => {
                        if signal_tx.try_send(()).is_err() {
                            log::trace!("Poll signal still pending");
                        }
                    }
                }
            })?;

        log::debug!("Polling every {:?}", interval);
        Ok(Self {
            signal,
            stop: Some(stop),
            handle: Some(handle),
        })
    }

    /// Consume the pending signal, if any
    pub fn take_due(&self) -> bool {
        self.signal.try_iter().count() > 0
    }

    pub fn stop(&mut self) {
        // Dropping the sender wakes the thread
        self.stop.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("Poller thread panicked");
            }
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}
