use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Sender, bounded, select, tick};

use crate::Runtime;

/// Dedicated thread calling [`Runtime::tick_all`] once per period. Dropping it stops the thread.
pub struct TickLoop {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TickLoop {
    pub fn spawn(runtime: Runtime, period: Duration) -> std::io::Result<Self> {
        let (stop, stop_rx) = bounded::<()>(0);
        let ticker = tick(period);
        let handle = thread::Builder::new()
            .name("strata-tick".into())
            .spawn(move || {
                let mut ticks = 0u64;
                loop {
                    select! {
                        recv(ticker) -> _ => {
                            ticks += 1;
                            let edits = runtime.tick_all();
                            log::trace!(target: "events", "tick {}: {} behaviour edits", ticks, edits);
                        }
                        recv(stop_rx) -> _ => break,
                    }
                }
                log::debug!("tick loop stopped after {} ticks", ticks);
            })?;
        Ok(Self {
            stop: Some(stop),
            handle: Some(handle),
        })
    }

    /// Stops the loop and waits for an in-progress tick to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Dropping the sender disconnects `stop_rx`, which ends the select loop.
        self.stop.take();
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

impl Drop for TickLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}
