// src/refresh.rs
//
// Background index rebuilds. A dedicated thread rebuilds the snapshot on an
// explicit trigger or on a timer and publishes it through the IndexStore;
// query traffic never waits on it.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, never, select, tick, Receiver, Sender, TryRecvError};

use crate::error::Result;
use crate::index_store::{IndexSnapshot, IndexStore};
use crate::record_source::RecordSource;

/// Handle to a running refresher thread.
pub struct IndexRefresher {
    trigger_tx: Sender<()>,
    shutdown_tx: Sender<()>,
    thread: Option<JoinHandle<()>>,
}

impl IndexRefresher {
    /// Start the refresher. With `interval` set, a rebuild also runs on every tick.
    pub fn spawn(
        store: Arc<IndexStore>,
        source: Arc<dyn RecordSource>,
        text_columns: Vec<String>,
        interval: Option<Duration>,
    ) -> Result<Self> {
        // Capacity 1: triggers arriving while one is pending coalesce
        let (trigger_tx, trigger_rx) = bounded(1);
        let (shutdown_tx, shutdown_rx) = bounded(1);

        let thread = thread::Builder::new()
            .name("index-refresh".to_string())
            .spawn(move || {
                log::info!("[Refresher] Started (interval: {:?})", interval);
                run_refresh_loop(&store, source.as_ref(), &text_columns, interval, &trigger_rx, &shutdown_rx);
                log::info!("[Refresher] Stopped");
            })?;

        Ok(Self {
            trigger_tx,
            shutdown_tx,
            thread: Some(thread),
        })
    }

    /// Request a rebuild. Returns false when one is already pending.
    pub fn trigger(&self) -> bool {
        self.trigger_tx.try_send(()).is_ok()
    }

    /// Stop the thread and wait for it. A rebuild still in progress is
    /// discarded instead of published.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.shutdown_tx.try_send(());
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("[Refresher] Refresh thread panicked");
            }
        }
    }
}

impl Drop for IndexRefresher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_refresh_loop(
    store: &IndexStore,
    source: &dyn RecordSource,
    text_columns: &[String],
    interval: Option<Duration>,
    trigger_rx: &Receiver<()>,
    shutdown_rx: &Receiver<()>,
) {
    let ticker = match interval {
        Some(period) => tick(period),
        None => never(),
    };

    loop {
        select! {
            recv(shutdown_rx) -> _ => break,
            recv(trigger_rx) -> message => {
                if message.is_err() {
                    break;
                }
                log::debug!("[Refresher] Rebuild triggered");
            }
            recv(ticker) -> _ => log::debug!("[Refresher] Scheduled rebuild"),
        }

        let start_time = Instant::now();
        let snapshot = IndexSnapshot::build(source, text_columns);

        match shutdown_rx.try_recv() {
            Err(TryRecvError::Empty) => {
                let generation = store.publish(snapshot);
                log::info!(
                    "[Refresher] Generation {} ready after {}ms",
                    generation,
                    start_time.elapsed().as_millis()
                );
            }
            _ => {
                log::info!("[Refresher] Shutdown requested during rebuild, discarding result");
                break;
            }
        }
    }
}
