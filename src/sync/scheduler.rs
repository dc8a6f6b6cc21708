//! Periodic polling with bounded retry.
//!
//! A single task owns the ticker and performs every fetch, so the automatic
//! tick and manual refreshes share one path and never overlap. Refresh
//! requests that arrive while a poll is in flight are folded into it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::config::PollSettings;
use crate::source::{RawReading, ReadingSource};

/// Progress of one poll cycle, in the order they are emitted.
#[derive(Debug, Clone)]
pub enum PollEvent {
    Started,
    Succeeded {
        readings: Vec<RawReading>,
        attempts: u32,
    },
    Failed {
        error: String,
        attempts: u32,
    },
}

/// Control handle for a running poller.
pub struct PollHandle {
    refresh_tx: mpsc::Sender<()>,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Ask for an immediate poll. A request already pending absorbs this one.
    pub fn refresh(&self) {
        match self.refresh_tx.try_send(()) {
            Ok(()) => tracing::debug!("Manual refresh queued"),
            Err(mpsc::error::TrySendError::Full(())) => {
                tracing::debug!("Manual refresh coalesced with pending request");
            }
            Err(mpsc::error::TrySendError::Closed(())) => {
                tracing::warn!("Manual refresh ignored, poller stopped");
            }
        }
    }

    /// Stop ticking and drop any in-flight fetch.
    ///
    /// Once this returns the poller has emitted its last event.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await
            && !e.is_cancelled()
        {
            tracing::error!(error = %e, "Poller task panicked");
        }
        tracing::info!("Poller stopped");
    }
}

/// Start polling `source` every `settings.interval`, reporting to `events`.
///
/// The first poll runs immediately through the same path as every later tick.
pub fn start<S: ReadingSource>(
    source: Arc<S>,
    settings: PollSettings,
    events: mpsc::Sender<PollEvent>,
) -> PollHandle {
    let (refresh_tx, refresh_rx) = mpsc::channel(1);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tracing::info!(
        interval_ms = settings.interval.as_millis() as u64,
        max_attempts = settings.max_attempts,
        retry_delay_ms = settings.retry_delay.as_millis() as u64,
        "Starting readings poller"
    );

    let task = tokio::spawn(run(source, settings, events, refresh_rx, shutdown_rx));

    PollHandle {
        refresh_tx,
        shutdown_tx,
        task,
    }
}

async fn run<S: ReadingSource>(
    source: Arc<S>,
    settings: PollSettings,
    events: mpsc::Sender<PollEvent>,
    mut refresh_rx: mpsc::Receiver<()>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = interval(settings.interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.changed() => break,
            _ = ticker.tick() => {}
            Some(()) = refresh_rx.recv() => {
                tracing::debug!("Running manual refresh");
                ticker.reset();
            }
        }

        if events.send(PollEvent::Started).await.is_err() {
            break;
        }

        let outcome = tokio::select! {
            biased;
            _ = shutdown_rx.changed() => break,
            outcome = poll_with_retry(source.as_ref(), &settings) => outcome,
        };

        if events.send(outcome).await.is_err() {
            break;
        }

        // Satisfied by the poll that just finished
        while refresh_rx.try_recv().is_ok() {}
    }
}

/// Fetch once, retrying up to `settings.max_attempts` calls in total.
pub async fn poll_with_retry<S: ReadingSource>(source: &S, settings: &PollSettings) -> PollEvent {
    let max_attempts = settings.max_attempts.max(1);
    let mut attempts = 0;

    loop {
        attempts += 1;
        match source.fetch_readings().await {
            Ok(readings) => {
                tracing::debug!(count = readings.len(), attempts, "Readings poll completed");
                return PollEvent::Succeeded { readings, attempts };
            }
            Err(e) if attempts < max_attempts => {
                tracing::warn!(
                    error = %e,
                    attempt = attempts,
                    max_attempts,
                    delay_ms = settings.retry_delay.as_millis() as u64,
                    "Readings poll failed, retrying"
                );
                tokio::time::sleep(settings.retry_delay).await;
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    max_attempts,
                    "Readings poll failed after max retries"
                );
                return PollEvent::Failed {
                    error: e.to_string(),
                    attempts,
                };
            }
        }
    }
}
