//! Single-task event loop around [`Dashboard`].
//!
//! Poll results and view commands funnel into one task, which is the only
//! owner of the dashboard state. Snapshots are published through a `watch`
//! channel so readers always see a complete, consistent view.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::config::PollSettings;
use crate::dashboard::controller::{Dashboard, DashboardEvent, Snapshot};
use crate::error::{AppError, AppResult};
use crate::source::ReadingSource;
use crate::sync::scheduler::{self, PollEvent};
use crate::telemetry::geometry::PointerEvent;

const COMMAND_BUFFER: usize = 64;
const POLL_EVENT_BUFFER: usize = 8;

/// User actions emitted by the view layer.
#[derive(Debug, Clone)]
pub enum Command {
    /// Debounced; only the last selection inside the window is applied.
    SelectDate(NaiveDate),
    ClearFilter,
    ToggleShowAll,
    PointClick(PointerEvent),
    DismissTooltip,
    Refresh,
}

/// Cloneable access for request handlers.
#[derive(Clone)]
pub struct DashboardHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Arc<Snapshot>>,
}

impl DashboardHandle {
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshots.borrow().clone()
    }

    /// Resolves with the next published snapshot.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ServiceUnavailable` if the dashboard has shut down.
    pub async fn changed(&mut self) -> AppResult<Arc<Snapshot>> {
        self.snapshots
            .changed()
            .await
            .map_err(|_| AppError::ServiceUnavailable("Dashboard stopped".to_string()))?;
        Ok(self.snapshots.borrow_and_update().clone())
    }

    /// # Errors
    ///
    /// Returns `AppError::ServiceUnavailable` if the dashboard has shut down.
    pub async fn send(&self, command: Command) -> AppResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| AppError::ServiceUnavailable("Dashboard stopped".to_string()))
    }
}

/// Owner of the background task; [`DashboardTask::shutdown`] tears it down.
pub struct DashboardTask {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl DashboardTask {
    /// Stop the poller and the event loop. No snapshot is published after
    /// this returns.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Dashboard task failed");
        }
        tracing::info!("Dashboard stopped");
    }
}

/// Start polling `source` and serving `dashboard` state.
pub fn spawn<S: ReadingSource>(
    dashboard: Dashboard,
    source: Arc<S>,
    poll: PollSettings,
    date_debounce: Duration,
) -> (DashboardHandle, DashboardTask) {
    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (snapshot_tx, snapshot_rx) = watch::channel(dashboard.snapshot());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (poll_tx, poll_rx) = mpsc::channel(POLL_EVENT_BUFFER);

    let poller = scheduler::start(source, poll, poll_tx);

    let task = tokio::spawn(run(
        dashboard,
        poller,
        poll_rx,
        command_rx,
        snapshot_tx,
        shutdown_rx,
        date_debounce,
    ));

    (
        DashboardHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
        },
        DashboardTask { shutdown_tx, task },
    )
}

async fn run(
    mut dashboard: Dashboard,
    poller: scheduler::PollHandle,
    mut poll_rx: mpsc::Receiver<PollEvent>,
    mut command_rx: mpsc::Receiver<Command>,
    snapshot_tx: watch::Sender<Arc<Snapshot>>,
    mut shutdown_rx: watch::Receiver<bool>,
    date_debounce: Duration,
) {
    let mut pending_date: Option<(NaiveDate, Instant)> = None;

    loop {
        let deadline = pending_date.map_or_else(Instant::now, |(_, at)| at);

        let event = tokio::select! {
            biased;
            _ = shutdown_rx.changed() => break,
            () = sleep_until(deadline), if pending_date.is_some() => {
                let Some((date, _)) = pending_date.take() else { continue };
                DashboardEvent::SelectDate(date)
            }
            Some(event) = poll_rx.recv() => event.into(),
            command = command_rx.recv() => match command {
                Some(Command::SelectDate(date)) => {
                    tracing::debug!(%date, "Date selection pending");
                    pending_date = Some((date, Instant::now() + date_debounce));
                    continue;
                }
                Some(Command::Refresh) => {
                    poller.refresh();
                    continue;
                }
                Some(Command::ClearFilter) => {
                    pending_date = None;
                    DashboardEvent::ClearFilter
                }
                Some(Command::ToggleShowAll) => DashboardEvent::ToggleShowAll,
                Some(Command::PointClick(pointer)) => DashboardEvent::PointClick(pointer),
                Some(Command::DismissTooltip) => DashboardEvent::DismissTooltip,
                // Every handle dropped
                None => break,
            },
        };

        let snapshot = dashboard.apply(event);
        snapshot_tx.send_replace(snapshot);
    }

    // Close first so a poller parked on a full channel fails its send and
    // exits; anything it already queued is discarded unapplied.
    poll_rx.close();
    poller.stop().await;
    tracing::debug!(
        filter = ?dashboard.filter(),
        "Dashboard event loop exited"
    );
}
