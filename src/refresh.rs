//! Periodic refresh timer for the list view.
//!
//! The timer runs as its own task and reports ticks over a channel. It is
//! owned by the session that started it: [`RefreshTask::stop`] ends it
//! gracefully and dropping the handle aborts it, so a closed view never
//! receives another tick.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior};

/// One firing of the timer, numbered from 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick(pub u64);

#[derive(Debug)]
enum RefreshMessage {
    /// Fire immediately and restart the period
    TickNow,
    Shutdown,
}

pub struct RefreshTask {
    control: mpsc::Sender<RefreshMessage>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshTask {
    const CHANNEL_CAPACITY: usize = 8;

    /// Start ticking every `period`; the first tick comes one period from now
    pub fn spawn(period: Duration) -> (Self, mpsc::Receiver<Tick>) {
        let (control, control_rx) = mpsc::channel(Self::CHANNEL_CAPACITY);
        let (tick_tx, tick_rx) = mpsc::channel(Self::CHANNEL_CAPACITY);

        let handle = tokio::spawn(run(period, control_rx, tick_tx));
        let task = Self {
            control,
            handle: Some(handle),
        };
        (task, tick_rx)
    }

    pub async fn tick_now(&self) {
        if let Err(e) = self.control.send(RefreshMessage::TickNow).await {
            tracing::debug!(error = %e, "Refresh task already stopped");
        }
    }

    /// Stop the timer and wait for the task to exit
    pub async fn stop(mut self) {
        if self.control.send(RefreshMessage::Shutdown).await.is_err() {
            tracing::debug!("Refresh task already stopped");
        }
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            tracing::warn!(error = %e, "Refresh task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn run(period: Duration, mut control: mpsc::Receiver<RefreshMessage>, ticks: mpsc::Sender<Tick>) {
    let period = period.max(Duration::from_millis(1));
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut count = 0u64;

    tracing::debug!(period_ms = period.as_millis() as u64, "Refresh timer started");

    loop {
        tokio::select! {
            msg = control.recv() => {
                match msg {
                    Some(RefreshMessage::TickNow) => {
                        interval.reset();
                    }
                    Some(RefreshMessage::Shutdown) | None => break,
                }
            }
            _ = interval.tick() => {}
        }

        count += 1;
        // A full channel means the view is still busy with the last tick
        match ticks.try_send(Tick(count)) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::debug!(tick = count, "Skipping refresh tick, view is behind");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => break,
        }
    }

    tracing::debug!(ticks = count, "Refresh timer stopped");
}
