//! One-second countdown driving the resend window.
//!
//! The timer is a spawned task that pushes a unit message every period. The
//! owner pulls ticks with [`CountdownTimer::tick`]; dropping the timer aborts
//! the task, so no tick can outlive the flow that started it.

use std::time::Duration;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tracing::trace;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct CountdownTimer {
    ticks: mpsc::Receiver<()>,
    task: JoinHandle<()>,
}

impl CountdownTimer {
    /// Starts ticking one `period` from now. Must be called within a tokio runtime.
    #[must_use]
    pub fn start(period: Duration) -> Self {
        let (tx, ticks) = mpsc::channel(64);
        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(()).await.is_err() {
                    break;
                }
                trace!("countdown tick");
            }
        });
        Self { ticks, task }
    }

    /// Waits for the next tick; `None` once the timer has been stopped.
    pub async fn tick(&mut self) -> Option<()> {
        self.ticks.recv().await
    }

    pub fn stop(&mut self) {
        self.task.abort();
        self.ticks.close();
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
