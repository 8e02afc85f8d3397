// # Detection Schedules
//
// A schedule decides *when* the driver runs the next detection. Both
// schedules start with an immediate detection.
//
// - `PollingSchedule`: fixed-rate timer, no jitter, no backoff
// - `EventDrivenSchedule`: waits for explicit triggers (navigator-online toggles)
//
// Triggers are also honoured by the polling schedule, so toggling the
// override re-detects immediately under either strategy.

use crate::config::StrategyConfig;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};

/// When to run the next detection
#[async_trait]
pub trait Schedule: Send {
    /// Wait until the next detection is due
    ///
    /// # Returns
    ///
    /// - `true`: Run a detection now
    /// - `false`: The schedule has ended
    async fn next_due(&mut self) -> bool;

    /// Strategy name used in logs
    fn name(&self) -> &'static str;
}

/// Fixed-interval schedule
pub struct PollingSchedule {
    interval: Interval,
    triggers: mpsc::UnboundedReceiver<()>,
}

impl PollingSchedule {
    /// Must be called within a Tokio runtime.
    pub fn new(period: Duration, triggers: mpsc::UnboundedReceiver<()>) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval, triggers }
    }
}

#[async_trait]
impl Schedule for PollingSchedule {
    async fn next_due(&mut self) -> bool {
        // First tick of a tokio interval completes immediately
        tokio::select! {
            _ = self.interval.tick() => true,
            Some(()) = self.triggers.recv() => true,
        }
    }

    fn name(&self) -> &'static str {
        "polling"
    }
}

/// Trigger-driven schedule
pub struct EventDrivenSchedule {
    started: bool,
    triggers: mpsc::UnboundedReceiver<()>,
}

impl EventDrivenSchedule {
    pub fn new(triggers: mpsc::UnboundedReceiver<()>) -> Self {
        Self {
            started: false,
            triggers,
        }
    }
}

#[async_trait]
impl Schedule for EventDrivenSchedule {
    async fn next_due(&mut self) -> bool {
        if !self.started {
            self.started = true;
            return true;
        }

        self.triggers.recv().await.is_some()
    }

    fn name(&self) -> &'static str {
        "event_driven"
    }
}

/// Build the schedule selected by configuration
///
/// Must be called within a Tokio runtime.
pub fn from_config(
    strategy: &StrategyConfig,
    triggers: mpsc::UnboundedReceiver<()>,
) -> Box<dyn Schedule> {
    match strategy {
        StrategyConfig::Polling { interval_ms } => Box::new(PollingSchedule::new(
            Duration::from_millis(*interval_ms),
            triggers,
        )),
        StrategyConfig::EventDriven => Box::new(EventDrivenSchedule::new(triggers)),
    }
}
