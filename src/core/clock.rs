//! Clock Sources
//!
//! The engine never reads wall-clock time. State moves forward only when a
//! clock source yields a tick; the async driver pulls ticks from one of the
//! sources below and feeds them to a session or arena.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Discrete engine time.
pub type Tick = u64;

/// A source of discrete ticks.
///
/// `next_tick` resolves with the running tick count, or `None` once the
/// source is exhausted (which stops the driver).
pub trait ClockSource: Send {
    /// Wait for the next tick.
    fn next_tick(&mut self) -> impl Future<Output = Option<Tick>> + Send;
}

/// Real-time clock backed by a tokio interval.
pub struct IntervalClock {
    interval: Interval,
    ticks: Tick,
}

impl IntervalClock {
    /// Create a clock that ticks `ticks_per_second` times per second.
    ///
    /// The first tick fires one period after creation.
    pub fn new(ticks_per_second: u32) -> Self {
        let period = Duration::from_secs(1) / ticks_per_second.max(1);
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval, ticks: 0 }
    }

    /// Duration of one tick.
    pub fn period(&self) -> Duration {
        self.interval.period()
    }
}

impl ClockSource for IntervalClock {
    async fn next_tick(&mut self) -> Option<Tick> {
        self.interval.tick().await;
        self.ticks += 1;
        Some(self.ticks)
    }
}

/// Clock advanced by hand, for tests and scripted demos.
pub struct ManualClock {
    pulses: mpsc::UnboundedReceiver<()>,
    ticks: Tick,
}

/// Handle that advances a [`ManualClock`].
#[derive(Clone)]
pub struct ManualTicker {
    pulses: mpsc::UnboundedSender<()>,
}

impl ManualClock {
    /// Create a clock and the ticker that drives it.
    pub fn new() -> (Self, ManualTicker) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self { pulses: rx, ticks: 0 },
            ManualTicker { pulses: tx },
        )
    }
}

impl ManualTicker {
    /// Queue one tick. Returns false if the clock has been dropped.
    pub fn tick(&self) -> bool {
        self.pulses.send(()).is_ok()
    }

    /// Queue `n` ticks.
    pub fn advance(&self, n: u32) -> bool {
        (0..n).all(|_| self.tick())
    }
}

impl ClockSource for ManualClock {
    async fn next_tick(&mut self) -> Option<Tick> {
        self.pulses.recv().await?;
        self.ticks += 1;
        Some(self.ticks)
    }
}
