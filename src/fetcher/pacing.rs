//! Per-unit pacing and throttle hard-stop control.
//!
//! The controller sleeps a short delay after every fetched post and an
//! additional long delay every `long_break_every` posts (additive: the
//! boundary post gets both pauses). A recognized throttle failure flips the
//! controller into a one-way `Stopped` state that ends the run.

use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::{DEFAULT_LONG_BREAK_EVERY, DEFAULT_LONG_DELAY, DEFAULT_SHORT_DELAY};
use crate::fetcher::FetchError;

/// Textual failure pattern the platform emits when rate limiting.
/// Matched case-insensitively as a substring.
pub const THROTTLE_SIGNAL: &str = "please wait a few minutes";

/// Case-insensitive substring predicate over platform failure text.
#[derive(Debug, Clone)]
pub struct ThrottleMatcher {
    needles: Vec<String>,
}

impl Default for ThrottleMatcher {
    fn default() -> Self {
        Self {
            needles: vec![THROTTLE_SIGNAL.to_string()],
        }
    }
}

impl ThrottleMatcher {
    /// Build a matcher over custom phrases (lowercased internally).
    pub fn new<I, S>(needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            needles: needles.into_iter().map(|s| s.into().to_lowercase()).collect(),
        }
    }

    /// Whether `text` contains any recognized throttle phrase.
    pub fn matches(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.needles.iter().any(|n| lower.contains(n))
    }
}

/// Delays applied between fetch units.
#[derive(Debug, Clone, Copy)]
pub struct PacingConfig {
    /// Sleep after every unit
    pub short_delay: Duration,
    /// Additional sleep every `long_break_every` units
    pub long_delay: Duration,
    /// Units between long breaks
    pub long_break_every: u32,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            short_delay: DEFAULT_SHORT_DELAY,
            long_delay: DEFAULT_LONG_DELAY,
            long_break_every: DEFAULT_LONG_BREAK_EVERY,
        }
    }
}

/// Pauses owed after completing one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitPauses {
    /// The short pause, always applied
    pub short: Duration,
    /// The long pause, applied only on break boundaries
    pub long: Option<Duration>,
}

/// Run state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacingState {
    /// Accepting further units
    Running,
    /// Hard stop signalled; no further units this run
    Stopped,
}

/// Inserts delays between successive fetch units and recognizes the
/// platform's throttle signal.
///
/// Owns the units-since-break counter for the duration of one fetch run;
/// nothing else mutates it.
#[derive(Debug)]
pub struct PacingController {
    config: PacingConfig,
    units_since_break: u32,
    state: PacingState,
}

impl PacingController {
    /// Create a controller for one fetch run.
    pub fn new(config: PacingConfig) -> Self {
        Self {
            config,
            units_since_break: 0,
            state: PacingState::Running,
        }
    }

    /// Whether the hard stop has been signalled.
    pub fn is_stopped(&self) -> bool {
        self.state == PacingState::Stopped
    }

    /// Advance the counter for one completed unit and return the pauses owed.
    ///
    /// Pure bookkeeping, no sleeping; [`Self::pace`] applies the result.
    /// The policy is additive: a break-boundary unit owes the short pause
    /// and then the long pause.
    pub fn next_pauses(&mut self) -> UnitPauses {
        self.units_since_break += 1;
        let long = if self.units_since_break >= self.config.long_break_every {
            self.units_since_break = 0;
            Some(self.config.long_delay)
        } else {
            None
        };
        UnitPauses {
            short: self.config.short_delay,
            long,
        }
    }

    /// Sleep the pauses owed after one completed unit.
    pub async fn pace(&mut self) {
        let pauses = self.next_pauses();
        sleep(pauses.short).await;
        if let Some(long) = pauses.long {
            info!(
                every = self.config.long_break_every,
                delay_secs = long.as_secs_f64(),
                "taking a longer break to stay under rate limits"
            );
            sleep(long).await;
        }
    }

    /// Inspect a fetch failure; a throttle signal flips the controller into
    /// the terminal `Stopped` state. Returns true when stopped.
    pub fn observe_failure(&mut self, err: &FetchError) -> bool {
        if err.is_throttle() {
            debug!(error = %err, "throttle signal observed, hard stop");
            self.state = PacingState::Stopped;
        }
        self.is_stopped()
    }
}
