//! A single server's logical clock and accumulated wait statistics.

use std::fmt::{self, Display};

use tracing::trace;

use crate::{report::format_seconds, Request};

/// Lifecycle of a server during a replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No request has been processed yet.
    Idle,
    /// At least one request has been processed.
    Active,
    /// The server's partition has been fully replayed. Final.
    Drained,
}

/// Server state captured at creation and after every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// The server's logical clock.
    pub clock: u128,
    /// Sum of waits so far.
    pub total_wait: u128,
    /// Requests processed so far.
    pub completed: u64,
    /// Where the server is in its lifecycle.
    pub phase: Phase,
}

/// One simulated first-come-first-served server.
///
/// Requests must be fed in non-decreasing arrival order. The clock never moves backwards and
/// waits are clamped at zero.
///
/// Timestamps and durations are `u64`. The clock and the wait total are `u128`, which holds any
/// value reachable from an in-memory ledger, so processing never overflows.
#[derive(Debug, Clone)]
pub struct ServerTimeline {
    clock: u128,
    total_wait: u128,
    completed: u64,
    trace: Option<Vec<Snapshot>>,
}

impl ServerTimeline {
    /// An idle server with its clock at zero.
    pub fn new() -> Self {
        Self {
            clock: 0,
            total_wait: 0,
            completed: 0,
            trace: None,
        }
    }

    /// A server which records a [Snapshot] of its initial state, then one after every mutation.
    pub fn with_trace() -> Self {
        let mut timeline = Self {
            trace: Some(Vec::new()),
            ..Self::new()
        };
        timeline.record();
        timeline
    }

    /// The time at which the server next becomes free.
    pub fn clock(&self) -> u128 {
        self.clock
    }

    /// Sum of every processed request's wait.
    pub fn total_wait(&self) -> u128 {
        self.total_wait
    }

    /// Number of requests processed.
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// [Phase::Idle] until the first request is processed, then [Phase::Active].
    pub fn phase(&self) -> Phase {
        if self.completed == 0 {
            Phase::Idle
        } else {
            Phase::Active
        }
    }

    /// Move an idle clock forward to `timestamp`. Does nothing if the clock is already there.
    pub fn advance_to(&mut self, timestamp: u64) {
        let timestamp = u128::from(timestamp);
        if self.clock < timestamp {
            self.clock = timestamp;
            self.record();
        }
    }

    /// Serve `request`, returning how long it waited.
    pub fn process(&mut self, request: &Request) -> u128 {
        let arrival = u128::from(request.arrival());
        let wait = self.clock.saturating_sub(arrival);

        self.total_wait += wait;
        self.clock = self.clock.max(arrival) + u128::from(request.service());
        self.completed += 1;

        trace!(
            arrival = request.arrival(),
            label = request.label(),
            wait,
            clock = self.clock,
            "Processed request"
        );
        self.record();

        wait
    }

    /// Mean wait over processed requests, or zero when nothing was processed.
    pub fn average_wait(&self) -> f64 {
        average(self.total_wait, self.completed)
    }

    /// Snapshots recorded so far. Empty unless created with [ServerTimeline::with_trace].
    pub fn trace(&self) -> &[Snapshot] {
        self.trace.as_deref().unwrap_or_default()
    }

    /// Finish the replay.
    pub fn drain(mut self) -> ServerStats {
        let phase = Phase::Drained;
        if let Some(trace) = self.trace.as_mut() {
            trace.push(Snapshot {
                clock: self.clock,
                total_wait: self.total_wait,
                completed: self.completed,
                phase,
            });
        }

        ServerStats {
            clock: self.clock,
            total_wait: self.total_wait,
            completed: self.completed,
            trace: self.trace.unwrap_or_default(),
        }
    }

    fn record(&mut self) {
        let snapshot = Snapshot {
            clock: self.clock,
            total_wait: self.total_wait,
            completed: self.completed,
            phase: self.phase(),
        };

        if let Some(trace) = self.trace.as_mut() {
            trace.push(snapshot);
        }
    }
}

impl Default for ServerTimeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Final values read from a drained server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerStats {
    clock: u128,
    total_wait: u128,
    completed: u64,
    trace: Vec<Snapshot>,
}

impl ServerStats {
    /// Always [Phase::Drained].
    pub fn phase(&self) -> Phase {
        Phase::Drained
    }

    /// The time the server finished its last request.
    pub fn clock(&self) -> u128 {
        self.clock
    }

    /// Sum of every processed request's wait.
    pub fn total_wait(&self) -> u128 {
        self.total_wait
    }

    /// Number of requests processed.
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Mean wait over processed requests, or zero for a server that received nothing.
    pub fn average_wait(&self) -> f64 {
        average(self.total_wait, self.completed)
    }

    /// Every recorded snapshot, ending with the [Phase::Drained] one. Empty if tracing was off.
    pub fn trace(&self) -> &[Snapshot] {
        &self.trace
    }
}

impl Display for ServerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "completed={} total_wait={} average_wait={}",
            self.completed,
            self.total_wait,
            format_seconds(self.average_wait())
        )
    }
}

fn average(total_wait: u128, completed: u64) -> f64 {
    if completed == 0 {
        0.0
    } else {
        total_wait as f64 / completed as f64
    }
}
