//! Results of a simulation run.

use std::fmt::{self, Display};

use crate::{config::Mode, timeline::ServerStats};

/// Per-server results plus the aggregate average wait.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    mode: Mode,
    servers: Vec<ServerStats>,
    average_wait: f64,
}

impl SimulationReport {
    /// Aggregate drained servers.
    ///
    /// The average is the arithmetic mean of each server's own average wait, so a lightly loaded
    /// server counts as much as a heavily loaded one. See [SimulationReport::global_mean_wait] for
    /// the per-request mean.
    pub fn new(mode: Mode, servers: Vec<ServerStats>) -> Self {
        let average_wait = if servers.is_empty() {
            0.0
        } else {
            servers.iter().map(ServerStats::average_wait).sum::<f64>() / servers.len() as f64
        };

        Self {
            mode,
            servers,
            average_wait,
        }
    }

    /// How requests were distributed.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Stats for each server, indexed by server number.
    pub fn servers(&self) -> &[ServerStats] {
        &self.servers
    }

    /// The reported average wait: mean of per-server averages.
    pub fn average_wait(&self) -> f64 {
        self.average_wait
    }

    /// Total wait across every request divided by the number of requests. Zero when empty.
    ///
    /// Diagnostic only. Differs from [SimulationReport::average_wait] when servers complete
    /// different numbers of requests.
    pub fn global_mean_wait(&self) -> f64 {
        let completed = self.total_completed();
        if completed == 0 {
            return 0.0;
        }

        let total_wait: u128 = self.servers.iter().map(ServerStats::total_wait).sum();
        total_wait as f64 / completed as f64
    }

    /// Requests processed across all servers.
    pub fn total_completed(&self) -> u64 {
        self.servers.iter().map(ServerStats::completed).sum()
    }

    /// The one-line result, e.g. `Average Wait Time with 2 Servers: 1.5 seconds`.
    pub fn summary_line(&self) -> String {
        format!(
            "Average Wait Time with {}: {} seconds",
            self.mode,
            format_seconds(self.average_wait)
        )
    }
}

/// Render a float the way the result line has always shown it: shortest round-trip digits, a
/// `.0` on whole numbers, and exponents signed with at least two digits (`1e+16`, `1.5e-05`).
pub(crate) fn format_seconds(value: f64) -> String {
    let shortest = format!("{value:?}");
    let Some((mantissa, exponent)) = shortest.split_once('e') else {
        return shortest;
    };

    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}

/// Per-server breakdown, one line per server.
impl Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, server) in self.servers.iter().enumerate() {
            writeln!(f, "server {idx}: {server}")?;
        }
        Ok(())
    }
}
