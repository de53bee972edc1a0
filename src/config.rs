//! Server count validation and run settings.

use std::{
    fmt::{self, Display},
    num::NonZeroUsize,
};

use bon::bon;

use crate::error::{SimError, SimResult};

/// A validated, positive number of servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerCount(NonZeroUsize);

impl ServerCount {
    /// A single server.
    pub const ONE: Self = Self(NonZeroUsize::MIN);

    /// Fails with [SimError::Configuration] for zero.
    pub fn new(servers: usize) -> SimResult<Self> {
        NonZeroUsize::new(servers)
            .map(Self)
            .ok_or_else(|| SimError::Configuration("server count must be at least 1".to_string()))
    }

    /// The count as a plain integer.
    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl TryFrom<i64> for ServerCount {
    type Error = SimError;

    fn try_from(servers: i64) -> SimResult<Self> {
        if servers <= 0 {
            return Err(SimError::Configuration(format!(
                "server count must be a positive integer, got {servers}"
            )));
        }

        let servers = usize::try_from(servers).map_err(|_| {
            SimError::Configuration(format!("server count {servers} is too large"))
        })?;
        Self::new(servers)
    }
}

impl Display for ServerCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// How requests are distributed to servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// One server replays the whole ledger.
    #[default]
    Single,
    /// Requests are dealt round-robin across this many servers.
    Multi(ServerCount),
}

impl Mode {
    /// Pick a mode from an optionally requested server count.
    ///
    /// Nothing requested, or exactly one server, means single-server mode. Zero or negative
    /// counts are rejected.
    pub fn from_requested(servers: Option<i64>) -> SimResult<Self> {
        let Some(servers) = servers else {
            return Ok(Mode::Single);
        };

        ServerCount::try_from(servers).map(Mode::from)
    }

    /// How many servers take part in the run.
    pub fn servers(&self) -> ServerCount {
        match self {
            Mode::Single => ServerCount::ONE,
            Mode::Multi(servers) => *servers,
        }
    }
}

/// One server is always single-server mode.
impl From<ServerCount> for Mode {
    fn from(servers: ServerCount) -> Self {
        if servers == ServerCount::ONE {
            Mode::Single
        } else {
            Mode::Multi(servers)
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Single => f.write_str("One Server"),
            Mode::Multi(servers) => write!(f, "{servers} Servers"),
        }
    }
}

/// Settings for one simulation run.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct SimulationConfig {
    pub(crate) mode: Mode,
    pub(crate) record_trace: bool,
}

#[bon]
impl SimulationConfig {
    #[allow(missing_docs)]
    #[builder]
    pub fn new(
        /// Single or multi-server replay.
        #[builder(default)]
        mode: Mode,
        /// Record a state snapshot after every clock advance and every processed request.
        #[builder(default)]
        record_trace: bool,
    ) -> Self {
        Self { mode, record_trace }
    }

    /// Single or multi-server replay.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether servers record a [crate::Snapshot] trace.
    pub fn record_trace(&self) -> bool {
        self.record_trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_server_count_is_single_mode() {
        assert_eq!(Mode::from_requested(None).unwrap(), Mode::Single);
    }

    #[test]
    fn one_server_is_single_mode() {
        assert_eq!(Mode::from_requested(Some(1)).unwrap(), Mode::Single);
    }

    #[test]
    fn several_servers_is_multi_mode() {
        let mode = Mode::from_requested(Some(3)).unwrap();

        assert_eq!(mode, Mode::Multi(ServerCount::new(3).unwrap()));
        assert_eq!(mode.servers().get(), 3);
    }

    #[test]
    fn non_positive_server_counts_are_rejected() {
        for requested in [0, -1, i64::MIN] {
            let err = Mode::from_requested(Some(requested)).unwrap_err();
            assert!(
                matches!(err, SimError::Configuration(_)),
                "{requested} should be rejected"
            );
        }
    }

    #[test]
    fn server_count_converts_to_mode() {
        assert_eq!(Mode::from(ServerCount::ONE), Mode::Single);

        let two = ServerCount::new(2).unwrap();
        assert_eq!(Mode::from(two), Mode::Multi(two));
    }

    #[test]
    fn zero_server_count_is_rejected() {
        assert!(ServerCount::new(0).is_err());
    }

    #[test]
    fn mode_display_matches_report_wording() {
        assert_eq!(Mode::Single.to_string(), "One Server");
        assert_eq!(
            Mode::Multi(ServerCount::new(4).unwrap()).to_string(),
            "4 Servers"
        );
    }

    #[test]
    fn builder_defaults() {
        let config = SimulationConfig::builder().build();

        assert_eq!(config.mode(), Mode::Single);
        assert!(!config.record_trace());
    }
}
