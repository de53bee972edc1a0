//! Simulate first-come-first-served request handling and measure how long requests wait.
//!
//! A [Ledger] of timestamped requests is sorted into arrival order, then replayed through one
//! server, or dealt round-robin across several servers which each replay their share
//! independently. Each server keeps its own logical clock. A request waits for as long as its
//! server's clock is ahead of its arrival.
//!
//! ```
//! use waitline::{simulate_one_server, Ledger};
//!
//! let ledger = Ledger::from_rows([["0", "a", "5"], ["2", "c", "5"], ["1", "b", "5"]]).unwrap();
//! let report = simulate_one_server(ledger);
//!
//! assert_eq!(report.average_wait(), 4.0);
//! ```

#![deny(missing_docs)]

pub mod config;
pub mod error;
mod ledger;
mod report;
mod request;
mod simulation;
pub mod timeline;

pub use config::{Mode, ServerCount, SimulationConfig};
pub use error::{SimError, SimResult};
pub use ledger::Ledger;
pub use report::SimulationReport;
pub use request::Request;
pub use simulation::{simulate, simulate_many_servers, simulate_one_server, simulate_parallel};
pub use timeline::{Phase, ServerStats, ServerTimeline, Snapshot};
