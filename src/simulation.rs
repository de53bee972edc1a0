//! Drivers which replay a ledger through one or more server timelines.

use tracing::{debug, debug_span, Instrument};

use crate::{
    config::{ServerCount, SimulationConfig},
    error::SimResult,
    report::SimulationReport,
    timeline::{ServerStats, ServerTimeline},
    Ledger, Request,
};

/// Run a simulation according to `config`.
pub fn simulate(ledger: Ledger, config: &SimulationConfig) -> SimulationReport {
    let servers = ledger
        .into_partitions(config.mode.servers())
        .into_iter()
        .enumerate()
        .map(|(server, partition)| replay(server, partition, config.record_trace))
        .collect();

    SimulationReport::new(config.mode, servers)
}

/// Replay every request through a single server.
pub fn simulate_one_server(ledger: Ledger) -> SimulationReport {
    simulate(ledger, &SimulationConfig::builder().build())
}

/// Deal requests round-robin across `servers` and replay each server independently.
///
/// The reported average is the mean of each server's own average wait.
pub fn simulate_many_servers(ledger: Ledger, servers: ServerCount) -> SimulationReport {
    let config = SimulationConfig::builder().mode(servers.into()).build();
    simulate(ledger, &config)
}

/// Like [simulate], but each server partition is replayed on its own task.
///
/// Waits for every server to drain before aggregating, so the result is identical to [simulate].
pub async fn simulate_parallel(
    ledger: Ledger,
    config: &SimulationConfig,
) -> SimResult<SimulationReport> {
    let record_trace = config.record_trace;

    let handles: Vec<_> = ledger
        .into_partitions(config.mode.servers())
        .into_iter()
        .enumerate()
        .map(|(server, partition)| {
            tokio::spawn(
                async move { replay(server, partition, record_trace) }
                    .instrument(debug_span!("parallel replay", server)),
            )
        })
        .collect();

    let mut servers = Vec::with_capacity(handles.len());
    for handle in handles {
        servers.push(handle.await?);
    }

    Ok(SimulationReport::new(config.mode, servers))
}

/// Replay one server's partition, which must already be in arrival order.
fn replay(server: usize, partition: Vec<Request>, record_trace: bool) -> ServerStats {
    let _span = debug_span!("replay", server).entered();

    let mut timeline = if record_trace {
        ServerTimeline::with_trace()
    } else {
        ServerTimeline::new()
    };

    for request in &partition {
        timeline.advance_to(request.arrival());
        timeline.process(request);
    }

    let stats = timeline.drain();
    debug!(
        completed = stats.completed(),
        total_wait = stats.total_wait(),
        "Server drained"
    );

    stats
}

#[cfg(test)]
mod tests {
    use crate::{config::Mode, timeline::Phase};

    use super::*;

    fn ledger(requests: &[(u64, u64)]) -> Ledger {
        requests
            .iter()
            .enumerate()
            .map(|(i, &(arrival, service))| Request::new(arrival, format!("r{i}"), service))
            .collect()
    }

    fn servers(n: usize) -> ServerCount {
        ServerCount::new(n).unwrap()
    }

    #[test]
    fn single_request_never_waits() {
        let report = simulate_one_server(ledger(&[(5, 3)]));

        assert_eq!(report.average_wait(), 0.0);
    }

    #[test]
    fn back_to_back_saturation() {
        let report = simulate_one_server(ledger(&[(0, 5), (1, 5), (2, 5)]));

        assert_eq!(report.average_wait(), 4.0);
        assert_eq!(report.servers()[0].clock(), 15);
    }

    #[test]
    fn single_server_trace_shows_clock_progression() {
        let config = SimulationConfig::builder().record_trace(true).build();

        let report = simulate(ledger(&[(0, 5), (1, 5), (2, 5)]), &config);

        let clocks: Vec<u128> = report.servers()[0]
            .trace()
            .iter()
            .map(|s| s.clock)
            .collect();
        assert_eq!(clocks, vec![0, 5, 10, 15, 15]);
    }

    #[test]
    fn idle_advance_appears_in_trace() {
        let config = SimulationConfig::builder().record_trace(true).build();

        let report = simulate(ledger(&[(5, 3)]), &config);

        let trace = report.servers()[0].trace();
        let clocks: Vec<u128> = trace.iter().map(|s| s.clock).collect();
        assert_eq!(clocks, vec![0, 5, 8, 8]);
        assert_eq!(trace[0].phase, Phase::Idle);
        assert_eq!(trace[1].phase, Phase::Idle);
        assert_eq!(trace[2].phase, Phase::Active);
        assert_eq!(trace[3].phase, Phase::Drained);
    }

    #[test]
    fn empty_ledger_averages_zero() {
        let report = simulate_one_server(Ledger::default());

        assert_eq!(report.average_wait(), 0.0);
        assert_eq!(report.servers().len(), 1);
    }

    #[test]
    fn round_robin_without_contention() {
        let report = simulate_many_servers(
            ledger(&[(0, 2), (10, 2), (20, 2), (30, 2)]),
            servers(2),
        );

        assert_eq!(report.average_wait(), 0.0);
        for server in report.servers() {
            assert_eq!(server.completed(), 2);
            assert_eq!(server.average_wait(), 0.0);
        }
    }

    #[test]
    fn uneven_split_is_mean_of_means() {
        // Server 0 gets arrivals 0 and 2 (waits 0 and 8), server 1 gets arrival 1 (wait 0).
        let report = simulate_many_servers(ledger(&[(0, 10), (1, 1), (2, 1)]), servers(2));

        let [s0, s1] = report.servers() else {
            panic!("expected two servers");
        };
        assert_eq!(s0.average_wait(), 4.0);
        assert_eq!(s1.average_wait(), 0.0);
        assert_eq!(report.average_wait(), 2.0);
        assert_ne!(report.average_wait(), report.global_mean_wait());
    }

    #[test]
    fn idle_servers_contribute_zero() {
        let report = simulate_many_servers(ledger(&[(0, 5), (0, 5)]), servers(5));

        assert_eq!(report.servers().len(), 5);
        assert_eq!(report.average_wait(), 0.0);
        assert!(report.servers().iter().all(|s| !s.average_wait().is_nan()));
    }

    #[test]
    fn one_server_through_multi_driver_is_single_mode() {
        let report = simulate_many_servers(ledger(&[(0, 5), (1, 5)]), ServerCount::ONE);

        assert_eq!(report.mode(), Mode::Single);
        assert_eq!(report.average_wait(), 2.0);
    }

    #[test]
    fn maximum_values_are_simulated_without_overflow() {
        let max = u128::from(u64::MAX);
        let config = SimulationConfig::builder().record_trace(true).build();

        let report = simulate(ledger(&[(0, u64::MAX), (1, 5), (u64::MAX, 1)]), &config);

        let server = &report.servers()[0];
        assert_eq!(server.total_wait(), (max - 1) + 5);
        assert_eq!(server.clock(), max + 6);
        assert!(server.trace().windows(2).all(|w| w[0].clock <= w[1].clock));
    }

    #[tokio::test]
    async fn parallel_matches_sequential() {
        let requests = [(0, 7), (1, 3), (1, 9), (4, 2), (6, 6), (7, 1), (12, 4)];
        let config = SimulationConfig::builder()
            .mode(Mode::Multi(servers(3)))
            .record_trace(true)
            .build();

        let sequential = simulate(ledger(&requests), &config);
        let parallel = simulate_parallel(ledger(&requests), &config).await.unwrap();

        assert_eq!(sequential, parallel);
    }
}
