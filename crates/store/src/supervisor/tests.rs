use super::*;
use crate::testing::{SimulatedDialer, SimulatedServer};
use sessionkv_core::Error;
use std::time::Duration;

async fn supervisor(server: &SimulatedServer) -> Arc<ConnectionSupervisor<SimulatedDialer>> {
    ConnectionSupervisor::connect(server.dialer(), SupervisorConfig::default())
        .await
        .unwrap()
}

fn hset(key: &str, field: &str) -> Command {
    Command::HSet {
        key: key.to_string(),
        field: field.to_string(),
        value: b"v".to_vec(),
    }
}

#[tokio::test]
async fn test_connect_fails_when_target_unreachable() {
    let server = SimulatedServer::new();
    server.refuse_next_dials(1);

    let result = ConnectionSupervisor::connect(server.dialer(), SupervisorConfig::default()).await;
    assert!(matches!(result, Err(Error::DialFailed { .. })));
}

#[tokio::test]
async fn test_healthy_probe_does_not_redial() {
    let server = SimulatedServer::new();
    let supervisor = supervisor(&server).await;

    let outcome = supervisor.probe_once().await;

    assert_eq!(outcome, ProbeOutcome::Healthy { failures: 0 });
    assert_eq!(server.dials(), 1);
    assert_eq!(supervisor.reconnects(), 0);
    assert_eq!(supervisor.state(), SupervisorState::Connected);
}

#[tokio::test]
async fn test_failures_below_threshold_stay_connected() {
    let server = SimulatedServer::new();
    let supervisor = supervisor(&server).await;

    server.fail_next_pings(9);
    let outcome = supervisor.probe_once().await;

    assert_eq!(outcome, ProbeOutcome::Healthy { failures: 9 });
    assert_eq!(server.pings(), 10);
    assert_eq!(server.dials(), 1);
    assert_eq!(supervisor.reconnects(), 0);
}

#[tokio::test]
async fn test_threshold_failures_trigger_reconnect() {
    let server = SimulatedServer::new();
    let supervisor = supervisor(&server).await;

    server.fail_next_pings(10);
    let outcome = supervisor.probe_once().await;

    assert_eq!(outcome, ProbeOutcome::Reconnected);
    assert_eq!(server.pings(), 10);
    assert_eq!(server.dials(), 2);
    assert_eq!(supervisor.reconnects(), 1);
    assert_eq!(supervisor.state(), SupervisorState::Connected);

    let stats = supervisor.stats();
    assert_eq!(stats.reconnects, 1);
    assert_eq!(stats.failed_reconnects, 0);
    assert_eq!(stats.probe_cycles, 1);
}

#[tokio::test]
async fn test_custom_threshold() {
    let server = SimulatedServer::new();
    let config = SupervisorConfig::default().with_failure_threshold(3);
    let supervisor = ConnectionSupervisor::connect(server.dialer(), config)
        .await
        .unwrap();

    server.fail_next_pings(3);
    assert_eq!(supervisor.probe_once().await, ProbeOutcome::Reconnected);
    assert_eq!(server.pings(), 3);
}

#[tokio::test]
async fn test_zero_threshold_still_probes_before_redialing() {
    let server = SimulatedServer::new();
    let config = SupervisorConfig {
        failure_threshold: 0,
        ..SupervisorConfig::default()
    };
    let supervisor = ConnectionSupervisor::connect(server.dialer(), config)
        .await
        .unwrap();

    assert_eq!(
        supervisor.probe_once().await,
        ProbeOutcome::Healthy { failures: 0 }
    );
    assert_eq!(server.pings(), 1);
    assert_eq!(server.dials(), 1);

    server.fail_next_pings(1);
    assert_eq!(supervisor.probe_once().await, ProbeOutcome::Reconnected);
    assert_eq!(server.dials(), 2);
}

#[tokio::test]
async fn test_failed_dial_keeps_current_connection() {
    let server = SimulatedServer::new();
    let supervisor = supervisor(&server).await;

    server.fail_next_pings(10);
    server.refuse_next_dials(1);
    let outcome = supervisor.probe_once().await;

    assert_eq!(outcome, ProbeOutcome::ReconnectFailed);
    assert_eq!(supervisor.reconnects(), 0);
    assert_eq!(supervisor.stats().failed_reconnects, 1);
    assert_eq!(server.dials(), 1);

    // the original connection still serves commands
    supervisor.execute(hset("s", "a")).await.unwrap();

    // the next cycle is healthy again
    assert_eq!(
        supervisor.probe_once().await,
        ProbeOutcome::Healthy { failures: 0 }
    );
}

#[tokio::test]
async fn test_failed_dial_is_retried_next_cycle() {
    let server = SimulatedServer::new();
    let supervisor = supervisor(&server).await;

    server.sever_connections();
    server.refuse_next_dials(1);
    assert_eq!(supervisor.probe_once().await, ProbeOutcome::ReconnectFailed);
    assert!(supervisor.execute(hset("s", "a")).await.is_err());

    assert_eq!(supervisor.probe_once().await, ProbeOutcome::Reconnected);
    assert_eq!(supervisor.reconnects(), 1);
    supervisor.execute(hset("s", "a")).await.unwrap();
}

#[tokio::test]
async fn test_broken_connection_fails_commands_until_swap() {
    let server = SimulatedServer::new();
    let supervisor = supervisor(&server).await;

    server.sever_connections();
    let err = supervisor.execute(hset("s", "a")).await.unwrap_err();
    assert!(err.is_storage());
    // callers are never retried on their behalf
    assert_eq!(server.commands(), 1);

    assert_eq!(supervisor.probe_once().await, ProbeOutcome::Reconnected);
    supervisor.execute(hset("s", "a")).await.unwrap();
    assert_eq!(server.field("s", "a"), Some(b"v".to_vec()));
}

#[tokio::test(start_paused = true)]
async fn test_background_loop_recovers_severed_connection() {
    let server = SimulatedServer::new();
    let supervisor = supervisor(&server).await;
    let handle = supervisor.spawn_health_check();

    server.sever_connections();
    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert_eq!(supervisor.reconnects(), 1);
    assert_eq!(server.dials(), 2);
    supervisor.execute(hset("s", "a")).await.unwrap();

    handle.abort();
}

#[tokio::test(start_paused = true)]
async fn test_background_loop_probes_every_interval() {
    let server = SimulatedServer::new();
    let supervisor = supervisor(&server).await;
    let handle = supervisor.spawn_health_check();

    tokio::time::sleep(Duration::from_millis(3500)).await;

    assert_eq!(supervisor.stats().probe_cycles, 3);
    assert_eq!(server.pings(), 3);
    handle.abort();
}

#[tokio::test(start_paused = true)]
async fn test_background_loop_stops_when_dropped() {
    let server = SimulatedServer::new();
    let supervisor = supervisor(&server).await;
    let handle = supervisor.spawn_health_check();

    drop(supervisor);
    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert!(handle.is_finished());
    assert_eq!(server.pings(), 0);
}

#[tokio::test]
async fn test_close_breaks_connection() {
    let server = SimulatedServer::new();
    let supervisor = supervisor(&server).await;

    supervisor.close().await;
    assert!(supervisor.execute(Command::Ping).await.is_err());
    assert_eq!(supervisor.target(), "sim://session-store");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_commands_during_reconnect_never_see_partial_state() {
    let server = SimulatedServer::new();
    let supervisor = supervisor(&server).await;

    let mut tasks = Vec::new();
    for worker in 0..8 {
        let supervisor = Arc::clone(&supervisor);
        tasks.push(tokio::spawn(async move {
            for i in 0..200 {
                let key = format!("w{worker}");
                supervisor
                    .execute(hset(&key, &i.to_string()))
                    .await
                    .unwrap();
                tokio::task::yield_now().await;
            }
        }));
    }

    for _ in 0..5 {
        server.fail_next_pings(10);
        assert_eq!(supervisor.probe_once().await, ProbeOutcome::Reconnected);
    }

    for task in tasks {
        task.await.unwrap();
    }
    assert_eq!(supervisor.reconnects(), 5);
    assert_eq!(server.dials(), 6);
    supervisor.execute(Command::Ping).await.unwrap();
}
