//! Wrapped tool runs against an in-process daemon
#![cfg(unix)]

use std::time::Duration;

use tokio::net::TcpListener;
use toolspan_server::{CollectorConfig, CollectorServer, Shutdown};
use toolspan_wrapper::{ClientConfig, CollectorClient, Invocation, ToolRunner, WrapperError};

async fn start_collector() -> CollectorClient {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let config = CollectorConfig::builder()
        .port(port)
        .idle_timeout(Duration::from_secs(30))
        .build();
    tokio::spawn(CollectorServer::new(config).serve(listener));

    CollectorClient::new(&ClientConfig::builder().port(port).build()).unwrap()
}

/// Collector on its own runtime thread; its connections close with it,
/// like a daemon process exiting
fn start_short_lived_collector(
    idle: Duration,
) -> (CollectorClient, std::thread::JoinHandle<Shutdown>) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let port = listener.local_addr().unwrap().port();
    let config = CollectorConfig::builder()
        .port(port)
        .idle_timeout(idle)
        .build();

    let daemon = std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = TcpListener::from_std(listener).unwrap();
            CollectorServer::new(config).serve(listener).await.unwrap()
        })
    });

    let client = CollectorClient::new(&ClientConfig::builder().port(port).build()).unwrap();
    (client, daemon)
}

fn sh(script: &str) -> Vec<String> {
    vec!["/bin/sh".to_string(), "-c".to_string(), script.to_string()]
}

#[tokio::test]
async fn test_successful_tool_reports_both_events() {
    let client = start_collector().await;
    let runner = ToolRunner::new(client.clone());

    let invocation = Invocation::new(sh("exit 0"), "example.com/foo").unwrap();
    assert_eq!(runner.run(&invocation).await.unwrap(), 0);

    let status = client.status().await.unwrap();
    assert!(status.contains("events: 2"));
    assert!(status.contains("live: 0"));

    let trace = client.trace().await.unwrap();
    assert_eq!(trace.trace_events.len(), 1);
    assert_eq!(trace.trace_events[0].name, "sh:example.com/foo");
}

#[tokio::test]
async fn test_failing_tool_still_reports_stop() {
    let client = start_collector().await;
    let runner = ToolRunner::new(client.clone());

    let invocation = Invocation::new(sh("exit 3"), "example.com/bar").unwrap();
    assert_eq!(runner.run(&invocation).await.unwrap(), 3);

    let status = client.status().await.unwrap();
    assert!(status.contains("events: 2"));
    assert!(status.contains("live: 0"));
}

#[tokio::test]
async fn test_missing_tool_reports_stop_then_errors() {
    let client = start_collector().await;
    let runner = ToolRunner::new(client.clone());

    let invocation = Invocation::new(
        vec!["/nonexistent/toolspan-test-tool".to_string()],
        "example.com/baz",
    )
    .unwrap();
    let err = runner.run(&invocation).await.unwrap_err();
    assert!(matches!(err, WrapperError::ToolSpawn { .. }));

    let status = client.status().await.unwrap();
    assert!(status.contains("events: 2"));
    assert!(status.contains("live: 0"));
}

#[tokio::test]
async fn test_concurrent_invocations_overlap_in_chart() {
    let client = start_collector().await;

    let mut tasks = Vec::new();
    for pkg in ["a", "b", "c"] {
        let runner = ToolRunner::new(client.clone());
        tasks.push(tokio::spawn(async move {
            let invocation = Invocation::new(sh("sleep 0.3"), pkg).unwrap();
            runner.run(&invocation).await.unwrap()
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap(), 0);
    }

    let chart = client.chart().await.unwrap();
    assert_eq!(chart.lines().count(), 6);
    assert!(chart
        .lines()
        .any(|line| line.ends_with(" 3 ['sh a' 'sh b' 'sh c']")));
    assert!(chart.lines().last().unwrap().ends_with(" 0 []"));
}

#[tokio::test]
async fn test_tool_outliving_idle_collector_keeps_its_status() {
    let (client, daemon) = start_short_lived_collector(Duration::from_millis(200));
    let runner = ToolRunner::new(client);

    let invocation = Invocation::new(sh("sleep 0.6; exit 5"), "example.com/slow").unwrap();
    assert_eq!(runner.run(&invocation).await.unwrap(), 5);

    // The stop had nowhere to go
    assert_eq!(daemon.join().unwrap(), Shutdown::IdleTimeout);
}
