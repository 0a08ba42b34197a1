use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::get, Router};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use statwatch::{
    CycleError, CycleOutcome, HttpStatsSource, Monitor, MonitorSettings, StatsSource, Thresholds,
};

// ─── Mock stats server ───────────────────────────────────────────

/// Replies in order; the last reply repeats forever.
struct Script {
    replies: Mutex<Vec<(StatusCode, String)>>,
    hits: AtomicUsize,
    stop_after: Option<(usize, CancellationToken)>,
}

async fn stats(State(script): State<Arc<Script>>) -> (StatusCode, String) {
    let hit = script.hits.fetch_add(1, Ordering::SeqCst) + 1;
    if let Some((limit, token)) = &script.stop_after {
        if hit >= *limit {
            token.cancel();
        }
    }

    let mut replies = script.replies.lock().unwrap();
    if replies.len() > 1 {
        replies.remove(0)
    } else {
        replies[0].clone()
    }
}

async fn serve(script: Arc<Script>) -> String {
    let app = Router::new()
        .route("/_stats", get(stats))
        .with_state(script);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/_stats")
}

fn script(replies: &[(StatusCode, &str)]) -> Arc<Script> {
    Arc::new(Script {
        replies: Mutex::new(replies.iter().map(|(s, b)| (*s, b.to_string())).collect()),
        hits: AtomicUsize::new(0),
        stop_after: None,
    })
}

fn settings() -> MonitorSettings {
    MonitorSettings {
        interval: Duration::from_millis(5),
        max_consecutive_failures: 3,
        thresholds: Thresholds::default(),
    }
}

fn lines(out: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(out).lines().map(str::to_owned).collect()
}

// ─── Tests ───────────────────────────────────────────────────────

#[tokio::test]
async fn fetches_body_on_ok() {
    let url = serve(script(&[(StatusCode::OK, " 1,2,3,4,5,6,7\n")])).await;
    let mut source = HttpStatsSource::new(url, Duration::from_secs(5)).unwrap();

    assert_eq!(source.fetch().await.unwrap(), " 1,2,3,4,5,6,7\n");
}

#[tokio::test]
async fn non_ok_status_is_an_error() {
    let url = serve(script(&[(StatusCode::SERVICE_UNAVAILABLE, "1,2,3,4,5,6,7")])).await;
    let mut source = HttpStatsSource::new(url, Duration::from_secs(5)).unwrap();

    match source.fetch().await {
        Err(CycleError::Status(status)) => assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn connection_refused_is_a_transport_error() {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut source =
        HttpStatsSource::new(format!("http://{addr}/_stats"), Duration::from_secs(5)).unwrap();
    assert!(matches!(source.fetch().await, Err(CycleError::Transport(_))));
}

#[tokio::test]
async fn slow_server_times_out() {
    let app = Router::new().route(
        "/_stats",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "1,1,1,1,1,1,1"
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let mut source =
        HttpStatsSource::new(format!("http://{addr}/_stats"), Duration::from_millis(100)).unwrap();
    assert!(matches!(source.fetch().await, Err(CycleError::Timeout(_))));
}

/// Promises 100 body bytes, sends 3, hangs up. Serves every connection.
async fn serve_truncated_body() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut conn, _)) = listener.accept().await else {
                return;
            };
            let mut request = [0u8; 1024];
            let _ = conn.read(&mut request).await;
            let _ = conn
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n1,2")
                .await;
            let _ = conn.shutdown().await;
        }
    });
    format!("http://{addr}/_stats")
}

#[tokio::test]
async fn truncated_body_is_a_body_error() {
    let url = serve_truncated_body().await;
    let mut source = HttpStatsSource::new(url, Duration::from_secs(5)).unwrap();

    assert!(matches!(source.fetch().await, Err(CycleError::Body(_))));
}

#[tokio::test]
async fn truncated_body_counts_toward_streak() {
    let url = serve_truncated_body().await;
    let source = HttpStatsSource::new(url, Duration::from_secs(5)).unwrap();
    let mut monitor = Monitor::new(source, settings(), Vec::new());

    for streak in 1..=3 {
        assert_eq!(
            monitor.run_cycle().await,
            CycleOutcome::Failure {
                streak,
                unreachable: streak >= 3
            }
        );
    }
    assert_eq!(lines(monitor.output()), vec!["Unable to fetch server statistic."]);
}

#[tokio::test]
async fn overloaded_server_end_to_end() {
    let url = serve(script(&[(StatusCode::OK, "31,1000,900,2000,1950,100,99")])).await;
    let source = HttpStatsSource::new(url, Duration::from_secs(5)).unwrap();
    let mut monitor = Monitor::new(source, settings(), Vec::new());

    let outcome = monitor.run_cycle().await;
    assert!(matches!(outcome, CycleOutcome::Success { .. }));
    assert_eq!(
        lines(monitor.output()),
        vec![
            "Load Average is too high: 31",
            "Memory usage too high: 90%",
            "Free disk space is too low: 0 Mb left",
            "Network bandwidth usage high: 0 Mbit/s available",
        ]
    );
}

#[tokio::test]
async fn outage_then_recovery() {
    let url = serve(script(&[
        (StatusCode::INTERNAL_SERVER_ERROR, ""),
        (StatusCode::OK, "1,2,3"),
        (StatusCode::OK, "1,2,x,4,5,6,7"),
        (StatusCode::BAD_GATEWAY, ""),
        (StatusCode::OK, "10,1000,100,1000,100,1000,100"),
        (StatusCode::NOT_FOUND, ""),
    ]))
    .await;
    let source = HttpStatsSource::new(url, Duration::from_secs(5)).unwrap();
    let mut monitor = Monitor::new(source, settings(), Vec::new());

    for _ in 0..2 {
        monitor.run_cycle().await;
    }
    assert!(monitor.output().is_empty());

    monitor.run_cycle().await;
    monitor.run_cycle().await;
    assert_eq!(monitor.failure_streak(), 4);
    assert_eq!(lines(monitor.output()).len(), 2);

    monitor.run_cycle().await;
    assert_eq!(monitor.failure_streak(), 0);

    let outcome = monitor.run_cycle().await;
    assert_eq!(
        outcome,
        CycleOutcome::Failure {
            streak: 1,
            unreachable: false
        }
    );
    assert_eq!(
        lines(monitor.output()),
        vec![
            "Unable to fetch server statistic.",
            "Unable to fetch server statistic.",
        ]
    );
}

#[tokio::test]
async fn run_loop_until_cancelled() {
    let token = CancellationToken::new();
    let script = Arc::new(Script {
        replies: Mutex::new(vec![(StatusCode::OK, "1,2,3".to_string())]),
        hits: AtomicUsize::new(0),
        stop_after: Some((3, token.clone())),
    });
    let url = serve(script.clone()).await;
    let source = HttpStatsSource::new(url, Duration::from_secs(5)).unwrap();
    let mut monitor = Monitor::new(source, settings(), Vec::new());

    tokio::time::timeout(Duration::from_secs(10), monitor.run(token))
        .await
        .expect("monitor loop did not stop");

    assert_eq!(script.hits.load(Ordering::SeqCst), 3);
    assert_eq!(
        lines(monitor.output()),
        vec!["Unable to fetch server statistic."]
    );
    assert_eq!(monitor.stats().summary().cycles, 3);
}
