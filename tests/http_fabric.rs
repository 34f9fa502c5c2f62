//! HTTP Fabric retry behavior against a real TCP socket: a stub server
//! answers the first connection with 429 and a `Retry-After` header (either
//! form RFC 7231 allows) and the second with 200, so the delay the client
//! actually waited can be measured end to end rather than asserted against
//! an internal helper.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use agent_core::config::HttpEnvConfig;
use agent_core::infrastructure::http::HttpFabric;
use chrono::Utc;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn config(min_delay_ms: u64, backoff_mult: f64) -> HttpEnvConfig {
    HttpEnvConfig {
        max_attempts: 2,
        min_delay_ms,
        max_delay_ms: 30_000,
        jitter: 0.0,
        backoff_mult,
        retry_methods: vec!["GET".to_string()],
        rate_default_max_requests: 1000,
        rate_default_window_ms: 1000,
    }
}

/// Serves one 429 (carrying `retry_after_header`) followed by one 200, each
/// on its own connection, then stops.
async fn spawn_fabric_stub(retry_after_header: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let calls = AtomicUsize::new(0);
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;

            let call = calls.fetch_add(1, Ordering::SeqCst);
            let response = if call == 0 {
                format!(
                    "HTTP/1.1 429 Too Many Requests\r\n{retry_after_header}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                )
            } else {
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}"
                    .to_string()
            };
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;

            if call >= 1 {
                return;
            }
        }
    });

    format!("http://{addr}/markets")
}

#[tokio::test]
async fn numeric_retry_after_overrides_a_smaller_backoff() {
    let url = spawn_fabric_stub("Retry-After: 1".to_string()).await;
    let fabric = HttpFabric::new(&config(10, 1.0));

    let start = Instant::now();
    let body: Value = fabric.get_json(&url, &[]).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(body, Value::Object(Default::default()));
    assert!(
        elapsed >= Duration::from_millis(900),
        "expected the 1s Retry-After to win over a 10ms backoff, waited {elapsed:?}"
    );
}

#[tokio::test]
async fn http_date_retry_after_is_parsed_and_honored() {
    let target = Utc::now() + chrono::Duration::seconds(1);
    let header = format!("Retry-After: {}", target.format("%a, %d %b %Y %H:%M:%S GMT"));
    let url = spawn_fabric_stub(header).await;
    let fabric = HttpFabric::new(&config(10, 1.0));

    let start = Instant::now();
    let body: Value = fabric.get_json(&url, &[]).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(body, Value::Object(Default::default()));
    assert!(
        elapsed >= Duration::from_millis(900),
        "expected the HTTP-date Retry-After (~1s out) to be honored, waited {elapsed:?}"
    );
}

#[tokio::test]
async fn backoff_wins_when_retry_after_is_smaller() {
    let url = spawn_fabric_stub("Retry-After: 0".to_string()).await;
    let fabric = HttpFabric::new(&config(300, 1.0));

    let start = Instant::now();
    let body: Value = fabric.get_json(&url, &[]).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(body, Value::Object(Default::default()));
    assert!(
        elapsed >= Duration::from_millis(250),
        "expected the 300ms backoff to win over a 0s Retry-After, waited {elapsed:?}"
    );
    assert!(
        elapsed < Duration::from_millis(900),
        "backoff winning should not wait anywhere near a full second, waited {elapsed:?}"
    );
}
