use std::time::Instant;

use lanwatch::events::{Event, Host, HostKey};
use lanwatch::web::server::WebServer;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// A stand-in for the real event loop: answers exactly one
/// `SnapshotRequest` with a fixed single-host table, then exits.
async fn fake_event_loop(mut events: mpsc::Receiver<Event>) {
    if let Some(Event::SnapshotRequest { reply, ack }) = events.recv().await {
        let key = HostKey::new([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff], [192, 168, 1, 42]);
        let mut host = Host::new(key, Instant::now());
        host.dns = "printer.example.com".to_string();

        let mut snapshot = std::collections::HashMap::new();
        snapshot.insert(key, host);

        let _ = reply.send(snapshot);
        let _ = ack.await;
    }
}

#[tokio::test]
async fn refresh_endpoint_returns_known_host() {
    let (events_tx, events_rx) = mpsc::channel(4);
    tokio::spawn(fake_event_loop(events_rx));

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    let server = WebServer::new(events_tx);
    tokio::spawn(async move {
        let _ = server.serve_on(listener).await;
    });

    let url = format!("http://{addr}/refresh");
    let response = reqwest::get(&url).await.expect("request refresh endpoint");
    assert!(response.status().is_success());

    let rows: Vec<serde_json::Value> = response.json().await.expect("valid json body");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["mac_addr"], "aa:bb:cc:dd:ee:ff");
    assert_eq!(rows[0]["ip"], "192.168.1.42");
    assert_eq!(rows[0]["dns"], "printer.example.com");
    assert_eq!(rows[0]["nbns"], "-");
}

#[tokio::test]
async fn healthz_endpoint_is_ok() {
    let (events_tx, events_rx) = mpsc::channel(4);
    tokio::spawn(fake_event_loop(events_rx));

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    let server = WebServer::new(events_tx);
    tokio::spawn(async move {
        let _ = server.serve_on(listener).await;
    });

    let url = format!("http://{addr}/healthz");
    let response = reqwest::get(&url).await.expect("request healthz endpoint");
    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("valid json body");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["entries"], 1);
}
