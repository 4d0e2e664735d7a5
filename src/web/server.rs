use axum::{
    extract::State,
    response::{Html, Json},
    routing::get,
    Router,
};
use tokio::sync::{mpsc, oneshot};
use tracing::info;

use crate::events::{Event, HostRow};
use crate::vendor;

/// HTTP surface (C12, external to the discovery core): a static
/// dashboard page plus a JSON snapshot endpoint it polls.
pub struct WebServer {
    events: mpsc::Sender<Event>,
    addr: String,
}

#[derive(Clone)]
struct AppState {
    events: mpsc::Sender<Event>,
}

impl WebServer {
    pub fn new(events: mpsc::Sender<Event>) -> Self {
        Self::bound_to(events, "0.0.0.0:8090")
    }

    pub fn bound_to(events: mpsc::Sender<Event>, addr: impl Into<String>) -> Self {
        Self { events, addr: addr.into() }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        info!(addr = %self.addr, "web UI listening");
        self.serve_on(listener).await
    }

    /// Serve on an already-bound listener, letting callers (tests, in
    /// particular) pick an ephemeral port and learn its address before
    /// traffic starts flowing.
    pub async fn serve_on(&self, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
        let state = AppState { events: self.events.clone() };

        let app = Router::new()
            .route("/", get(dashboard))
            .route("/refresh", get(refresh))
            .route("/healthz", get(healthz))
            .with_state(state);

        axum::serve(listener, app).await?;
        Ok(())
    }
}

/// Dashboard HTML - embedded single-page app
async fn dashboard() -> Html<&'static str> {
    Html(include_str!("../../static/dashboard.html"))
}

#[derive(serde::Serialize)]
struct Health {
    status: &'static str,
    entries: usize,
}

/// A snapshot handshake just like `refresh`, but only the entry count
/// is reported back.
async fn healthz(State(state): State<AppState>) -> Json<Health> {
    let (reply_tx, reply_rx) = oneshot::channel();
    let (ack_tx, ack_rx) = oneshot::channel();

    let entries = if state
        .events
        .send(Event::SnapshotRequest { reply: reply_tx, ack: ack_rx })
        .await
        .is_err()
    {
        0
    } else {
        match reply_rx.await {
            Ok(snapshot) => {
                let _ = ack_tx.send(());
                snapshot.len()
            }
            Err(_) => 0,
        }
    };

    Json(Health { status: "ok", entries })
}

/// Polled every 2s by the dashboard page: a snapshot handshake with
/// the event loop, rendered into the JSON row shape the frontend wants.
async fn refresh(State(state): State<AppState>) -> Json<Vec<HostRow>> {
    let (reply_tx, reply_rx) = oneshot::channel();
    let (ack_tx, ack_rx) = oneshot::channel();

    if state
        .events
        .send(Event::SnapshotRequest { reply: reply_tx, ack: ack_rx })
        .await
        .is_err()
    {
        return Json(Vec::new());
    }

    let snapshot = match reply_rx.await {
        Ok(snapshot) => snapshot,
        Err(_) => return Json(Vec::new()),
    };
    let _ = ack_tx.send(());

    let now_wall = chrono::Local::now();
    let now_mono = std::time::Instant::now();

    let mut rows: Vec<HostRow> = snapshot
        .iter()
        .map(|(key, host)| {
            let vendor_name = vendor::lookup(&key.mac);
            HostRow::from_host(key, host, vendor_name, now_wall, now_mono)
        })
        .collect();
    rows.sort_by(|a, b| a.ip.cmp(&b.ip));

    Json(rows)
}
