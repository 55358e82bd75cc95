use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use duet_core::test_helpers::ManualClock;
use duet_core::time::Clock;
use duet_tables::test_helpers::LoadedDice;

use duet_server::config::ServerConfig;
use duet_server::room_manager::RoomManager;
use duet_server::{build_app, build_app_with};

pub struct TestServer {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    _shutdown: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Start a test server with default config, real clock and dice.
    pub async fn new() -> Self {
        Self::from_config(ServerConfig::default()).await
    }

    pub async fn from_config(config: ServerConfig) -> Self {
        let (app, _state) = build_app(config);
        Self::serve(app).await
    }

    /// Start a server whose clock and dice the test controls.
    pub async fn scripted(clock: &Arc<ManualClock>, dice: LoadedDice) -> Self {
        let config = ServerConfig::default();
        let manager = RoomManager::new(
            Arc::clone(clock) as Arc<dyn Clock>,
            Box::new(dice),
            config.limits.signal_queue_capacity,
        );
        let (app, _state) = build_app_with(config, manager);
        Self::serve(app).await
    }

    async fn serve(app: axum::Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start accepting
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            client: reqwest::Client::new(),
            _shutdown: handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn room_url(&self) -> String {
        format!("{}/api/room", self.base_url())
    }

    pub fn events_url(&self, room_id: &str) -> String {
        format!("{}/api/room/events?roomId={room_id}", self.base_url())
    }

    /// POST an action and return (status, body).
    pub async fn act(&self, body: serde_json::Value) -> (u16, serde_json::Value) {
        let resp = self
            .client
            .post(self.room_url())
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        let json = resp.json().await.unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    /// POST an action that must succeed; returns the snapshot.
    pub async fn act_ok(&self, body: serde_json::Value) -> serde_json::Value {
        let (status, json) = self.act(body.clone()).await;
        assert_eq!(status, 200, "action {body} failed: {json}");
        json
    }

    pub async fn snapshot(&self, room_id: &str) -> serde_json::Value {
        self.client
            .get(self.room_url())
            .query(&[("roomId", room_id)])
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    /// Seat `alice` as P1 and `bob` as P2 in `room_id`.
    pub async fn seat_both(&self, room_id: &str) -> serde_json::Value {
        self.act_ok(join(room_id, "alice", "p1")).await;
        self.act_ok(join(room_id, "bob", "p2")).await
    }
}

pub fn join(room_id: &str, participant: &str, role: &str) -> serde_json::Value {
    serde_json::json!({
        "roomId": room_id,
        "participantId": participant,
        "action": "join",
        "role": role,
    })
}

/// Read an SSE response until `pred` matches the collected text or `secs` pass.
pub async fn read_sse_until(
    resp: reqwest::Response,
    secs: u64,
    pred: impl Fn(&str) -> bool,
) -> (bool, String) {
    let mut collected = String::new();
    let mut resp = resp;
    let found = tokio::time::timeout(Duration::from_secs(secs), async {
        loop {
            match resp.chunk().await {
                Ok(Some(bytes)) => {
                    collected.push_str(&String::from_utf8_lossy(&bytes));
                    if pred(&collected) {
                        return true;
                    }
                },
                _ => return false,
            }
        }
    })
    .await
    .unwrap_or(false);
    (found, collected)
}
