use std::sync::Arc;

use chrono::DateTime;
use lock_states::http::{self, AppState};
use lock_states::{InMemoryLockStore, LockService, ManualClock};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Created {
    pub lock_id: String,
    pub lock_key: String,
    pub is_locked: bool,
}

pub struct TestServer {
    pub base: String,
    pub clock: ManualClock,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub async fn create(&self, query: &str) -> reqwest::Response {
        self.client
            .post(self.url(&format!("/locks{}", query)))
            .send()
            .await
            .unwrap()
    }

    pub async fn create_lock(&self) -> Created {
        let resp = self.create("").await;
        assert_eq!(resp.status(), 200);
        resp.json().await.unwrap()
    }

    pub async fn query(&self, id: &str) -> u16 {
        self.client
            .get(self.url(&format!("/locks/{}", id)))
            .send()
            .await
            .unwrap()
            .status()
            .as_u16()
    }

    pub async fn patch(&self, id: &str, action: &str, query: &str) -> u16 {
        self.client
            .patch(self.url(&format!("/locks/{}/{}{}", id, action, query)))
            .send()
            .await
            .unwrap()
            .status()
            .as_u16()
    }
}

/// Bind to port 0 with a manual clock starting at a fixed instant.
pub async fn start_server() -> TestServer {
    let clock = ManualClock::new(DateTime::from_timestamp_millis(1_700_000_000_000).unwrap());
    let service = LockService::new(InMemoryLockStore::new()).with_clock(clock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base = format!("http://{addr}");

    let app = http::router(Arc::new(AppState::new(service, base.clone())));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base,
        clock,
        client: reqwest::Client::new(),
    }
}
