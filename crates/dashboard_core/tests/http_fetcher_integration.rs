use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use dashboard_core::{
    DashboardStore, HttpFetcher, HttpFetcherConfig, RequestCoordinator, ResourceFetcher,
    ResourceSignal,
};
use serde_json::json;
use shared::{
    domain::MemberId,
    error::FetchError,
    protocol::{ApiResource, ResourceRequest},
};
use tokio::{net::TcpListener, runtime::Handle, sync::mpsc, time::timeout};

#[derive(Clone, Default)]
struct Recorded {
    tokens: Arc<Mutex<Vec<(String, Option<String>)>>>,
    event_queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl Recorded {
    fn record_token(&self, path: &str, headers: &HeaderMap) {
        let token = headers
            .get("x-access-token")
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);
        self.tokens
            .lock()
            .expect("tokens lock")
            .push((path.to_string(), token));
    }
}

async fn cluster(State(recorded): State<Recorded>, headers: HeaderMap) -> impl IntoResponse {
    recorded.record_token("/api/v1/cluster", &headers);
    Json(json!({
        "Members": {
            "m1": {
                "MemberID": "m1",
                "Hostname": "h1",
                "ListenAddress": "1.2.3.4:80",
                "LastUpdated": "2020-01-01T00:00:00Z"
            }
        },
        "Director": {"MemberID": "m1"}
    }))
}

async fn events(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    recorded.record_token("/api/v1/event", &headers);
    recorded
        .event_queries
        .lock()
        .expect("queries lock")
        .push(query);
    Json(json!({}))
}

async fn status_check(State(recorded): State<Recorded>, headers: HeaderMap) -> impl IntoResponse {
    recorded.record_token("/status/check", &headers);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"status": "unhealthy", "message": "MemberID m1"})),
    )
}

async fn spawn_monitor_api() -> Result<(String, Recorded)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/api/v1/cluster", get(cluster))
        .route("/api/v1/event", get(events))
        .route("/status/check", get(status_check))
        .with_state(recorded.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), recorded))
}

fn fetcher(server_url: &str, access_token: Option<&str>) -> HttpFetcher {
    HttpFetcher::new(HttpFetcherConfig {
        base_url: server_url.to_string(),
        access_token: access_token.map(ToString::to_string),
        timeout: Some(Duration::from_secs(5)),
    })
    .expect("http fetcher")
}

#[tokio::test]
async fn fetches_cluster_json_with_access_token() {
    let (server_url, recorded) = spawn_monitor_api().await.expect("spawn server");
    let fetcher = fetcher(&server_url, Some("secret"));

    let body = fetcher
        .get_json(&ApiResource::Cluster.into())
        .await
        .expect("cluster body");
    assert_eq!(body["Director"]["MemberID"], "m1");

    let tokens = recorded.tokens.lock().expect("tokens lock").clone();
    assert_eq!(
        tokens,
        vec![("/api/v1/cluster".to_string(), Some("secret".to_string()))]
    );
}

#[tokio::test]
async fn status_check_is_sent_without_token_and_surfaces_http_error() {
    let (server_url, recorded) = spawn_monitor_api().await.expect("spawn server");
    let fetcher = fetcher(&server_url, Some("secret"));

    let err = fetcher
        .get_json(&ApiResource::Status.into())
        .await
        .expect_err("status check is unhealthy");
    assert_eq!(err, FetchError::http(500, "Internal Server Error"));

    let tokens = recorded.tokens.lock().expect("tokens lock").clone();
    assert_eq!(tokens, vec![("/status/check".to_string(), None)]);
}

#[tokio::test]
async fn unknown_route_reports_404() {
    let (server_url, _recorded) = spawn_monitor_api().await.expect("spawn server");
    // Mounting the api under a prefix the server does not serve yields 404s.
    let fetcher = fetcher(&format!("{server_url}/missing"), None);

    let err = fetcher
        .get_json(&ApiResource::Cluster.into())
        .await
        .expect_err("route is not served");
    assert_eq!(err.status(), 404);
}

#[tokio::test]
async fn event_type_filter_is_sent_as_query() {
    let (server_url, recorded) = spawn_monitor_api().await.expect("spawn server");
    let fetcher = fetcher(&server_url, None);

    fetcher
        .get_json(&ResourceRequest::events_of_types(["monitor", "alerter"]))
        .await
        .expect("events body");

    let queries = recorded.event_queries.lock().expect("queries lock").clone();
    assert_eq!(queries.len(), 1);
    assert_eq!(
        queries[0].get("type").map(String::as_str),
        Some("monitor,alerter")
    );
}

#[tokio::test]
async fn unreachable_server_is_a_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let fetcher = fetcher(&format!("http://{addr}"), None);
    let err = fetcher
        .get_json(&ApiResource::Cluster.into())
        .await
        .expect_err("nothing listens");
    assert!(matches!(err, FetchError::Transport { .. }));
    assert_eq!(err.status(), 500);
}

#[tokio::test]
async fn coordinator_drives_store_against_live_server() {
    let (server_url, _recorded) = spawn_monitor_api().await.expect("spawn server");
    let (tx, mut rx) = mpsc::unbounded_channel::<ResourceSignal>();
    let mut coordinator =
        RequestCoordinator::new(Arc::new(fetcher(&server_url, None)), tx, Handle::current());
    let mut store = DashboardStore::new();

    coordinator.request(ApiResource::Cluster);
    coordinator.request(ApiResource::Status);

    let mut completions = 0;
    while completions < 2 {
        let signal = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("signal within timeout")
            .expect("channel open");
        if signal.kind() != "begin" {
            completions += 1;
        }
        store.dispatch(signal);
    }

    let stats = store.cluster.data.as_ref().expect("cluster data");
    assert!(stats.is_director(&MemberId::from("m1")));
    assert_eq!(store.cluster.status_text, "Clusters retrieved.");

    assert_eq!(store.status.data, None);
    assert_eq!(
        store.status.status_text,
        "Status Error: 500 Internal Server Error"
    );
    assert!(!store.any_fetching());
}
