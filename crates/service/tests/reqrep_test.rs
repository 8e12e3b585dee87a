//! Integration tests for the REQ/REP scheduling endpoint.
//!
//! Each test binds a real TCP socket on a distinct high port, runs the
//! serve loop in a background task, and drives it with a REQ client in
//! strict request-then-reply alternation.

use std::sync::Arc;
use std::time::Duration;

use fahrplan_core::Dispatcher;
use fahrplan_service::channel::{RequestChannel, ZmqReplyServer, ZmqRequestClient};
use fahrplan_service::serve::EventService;
use fahrplan_service::transport::Transport;
use serde_json::{json, Value};
use tokio::sync::Notify;

const SETTLE: Duration = Duration::from_millis(200);
const TIMEOUT: Duration = Duration::from_secs(5);

async fn start_service(
    port: u16,
) -> (ZmqRequestClient, Arc<Notify>, tokio::task::JoinHandle<()>) {
    let transport = Transport::tcp("127.0.0.1", port);

    let server = ZmqReplyServer::bind(&transport).await.unwrap();
    let shutdown = Arc::new(Notify::new());

    let loop_shutdown = shutdown.clone();
    let handle = tokio::spawn(async move {
        let service = EventService::new(server, Dispatcher::new());
        let _ = service.run(loop_shutdown).await;
    });
    tokio::time::sleep(SETTLE).await;

    let client = ZmqRequestClient::connect(&transport).await.unwrap();
    tokio::time::sleep(SETTLE).await;

    (client, shutdown, handle)
}

async fn stop_service(shutdown: Arc<Notify>, handle: tokio::task::JoinHandle<()>) {
    shutdown.notify_waiters();
    let _ = tokio::time::timeout(TIMEOUT, handle).await;
}

async fn roundtrip(client: &ZmqRequestClient, request: &str) -> Value {
    let reply = client.request(request.to_string(), TIMEOUT).await.unwrap();
    serde_json::from_str(&reply).unwrap()
}

#[tokio::test]
async fn create_event_round_trip() {
    let (client, shutdown, handle) = start_service(16600).await;

    let request = json!({
        "action": "create_event",
        "event_name": "Standup",
        "event_type": "meeting",
        "duration_hours": 1,
    });
    let reply = roundtrip(&client, &request.to_string()).await;

    assert_eq!(reply["status"], "success");
    assert_eq!(reply["event_name"], "Standup");
    assert_eq!(reply["event_type"], "meeting");
    assert_eq!(reply["timezone"], "local");
    assert_eq!(reply["duration_hours"], 1.0);
    assert!(reply["event_id"].as_str().unwrap().starts_with("EVT-"));
    assert!(reply["timestamp"].is_string());
    assert!(reply["end_timestamp"].is_string());

    stop_service(shutdown, handle).await;
}

#[tokio::test]
async fn health_check_counts_created_events() {
    let (client, shutdown, handle) = start_service(16610).await;

    let reply = roundtrip(&client, r#"{"action":"health_check"}"#).await;
    assert_eq!(reply["status"], "healthy");
    assert_eq!(reply["events_created"], 0);

    let reply = roundtrip(
        &client,
        r#"{"action":"create_event","event_name":"Call Client","event_type":"reminder"}"#,
    )
    .await;
    assert_eq!(reply["status"], "success");

    let reply = roundtrip(&client, r#"{"action":"health_check"}"#).await;
    assert_eq!(reply["status"], "healthy");
    assert_eq!(reply["events_created"], 1);

    stop_service(shutdown, handle).await;
}

#[tokio::test]
async fn invalid_event_type_leaves_log_unchanged() {
    let (client, shutdown, handle) = start_service(16620).await;

    let reply = roundtrip(
        &client,
        r#"{"action":"create_event","event_name":"Bad","event_type":"bogus"}"#,
    )
    .await;
    assert_eq!(reply["status"], "error");
    assert!(
        reply["message"].as_str().unwrap().contains("bogus"),
        "got: {reply}"
    );

    let reply = roundtrip(&client, r#"{"action":"health_check"}"#).await;
    assert_eq!(reply["events_created"], 0);

    stop_service(shutdown, handle).await;
}

#[tokio::test]
async fn malformed_payload_gets_error_reply() {
    let (client, shutdown, handle) = start_service(16630).await;

    let reply = roundtrip(&client, "definitely not json").await;
    assert_eq!(reply["status"], "error");
    assert!(reply["message"]
        .as_str()
        .unwrap()
        .contains("invalid request payload"));

    // The socket keeps alternating after the rejection.
    let reply = roundtrip(&client, r#"{"action":"health_check"}"#).await;
    assert_eq!(reply["status"], "healthy");

    stop_service(shutdown, handle).await;
}

#[tokio::test]
async fn consecutive_creates_get_distinct_sequential_ids() {
    let (client, shutdown, handle) = start_service(16640).await;

    let first = roundtrip(
        &client,
        r#"{"action":"create_event","event_name":"One"}"#,
    )
    .await;
    let second = roundtrip(
        &client,
        r#"{"action":"create_event","event_name":"Two"}"#,
    )
    .await;

    let first_id = first["event_id"].as_str().unwrap();
    let second_id = second["event_id"].as_str().unwrap();
    assert_ne!(first_id, second_id);
    assert!(first_id.ends_with("-0001"), "got: {first_id}");
    assert!(second_id.ends_with("-0002"), "got: {second_id}");

    stop_service(shutdown, handle).await;
}

#[tokio::test]
async fn end_timestamp_never_precedes_timestamp() {
    let (client, shutdown, handle) = start_service(16650).await;

    for kind in ["meeting", "deadline", "reminder", "appointment", "general"] {
        let request = json!({
            "action": "create_event",
            "event_name": format!("Probe {kind}"),
            "event_type": kind,
        });
        let reply = roundtrip(&client, &request.to_string()).await;
        assert_eq!(reply["status"], "success", "{kind}: {reply}");

        let start: chrono::DateTime<chrono::FixedOffset> =
            reply["timestamp"].as_str().unwrap().parse().unwrap();
        let end: chrono::DateTime<chrono::FixedOffset> =
            reply["end_timestamp"].as_str().unwrap().parse().unwrap();
        assert!(end >= start, "{kind}: end precedes start");
    }

    stop_service(shutdown, handle).await;
}
