#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use pretty_assertions::assert_eq;
use reqwest::Method;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use decoyscope_api::{
    ApiClient, ControlCommand, Error, NotificationQuery, NotificationType, Protocol,
};

// ── Helpers ─────────────────────────────────────────────────────────

const BASE: &str = "/api/honeypot";

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}{BASE}", server.uri())).unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn api_path(suffix: &str) -> String {
    format!("{BASE}/{suffix}")
}

// ── Generic call ────────────────────────────────────────────────────

#[tokio::test]
async fn test_call_returns_raw_json() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("status")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"running": true})))
        .mount(&server)
        .await;

    let value = client.call("/status", Method::GET, None).await.unwrap();
    assert_eq!(value, json!({"running": true}));
}

#[tokio::test]
async fn test_non_2xx_names_endpoint_and_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("stats")))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client.stats().await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.endpoint(), Some("/api/honeypot/stats"));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_undecodable_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("status")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client.status().await.unwrap_err();
    assert!(
        matches!(&err, Error::Deserialization { endpoint, .. } if endpoint == "/api/honeypot/status"),
        "expected Deserialization error, got: {err:?}"
    );
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let client = ApiClient::with_client(
        reqwest::Client::new(),
        Url::parse("http://127.0.0.1:9/api/honeypot").unwrap(),
    );
    let err = client.status().await.unwrap_err();
    assert!(matches!(err, Error::Transport { .. }), "got: {err:?}");
    assert_eq!(err.endpoint(), Some("/api/honeypot/status"));
    assert_eq!(err.status(), None);
}

// ── Stats ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_stats_counters_verbatim() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("stats")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalLogs": 42, "sshLogs": 30, "telnetLogs": 12
        })))
        .mount(&server)
        .await;

    let stats = client.stats().await.unwrap();
    assert_eq!(
        (stats.total_logs, stats.ssh_logs, stats.telnet_logs),
        (42, 30, 12)
    );
}

#[tokio::test]
async fn test_top_ips_keeps_server_order() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("stats/top-ips")))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "topIps": [
                {"ip": "10.0.0.9", "count": 3, "lastAttack": "2024-06-15T10:30:00"},
                {"ip": "10.0.0.1", "count": 7}
            ]
        })))
        .mount(&server)
        .await;

    let top = client.top_ips(10).await.unwrap();
    let ips: Vec<_> = top.top_ips.iter().map(|t| t.ip.as_str()).collect();
    assert_eq!(ips, vec!["10.0.0.9", "10.0.0.1"]);
}

#[tokio::test]
async fn test_top_credentials_message_only_is_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("stats/top-credentials")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "not implemented"})),
        )
        .mount(&server)
        .await;

    let creds = client.top_credentials(10).await.unwrap();
    assert!(creds.top_credentials.is_empty());
}

#[tokio::test]
async fn test_timeline() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("stats/timeline")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hours": ["09:00", "10:00"], "counts": [1, 4]
        })))
        .mount(&server)
        .await;

    let timeline = client.timeline().await.unwrap();
    assert_eq!(timeline.hours.len(), 2);
    assert_eq!(timeline.counts, vec![1, 4]);
}

// ── Logs ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_logs_paged() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("logs")))
        .and(query_param("page", "2"))
        .and(query_param("size", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "logs": [{
                "id": "l1",
                "timestamp": "2024-06-15T10:30:00",
                "sourceIp": "203.0.113.5",
                "protocol": "SSH",
                "username": "root",
                "password": "toor",
                "sessionId": "s-1",
                "commands": [
                    {"command": "ls", "timestamp": "2024-06-15T10:30:01"},
                    {"command": "cat /etc/passwd", "timestamp": "2024-06-15T10:30:05"}
                ]
            }],
            "totalPages": 5
        })))
        .mount(&server)
        .await;

    let page = client.logs(2, 20).await.unwrap();
    assert_eq!(page.total_pages, Some(5));
    let entry = &page.logs[0];
    assert_eq!(entry.protocol, Protocol::Ssh);
    assert_eq!(entry.last_command(), Some("cat /etc/passwd"));
}

#[tokio::test]
async fn test_logs_bare_array() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("logs")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "l1", "sourceIp": "198.51.100.2", "protocol": "TELNET", "port": 23}
        ])))
        .mount(&server)
        .await;

    let page = client.logs(0, 20).await.unwrap();
    assert_eq!(page.total_pages, None);
    assert_eq!(page.logs[0].port, Some(23));
}

#[tokio::test]
async fn test_clear_logs() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path(api_path("logs")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success", "message": "cleared"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client.clear_logs().await.unwrap();
    assert_eq!(resp.message.as_deref(), Some("cleared"));
}

// ── Notifications ───────────────────────────────────────────────────

#[tokio::test]
async fn test_unread_notifications() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("notifications/unread")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "n1", "type": "ALERT", "category": "ATTACK", "title": "Brute force",
             "message": "50 attempts", "read": false, "isHighPriority": true, "isCritical": true}
        ])))
        .mount(&server)
        .await;

    let unread = client.unread_notifications().await.unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].kind, NotificationType::Alert);
    assert!(unread[0].critical());
}

#[tokio::test]
async fn test_notification_history_sends_filters() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("notifications")))
        .and(query_param("page", "0"))
        .and(query_param("size", "100"))
        .and(query_param("type", "WARNING"))
        .and(query_param("category", "SECURITY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "notifications": [], "totalPages": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = NotificationQuery {
        page: 0,
        size: 100,
        kind: Some(NotificationType::Warning),
        category: Some("SECURITY".into()),
    };
    let page = client.notifications(&query).await.unwrap();
    assert_eq!(page.total_pages, Some(1));
}

#[tokio::test]
async fn test_mark_read_puts_to_id_path() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path(api_path("notifications/n1/read")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.mark_notification_read("n1").await.unwrap();
}

#[tokio::test]
async fn test_mark_all_read() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path(api_path("notifications/read-all")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.mark_all_notifications_read().await.unwrap();
}

// ── Control ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_control_commands_post_to_their_paths() {
    let (server, client) = setup().await;

    for name in ["start", "stop", "restart"] {
        Mock::given(method("POST"))
            .and(path(api_path(name)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success", "message": name
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    for cmd in [
        ControlCommand::Start,
        ControlCommand::Stop,
        ControlCommand::Restart,
    ] {
        let resp = client.control(cmd).await.unwrap();
        assert_eq!(resp.message.as_deref(), Some(cmd.to_string().as_str()));
    }
}

#[tokio::test]
async fn test_control_failure_keeps_status() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(api_path("start")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "status": "error", "message": "port in use"
        })))
        .mount(&server)
        .await;

    let err = client.control(ControlCommand::Start).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(err.to_string().contains("port in use"));
}
