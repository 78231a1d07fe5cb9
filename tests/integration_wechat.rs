mod common;

use mockito::{Matcher, Server, ServerGuard};
use push_relay::adapters::push::WechatBackend;
use push_relay::adapters::push::device_map::DeviceMap;
use push_relay::domain::PushResponse;
use push_relay::services::{NotificationServer, PushMetrics, PushNotificationServer};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

const TEMPLATE_ID: &str = "tmpl-1";
const DEVICE_MAP: &str = r#"{"device-1": "openid-1"}"#;

fn wechat_server(base_url: &str, map_path: &Path) -> (PushNotificationServer<WechatBackend>, Arc<common::RecordingMetrics>) {
    common::setup_tracing();
    let metrics = Arc::new(common::RecordingMetrics::default());
    let backend =
        WechatBackend::new(reqwest::Client::new(), base_url, "wx-app:wx-secret", TEMPLATE_ID, DeviceMap::new(map_path));
    let shared: Arc<dyn PushMetrics> = Arc::<common::RecordingMetrics>::clone(&metrics);
    (PushNotificationServer::new(backend, shared), metrics)
}

async fn mock_token(server: &mut ServerGuard, hits: usize) -> mockito::Mock {
    server
        .mock("GET", "/cgi-bin/token")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "client_credential".into()),
            Matcher::UrlEncoded("appid".into(), "wx-app".into()),
            Matcher::UrlEncoded("secret".into(), "wx-secret".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"access_token":"TOKEN-1","expires_in":3600}"#)
        .expect(hits)
        .create_async()
        .await
}

async fn mock_send(server: &mut ServerGuard, reply: &str, hits: usize) -> mockito::Mock {
    server
        .mock("POST", "/cgi-bin/message/template/send")
        .match_query(Matcher::UrlEncoded("access_token".into(), "TOKEN-1".into()))
        .match_header("content-type", "application/json;encoding=utf-8")
        .with_status(200)
        .with_body(reply)
        .expect(hits)
        .create_async()
        .await
}

#[tokio::test]
async fn test_wechat_delivers_template_message() {
    let mut server = Server::new_async().await;
    let map = common::device_map(DEVICE_MAP);
    let token = mock_token(&mut server, 1).await;
    let send = server
        .mock("POST", "/cgi-bin/message/template/send")
        .match_query(Matcher::UrlEncoded("access_token".into(), "TOKEN-1".into()))
        .match_body(Matcher::Json(json!({
            "touser": "openid-1",
            "template_id": TEMPLATE_ID,
            "data": {"content": {"value": "alice: hi :smile:"}}
        })))
        .with_status(200)
        .with_body(r#"{"errcode":0,"errmsg":"ok","msgid":200228332}"#)
        .create_async()
        .await;

    let (push, metrics) = wechat_server(&server.url(), map.path());
    let response = push.send_notification(&common::chat_message("device-1")).await;

    assert_eq!(response, PushResponse::ok(true));
    token.assert_async().await;
    send.assert_async().await;
    assert_eq!(metrics.success_with_ack_count(), 1);
}

#[tokio::test]
async fn test_wechat_reuses_cached_token() {
    let mut server = Server::new_async().await;
    let map = common::device_map(DEVICE_MAP);
    let token = mock_token(&mut server, 1).await;
    let send = mock_send(&mut server, r#"{"errcode":0,"errmsg":"ok"}"#, 2).await;

    let (push, metrics) = wechat_server(&server.url(), map.path());
    let msg = common::chat_message("device-1");

    assert!(push.send_notification(&msg).await.is_success());
    assert!(push.send_notification(&msg).await.is_success());

    token.assert_async().await;
    send.assert_async().await;
    assert_eq!(metrics.total_count(), 2);
}

#[tokio::test]
async fn test_wechat_missing_device_map_makes_no_calls() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let token = mock_token(&mut server, 0).await;
    let send = mock_send(&mut server, r#"{"errcode":0,"errmsg":"ok"}"#, 0).await;

    let (push, metrics) = wechat_server(&server.url(), &dir.path().join("wechat-device-ids.json"));
    let response = push.send_notification(&common::chat_message("device-1")).await;

    assert_eq!(response, PushResponse::failure("Map not found error"));
    token.assert_async().await;
    send.assert_async().await;
    assert_eq!(metrics.failure_reasons(), vec!["Map not found error"]);
    assert_eq!(metrics.latency_count(), 0);
}

#[tokio::test]
async fn test_wechat_unknown_device() {
    let mut server = Server::new_async().await;
    let map = common::device_map(DEVICE_MAP);
    let token = mock_token(&mut server, 0).await;

    let (push, _metrics) = wechat_server(&server.url(), map.path());
    let response = push.send_notification(&common::chat_message("device-2")).await;

    assert_eq!(response.reason(), Some("No map error"));
    token.assert_async().await;
}

#[tokio::test]
async fn test_wechat_token_failure_skips_send() {
    let mut server = Server::new_async().await;
    let map = common::device_map(DEVICE_MAP);
    let token = server
        .mock("GET", "/cgi-bin/token")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;
    let send = mock_send(&mut server, r#"{"errcode":0,"errmsg":"ok"}"#, 0).await;

    let (push, metrics) = wechat_server(&server.url(), map.path());
    let response = push.send_notification(&common::chat_message("device-1")).await;

    assert_eq!(response, PushResponse::failure("Getting token error"));
    token.assert_async().await;
    send.assert_async().await;
    assert_eq!(metrics.failure_reasons(), vec!["Getting token error"]);
}

#[tokio::test]
async fn test_wechat_unparsable_token_skips_send() {
    let mut server = Server::new_async().await;
    let map = common::device_map(DEVICE_MAP);
    let _token = server
        .mock("GET", "/cgi-bin/token")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("{not json")
        .create_async()
        .await;
    let send = mock_send(&mut server, r#"{"errcode":0,"errmsg":"ok"}"#, 0).await;

    let (push, _metrics) = wechat_server(&server.url(), map.path());
    let response = push.send_notification(&common::chat_message("device-1")).await;

    assert_eq!(response.reason(), Some("Getting token error"));
    send.assert_async().await;
}

#[tokio::test]
async fn test_wechat_business_rejection_is_reported_and_drops_token() {
    let mut server = Server::new_async().await;
    let map = common::device_map(DEVICE_MAP);
    let token = mock_token(&mut server, 2).await;
    let _send = mock_send(&mut server, r#"{"errcode":40001,"errmsg":"invalid credential"}"#, 2).await;

    let (push, metrics) = wechat_server(&server.url(), map.path());
    let msg = common::chat_message("device-1");

    let response = push.send_notification(&msg).await;
    assert_eq!(response, PushResponse::failure("invalid credential"));

    {
        let failures = metrics.failures.lock().unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].1, "message");
        assert_eq!(failures[0].2, "invalid credential");
    }

    // The rejected token is not reused
    let _ = push.send_notification(&msg).await;
    token.assert_async().await;
}

#[tokio::test]
async fn test_wechat_malformed_reply() {
    let mut server = Server::new_async().await;
    let map = common::device_map(DEVICE_MAP);
    let _token = mock_token(&mut server, 1).await;
    let _send = mock_send(&mut server, "upstream timeout", 1).await;

    let (push, metrics) = wechat_server(&server.url(), map.path());
    let response = push.send_notification(&common::chat_message("device-1")).await;

    assert_eq!(response.reason(), Some("invalid response"));
    assert_eq!(metrics.failure_reasons(), vec!["invalid response"]);
}

#[tokio::test]
async fn test_wechat_out_of_range_token_lifetime_fails_cleanly() {
    let mut server = Server::new_async().await;
    let map = common::device_map(DEVICE_MAP);
    let _token = server
        .mock("GET", "/cgi-bin/token")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"access_token":"TOKEN-1","expires_in":18446744073709551615}"#)
        .create_async()
        .await;
    let send = mock_send(&mut server, r#"{"errcode":0,"errmsg":"ok"}"#, 0).await;

    let (push, metrics) = wechat_server(&server.url(), map.path());
    let response = push.send_notification(&common::chat_message("device-1")).await;

    assert_eq!(response, PushResponse::failure("Getting token error"));
    send.assert_async().await;
    assert_eq!(metrics.failure_reasons(), vec!["Getting token error"]);
}
