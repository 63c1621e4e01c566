//! End-to-end forwarding tests against mock upstreams.

use std::time::{Duration, Instant};

use reqwest::header;
use serde_json::{json, Value};

mod common;

use common::{ALLOWED_ORIGIN, client, gateway_config, start_gateway, start_mock_upstream};

#[tokio::test]
async fn test_success_is_passed_through() {
    let upstream = start_mock_upstream(200, r#"{"ok":true}"#).await;
    let gateway = start_gateway(gateway_config(&upstream.url())).await;

    let res = client()
        .post(gateway.endpoint())
        .header(header::ORIGIN, ALLOWED_ORIGIN)
        .json(&json!({"x": 1}))
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], ALLOWED_ORIGIN);
    assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"ok": true}));

    let received = upstream.received();
    assert_eq!(received.len(), 1, "exactly one outbound call");
    assert_eq!(received[0].body, json!({"x": 1}));
    assert_eq!(received[0].headers[header::ACCEPT], "application/json");
    assert_eq!(received[0].headers[header::CONTENT_TYPE], "application/json");
    assert_eq!(received[0].query, None);
}

#[tokio::test]
async fn test_upstream_error_is_wrapped() {
    let upstream = start_mock_upstream(400, r#"{"err":"bad"}"#).await;
    let gateway = start_gateway(gateway_config(&upstream.url())).await;

    let res = client()
        .post(gateway.endpoint())
        .header(header::ORIGIN, ALLOWED_ORIGIN)
        .json(&json!({"x": 1}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 400);
    assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], ALLOWED_ORIGIN);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"error": "Proxy Error", "message": {"err": "bad"}, "status": 400})
    );
    assert_eq!(upstream.received().len(), 1, "errors are never retried");
}

#[tokio::test]
async fn test_upstream_server_error_keeps_status() {
    let upstream = start_mock_upstream(503, "Service Unavailable").await;
    let gateway = start_gateway(gateway_config(&upstream.url())).await;

    let res = client().post(gateway.endpoint()).json(&json!({})).send().await.unwrap();

    assert_eq!(res.status(), 503);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"error": "Proxy Error", "message": "Service Unavailable", "status": 503})
    );
    assert_eq!(upstream.received().len(), 1);
}

#[tokio::test]
async fn test_silent_upstream_times_out() {
    let upstream =
        common::start_programmable_upstream(|_, _| std::future::pending::<(u16, String)>()).await;
    let mut config = gateway_config(&upstream.url());
    config.upstream.timeout_ms = 300;
    let gateway = start_gateway(config).await;

    let start = Instant::now();
    let res = client()
        .post(gateway.endpoint())
        .header(header::ORIGIN, ALLOWED_ORIGIN)
        .json(&json!({"x": 1}))
        .send()
        .await
        .unwrap();

    assert!(start.elapsed() >= Duration::from_millis(300));
    assert_eq!(res.status(), 504);
    assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], ALLOWED_ORIGIN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Gateway Timeout");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    let url = format!("http://{}/exec", common::closed_addr());
    let gateway = start_gateway(gateway_config(&url)).await;

    let res = client()
        .post(gateway.endpoint())
        .header(header::ORIGIN, ALLOWED_ORIGIN)
        .json(&json!({"x": 1}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 502);
    assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], ALLOWED_ORIGIN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Bad Gateway");
}

#[tokio::test]
async fn test_unresolvable_upstream_is_bad_gateway() {
    let mut config = gateway_config("http://no-such-host.invalid/exec");
    config.upstream.timeout_ms = 5_000;
    let gateway = start_gateway(config).await;

    let res = client()
        .post(gateway.endpoint())
        .header(header::ORIGIN, ALLOWED_ORIGIN)
        .json(&json!({"x": 1}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 502);
    assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], ALLOWED_ORIGIN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Bad Gateway");
    assert_eq!(body["message"], "Unable to reach upstream service");
}

#[tokio::test]
async fn test_oversized_body_is_payload_too_large_with_cors() {
    let upstream = start_mock_upstream(200, "{}").await;
    let mut config = gateway_config(&upstream.url());
    config.security.max_body_size = 16;
    let gateway = start_gateway(config).await;

    let res = client()
        .post(gateway.endpoint())
        .header(header::ORIGIN, ALLOWED_ORIGIN)
        .json(&json!({"padding": "x".repeat(64)}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 413);
    assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], ALLOWED_ORIGIN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({"error": "Payload Too Large", "message": "Request body exceeds 16 bytes"})
    );
    assert!(upstream.received().is_empty());
}

#[tokio::test]
async fn test_query_is_appended_verbatim() {
    let upstream = start_mock_upstream(200, "{}").await;
    let gateway = start_gateway(gateway_config(&upstream.url())).await;
    let client = client();

    client
        .post(format!("{}?a=1&b=2", gateway.endpoint()))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    client
        .post(format!("{}?tag=x&tag=y", gateway.endpoint()))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    client.post(gateway.endpoint()).json(&json!({})).send().await.unwrap();

    let queries: Vec<_> = upstream.received().into_iter().map(|r| r.query).collect();
    assert_eq!(
        queries,
        vec![Some("a=1&b=2".to_string()), Some("tag=x&tag=y".to_string()), None]
    );
}

#[tokio::test]
async fn test_no_origin_is_forwarded_without_allow_origin() {
    let upstream = start_mock_upstream(200, r#"{"ok":true}"#).await;
    let gateway = start_gateway(gateway_config(&upstream.url())).await;

    let res = client().post(gateway.endpoint()).json(&json!({"x": 1})).send().await.unwrap();

    assert_eq!(res.status(), 200);
    assert!(res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert_eq!(upstream.received().len(), 1);
}

#[tokio::test]
async fn test_no_origin_uses_fallback_when_configured() {
    let upstream = start_mock_upstream(200, "{}").await;
    let mut config = gateway_config(&upstream.url());
    config.cors.fallback_origin = Some(ALLOWED_ORIGIN.to_string());
    let gateway = start_gateway(config).await;

    let res = client().post(gateway.endpoint()).json(&json!({})).send().await.unwrap();
    assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], ALLOWED_ORIGIN);
}

#[tokio::test]
async fn test_plain_text_json_body_is_forwarded() {
    let upstream = start_mock_upstream(200, "{}").await;
    let gateway = start_gateway(gateway_config(&upstream.url())).await;

    let res = client()
        .post(gateway.endpoint())
        .header(header::ORIGIN, ALLOWED_ORIGIN)
        .header(header::CONTENT_TYPE, "text/plain;charset=UTF-8")
        .body(r#"{"name":"Son","items":[1,2]}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(
        upstream.received()[0].body,
        json!({"name": "Son", "items": [1, 2]})
    );
}

#[tokio::test]
async fn test_empty_body_is_forwarded_as_empty_object() {
    let upstream = start_mock_upstream(200, "{}").await;
    let gateway = start_gateway(gateway_config(&upstream.url())).await;

    let res = client().post(gateway.endpoint()).send().await.unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(upstream.received()[0].body, json!({}));
}

#[tokio::test]
async fn test_non_json_upstream_body_becomes_string() {
    let upstream = start_mock_upstream(200, "Thanks!").await;
    let gateway = start_gateway(gateway_config(&upstream.url())).await;

    let res = client().post(gateway.endpoint()).json(&json!({})).send().await.unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.json::<Value>().await.unwrap(), json!("Thanks!"));
}

#[tokio::test]
async fn test_redirects_are_followed() {
    let upstream = start_mock_upstream(200, "{}").await;
    let gateway = start_gateway(gateway_config(&format!("http://{}/moved", upstream.addr))).await;

    let res = client().post(gateway.endpoint()).json(&json!({})).send().await.unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"followed": true}));
}

#[tokio::test]
async fn test_response_carries_request_id() {
    let upstream = start_mock_upstream(200, "{}").await;
    let gateway = start_gateway(gateway_config(&upstream.url())).await;

    let res = client().post(gateway.endpoint()).json(&json!({})).send().await.unwrap();
    assert!(res.headers().contains_key("x-request-id"));

    let res = client()
        .post(gateway.endpoint())
        .header("x-request-id", "caller-supplied")
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "caller-supplied");
}
