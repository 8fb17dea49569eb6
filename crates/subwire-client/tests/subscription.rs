#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod support;

use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use subwire_client::config;
use subwire_client::{Client, Subscription, SubscriptionState};
use subwire_core::error::{SubwireError, TerminalState};

use support::{data, init_tracing, ScriptedDialer, KA};

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct Point {
    x: i64,
}

async fn streaming(dialer: &ScriptedDialer) -> Subscription {
    init_tracing();
    Client::new(Router::new(), [])
        .subscribe_via(dialer, "subscription { point { x } }", None, &[])
        .await
        .unwrap()
}

#[tokio::test]
async fn data_frame_decodes_into_destination() {
    let dialer = ScriptedDialer::streaming([data(r#"{"data":{"x":1}}"#)]);
    let mut sub = streaming(&dialer).await;

    let mut point = Point::default();
    sub.next(&mut point).await.unwrap();

    assert_eq!(point, Point { x: 1 });
    assert_eq!(sub.state(), SubscriptionState::Streaming);
}

#[tokio::test]
async fn partial_data_and_remote_errors_arrive_together() {
    let dialer =
        ScriptedDialer::streaming([data(r#"{"data":{"x":1},"errors":[{"message":"boom"}]}"#)]);
    let mut sub = streaming(&dialer).await;

    let mut point = Point::default();
    let err = sub.next(&mut point).await.unwrap_err();

    assert_eq!(point, Point { x: 1 });
    let remote = err.as_remote().expect("remote error");
    let raw: Value = serde_json::from_str(remote.raw()).unwrap();
    assert_eq!(raw, json!([{"message": "boom"}]));
    assert_eq!(remote.entries().unwrap()[0].message, "boom");
}

#[tokio::test]
async fn shape_mismatch_wins_over_remote_errors() {
    let dialer = ScriptedDialer::streaming([data(
        r#"{"data":{"x":1,"extra":true},"errors":[{"message":"boom"}]}"#,
    )]);
    let mut sub = streaming(&dialer).await;

    let mut point = Point::default();
    let err = sub.next(&mut point).await.unwrap_err();
    assert_eq!(err.code().as_str(), "DECODE");
    assert_eq!(point, Point { x: 1 });
    assert_eq!(sub.state(), SubscriptionState::Streaming);
}

#[tokio::test]
async fn error_frame_text_passes_through() {
    let dialer = ScriptedDialer::streaming([
        r#"{"type":"error","id":"1","payload":"boom"}"#.to_string(),
        data(r#"{"data":{"x":2}}"#),
    ]);
    let mut sub = streaming(&dialer).await;

    let mut point = Point::default();
    let err = sub.next(&mut point).await.unwrap_err();
    assert_eq!(err.to_string(), "boom");

    // the stream is not torn down by an error frame
    assert_eq!(sub.state(), SubscriptionState::Streaming);
    sub.next(&mut point).await.unwrap();
    assert_eq!(point, Point { x: 2 });
}

#[tokio::test]
async fn unknown_frame_type_is_a_protocol_violation() {
    let dialer = ScriptedDialer::streaming([r#"{"type":"unknown_type","id":"1"}"#]);
    let mut sub = streaming(&dialer).await;

    let mut point = Point::default();
    let err = sub.next(&mut point).await.unwrap_err();
    match err {
        SubwireError::ProtocolViolation { got } => assert_eq!(got, "unknown_type"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn keepalive_while_streaming_is_a_violation_in_strict_mode() {
    let dialer = ScriptedDialer::streaming([KA]);
    let mut sub = streaming(&dialer).await;

    let mut point = Point::default();
    let err = sub.next(&mut point).await.unwrap_err();
    assert!(matches!(err, SubwireError::ProtocolViolation { got } if got == "ka"));
}

#[tokio::test]
async fn keepalive_while_streaming_is_skipped_in_tolerant_mode() {
    let cfg = config::load_from_str("version: 1\nsession:\n  keepalive: tolerant\n").unwrap();
    let dialer = ScriptedDialer::streaming([
        KA.to_string(),
        KA.to_string(),
        data(r#"{"data":{"x":5}}"#),
    ]);

    let mut sub = Client::new(Router::new(), [])
        .with_config(cfg)
        .subscribe_via(&dialer, "subscription { point { x } }", None, &[])
        .await
        .unwrap();

    let mut point = Point::default();
    sub.next(&mut point).await.unwrap();
    assert_eq!(point, Point { x: 5 });
}

#[tokio::test]
async fn close_is_idempotent() {
    let dialer = ScriptedDialer::streaming(Vec::<String>::new());
    let mut sub = streaming(&dialer).await;

    sub.close().await.unwrap();
    sub.close().await.unwrap();

    assert_eq!(sub.state(), SubscriptionState::Closed);
    assert_eq!(dialer.probe.closes(), 1);
}

#[tokio::test]
async fn next_after_close_fails_without_blocking() {
    let dialer = ScriptedDialer::streaming([data(r#"{"data":{"x":1}}"#)]);
    let mut sub = streaming(&dialer).await;
    sub.close().await.unwrap();

    let mut point = Point::default();
    let err = sub.next(&mut point).await.unwrap_err();
    assert!(matches!(
        err,
        SubwireError::Terminal {
            state: TerminalState::Closed,
            ..
        }
    ));
    assert_eq!(point, Point::default());
}

#[tokio::test]
async fn transport_failure_moves_to_failed_and_releases() {
    let dialer = ScriptedDialer::streaming(Vec::<String>::new());
    let mut sub = streaming(&dialer).await;

    let mut point = Point::default();
    let err = sub.next(&mut point).await.unwrap_err();
    assert_eq!(err.code().as_str(), "READ");
    assert_eq!(sub.state(), SubscriptionState::Failed);
    assert_eq!(dialer.probe.closes(), 1);

    let err = sub.next(&mut point).await.unwrap_err();
    assert!(matches!(
        err,
        SubwireError::Terminal {
            state: TerminalState::Failed,
            ..
        }
    ));
    sub.close().await.unwrap();
    assert_eq!(dialer.probe.closes(), 1);
}

#[tokio::test]
async fn data_without_payload_leaves_destination_alone() {
    let dialer = ScriptedDialer::streaming([r#"{"type":"data","id":"1"}"#]);
    let mut sub = streaming(&dialer).await;

    let mut point = Point { x: 7 };
    sub.next(&mut point).await.unwrap();
    assert_eq!(point, Point { x: 7 });
}

#[tokio::test]
async fn failed_subscription_reports_its_cause() {
    let sub_err = SubwireError::Dial("connection refused".into());
    let mut sub = Subscription::failed(&sub_err);

    let mut point = Point::default();
    let err = sub.next(&mut point).await.unwrap_err();
    assert!(err.to_string().contains("connection refused"));
    sub.close().await.unwrap();
    sub.close().await.unwrap();
}
