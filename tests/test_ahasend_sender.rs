mod support;

use ahasend_relay_lib::{
    mapper, AhaSend, DeliveryOutcome, OutgoingMailRequest, ProviderMessage, ReplyTo, Sender,
    SenderConfig,
};
use serde_json::json;
use uuid::Uuid;

use support::{refused_url, MockServer};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn config(api_url: &str) -> SenderConfig {
    SenderConfig {
        api_key: "key-1".into(),
        account_id: "acc-1".into(),
        from_name: "Site".into(),
        from_email: "site@x.com".into(),
        api_url: Some(api_url.into()),
        timeout: Some(5),
        ..SenderConfig::default()
    }
}

fn message(config: &SenderConfig) -> ProviderMessage {
    let req = OutgoingMailRequest::new(vec!["a@x.com", "b@x.com"], "Hello", "Hi\nthere")
        .headers("Reply-To: Jane <jane@x.com>");
    mapper::build(&req, config)
}

#[test]
fn test_delivered_with_message_ids() {
    init_logger();

    let server = MockServer::respond(200, r#"{"data":[{"id":"m1"},{"id":"m2"}]}"#);
    let config = config(server.url());
    let msg = message(&config);

    let outcome = AhaSend::new(&config).send(&msg);
    assert_eq!(
        DeliveryOutcome::Delivered {
            response: r#"{"data":[{"id":"m1"},{"id":"m2"}]}"#.into(),
            message_ids: vec!["m1".into(), "m2".into()],
        },
        outcome
    );

    let req = server.request();
    assert_eq!("POST /v2/accounts/acc-1/messages HTTP/1.1", req.request_line);
    assert_eq!(Some("Bearer key-1"), req.header("Authorization"));
    assert_eq!(Some("application/json"), req.header("Content-Type"));

    let key = req.header("Idempotency-Key").unwrap();
    assert!(Uuid::parse_str(key).is_ok());

    let body: serde_json::Value = serde_json::from_str(&req.body).unwrap();
    assert_eq!(
        json!({
            "from": { "name": "Site", "email": "site@x.com" },
            "recipients": [
                { "name": "", "email": "a@x.com" },
                { "name": "", "email": "b@x.com" },
            ],
            "subject": "Hello",
            "text_content": "Hi\nthere",
            "html_content": "Hi<br>there",
            "reply_to": { "name": "Jane", "email": "jane@x.com" },
        }),
        body
    );
}

#[test]
fn test_delivered_with_malformed_body() {
    init_logger();

    let server = MockServer::respond(202, "queued");
    let config = config(server.url());

    let outcome = AhaSend::new(&config).send(&message(&config));
    assert_eq!(
        DeliveryOutcome::Delivered {
            response: "queued".into(),
            message_ids: vec![],
        },
        outcome
    );
    server.request();
}

#[test]
fn test_rejected() {
    init_logger();

    let server = MockServer::respond(422, r#"{"error":"invalid"}"#);
    let config = config(server.url());

    let outcome = AhaSend::new(&config).send(&message(&config));
    assert_eq!(
        DeliveryOutcome::Rejected {
            status: 422,
            response: r#"{"error":"invalid"}"#.into(),
        },
        outcome
    );
    server.request();
}

#[test]
fn test_server_error_without_body() {
    init_logger();

    let server = MockServer::respond(500, "");
    let config = config(server.url());

    let outcome = AhaSend::new(&config).send(&message(&config));
    assert_eq!(
        DeliveryOutcome::Rejected {
            status: 500,
            response: "".into(),
        },
        outcome
    );
    server.request();
}

#[test]
fn test_transport_failed() {
    init_logger();

    let config = config(&refused_url());
    let outcome = AhaSend::new(&config).send(&message(&config));

    match outcome {
        DeliveryOutcome::TransportFailed(err) => assert!(!err.is_empty()),
        outcome => panic!("expected a transport failure, got {:?}", outcome),
    }
}

#[test]
fn test_fresh_idempotency_key_per_call() {
    init_logger();

    let keys: Vec<String> = (0..2)
        .map(|_| {
            let server = MockServer::respond(200, r#"{"data":[{"id":"m1"}]}"#);
            let config = config(server.url());
            AhaSend::new(&config).send(&message(&config));
            server
                .request()
                .header("Idempotency-Key")
                .unwrap()
                .to_owned()
        })
        .collect();

    assert_ne!(keys[0], keys[1]);
}

#[test]
fn test_forced_reply_to_payload() {
    init_logger();

    let server = MockServer::respond(200, r#"{"data":[]}"#);
    let config = SenderConfig {
        reply_to: Some(ReplyTo::new("", "support@x.com")),
        force_reply_to: true,
        ..config(server.url())
    };

    let outcome = AhaSend::new(&config).send(&message(&config));
    assert_eq!(
        DeliveryOutcome::Delivered {
            response: r#"{"data":[]}"#.into(),
            message_ids: vec![],
        },
        outcome
    );

    let body: serde_json::Value = serde_json::from_str(&server.request().body).unwrap();
    assert_eq!(json!({ "email": "support@x.com" }), body["reply_to"]);
}
