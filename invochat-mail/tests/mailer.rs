use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;

use invochat_mail::{MailError, Mailer, SendRequest};

fn mailer_for(server: &MockServer) -> Mailer {
    Mailer::builder()
        .api_key("test-key")
        .sender_email("agent@example.com")
        .base_url(server.base_url())
        .backoff(Duration::from_millis(10))
        .build()
        .unwrap()
}

fn plain_request() -> SendRequest {
    SendRequest {
        to_emails: "a@example.com, b@example.com".to_string(),
        subject: "Invoice Report".to_string(),
        body: "Hi,\n\nPlease find the report attached.".to_string(),
        attachments_json: "[]".to_string(),
    }
}

#[tokio::test]
async fn sends_plain_text_email_with_all_recipients() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v3/smtp/email")
            .header("api-key", "test-key")
            .json_body_partial(
                json!({
                    "sender": {"email": "agent@example.com", "name": "Invoice Agent"},
                    "to": [{"email": "a@example.com"}, {"email": "b@example.com"}],
                    "subject": "Invoice Report"
                })
                .to_string(),
            );
        then.status(201).json_body(json!({"messageId": "<msg-1>"}));
    });

    let receipt = mailer_for(&server).send(&plain_request()).await.unwrap();

    mock.assert();
    assert_eq!(receipt.message_id, "<msg-1>");
}

#[tokio::test]
async fn gives_up_after_three_transient_failures() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/v3/smtp/email");
        then.status(503).body("unavailable");
    });

    let error = mailer_for(&server).send(&plain_request()).await.unwrap_err();

    mock.assert_hits(3);
    assert!(matches!(error, MailError::RetriesExhausted));
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/v3/smtp/email");
        then.status(400).body("bad payload");
    });

    let error = mailer_for(&server).send(&plain_request()).await.unwrap_err();

    mock.assert_hits(1);
    assert!(matches!(error, MailError::Api { status: 400, .. }));
}

#[tokio::test]
async fn unreachable_attachments_are_skipped_not_fatal() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/files/report.csv");
        then.status(404);
    });
    // A payload that still carries an attachment key would be a bug.
    server.mock(|when, then| {
        when.method(POST)
            .path("/v3/smtp/email")
            .body_contains("\"attachment\"");
        then.status(400).body("unexpected attachment");
    });
    let send = server.mock(|when, then| {
        when.method(POST).path("/v3/smtp/email");
        then.status(201).json_body(json!({"messageId": "<msg-3>"}));
    });

    let mut request = plain_request();
    request.attachments_json = json!([
        {"url": server.url("/files/report.csv"), "filename": "report.csv"}
    ])
    .to_string();

    let receipt = mailer_for(&server).send(&request).await.unwrap();
    assert_eq!(receipt.message_id, "<msg-3>");
    send.assert_hits(1);
}

#[tokio::test]
async fn attachments_are_downloaded_and_base64_encoded() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/files/report.csv");
        then.status(200).body("a,b\r\n1,2\r\n");
    });
    let send = server.mock(|when, then| {
        when.method(POST).path("/v3/smtp/email").json_body_partial(
            json!({
                "attachment": [{
                    "name": "report.csv",
                    "content": "YSxiDQoxLDINCg=="
                }]
            })
            .to_string(),
        );
        then.status(201).json_body(json!({"messageId": "<msg-4>"}));
    });

    let mut request = plain_request();
    request.attachments_json = json!([
        {"url": server.url("/files/report.csv"), "filename": "report.csv"}
    ])
    .to_string();

    mailer_for(&server).send(&request).await.unwrap();
    send.assert_hits(1);
}

#[tokio::test]
async fn empty_recipient_list_is_rejected() {
    let server = MockServer::start();
    let mut request = plain_request();
    request.to_emails = " , ".to_string();

    let error = mailer_for(&server).send(&request).await.unwrap_err();
    assert!(matches!(error, MailError::NoRecipients));
}

#[tokio::test]
async fn non_list_attachments_json_is_rejected() {
    let server = MockServer::start();
    let mut request = plain_request();
    request.attachments_json = "{\"url\": \"x\"}".to_string();

    let error = mailer_for(&server).send(&request).await.unwrap_err();
    assert!(matches!(error, MailError::InvalidAttachments(_)));
}
