//! Integration tests for the combined router.

use std::sync::{Arc, Mutex};

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use plotbook_api::ChangeFeed;
use plotbook_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{
  RelayConfig,
  mailer::{MailError, Mailer, OutgoingEmail},
  relay::RelayState,
  router,
};

#[derive(Default)]
struct RecordingMailer {
  sent: Mutex<Vec<OutgoingEmail>>,
  fail: bool,
}

impl Mailer for RecordingMailer {
  async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
    if self.fail {
      return Err(MailError::Rejected { status: 422, body: "invalid from".into() });
    }
    self.sent.lock().unwrap().push(email.clone());
    Ok(())
  }
}

async fn app(mailer: Arc<RecordingMailer>) -> axum::Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let relay = RelayState {
    mailer,
    config: Arc::new(RelayConfig {
      admin_email: "owner@plots.test".into(),
      ..RelayConfig::default()
    }),
  };
  router(Arc::new(store), ChangeFeed::default(), relay)
}

async fn oneshot_raw(
  app:     axum::Router,
  method:  &str,
  uri:     &str,
  headers: Vec<(&str, &str)>,
  body:    &str,
) -> axum::response::Response {
  let mut builder = Request::builder().method(method).uri(uri);
  for (k, v) in headers {
    builder = builder.header(k, v);
  }
  let req = builder.body(Body::from(body.to_string())).unwrap();
  app.oneshot(req).await.unwrap()
}

async fn json_body(resp: axum::response::Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

fn payload() -> String {
  json!({
    "plot": { "id": "A-7", "block": "A", "number": 7, "size": 100 },
    "booking": {
      "id": 3,
      "plot_id": "A-7",
      "block_id": "A",
      "plot_number": 7,
      "booked_by": "Jane Doe",
      "contact_info": "jane@example.com",
      "phone": "5550101234",
      "visit_date": "2025-05-02",
      "note": null
    },
    "hasDocument": true
  })
  .to_string()
}

// ── Relay ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn notify_sends_one_email_to_admin() {
  let mailer = Arc::new(RecordingMailer::default());
  let resp = oneshot_raw(
    app(mailer.clone()).await,
    "POST",
    "/notify-booking",
    vec![("content-type", "application/json"), ("origin", "http://localhost:5173")],
    &payload(),
  )
  .await;

  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(
    resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
    "*"
  );
  assert_eq!(json_body(resp).await, json!({ "success": true }));

  let sent = mailer.sent.lock().unwrap();
  assert_eq!(sent.len(), 1);
  assert_eq!(sent[0].to, vec!["owner@plots.test".to_string()]);
  assert_eq!(sent[0].subject, "New Plot Booking: A-7 in Block A");
  assert!(sent[0].html.contains("Government ID"));
  assert!(sent[0].html.contains("May 2, 2025"));
}

#[tokio::test]
async fn malformed_payload_is_400_with_error() {
  let mailer = Arc::new(RecordingMailer::default());
  let resp = oneshot_raw(
    app(mailer.clone()).await,
    "POST",
    "/notify-booking",
    vec![("content-type", "application/json")],
    r#"{"plot": {}}"#,
  )
  .await;

  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(json_body(resp).await["error"].is_string());
  assert!(mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn mail_failure_is_500_with_error() {
  let mailer = Arc::new(RecordingMailer { fail: true, ..Default::default() });
  let resp = oneshot_raw(
    app(mailer).await,
    "POST",
    "/notify-booking",
    vec![("content-type", "application/json"), ("origin", "http://localhost:5173")],
    &payload(),
  )
  .await;

  assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
  assert!(resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
  let body = json_body(resp).await;
  assert!(body["error"].as_str().unwrap().contains("422"));
}

#[tokio::test]
async fn preflight_returns_permissive_headers() {
  let resp = oneshot_raw(
    app(Arc::new(RecordingMailer::default())).await,
    "OPTIONS",
    "/notify-booking",
    vec![
      ("origin", "https://plots.example"),
      ("access-control-request-method", "POST"),
      ("access-control-request-headers", "content-type, apikey, x-client-info"),
    ],
    "",
  )
  .await;

  assert!(resp.status().is_success());
  let headers = resp.headers();
  assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
  let allowed = headers
    .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
    .unwrap()
    .to_str()
    .unwrap();
  for h in ["authorization", "x-client-info", "apikey", "content-type"] {
    assert!(allowed.contains(h), "allow-headers: {allowed}");
  }
}

#[tokio::test]
async fn bare_options_is_ok() {
  let resp = oneshot_raw(
    app(Arc::new(RecordingMailer::default())).await,
    "OPTIONS",
    "/notify-booking",
    vec![],
    "",
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
}

// ── API mount ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn booking_api_is_nested_under_api() {
  let app = app(Arc::new(RecordingMailer::default())).await;
  let resp = oneshot_raw(app.clone(), "GET", "/api/bookings", vec![], "").await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await, json!([]));

  let resp = oneshot_raw(app, "GET", "/bookings", vec![], "").await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
