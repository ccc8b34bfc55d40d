//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use plotbook_core::{
  booking::Booking,
  catalog::{CatalogConfig, build_catalog},
  change::{BOOKINGS_TABLE, ChangeKind},
  plot::PlotStatus,
  projection::merge,
};
use plotbook_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{ChangeFeed, api_router};

async fn app() -> (axum::Router, ChangeFeed) {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let changes = ChangeFeed::default();
  (api_router(Arc::new(store), changes.clone()), changes)
}

async fn send(
  app:     &axum::Router,
  method:  &str,
  uri:     &str,
  headers: Vec<(header::HeaderName, &str)>,
  body:    Body,
) -> axum::response::Response {
  let mut builder = Request::builder().method(method).uri(uri);
  for (k, v) in headers {
    builder = builder.header(k, v);
  }
  app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

async fn post_json(app: &axum::Router, uri: &str, body: Value) -> axum::response::Response {
  send(
    app,
    "POST",
    uri,
    vec![(header::CONTENT_TYPE, "application/json")],
    Body::from(body.to_string()),
  )
  .await
}

async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
  axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap()
    .to_vec()
}

fn jane(plot_id: &str, block: &str, number: u32) -> Value {
  json!({
    "plot_id": plot_id,
    "block_id": block,
    "plot_number": number,
    "booked_by": "Jane Doe",
    "contact_info": "jane@example.com",
    "phone": "5550101234",
    "visit_date": "2025-06-14",
    "note": null
  })
}

// ── Bookings ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_starts_empty() {
  let (app, _) = app().await;
  let resp = send(&app, "GET", "/bookings", vec![], Body::empty()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let bookings: Vec<Booking> = serde_json::from_slice(&body_bytes(resp).await).unwrap();
  assert!(bookings.is_empty());
}

#[tokio::test]
async fn create_returns_201_and_lists_booking() {
  let (app, _) = app().await;
  let resp = post_json(&app, "/bookings", jane("A-1", "A", 1)).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let created: Booking = serde_json::from_slice(&body_bytes(resp).await).unwrap();
  assert_eq!(created.plot_id, "A-1");
  assert_eq!(created.visit_date.unwrap().to_string(), "2025-06-14");

  let resp = send(&app, "GET", "/bookings", vec![], Body::empty()).await;
  let bookings: Vec<Booking> = serde_json::from_slice(&body_bytes(resp).await).unwrap();
  assert_eq!(bookings, vec![created]);
}

#[tokio::test]
async fn create_publishes_insert_event() {
  let (app, changes) = app().await;
  let mut rx = changes.subscribe();

  let resp = post_json(&app, "/bookings", jane("B-12", "B", 12)).await;
  let created: Booking = serde_json::from_slice(&body_bytes(resp).await).unwrap();

  let event = rx.try_recv().unwrap();
  assert_eq!(event.kind, ChangeKind::Insert);
  assert_eq!(event.table, BOOKINGS_TABLE);
  assert_eq!(event.booking_id, Some(created.id));
}

#[tokio::test]
async fn create_rejects_inconsistent_plot_identity() {
  let (app, changes) = app().await;
  let mut rx = changes.subscribe();

  let resp = post_json(&app, "/bookings", jane("A-1", "B", 1)).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
  assert!(body["error"].as_str().unwrap().contains("A-1"));
  assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn create_stores_loose_plot_id_in_canonical_form() {
  let (app, _) = app().await;
  let resp = post_json(&app, "/bookings", jane("a-01", "a", 1)).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let created: Booking = serde_json::from_slice(&body_bytes(resp).await).unwrap();
  assert_eq!((created.plot_id.as_str(), created.block_id.as_str()), ("A-1", "A"));

  let resp = send(&app, "GET", "/bookings", vec![], Body::empty()).await;
  let bookings: Vec<Booking> = serde_json::from_slice(&body_bytes(resp).await).unwrap();
  let catalog = build_catalog(&CatalogConfig::default());
  let plots = merge(&catalog, &bookings);
  let a1 = plots.iter().find(|p| p.id.to_string() == "A-1").unwrap();
  assert_eq!(a1.status, PlotStatus::Booked);
  assert_eq!(a1.booking_info.as_ref().unwrap().booked_by, "Jane Doe");
}

#[tokio::test]
async fn create_rejects_blank_name() {
  let (app, _) = app().await;
  let mut body = jane("C-3", "C", 3);
  body["booked_by"] = json!("   ");
  let resp = post_json(&app, "/bookings", body).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ── Documents ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn document_upload_then_download() {
  let (app, _) = app().await;
  let resp = send(
    &app,
    "PUT",
    "/documents/1-govid.png",
    vec![(header::CONTENT_TYPE, "image/png")],
    Body::from(vec![0x89, b'P', b'N', b'G']),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let resp = send(&app, "GET", "/documents/1-govid.png", vec![], Body::empty()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(
    resp.headers().get(header::CONTENT_TYPE).unwrap(),
    "image/png"
  );
  let modified = resp.headers().get(header::LAST_MODIFIED).unwrap();
  assert!(modified.to_str().unwrap().ends_with(" GMT"));
  assert_eq!(body_bytes(resp).await, vec![0x89, b'P', b'N', b'G']);
}

#[tokio::test]
async fn second_upload_to_same_key_conflicts() {
  let (app, _) = app().await;
  for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
    let resp = send(
      &app,
      "PUT",
      "/documents/2-govid.pdf",
      vec![],
      Body::from("%PDF"),
    )
    .await;
    assert_eq!(resp.status(), expected);
  }
}

#[tokio::test]
async fn racing_uploads_to_one_key_yield_one_conflict() {
  let (app, _) = app().await;
  let app = &app;
  let put = move |byte: u8| {
    send(app, "PUT", "/documents/3-govid.png", vec![], Body::from(vec![byte]))
  };
  let (a, b) = tokio::join!(put(1), put(2));

  let mut statuses = [a.status(), b.status()];
  statuses.sort();
  assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
  let loser = if a.status() == StatusCode::CONFLICT { a } else { b };
  let body: Value = serde_json::from_slice(&body_bytes(loser).await).unwrap();
  assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn missing_document_is_404_json() {
  let (app, _) = app().await;
  let resp = send(&app, "GET", "/documents/9-govid.pdf", vec![], Body::empty()).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  let body: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
  assert!(body["error"].is_string());
}

// ── Change feed ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn change_feed_is_an_event_stream() {
  let (app, changes) = app().await;
  let resp = send(&app, "GET", "/changes", vec![], Body::empty()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let ct = resp.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
  assert!(ct.starts_with("text/event-stream"), "Content-Type: {ct}");
  assert_eq!(changes.subscriber_count(), 1);
}
