//! Integration tests for the HTTP clients against an in-process fake API.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, patch, post, put};
use serde_json::{Value, json};

use synctime_api::{
    ApiClient, CalendarLookup, HttpCalendarApi, HttpNotificationApi, NotificationRemote,
};
use synctime_core::config::api::ApiConfig;
use synctime_core::error::ErrorKind;
use synctime_core::types::id::{NoteId, NotificationId, RoutineId, UserId};

/// One request observed by the fake backend.
#[derive(Debug, Clone)]
struct Seen {
    route: String,
    auth: Option<String>,
    body: Option<Value>,
}

#[derive(Clone, Default)]
struct FakeApi {
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl FakeApi {
    fn record(&self, route: &str, headers: &HeaderMap, body: Option<Value>) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.seen.lock().unwrap().push(Seen {
            route: route.to_string(),
            auth,
            body,
        });
    }

    fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

async fn notification_by_id(
    State(api): State<FakeApi>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    if query.get("isListAll").map(String::as_str) == Some("true") {
        api.record(&format!("list:{id}:{}", query["order"]), &headers, None);
        return Ok(Json(json!({
            "data": [
                {"id": 2, "title": "Conta criada", "createdAt": "2026-10-14T10:00:00Z",
                 "isRead": false, "entity": "Conta", "path": "/accounts"},
                {"id": 1, "title": "Nota criada", "createdAt": "2026-10-13T10:00:00Z",
                 "isRead": true, "entity": "Nota", "idEntity": 40}
            ]
        })));
    }
    api.record(&format!("get:{id}"), &headers, None);
    if id == "404" {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(json!({
        "id": id, "text": "Único", "createdAt": "2026-10-14T10:00:00Z", "entity": "Report"
    })))
}

async fn mark_read(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    api.record("mark-read", &headers, Some(body));
    StatusCode::NO_CONTENT
}

async fn delete(State(api): State<FakeApi>, headers: HeaderMap, Json(body): Json<Value>) -> StatusCode {
    api.record("delete", &headers, Some(body));
    StatusCode::OK
}

async fn unseen_count(State(api): State<FakeApi>, headers: HeaderMap) -> Json<Value> {
    api.record("count", &headers, None);
    Json(json!({"count": 3}))
}

async fn mark_all_seen(State(api): State<FakeApi>, headers: HeaderMap) -> StatusCode {
    api.record("seen-all", &headers, None);
    StatusCode::OK
}

async fn note(Path(id): Path<String>) -> Json<Value> {
    Json(json!({"data": {"id": id, "routineId": 77}}))
}

async fn routine(Path(id): Path<String>) -> Result<Json<Value>, StatusCode> {
    if id == "0" {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(json!({"id": id, "date": "2026-10-14T00:00:00.000Z"})))
}

async fn spawn_fake() -> (FakeApi, ApiClient) {
    let api = FakeApi::default();
    let app = Router::new()
        .route("/notification/{id}", get(notification_by_id))
        .route("/notification/mark-read", patch(mark_read))
        .route("/notification/delete", post(delete))
        .route("/notification/count/new-notification", get(unseen_count))
        .route(
            "/notification/mark-read-new-notification-all",
            put(mark_all_seen),
        )
        .route("/note/{id}", get(note))
        .route("/routine/{id}", get(routine))
        .with_state(api.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = ApiClient::new(&ApiConfig {
        base_url: format!("http://{addr}/"),
        token: Some("secret-token".to_string()),
        request_timeout_seconds: 5,
    })
    .unwrap();

    (api, client)
}

#[tokio::test]
async fn test_list_unwraps_envelope_and_sends_bearer() {
    let (fake, client) = spawn_fake().await;
    let api = HttpNotificationApi::new(client);

    let records = api.list(&UserId::from("u-1")).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id.as_str(), "2");
    assert_eq!(records[1].entity, "Nota");
    let seen = fake.seen();
    assert_eq!(seen[0].route, "list:u-1:DESC");
    assert_eq!(seen[0].auth.as_deref(), Some("Bearer secret-token"));
}

#[tokio::test]
async fn test_get_one_and_not_found() {
    let (_fake, client) = spawn_fake().await;
    let api = HttpNotificationApi::new(client);

    let record = api.get(&NotificationId::from("9")).await.unwrap();
    assert_eq!(record.text, "Único");

    let err = api.get(&NotificationId::from("404")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_mark_read_and_delete_send_id_bodies() {
    let (fake, client) = spawn_fake().await;
    let api = HttpNotificationApi::new(client);

    let ids = vec![NotificationId::from("1"), NotificationId::from("2")];
    api.mark_read(&ids).await.unwrap();
    api.delete(&ids[..1]).await.unwrap();

    let seen = fake.seen();
    assert_eq!(seen[0].route, "mark-read");
    assert_eq!(seen[0].body, Some(json!({"ids": ["1", "2"]})));
    assert_eq!(seen[1].route, "delete");
    assert_eq!(seen[1].body, Some(json!({"ids": ["1"]})));
}

#[tokio::test]
async fn test_empty_id_list_is_rejected_locally() {
    let (fake, client) = spawn_fake().await;
    let api = HttpNotificationApi::new(client);

    let err = api.delete(&[]).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(fake.seen().is_empty());
}

#[tokio::test]
async fn test_count_and_mark_all_seen() {
    let (fake, client) = spawn_fake().await;
    let api = HttpNotificationApi::new(client);

    assert_eq!(api.unseen_count().await.unwrap(), 3);
    api.mark_all_seen().await.unwrap();

    let routes: Vec<String> = fake.seen().into_iter().map(|s| s.route).collect();
    assert_eq!(routes, vec!["count".to_string(), "seen-all".to_string()]);
}

#[tokio::test]
async fn test_calendar_lookups() {
    let (_fake, client) = spawn_fake().await;
    let api = HttpCalendarApi::new(client);

    let note = api.note(&NoteId::from("40")).await.unwrap();
    assert_eq!(note.parent_routine(), Some(&RoutineId::from("77")));

    let routine = api.routine(&RoutineId::from("77")).await.unwrap();
    assert_eq!(
        routine.day(),
        chrono::NaiveDate::from_ymd_opt(2026, 10, 14)
    );

    let err = api.routine(&RoutineId::from("0")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::ExternalService);
}

#[tokio::test]
async fn test_unreachable_server_is_transient() {
    let client = ApiClient::new(&ApiConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        token: None,
        request_timeout_seconds: 2,
    })
    .unwrap();
    let api = HttpNotificationApi::new(client);

    let err = api.unseen_count().await.unwrap_err();
    assert!(err.is_transient(), "unexpected kind {:?}", err.kind);
}
