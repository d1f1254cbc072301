//! In-process mock of the blog backend for HTTP-level tests.
//!
//! Binds an `axum` router on `127.0.0.1:0`, seeds a few posts and records
//! every request (path, method, `Authorization` header, body) so tests can
//! assert on what the client actually sent.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};
use time::OffsetDateTime;
use time::macros::datetime;

use crate::config::Timeouts;
use crate::net::api::ApiClient;
use crate::net::http::Transport;
use crate::state::{ManualClock, MemoryStorage, SessionStore};

pub(crate) const ADA_EMAIL: &str = "ada@example.test";
pub(crate) const BOB_EMAIL: &str = "bob@example.test";
pub(crate) const PASSWORD: &str = "secret";
pub(crate) const ADA_TOKEN: &str = "tok-ada";
pub(crate) const CLOCK_START: OffsetDateTime = datetime!(2025-03-10 12:00 UTC);

#[derive(Clone, Debug)]
pub(crate) struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: String,
}

#[derive(Debug)]
pub(crate) struct MockState {
    pub posts: Vec<Value>,
    pub requests: Vec<Recorded>,
    pub next_id: i64,
    /// Answer 401 to every request carrying a bearer.
    pub reject_tokens: bool,
    pub fail_logout: bool,
    pub fail_posts: bool,
}

impl MockState {
    fn seeded() -> Self {
        Self {
            posts: vec![
                post_json(1, 1, "Lisbon in spring", "Trams and tiles", Some("Travel"), "2025-03-04T10:00:00.000000Z"),
                post_json(2, 2, "Sourdough basics", "Flour, water, salt", Some("Food"), "2025-02-14T08:30:00.000000Z"),
                post_json(42, 2, "The answer", "Forty two, travel-sized", None, "2025-01-01T00:00:00.000000Z"),
            ],
            requests: Vec::new(),
            next_id: 100,
            reject_tokens: false,
            fail_logout: false,
            fail_posts: false,
        }
    }
}

pub(crate) fn user_json(id: i64) -> Value {
    match id {
        1 => json!({ "id": 1, "name": "Ada Lovelace", "email": ADA_EMAIL, "username": "ada", "bio": null }),
        _ => json!({ "id": id, "name": "Bob Stone", "email": BOB_EMAIL }),
    }
}

pub(crate) fn post_json(id: i64, user_id: i64, title: &str, content: &str, category: Option<&str>, created_at: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "content": content,
        "media": null,
        "category": category.map(|name| json!({ "name": name })),
        "user_id": user_id,
        "user": { "id": user_id, "name": user_json(user_id)["name"] },
        "created_at": created_at,
    })
}

type Shared = Arc<Mutex<MockState>>;

pub(crate) struct MockBackend {
    pub base_url: String,
    state: Shared,
}

impl MockBackend {
    pub(crate) async fn spawn() -> Self {
        let state: Shared = Arc::new(Mutex::new(MockState::seeded()));
        let app = Router::new()
            .route("/api/login", post(login))
            .route("/api/register", post(register))
            .route("/api/logout", post(logout))
            .route("/api/posts", get(list_posts).post(create_post))
            .route("/api/posts/{id}", get(show_post).delete(delete_post))
            .route("/api/posts/{id}/comments", post(create_comment))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self { base_url: format!("http://{addr}"), state }
    }

    pub(crate) fn transport(&self) -> Transport {
        Transport::new(&self.base_url, Timeouts { request_secs: 5, connect_secs: 2 }).expect("transport")
    }

    /// Session store backed by fresh memory storage and a manual clock.
    pub(crate) fn session(&self) -> (SessionStore, Arc<MemoryStorage>, ManualClock) {
        let storage = Arc::new(MemoryStorage::new());
        let clock = ManualClock::new(CLOCK_START);
        let store = SessionStore::with_clock(self.transport(), storage.clone(), Arc::new(clock.clone()));
        (store, storage, clock)
    }

    pub(crate) fn api(&self, session: &SessionStore) -> ApiClient {
        ApiClient::new(session.clone())
    }

    pub(crate) fn requests(&self) -> Vec<Recorded> {
        self.lock().requests.clone()
    }

    pub(crate) fn last_request(&self, method: &str, path: &str) -> Option<Recorded> {
        self.requests().into_iter().rev().find(|r| r.method == method && r.path == path)
    }

    pub(crate) fn update(&self, apply: impl FnOnce(&mut MockState)) {
        apply(&mut self.lock());
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

fn reply(status: StatusCode, body: Value) -> Response {
    (status, axum::Json(body)).into_response()
}

fn record<'a>(state: &'a Shared, method: Method, path: String, headers: &HeaderMap, body: &str) -> MutexGuard<'a, MockState> {
    let mut guard = state.lock().unwrap_or_else(PoisonError::into_inner);
    let authorization = headers.get("authorization").and_then(|v| v.to_str().ok()).map(ToOwned::to_owned);
    guard.requests.push(Recorded { method: method.to_string(), path, authorization, body: body.to_owned() });
    guard
}

/// Resolve the bearer to a user id, or the 401 the backend would send.
fn authenticate(guard: &MockState, headers: &HeaderMap) -> Result<i64, Response> {
    let unauthenticated = || reply(StatusCode::UNAUTHORIZED, json!({ "message": "Unauthenticated." }));
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(unauthenticated)?;
    if guard.reject_tokens {
        return Err(unauthenticated());
    }
    match bearer {
        "tok-ada" => Ok(1),
        "tok-bob" => Ok(2),
        _ => Err(unauthenticated()),
    }
}

async fn login(State(state): State<Shared>, headers: HeaderMap, body: String) -> Response {
    let _guard = record(&state, Method::POST, "/api/login".into(), &headers, &body);
    let creds: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    if creds["password"] != PASSWORD {
        return reply(StatusCode::UNAUTHORIZED, json!({ "message": "Invalid credentials." }));
    }
    match creds["email"].as_str() {
        Some(ADA_EMAIL) => reply(StatusCode::OK, json!({ "token": ADA_TOKEN, "user": user_json(1) })),
        Some(BOB_EMAIL) => reply(StatusCode::OK, json!({ "token": "tok-bob", "user": user_json(2) })),
        _ => reply(StatusCode::UNAUTHORIZED, json!({ "message": "Invalid credentials." })),
    }
}

async fn register(State(state): State<Shared>, headers: HeaderMap, body: String) -> Response {
    let _guard = record(&state, Method::POST, "/api/register".into(), &headers, &body);
    let profile: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    if profile["email"] == "taken@example.test" {
        return reply(StatusCode::UNPROCESSABLE_ENTITY, json!({ "message": "The email has already been taken." }));
    }
    reply(StatusCode::CREATED, json!({ "message": "User registered" }))
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let guard = record(&state, Method::POST, "/api/logout".into(), &headers, "");
    if guard.fail_logout {
        return reply(StatusCode::INTERNAL_SERVER_ERROR, json!({}));
    }
    reply(StatusCode::OK, json!({ "message": "Logged out" }))
}

async fn list_posts(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let guard = record(&state, Method::GET, "/api/posts".into(), &headers, "");
    if guard.fail_posts {
        return reply(StatusCode::INTERNAL_SERVER_ERROR, json!({ "message": "Server Error" }));
    }
    if guard.reject_tokens && headers.contains_key("authorization") {
        return reply(StatusCode::UNAUTHORIZED, json!({ "message": "Unauthenticated." }));
    }
    reply(StatusCode::OK, Value::Array(guard.posts.clone()))
}

async fn show_post(State(state): State<Shared>, Path(id): Path<i64>, headers: HeaderMap) -> Response {
    let guard = record(&state, Method::GET, format!("/api/posts/{id}"), &headers, "");
    let Some(post) = guard.posts.iter().find(|p| p["id"] == id) else {
        return reply(StatusCode::NOT_FOUND, json!({ "message": "Post not found." }));
    };
    let mut detail = post.clone();
    detail["comments"] = if id == 42 {
        json!([{ "id": 1, "content": "first!", "user": { "id": 1, "name": "Ada Lovelace", "username": "ada" } }])
    } else {
        json!([])
    };
    reply(StatusCode::OK, detail)
}

async fn create_post(State(state): State<Shared>, headers: HeaderMap, body: String) -> Response {
    let mut guard = record(&state, Method::POST, "/api/posts".into(), &headers, &body);
    let user_id = match authenticate(&guard, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let is_multipart = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));
    let (Some(title), Some(content)) = (multipart_field(&body, "title"), multipart_field(&body, "content")) else {
        return reply(StatusCode::UNPROCESSABLE_ENTITY, json!({ "message": "The title field is required." }));
    };
    if !is_multipart {
        return reply(StatusCode::UNSUPPORTED_MEDIA_TYPE, json!({ "message": "Expected multipart." }));
    }
    let id = guard.next_id;
    guard.next_id += 1;
    let mut post = post_json(id, user_id, &title, &content, None, "2025-03-10T12:00:00.000000Z");
    if body.contains("name=\"media\"") {
        post["media"] = json!(format!("posts/{id}.bin"));
    }
    guard.posts.push(post.clone());
    reply(StatusCode::CREATED, post)
}

async fn delete_post(State(state): State<Shared>, Path(id): Path<i64>, headers: HeaderMap) -> Response {
    let mut guard = record(&state, Method::DELETE, format!("/api/posts/{id}"), &headers, "");
    let user_id = match authenticate(&guard, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let Some(index) = guard.posts.iter().position(|p| p["id"] == id) else {
        return reply(StatusCode::NOT_FOUND, json!({ "message": "Post not found." }));
    };
    if guard.posts[index]["user_id"] != user_id {
        return reply(StatusCode::FORBIDDEN, json!({ "message": "This action is unauthorized." }));
    }
    guard.posts.remove(index);
    reply(StatusCode::OK, json!({ "message": "Post deleted" }))
}

async fn create_comment(State(state): State<Shared>, Path(id): Path<i64>, headers: HeaderMap, body: String) -> Response {
    let mut guard = record(&state, Method::POST, format!("/api/posts/{id}/comments"), &headers, &body);
    let user_id = match authenticate(&guard, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let payload: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    let Some(content) = payload["content"].as_str().filter(|c| !c.is_empty()) else {
        return reply(StatusCode::UNPROCESSABLE_ENTITY, json!({ "message": "The content field is required." }));
    };
    let comment_id = guard.next_id;
    guard.next_id += 1;
    reply(StatusCode::CREATED, json!({ "id": comment_id, "content": content, "post_id": id, "user_id": user_id }))
}

/// Text value of a multipart field, good enough for the client's own encoding.
fn multipart_field(body: &str, name: &str) -> Option<String> {
    let marker = format!("name=\"{name}\"");
    let start = body.find(&marker)? + marker.len();
    let rest = &body[start..];
    let value_start = rest.find("\r\n\r\n")? + 4;
    let value = &rest[value_start..];
    let end = value.find("\r\n")?;
    Some(value[..end].to_owned())
}
