#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use feedback_desk::api::{FeedbackApi, HttpFeedbackApi};
use feedback_desk::session::{MemorySessionStore, SessionHandle};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;

pub const MANAGER_TOKEN: &str = "manager-token";
pub const EMPLOYEE_TOKEN: &str = "employee-token";

#[derive(Default)]
pub struct Backend {
    pub employees: Vec<Value>,
    pub feedback: Vec<Value>,
    pub users: Vec<String>,
    /// "METHOD path" of every request, in arrival order.
    pub calls: Vec<String>,
    pub bearer_tokens: Vec<Option<String>>,
    /// Endpoints (as logged in `calls`) that answer 500.
    pub failing: HashSet<String>,
    /// Serve every id as a JSON string instead of a number.
    pub string_ids: bool,
    next_id: i64,
}

pub type Stub = Arc<Mutex<Backend>>;

impl Backend {
    pub fn seeded() -> Self {
        let mut backend = Backend {
            employees: vec![
                json!({ "id": 2, "username": "bob" }),
                json!({ "id": 3, "username": "carol" }),
            ],
            users: vec!["alice".into(), "bob".into(), "carol".into()],
            next_id: 100,
            ..Default::default()
        };
        backend.feedback = vec![
            feedback(1, "bob", "alice", "positive", false),
            feedback(2, "bob", "alice", "neutral", true),
            feedback(3, "carol", "alice", "negative", false),
        ];
        backend
    }

    pub fn seeded_with_string_ids() -> Self {
        let mut backend = Self::seeded();
        backend.string_ids = true;
        for item in backend.employees.iter_mut().chain(backend.feedback.iter_mut()) {
            let id = id_text(&item["id"]);
            item["id"] = json!(id);
        }
        for fb in backend.feedback.iter_mut() {
            let employee_id = id_text(&fb["employee_id"]);
            fb["employee_id"] = json!(employee_id);
        }
        backend
    }

    pub fn calls_to(&self, call: &str) -> usize {
        self.calls.iter().filter(|c| c.as_str() == call).count()
    }

    pub fn record_mut(&mut self, id: &str) -> Option<&mut Value> {
        self.feedback.iter_mut().find(|fb| id_text(&fb["id"]) == id)
    }

    pub fn record(&self, id: &str) -> Option<&Value> {
        self.feedback.iter().find(|fb| id_text(&fb["id"]) == id)
    }
}

pub fn id_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub fn feedback(id: i64, employee: &str, manager: &str, sentiment: &str, anonymous: bool) -> Value {
    let employee_id = if employee == "bob" { 2 } else { 3 };
    json!({
        "id": id,
        "employee_id": employee_id,
        "employee_username": employee,
        "manager_username": manager,
        "content": format!("feedback {id}"),
        "strengths": format!("strength {id}"),
        "improvements": "",
        "sentiment": sentiment,
        "tags": ["growth"],
        "anonymous": anonymous,
        "acknowledged": false,
        "employee_comments": null,
        "created_at": "2024-02-01T10:00:00"
    })
}

fn user_for(token: &str) -> Option<&'static str> {
    match token {
        MANAGER_TOKEN => Some("alice"),
        EMPLOYEE_TOKEN => Some("bob"),
        _ => None,
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
}

/// Logs the call, applies failure injection and resolves the bearer user.
fn enter(stub: &Stub, headers: &HeaderMap, call: String, needs_auth: bool) -> Result<Option<&'static str>, StatusCode> {
    let mut backend = stub.lock();
    let token = bearer(headers);
    backend.bearer_tokens.push(token.clone());
    let failing = backend.failing.contains(&call);
    backend.calls.push(call);
    if failing {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let user = token.as_deref().and_then(user_for);
    if needs_auth && user.is_none() {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(user)
}

async fn login(State(stub): State<Stub>, headers: HeaderMap, Json(body): Json<Value>) -> Result<Json<Value>, StatusCode> {
    enter(&stub, &headers, "POST /auth/login".into(), false)?;
    let token = match (body["username"].as_str(), body["password"].as_str()) {
        (Some("alice"), Some("secret")) => MANAGER_TOKEN,
        (Some("bob"), Some("secret")) => EMPLOYEE_TOKEN,
        _ => return Err(StatusCode::UNAUTHORIZED),
    };
    Ok(Json(json!({ "access_token": token, "token_type": "bearer" })))
}

async fn register(State(stub): State<Stub>, headers: HeaderMap, Json(body): Json<Value>) -> Result<StatusCode, StatusCode> {
    enter(&stub, &headers, "POST /auth/register".into(), false)?;
    let username = body["username"].as_str().ok_or(StatusCode::UNPROCESSABLE_ENTITY)?.to_string();
    let mut backend = stub.lock();
    if backend.users.contains(&username) {
        return Err(StatusCode::BAD_REQUEST);
    }
    backend.users.push(username);
    Ok(StatusCode::CREATED)
}

async fn employees(State(stub): State<Stub>, headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    enter(&stub, &headers, "GET /feedback/employees".into(), true)?;
    Ok(Json(Value::Array(stub.lock().employees.clone())))
}

async fn team_overview(State(stub): State<Stub>, headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    let user = enter(&stub, &headers, "GET /feedback/team-overview".into(), true)?;
    let backend = stub.lock();
    let mine: Vec<&Value> = backend
        .feedback
        .iter()
        .filter(|fb| fb["manager_username"].as_str() == user)
        .collect();
    let mut breakdown = serde_json::Map::new();
    for fb in &mine {
        let key = fb["sentiment"].as_str().unwrap_or("neutral").to_string();
        let count = breakdown.get(&key).and_then(Value::as_u64).unwrap_or(0);
        breakdown.insert(key, json!(count + 1));
    }
    Ok(Json(json!({
        "employees_count": backend.employees.len(),
        "total_feedbacks": mine.len(),
        "sentiment_breakdown": breakdown
    })))
}

async fn given(State(stub): State<Stub>, headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    let user = enter(&stub, &headers, "GET /feedback/given".into(), true)?;
    let backend = stub.lock();
    let list = backend
        .feedback
        .iter()
        .filter(|fb| fb["manager_username"].as_str() == user)
        .cloned()
        .collect();
    Ok(Json(Value::Array(list)))
}

async fn create(State(stub): State<Stub>, headers: HeaderMap, Json(body): Json<Value>) -> Result<Json<Value>, StatusCode> {
    let user = enter(&stub, &headers, "POST /feedback/".into(), true)?;
    let mut backend = stub.lock();
    let employee = backend
        .employees
        .iter()
        .find(|e| e["id"] == body["employee_id"])
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)?;
    backend.next_id += 1;
    let id = if backend.string_ids {
        json!(backend.next_id.to_string())
    } else {
        json!(backend.next_id)
    };
    let record = json!({
        "id": id,
        "employee_id": employee["id"],
        "employee_username": employee["username"],
        "manager_username": user,
        "strengths": body["strengths"],
        "improvements": body["improvements"],
        "sentiment": body["sentiment"],
        "tags": body["tags"],
        "anonymous": false,
        "acknowledged": false,
        "employee_comments": null,
        "created_at": "2024-03-01T08:00:00Z"
    });
    backend.feedback.push(record.clone());
    Ok(Json(record))
}

async fn mine(State(stub): State<Stub>, headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    let user = enter(&stub, &headers, "GET /user/feedback".into(), true)?;
    let backend = stub.lock();
    let list = backend
        .feedback
        .iter()
        .filter(|fb| fb["employee_username"].as_str() == user)
        .cloned()
        .collect();
    Ok(Json(Value::Array(list)))
}

async fn acknowledge(State(stub): State<Stub>, headers: HeaderMap, Path(id): Path<String>) -> Result<StatusCode, StatusCode> {
    enter(&stub, &headers, format!("PUT /feedback/{id}/acknowledge"), true)?;
    let mut backend = stub.lock();
    let record = backend.record_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    record["acknowledged"] = json!(true);
    Ok(StatusCode::OK)
}

async fn comment(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<StatusCode, StatusCode> {
    enter(&stub, &headers, format!("PUT /feedback/{id}/comment"), true)?;
    let mut backend = stub.lock();
    let record = backend.record_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    record["employee_comments"] = body["employee_comments"].clone();
    Ok(StatusCode::OK)
}

async fn update(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    enter(&stub, &headers, format!("PUT /feedback/{id}"), true)?;
    let mut backend = stub.lock();
    let record = backend.record_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    for field in ["strengths", "improvements", "sentiment", "tags"] {
        record[field] = body[field].clone();
    }
    Ok(Json(record.clone()))
}

pub struct TestServer {
    pub base_url: String,
    pub stub: Stub,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(Backend::seeded()).await
    }

    pub async fn start_with(backend: Backend) -> Self {
        let stub: Stub = Arc::new(Mutex::new(backend));
        let app = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/register", post(register))
            .route("/feedback/employees", get(employees))
            .route("/feedback/team-overview", get(team_overview))
            .route("/feedback/given", get(given))
            .route("/feedback/", post(create))
            .route("/user/feedback", get(mine))
            .route("/feedback/:id/acknowledge", put(acknowledge))
            .route("/feedback/:id/comment", put(comment))
            .route("/feedback/:id", put(update))
            .with_state(stub.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            stub,
        }
    }

    pub fn api(&self, session: SessionHandle) -> Arc<dyn FeedbackApi> {
        Arc::new(HttpFeedbackApi::with_client(
            reqwest::Client::new(),
            &self.base_url,
            session,
        ))
    }

    pub fn fail(&self, call: &str) {
        self.stub.lock().failing.insert(call.to_string());
    }

    pub fn heal(&self, call: &str) {
        self.stub.lock().failing.remove(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.stub.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.stub.lock().calls.clear();
    }
}

pub fn memory_session() -> SessionHandle {
    MemorySessionStore::handle()
}
