use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard},
};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    pub email: String,
    pub role: String,
    pub team_ids: Vec<u64>,
}

#[derive(Debug, Default)]
struct Org {
    name: String,
    /// slug -> id. `None` models a team record that comes back without an id.
    teams: HashMap<String, Option<u64>>,
    invitations: Vec<Invitation>,
    /// Statuses returned, one per request, before invitations are accepted.
    injected: VecDeque<u16>,
    /// Every request seen, as `METHOD path`.
    log: Vec<String>,
}

/// Shared in-memory organization. Uses a std mutex so blocking test code can
/// inspect it while the server runs on another thread.
#[derive(Clone, Debug)]
pub struct Db {
    token: Arc<str>,
    org: Arc<Mutex<Org>>,
}

impl Db {
    pub fn new(token: &str, org: &str) -> Self {
        Self {
            token: token.into(),
            org: Arc::new(Mutex::new(Org {
                name: org.to_string(),
                ..Org::default()
            })),
        }
    }

    pub fn with_team(self, slug: &str, id: u64) -> Self {
        self.lock().teams.insert(slug.to_string(), Some(id));
        self
    }

    pub fn with_team_without_id(self, slug: &str) -> Self {
        self.lock().teams.insert(slug.to_string(), None);
        self
    }

    /// Answer the next invitation requests with `statuses`, in order.
    pub fn inject_invitation_statuses(&self, statuses: &[u16]) {
        self.lock().injected.extend(statuses);
    }

    pub fn invitations(&self) -> Vec<Invitation> {
        self.lock().invitations.clone()
    }

    pub fn requests(&self) -> Vec<String> {
        self.lock().log.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Org> {
        self.org.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("token "))
            .is_some_and(|t| t == &*self.token)
    }
}

type Reply = (StatusCode, Json<Value>);

fn message(status: StatusCode, text: &str) -> Reply {
    (status, Json(json!({ "message": text })))
}

pub fn app(db: Db) -> Router {
    Router::new()
        .route("/orgs/{org}/teams/{slug}", get(get_team))
        .route("/orgs/{org}/invitations", post(create_invitation))
        .with_state(db)
}

pub async fn run(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app(db)).await
}

async fn get_team(
    State(db): State<Db>,
    Path((org, slug)): Path<(String, String)>,
    headers: HeaderMap,
    body: String,
) -> Reply {
    let mut state = db.lock();
    state.log.push(format!("GET /orgs/{org}/teams/{slug}"));
    if !db.authorized(&headers) {
        return message(StatusCode::UNAUTHORIZED, "Bad credentials");
    }
    if !body.is_empty() {
        return message(StatusCode::BAD_REQUEST, "GET must not carry a body");
    }
    if org != state.name {
        return message(StatusCode::NOT_FOUND, "Not Found");
    }
    match state.teams.get(&slug) {
        Some(Some(id)) => (StatusCode::OK, Json(json!({ "id": id, "slug": slug, "name": slug }))),
        Some(None) => (StatusCode::OK, Json(json!({}))),
        None => message(StatusCode::NOT_FOUND, "Not Found"),
    }
}

async fn create_invitation(
    State(db): State<Db>,
    Path(org): Path<String>,
    headers: HeaderMap,
    Json(input): Json<Invitation>,
) -> Reply {
    let mut state = db.lock();
    state.log.push(format!("POST /orgs/{org}/invitations"));
    if !db.authorized(&headers) {
        return message(StatusCode::UNAUTHORIZED, "Bad credentials");
    }
    if org != state.name {
        return message(StatusCode::NOT_FOUND, "Not Found");
    }
    if let Some(status) = state.injected.pop_front() {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return message(status, "injected failure");
    }
    let known = |id: &u64| state.teams.values().any(|t| *t == Some(*id));
    if input.role != "direct_member" || !input.team_ids.iter().all(known) {
        return message(StatusCode::UNPROCESSABLE_ENTITY, "Validation Failed");
    }
    if state.invitations.iter().any(|i| i.email.eq_ignore_ascii_case(&input.email)) {
        return message(StatusCode::UNPROCESSABLE_ENTITY, "Validation Failed");
    }
    state.invitations.push(input.clone());
    let id = state.invitations.len();
    (
        StatusCode::CREATED,
        Json(json!({ "id": id, "email": input.email, "role": input.role })),
    )
}
