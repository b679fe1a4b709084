//! In-memory stand-in for the users/posts/todos API plus transport wrappers
//! used to break it in controlled ways.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use restcheck_core::expect::messages::{
    BLANK, BLANK_GENDER, BLANK_TODO_STATUS, INVALID, MUST_EXIST, TAKEN,
};
use restcheck_core::expect::not_found_body;
use restcheck_core::{ResponseSnapshot, SchemaStore};
use restcheck_runner::fabricate::{GENDERS, TODO_STATUSES, USER_STATUSES};
use restcheck_runner::{ApiRequest, ClientError, Method, Transport};
use serde_json::{Map, Value, json};

pub const BASE_URL: &str = "http://simulated.invalid/public/v2";

const DEFAULT_PER_PAGE: usize = 10;

pub fn schemas() -> SchemaStore {
    SchemaStore::new(
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("schemas"),
    )
}

#[derive(Default)]
struct State {
    next_id: u64,
    users: BTreeMap<u64, Value>,
    posts: BTreeMap<u64, Value>,
    todos: BTreeMap<u64, Value>,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn email_taken(&self, email: &str, except: Option<u64>) -> bool {
        self.users
            .iter()
            .any(|(id, u)| Some(*id) != except && u["email"] == email)
    }
}

/// Behaves like the remote service for every route the catalog uses.
pub struct SimulatedApi {
    state: Mutex<State>,
}

impl SimulatedApi {
    /// Pre-populated with `n` users, each owning one post and one todo.
    pub fn seeded(n: u64) -> Self {
        let mut state = State::default();
        for i in 1..=n {
            let user_id = state.next_id();
            state.users.insert(
                user_id,
                json!({
                    "id": user_id,
                    "name": format!("Seed User {i}"),
                    "email": format!("seed{i}@example.test"),
                    "gender": GENDERS[(i % 2) as usize],
                    "status": USER_STATUSES[(i % 2) as usize],
                }),
            );
            let post_id = state.next_id();
            state.posts.insert(
                post_id,
                json!({
                    "id": post_id,
                    "user_id": user_id,
                    "title": format!("Seed post {i}"),
                    "body": "Seeded body text.",
                }),
            );
            let todo_id = state.next_id();
            let due_on = if i % 2 == 0 {
                Value::Null
            } else {
                json!("2024-03-12T08:15:42.000+05:30")
            };
            state.todos.insert(
                todo_id,
                json!({
                    "id": todo_id,
                    "user_id": user_id,
                    "title": format!("Seed todo {i}"),
                    "due_on": due_on,
                    "status": TODO_STATUSES[(i % 2) as usize],
                }),
            );
        }
        Self {
            state: Mutex::new(state),
        }
    }

    fn handle(&self, req: &ApiRequest) -> ResponseSnapshot {
        let mut state = self.state.lock().unwrap();
        let body = req
            .body
            .as_ref()
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        let segments: Vec<&str> = req.path.trim_start_matches('/').split('/').collect();

        match (req.method, segments.as_slice()) {
            (Method::Get, ["users"]) => list(&state.users, req),
            (Method::Get, ["posts"]) => list(&state.posts, req),
            (Method::Get, ["todos"]) => list(&state.todos, req),
            (Method::Post, ["users"]) => create_user(&mut state, &body),
            (Method::Put, ["users", id]) => update_user(&mut state, id, &body),
            (Method::Delete, ["users", id]) => match user_id(&state, id) {
                Some(id) => {
                    state.users.remove(&id);
                    ResponseSnapshot::new(204)
                }
                None => not_found(),
            },
            (Method::Post, ["users", id, "posts"]) => create_post(&mut state, id, &body),
            (Method::Post, ["users", id, "todos"]) => create_todo(&mut state, id, &body),
            _ => not_found(),
        }
    }
}

impl Transport for SimulatedApi {
    fn base_url(&self) -> &str {
        BASE_URL
    }

    fn execute(&self, request: ApiRequest) -> Result<ResponseSnapshot, ClientError> {
        Ok(self.handle(&request))
    }
}

fn not_found() -> ResponseSnapshot {
    ResponseSnapshot::json(404, &not_found_body())
}

fn unprocessable(errors: &[(&str, &str)]) -> ResponseSnapshot {
    let list: Vec<Value> = errors
        .iter()
        .map(|(field, message)| json!({ "field": field, "message": message }))
        .collect();
    ResponseSnapshot::json(422, &Value::Array(list))
}

fn user_id(state: &State, raw: &str) -> Option<u64> {
    raw.parse::<u64>()
        .ok()
        .filter(|id| state.users.contains_key(id))
}

fn text<'a>(body: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str)
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(str::is_empty)
}

fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    }
}

fn one_of(value: Option<&str>, allowed: &[&str]) -> bool {
    value.is_some_and(|v| allowed.contains(&v))
}

fn check_email(
    state: &State,
    email: Option<&str>,
    except: Option<u64>,
    errors: &mut Vec<(&'static str, &'static str)>,
) {
    match email {
        None | Some("") => errors.push(("email", BLANK)),
        Some(e) if !is_email(e) => errors.push(("email", INVALID)),
        Some(e) if state.email_taken(e, except) => errors.push(("email", TAKEN)),
        Some(_) => {}
    }
}

fn list(items: &BTreeMap<u64, Value>, req: &ApiRequest) -> ResponseSnapshot {
    let page: usize = req
        .query_param("page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);
    let per_page: usize = req
        .query_param("per_page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PER_PAGE);
    let shown: Vec<Value> = items
        .values()
        .rev()
        .skip(page.saturating_sub(1).saturating_mul(per_page))
        .take(per_page)
        .cloned()
        .collect();
    ResponseSnapshot::json(200, &Value::Array(shown))
        .with_header("X-Pagination-Total", &items.len().to_string())
        .with_header("X-Pagination-Page", &page.to_string())
        .with_header("X-Pagination-Limit", &per_page.to_string())
}

fn create_user(state: &mut State, body: &Map<String, Value>) -> ResponseSnapshot {
    let mut errors = Vec::new();
    if is_blank(text(body, "name")) {
        errors.push(("name", BLANK));
    }
    check_email(state, text(body, "email"), None, &mut errors);
    if !one_of(text(body, "gender"), GENDERS) {
        errors.push(("gender", BLANK_GENDER));
    }
    if !one_of(text(body, "status"), USER_STATUSES) {
        errors.push(("status", BLANK));
    }
    if !errors.is_empty() {
        return unprocessable(&errors);
    }

    let id = state.next_id();
    let user = json!({
        "id": id,
        "name": body["name"],
        "email": body["email"],
        "gender": body["gender"],
        "status": body["status"],
    });
    state.users.insert(id, user.clone());
    ResponseSnapshot::json(201, &user)
}

fn update_user(state: &mut State, raw_id: &str, body: &Map<String, Value>) -> ResponseSnapshot {
    let Some(id) = user_id(state, raw_id) else {
        return not_found();
    };

    let mut errors = Vec::new();
    if body.contains_key("name") && is_blank(text(body, "name")) {
        errors.push(("name", BLANK));
    }
    if body.contains_key("email") {
        check_email(state, text(body, "email"), Some(id), &mut errors);
    }
    if body.contains_key("gender") && !one_of(text(body, "gender"), GENDERS) {
        errors.push(("gender", BLANK_GENDER));
    }
    if body.contains_key("status") && !one_of(text(body, "status"), USER_STATUSES) {
        errors.push(("status", BLANK));
    }
    if !errors.is_empty() {
        return unprocessable(&errors);
    }

    let Some(user) = state.users.get_mut(&id) else {
        return not_found();
    };
    for key in ["name", "email", "gender", "status"] {
        if let Some(value) = body.get(key) {
            user[key] = value.clone();
        }
    }
    ResponseSnapshot::json(200, user)
}

fn create_post(state: &mut State, raw_id: &str, body: &Map<String, Value>) -> ResponseSnapshot {
    let owner = user_id(state, raw_id);
    let mut errors = Vec::new();
    if owner.is_none() {
        errors.push(("user", MUST_EXIST));
    }
    if is_blank(text(body, "title")) {
        errors.push(("title", BLANK));
    }
    if is_blank(text(body, "body")) {
        errors.push(("body", BLANK));
    }
    let (Some(user_id), true) = (owner, errors.is_empty()) else {
        return unprocessable(&errors);
    };

    let id = state.next_id();
    let post = json!({
        "id": id,
        "user_id": user_id,
        "title": body["title"],
        "body": body["body"],
    });
    state.posts.insert(id, post.clone());
    ResponseSnapshot::json(201, &post)
}

fn create_todo(state: &mut State, raw_id: &str, body: &Map<String, Value>) -> ResponseSnapshot {
    let owner = user_id(state, raw_id);
    let mut errors = Vec::new();
    if owner.is_none() {
        errors.push(("user", MUST_EXIST));
    }
    if is_blank(text(body, "title")) {
        errors.push(("title", BLANK));
    }
    if !one_of(text(body, "status"), TODO_STATUSES) {
        errors.push(("status", BLANK_TODO_STATUS));
    }
    let (Some(user_id), true) = (owner, errors.is_empty()) else {
        return unprocessable(&errors);
    };

    let id = state.next_id();
    let todo = json!({
        "id": id,
        "user_id": user_id,
        "title": body["title"],
        "due_on": body.get("due_on").cloned().unwrap_or(Value::Null),
        "status": body["status"],
    });
    state.todos.insert(id, todo.clone());
    ResponseSnapshot::json(201, &todo)
}

/// Passes requests through and rewrites every response with `edit`.
pub struct Tampered<T, F> {
    pub inner: T,
    pub edit: F,
}

impl<T, F> Transport for Tampered<T, F>
where
    T: Transport,
    F: Fn(&ApiRequest, ResponseSnapshot) -> ResponseSnapshot,
{
    fn base_url(&self) -> &str {
        self.inner.base_url()
    }

    fn execute(&self, request: ApiRequest) -> Result<ResponseSnapshot, ClientError> {
        let resp = self.inner.execute(request.clone())?;
        Ok((self.edit)(&request, resp))
    }
}

/// Keeps a copy of every request it forwards.
pub struct Recorder<T> {
    pub inner: T,
    pub requests: Mutex<Vec<ApiRequest>>,
}

impl<T> Recorder<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn take(&self) -> Vec<ApiRequest> {
        std::mem::take(&mut *self.requests.lock().unwrap())
    }
}

impl<T: Transport> Transport for Recorder<T> {
    fn base_url(&self) -> &str {
        self.inner.base_url()
    }

    fn execute(&self, request: ApiRequest) -> Result<ResponseSnapshot, ClientError> {
        self.requests.lock().unwrap().push(request.clone());
        self.inner.execute(request)
    }
}

/// Every request fails before reaching a server.
pub struct Unreachable;

impl Transport for Unreachable {
    fn base_url(&self) -> &str {
        "http://127.0.0.1:9"
    }

    fn execute(&self, request: ApiRequest) -> Result<ResponseSnapshot, ClientError> {
        Err(ClientError::Send {
            method: request.method,
            url: format!("{}{}", self.base_url(), request.path),
            message: "connection refused".into(),
        })
    }
}
