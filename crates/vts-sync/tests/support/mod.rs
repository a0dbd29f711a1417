//! In-memory GitHub used by the integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};
use vts_sync::{HttpRequest, HttpResponse, Method, SyncError, Transport, encode_content};

pub const OWNER: &str = "acme";
pub const REPO: &str = "tokens";

#[derive(Debug, Default)]
struct State {
    default_branch: String,
    refs: BTreeMap<String, String>,
    /// (branch, path) -> (blob sha, text)
    files: BTreeMap<(String, String), (String, String)>,
    requests: Vec<(Method, String)>,
    scripted: VecDeque<(Method, String, Scripted)>,
    next_sha: u32,
}

#[derive(Debug, Clone)]
pub enum Scripted {
    Respond(HttpResponse),
    NetworkError,
    /// Another writer commits this text right before the response is a 409.
    ConflictAfterWrite(String),
}

/// Fake repository `acme/tokens` with a `main` branch at commit `base-sha`.
#[derive(Debug)]
pub struct FakeGitHub {
    state: Mutex<State>,
}

impl Default for FakeGitHub {
    fn default() -> Self {
        let mut state = State {
            default_branch: "main".to_string(),
            ..State::default()
        };
        state.refs.insert("main".to_string(), "base-sha".to_string());
        Self {
            state: Mutex::new(state),
        }
    }
}

impl FakeGitHub {
    /// Queues a canned outcome for the next request whose method matches
    /// and whose path starts with `prefix`.
    pub fn script(&self, method: Method, prefix: &str, outcome: Scripted) {
        self.state
            .lock()
            .unwrap()
            .scripted
            .push_back((method, prefix.to_string(), outcome));
    }

    pub fn put_file(&self, branch: &str, path: &str, text: &str) {
        let mut state = self.state.lock().unwrap();
        let sha = state.new_sha();
        state
            .files
            .insert((branch.to_string(), path.to_string()), (sha, text.to_string()));
    }

    pub fn file(&self, branch: &str, path: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .files
            .get(&(branch.to_string(), path.to_string()))
            .map(|(_, text)| text.clone())
    }

    pub fn has_branch(&self, branch: &str) -> bool {
        self.state.lock().unwrap().refs.contains_key(branch)
    }

    pub fn requests(&self) -> Vec<(Method, String)> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn count(&self, method: Method) -> usize {
        self.requests().iter().filter(|(m, _)| *m == method).count()
    }

    pub fn clear_requests(&self) {
        self.state.lock().unwrap().requests.clear();
    }
}

impl State {
    fn new_sha(&mut self) -> String {
        self.next_sha += 1;
        format!("blob-{}", self.next_sha)
    }

    fn take_scripted(&mut self, request: &HttpRequest) -> Option<Scripted> {
        let index = self.scripted.iter().position(|(method, prefix, _)| {
            *method == request.method && request.path.starts_with(prefix.as_str())
        })?;
        self.scripted.remove(index).map(|(_, _, outcome)| outcome)
    }

    fn route(&mut self, request: &HttpRequest) -> HttpResponse {
        let repo = format!("/repos/{OWNER}/{REPO}");
        let path = request.path.as_str();
        let body = request.body.clone().unwrap_or(Value::Null);

        if request.method == Method::Get && path == "/user" {
            return HttpResponse::json(200, &json!({"login": "octocat"}));
        }
        let Some(rest) = path.strip_prefix(&repo) else {
            return not_found();
        };

        match (request.method, rest) {
            (Method::Get, "") => HttpResponse::json(
                200,
                &json!({"default_branch": self.default_branch, "full_name": "acme/tokens"}),
            ),
            (Method::Get, rest) if rest.starts_with("/git/ref/heads/") => {
                let branch = &rest["/git/ref/heads/".len()..];
                match self.refs.get(branch) {
                    Some(sha) => HttpResponse::json(
                        200,
                        &json!({"ref": format!("refs/heads/{branch}"), "object": {"sha": sha}}),
                    ),
                    None => not_found(),
                }
            }
            (Method::Post, "/git/refs") => {
                let name = body["ref"].as_str().unwrap_or_default();
                let branch = name.trim_start_matches("refs/heads/").to_string();
                let sha = body["sha"].as_str().unwrap_or_default().to_string();
                self.refs.insert(branch, sha.clone());
                HttpResponse::json(201, &json!({"ref": name, "object": {"sha": sha}}))
            }
            (Method::Get, rest) if rest.starts_with("/contents/") => {
                let (file_path, branch) = split_ref(&rest["/contents/".len()..]);
                match self.files.get(&(branch.clone(), file_path.clone())) {
                    Some((sha, text)) => HttpResponse::json(
                        200,
                        &json!({
                            "sha": sha,
                            "content": wrap(&encode_content(text)),
                            "html_url": html_url(&branch, &file_path),
                        }),
                    ),
                    None => not_found(),
                }
            }
            (Method::Put, rest) if rest.starts_with("/contents/") => {
                let file_path = rest["/contents/".len()..].to_string();
                self.write(&file_path, &body)
            }
            _ => not_found(),
        }
    }

    fn write(&mut self, file_path: &str, body: &Value) -> HttpResponse {
        let branch = body["branch"].as_str().unwrap_or("main").to_string();
        let key = (branch.clone(), file_path.to_string());
        let current = self.files.get(&key).map(|(sha, _)| sha.clone());
        let given = body["sha"].as_str().map(str::to_string);
        if current != given {
            return HttpResponse::json(409, &json!({"message": "sha does not match"}));
        }
        let encoded = body["content"].as_str().unwrap_or_default();
        let text = vts_sync::decode_content(encoded).unwrap();
        let sha = self.new_sha();
        self.files.insert(key, (sha.clone(), text));
        let status = if current.is_some() { 200 } else { 201 };
        HttpResponse::json(
            status,
            &json!({
                "content": {"sha": sha, "html_url": html_url(&branch, file_path)},
                "commit": {"sha": format!("commit-{sha}"), "html_url": null},
            }),
        )
    }
}

#[async_trait]
impl Transport for FakeGitHub {
    async fn send(&self, request: &HttpRequest) -> vts_sync::Result<HttpResponse> {
        let mut state = self.state.lock().unwrap();
        state.requests.push((request.method, request.path.clone()));
        match state.take_scripted(request) {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::NetworkError) => Err(SyncError::Network("connection reset".to_string())),
            Some(Scripted::ConflictAfterWrite(text)) => {
                let file_path = request.path[format!("/repos/{OWNER}/{REPO}/contents/").len()..].to_string();
                let branch = request
                    .body
                    .as_ref()
                    .and_then(|body| body["branch"].as_str())
                    .unwrap_or("main")
                    .to_string();
                let sha = state.new_sha();
                state.files.insert((branch, file_path), (sha, text));
                Ok(HttpResponse::json(409, &json!({"message": "conflict"})))
            }
            None => Ok(state.route(request)),
        }
    }
}

pub fn status(code: u16) -> Scripted {
    Scripted::Respond(HttpResponse {
        status: code,
        body: format!("{{\"message\": \"status {code}\"}}"),
    })
}

fn not_found() -> HttpResponse {
    HttpResponse::json(404, &json!({"message": "Not Found"}))
}

fn split_ref(rest: &str) -> (String, String) {
    match rest.split_once("?ref=") {
        Some((path, branch)) => (path.to_string(), branch.to_string()),
        None => (rest.to_string(), "main".to_string()),
    }
}

fn html_url(branch: &str, path: &str) -> String {
    format!("https://github.com/{OWNER}/{REPO}/blob/{branch}/{path}")
}

/// Wraps Base64 at 60 columns, like the contents API.
fn wrap(encoded: &str) -> String {
    encoded
        .as_bytes()
        .chunks(60)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}
