// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    Router,
    extract::State,
    http::{Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use quizdrum_client::utils::{http::ApiClient, report::InfoLine};

/// One request the fake backend received.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub body: String,
}

impl Recorded {
    /// Form-decoded body pairs.
    pub fn form(&self) -> Vec<(String, String)> {
        url::form_urlencoded::parse(self.body.as_bytes())
            .into_owned()
            .collect()
    }

    pub fn field(&self, key: &str) -> Option<String> {
        self.form().into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

/// Mutable behaviour of the fake quiz backend.
pub struct Backend {
    pub requests: Vec<Recorded>,
    /// JSON body of `getstatus`.
    pub status_json: String,
    /// Whether `submit-answer` is accepted.
    pub accepting: bool,
    /// Body of `getallanswers`.
    pub answers_html: String,
    /// Body of `GET question/{id}`.
    pub question_json: String,
    /// Every request fails with a 500 while set.
    pub broken: bool,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            requests: Vec::new(),
            status_json: r#"{"QuestionID":5,"AcceptingResponses":true}"#.to_string(),
            accepting: true,
            answers_html: String::new(),
            question_json: String::new(),
            broken: false,
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeServer {
    inner: Arc<Mutex<Backend>>,
}

impl FakeServer {
    pub fn with<R>(&self, f: impl FnOnce(&mut Backend) -> R) -> R {
        f(&mut self.inner.lock().unwrap())
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.with(|b| b.requests.clone())
    }

    pub fn last_request(&self) -> Recorded {
        self.requests().pop().expect("no request was made")
    }
}

type Reply = (StatusCode, &'static str, String);

fn text(body: &str) -> Reply {
    (StatusCode::OK, "text/plain", body.to_string())
}

fn json(body: &str) -> Reply {
    (StatusCode::OK, "application/json", body.to_string())
}

fn respond(backend: &mut Backend, method: &Method, path: &str) -> Reply {
    if backend.broken {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "text/plain",
            "backend down".to_string(),
        );
    }
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    match (method.as_str(), segments.as_slice()) {
        ("POST", ["api", "participant", "submit-answer"]) => {
            if backend.accepting {
                json("42")
            } else {
                (
                    StatusCode::CONFLICT,
                    "text/plain",
                    "the quiz is not accepting responses right now".to_string(),
                )
            }
        }
        ("GET", ["api", "participant", "quiz", _, "getstatus"]) => json(&backend.status_json),
        ("POST", ["api", "participant", "set-profile"]) => text("written\n"),
        ("POST", ["api", "quizmaster", "question", "new"]) => json("13"),
        ("PUT", ["api", "quizmaster", "question", _, "update"]) => text("updated"),
        ("GET", ["api", "quizmaster", "question", _, "getallanswers"]) => {
            (StatusCode::OK, "text/html", backend.answers_html.clone())
        }
        ("GET", ["api", "quizmaster", "question", _]) => json(&backend.question_json),
        ("DELETE", ["api", "quizmaster", "question", _, "delete"]) => text("deleted"),
        ("POST", ["api", "quizmaster", "question", _, "savescores"]) => text("saved"),
        ("PUT", ["api", "quizmaster", "quiz", _, "updateproperties"]) => text("updated"),
        ("DELETE", ["api", "quizmaster", "quiz", _, "delete"]) => text("deleted"),
        ("PUT", ["api", "quizmaster", "quiz", _, "reinstate"]) => text("deleted"),
        ("POST", ["api", "quizmaster", "quiz", _, "setactive", _]) => text(""),
        ("POST", ["api", "quizmaster", "quiz", _, "setacceptingresponses"]) => {
            text("set accepting responses")
        }
        _ => (StatusCode::NOT_FOUND, "text/plain", "not found".to_string()),
    }
}

async fn handle(
    State(fake): State<FakeServer>,
    method: Method,
    uri: Uri,
    body: String,
) -> Response {
    let path = uri.path().to_string();
    let (status, content_type, reply) = fake.with(|backend| {
        backend.requests.push(Recorded {
            method: method.to_string(),
            path: path.clone(),
            body,
        });
        respond(backend, &method, &path)
    });
    (status, [(header::CONTENT_TYPE, content_type)], reply).into_response()
}

/// Spawns the fake backend on a random port.
/// Returns its handle and base URL (e.g., "http://127.0.0.1:12345").
pub async fn spawn_backend() -> (FakeServer, String) {
    let fake = FakeServer::default();
    let app = Router::new().fallback(handle).with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (fake, address)
}

/// A client pointed at `address` plus the status line it reports into.
pub fn client(address: &str) -> (ApiClient, InfoLine) {
    let info = InfoLine::new();
    let api = ApiClient::new(address, Arc::new(info.clone())).expect("valid base url");
    (api, info)
}
