// src/config.rs

use std::env;
use std::time::Duration;
use dotenvy::dotenv;

use crate::error::ClientError;

/// Which polling loop the watcher binary runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchMode {
    /// Participant live page: quiz status.
    Participant,
    /// Quizmaster live page: answer listing.
    Answers,
}

impl WatchMode {
    pub fn parse(raw: &str) -> Result<Self, ClientError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "participant" => Ok(WatchMode::Participant),
            "answers" => Ok(WatchMode::Answers),
            other => Err(ClientError::Config(format!(
                "QUIZDRUM_WATCH must be 'participant' or 'answers', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    /// Value of the `sid` session cookie the server authenticates with.
    pub session_id: Option<String>,
    pub request_timeout: Option<Duration>,
    pub watch: WatchMode,
    pub quiz_id: i64,
    pub question_id: i64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ClientError> {
        dotenv().ok();

        let base_url = env::var("QUIZDRUM_BASE_URL")
            .map_err(|_| ClientError::Config("QUIZDRUM_BASE_URL must be set".to_string()))?;

        let session_id = env::var("QUIZDRUM_SID").ok().filter(|s| !s.is_empty());

        let request_timeout = match env::var("QUIZDRUM_REQUEST_TIMEOUT_MS") {
            Ok(raw) => Some(Duration::from_millis(parse_number(
                "QUIZDRUM_REQUEST_TIMEOUT_MS",
                &raw,
            )?)),
            Err(_) => None,
        };

        let watch = WatchMode::parse(
            &env::var("QUIZDRUM_WATCH").unwrap_or_else(|_| "participant".to_string()),
        )?;

        let quiz_id = env::var("QUIZDRUM_QUIZ_ID")
            .map_err(|_| ClientError::Config("QUIZDRUM_QUIZ_ID must be set".to_string()))
            .and_then(|raw| parse_number("QUIZDRUM_QUIZ_ID", &raw))?;

        let question_id = match env::var("QUIZDRUM_QUESTION_ID") {
            Ok(raw) => parse_number("QUIZDRUM_QUESTION_ID", &raw)?,
            Err(_) => 0,
        };

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            base_url,
            session_id,
            request_timeout,
            watch,
            quiz_id,
            question_id,
            rust_log,
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ClientError> {
    raw.trim()
        .parse()
        .map_err(|_| ClientError::Config(format!("{} is not a valid number: '{}'", key, raw)))
}
