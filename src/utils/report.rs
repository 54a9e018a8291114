// src/utils/report.rs

use std::sync::{Arc, Mutex};

use crate::error::ClientError;

/// Anything that can display a one-line status message to the user.
pub trait StatusSink: Send + Sync {
    fn show(&self, message: &str);
}

/// The shared status line (the `#info` element of the pages).
///
/// Cloning shares the same line. Every message is also logged.
#[derive(Debug, Clone, Default)]
pub struct InfoLine {
    text: Arc<Mutex<String>>,
}

impl InfoLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text of the line.
    pub fn text(&self) -> String {
        match self.text.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl StatusSink for InfoLine {
    fn show(&self, message: &str) {
        tracing::info!(target: "quizdrum::info", "{}", message);
        let mut guard = match self.text.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = message.to_string();
    }
}

/// Renders a failure into the status line.
///
/// HTTP failures show `Error HTTP (<status>): <body>`, everything else
/// `Error: <message>`. Fire-and-forget.
pub fn show_error(sink: &dyn StatusSink, err: &ClientError) {
    tracing::warn!("Request failed: {:?}", err);
    sink.show(&err.to_string());
}
