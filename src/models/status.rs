// src/models/status.rs

use serde::{Deserialize, Serialize};

/// Live status of a quiz as seen by participants.
///
/// Both fields may be absent; a zero question id means "no live question".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizStatus {
    #[serde(rename = "QuestionID", default)]
    pub question_id: Option<i64>,
    #[serde(rename = "AcceptingResponses", default)]
    pub accepting_responses: Option<bool>,
}

impl QuizStatus {
    /// True when the server is live on a question other than `local_id`.
    pub fn diverges_from(&self, local_id: i64) -> bool {
        matches!(self.question_id, Some(id) if id != 0 && id != local_id)
    }
}
