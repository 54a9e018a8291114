// src/handlers/quiz.rs

use crate::{
    error::ClientError,
    handlers::{Navigation, answers::AnswerBoard},
    models::form::FormData,
    routes,
    utils::{http::ApiClient, report::show_error},
};

pub const STOP_ACCEPTING_LABEL: &str = "Stop Accepting Responses";
pub const ACCEPT_AGAIN_LABEL: &str = "Accept Responses Again";

/// Quiz-level controls of the quizmaster pages.
///
/// Holds the ordered question ids of the quiz and the question currently
/// live, which is what "next" and "previous" move from.
pub struct QuizControls {
    api: ApiClient,
    quiz_id: i64,
    question_ids: Vec<i64>,
    current_question: i64,
    deleted: bool,
    accepting: bool,
}

impl QuizControls {
    pub fn new(api: ApiClient, quiz_id: i64, question_ids: Vec<i64>, current_question: i64) -> Self {
        Self {
            api,
            quiz_id,
            question_ids,
            current_question,
            deleted: false,
            accepting: true,
        }
    }

    pub fn quiz_id(&self) -> i64 {
        self.quiz_id
    }

    /// Whether the "delete quiz" button shows (the "undo" button shows
    /// otherwise).
    pub fn delete_visible(&self) -> bool {
        !self.deleted
    }

    pub fn undo_delete_visible(&self) -> bool {
        self.deleted
    }

    /// Sets the toggle from what the page was rendered with.
    pub fn set_accepting(&mut self, accepting: bool) {
        self.accepting = accepting;
    }

    /// Label of the accepting-responses toggle.
    pub fn accepting_label(&self) -> &'static str {
        if self.accepting {
            STOP_ACCEPTING_LABEL
        } else {
            ACCEPT_AGAIN_LABEL
        }
    }

    /// Saves the quiz title and description.
    pub async fn update_properties(&self, title: &str, description: &str) -> Result<(), ClientError> {
        let form = FormData::new()
            .with("qz-title", title)
            .with("qz-descr", description);
        self.api
            .put_text(&routes::update_quiz_properties(self.quiz_id), &form)
            .await?;
        self.api.status().show("Updated Quiz.");
        Ok(())
    }

    pub async fn delete_quiz(&mut self) -> Result<(), ClientError> {
        self.api.delete_text(&routes::delete_quiz(self.quiz_id)).await?;
        self.api.status().show("Deleted Quiz.");
        self.deleted = true;
        tracing::info!("Deleted quiz {}", self.quiz_id);
        Ok(())
    }

    /// Undoes a delete. The reply body is not interpreted: the server
    /// answers with a bare word rather than JSON.
    pub async fn reinstate_quiz(&mut self) -> Result<(), ClientError> {
        self.api
            .put_text(&routes::reinstate_quiz(self.quiz_id), &FormData::new())
            .await?;
        self.api.status().show("Reinstated Quiz.");
        self.deleted = false;
        tracing::info!("Reinstated quiz {}", self.quiz_id);
        Ok(())
    }

    /// Makes the question after the current one live.
    pub async fn next_question(&self) -> Result<Option<Navigation>, ClientError> {
        self.activate_relative(1).await
    }

    /// Makes the question before the current one live.
    pub async fn previous_question(&self) -> Result<Option<Navigation>, ClientError> {
        self.activate_relative(-1).await
    }

    /// Index of the question `step` positions away from the current one.
    /// An unknown current question counts as sitting before the first one.
    fn relative_index(&self, step: isize) -> Option<usize> {
        let current = self
            .question_ids
            .iter()
            .position(|id| *id == self.current_question)
            .map_or(-1, |i| i as isize);
        let target = current + step;
        if target < 0 || target as usize >= self.question_ids.len() {
            None
        } else {
            Some(target as usize)
        }
    }

    /// Past either end there is nothing to activate and `None` is returned.
    async fn activate_relative(&self, step: isize) -> Result<Option<Navigation>, ClientError> {
        let Some(index) = self.relative_index(step) else {
            tracing::debug!("No question {} away from {}", step, self.current_question);
            return Ok(None);
        };
        let target = self.question_ids[index];

        if let Err(e) = self
            .api
            .post_raw(&routes::set_active_question(self.quiz_id, target), &FormData::new())
            .await
        {
            show_error(self.api.status(), &e);
            return Err(e);
        }
        self.api
            .status()
            .show("Next ID has been marked as active. Refresh the page now.");
        tracing::info!("Quiz {} now live on question {}", self.quiz_id, target);
        Ok(Some(Navigation::Reload))
    }

    /// Flips whether the quiz accepts responses, then refreshes the answers
    /// once.
    ///
    /// Stopping also stops the board's refresh loop. Accepting again re-arms
    /// the stop flag, which retires any loop still running; the host starts
    /// `AnswerBoard::watch` again when the returned value is `true`.
    pub async fn toggle_accepting(&mut self, board: &AnswerBoard) -> Result<bool, ClientError> {
        let accept = !self.accepting;
        let form = FormData::new().with("ar", accept.to_string());

        self.api
            .post_text(&routes::set_accepting_responses(self.quiz_id), &form)
            .await?;

        self.accepting = accept;
        if accept {
            board.keep_refreshing().resume();
        } else {
            board.keep_refreshing().cancel();
        }
        tracing::info!("Quiz {} accepting responses: {}", self.quiz_id, accept);

        // Reported by the board itself on failure.
        let _ = board.refresh().await;
        Ok(accept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::report::InfoLine;
    use std::sync::Arc;

    fn controls(ids: Vec<i64>, current: i64) -> QuizControls {
        let api = ApiClient::new("http://127.0.0.1:9", Arc::new(InfoLine::new())).unwrap();
        QuizControls::new(api, 1, ids, current)
    }

    #[test]
    fn relative_index_moves_within_bounds() {
        let qc = controls(vec![10, 11, 12], 11);
        assert_eq!(qc.relative_index(1), Some(2));
        assert_eq!(qc.relative_index(-1), Some(0));
    }

    #[test]
    fn relative_index_stops_at_the_ends() {
        assert_eq!(controls(vec![10, 11, 12], 12).relative_index(1), None);
        assert_eq!(controls(vec![10, 11, 12], 10).relative_index(-1), None);
    }

    #[test]
    fn unknown_current_question_starts_from_first() {
        let qc = controls(vec![10, 11], 99);
        assert_eq!(qc.relative_index(1), Some(0));
        assert_eq!(qc.relative_index(-1), None);
    }

    #[test]
    fn labels_and_buttons_start_in_live_state() {
        let qc = controls(vec![], 0);
        assert_eq!(qc.accepting_label(), STOP_ACCEPTING_LABEL);
        assert!(qc.delete_visible());
        assert!(!qc.undo_delete_visible());
    }
}
