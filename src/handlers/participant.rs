// src/handlers/participant.rs

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;

use crate::{
    error::ClientError,
    handlers::Navigation,
    models::{form::FormData, question::NewId, status::QuizStatus},
    poll::{self, Backoff, BackoffPolicy, CancellationFlag, LoopExit, ReloadReason, TickOutcome},
    routes,
    utils::{http::ApiClient, report::show_error},
};

/// How long the check mark stays up after an answer is saved.
pub const DONE_CHECK_DURATION: Duration = Duration::from_secs(2);

pub const UNREACHABLE_MESSAGE: &str =
    "Something went wrong, we can't contact the server. Reloading the page.";

/// A participant's answer, one variant per answer type.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// 0-based index of the selected option.
    Choice(usize),
}

impl AnswerValue {
    fn append_to(&self, form: &mut FormData) {
        match self {
            AnswerValue::Text(text) => form.append("ans-text", text.as_str()),
            AnswerValue::Int(n) => form.append("ans-int64", n.to_string()),
            AnswerValue::Float(x) => form.append("ans-float", x.to_string()),
            AnswerValue::Bool(b) => form.append("ans-bool", b.to_string()),
            AnswerValue::Choice(i) => form.append("ans-mcq", i.to_string()),
        }
    }
}

/// Registers a profile name for a quiz.
///
/// On success shows "Saved." and returns where to go next: the quiz's live
/// page.
pub async fn register(
    api: &ApiClient,
    quiz_id: &str,
    profile_name: &str,
) -> Result<Navigation, ClientError> {
    let form = FormData::new()
        .with("quiz-id", quiz_id)
        .with("profile-name", profile_name);

    match api.post_raw(&routes::set_profile(), &form).await {
        Ok(_) => {
            api.status().show("Saved.");
            tracing::info!("Registered '{}' for quiz {}", profile_name, quiz_id);
            Ok(Navigation::Navigate(routes::participant_live_page(quiz_id)))
        }
        Err(e) => {
            show_error(api.status(), &e);
            Err(e)
        }
    }
}

/// What the live question page shows.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveView {
    pub submit_enabled: bool,
    /// Id of the stored answer; later submissions update it.
    pub answer_id: Option<i64>,
    check_until: Option<Instant>,
}

impl Default for LiveView {
    fn default() -> Self {
        Self {
            submit_enabled: true,
            answer_id: None,
            check_until: None,
        }
    }
}

impl LiveView {
    pub fn check_visible(&self) -> bool {
        self.check_until.is_some_and(|until| Instant::now() < until)
    }
}

/// A participant on the live page of one question.
///
/// Clones share the same view, so the status loop and answer submission can
/// run side by side.
#[derive(Clone)]
pub struct ParticipantSession {
    api: ApiClient,
    quiz_id: i64,
    question_id: i64,
    view: Arc<Mutex<LiveView>>,
}

impl ParticipantSession {
    pub fn new(api: ApiClient, quiz_id: i64, question_id: i64) -> Self {
        Self {
            api,
            quiz_id,
            question_id,
            view: Arc::new(Mutex::new(LiveView::default())),
        }
    }

    pub fn quiz_id(&self) -> i64 {
        self.quiz_id
    }

    pub fn question_id(&self) -> i64 {
        self.question_id
    }

    pub fn view(&self) -> LiveView {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, LiveView> {
        match self.view.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Submits (or updates) the answer to the live question.
    pub async fn submit_answer(&self, answer: &AnswerValue) -> Result<i64, ClientError> {
        let mut form = FormData::new()
            .with("qz-id", self.quiz_id.to_string())
            .with("qn-id", self.question_id.to_string())
            .with(
                "ans-id",
                self.lock().answer_id.map(|id| id.to_string()).unwrap_or_default(),
            );
        answer.append_to(&mut form);

        let NewId(answer_id) = self.api.post_json(&routes::submit_answer(), &form).await?;

        let mut view = self.lock();
        view.answer_id = Some(answer_id);
        view.check_until = Some(Instant::now() + DONE_CHECK_DURATION);
        tracing::debug!("Answer {} saved for question {}", answer_id, self.question_id);
        Ok(answer_id)
    }

    /// One status poll. Diverges when the quiz has moved to another question;
    /// otherwise mirrors whether responses are accepted onto the submit button.
    pub async fn check_status(&self) -> Result<TickOutcome, ClientError> {
        let status: QuizStatus = self.api.get_json(&routes::quiz_status(self.quiz_id)).await?;

        if status.diverges_from(self.question_id) {
            tracing::info!(
                "Quiz {} moved from question {} to {:?}",
                self.quiz_id,
                self.question_id,
                status.question_id
            );
            return Ok(TickOutcome::Diverged);
        }
        if let Some(accepting) = status.accepting_responses {
            self.lock().submit_enabled = accepting;
        }
        Ok(TickOutcome::Continue)
    }

    /// Polls the quiz status until a reload is needed or `cancel` is set.
    pub async fn watch_status(&self, cancel: &CancellationFlag) -> LoopExit {
        self.watch_status_with(BackoffPolicy::PARTICIPANT_STATUS, cancel).await
    }

    pub async fn watch_status_with(&self, policy: BackoffPolicy, cancel: &CancellationFlag) -> LoopExit {
        let mut backoff = Backoff::new(policy);
        let exit = poll::run(&mut backoff, cancel, || {
            let session = self.clone();
            async move { session.check_status().await }
        })
        .await;

        if exit == LoopExit::Reload(ReloadReason::GaveUp) {
            self.api.status().show(UNREACHABLE_MESSAGE);
        }
        exit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_fields_follow_type() {
        let cases = [
            (AnswerValue::Text("Paris".into()), "ans-text", "Paris"),
            (AnswerValue::Int(-3), "ans-int64", "-3"),
            (AnswerValue::Float(2.5), "ans-float", "2.5"),
            (AnswerValue::Bool(true), "ans-bool", "true"),
            (AnswerValue::Choice(2), "ans-mcq", "2"),
        ];
        for (answer, key, value) in cases {
            let mut form = FormData::new();
            answer.append_to(&mut form);
            assert_eq!(form.get(key), Some(value));
            assert_eq!(form.len(), 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn done_check_hides_after_two_seconds() {
        let mut view = LiveView::default();
        assert!(!view.check_visible());
        view.check_until = Some(Instant::now() + DONE_CHECK_DURATION);
        assert!(view.check_visible());
        tokio::time::advance(Duration::from_millis(2001)).await;
        assert!(!view.check_visible());
    }
}
