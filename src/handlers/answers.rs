// src/handlers/answers.rs

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::FixedOffset;

use crate::{
    error::ClientError,
    models::{answer::ScoreInputs, form::FormData},
    poll::{self, Backoff, BackoffPolicy, CancellationFlag, LoopExit, ReloadReason, TickOutcome},
    routes,
    utils::{http::ApiClient, time::replace_answer_times},
};

/// Key suffix of free-text score overrides.
pub const CUSTOM_SCORE_SUFFIX: &str = "-custom-score";

/// Id suffix of the radio button that selects the custom score.
pub const CUSTOM_CHOICE_SUFFIX: &str = "-score-custom";

pub const ANSWERS_UNREACHABLE_MESSAGE: &str =
    "Something's wrong. Can't seem to fetch answers from the server";

/// Scores the quizmaster entered but has not necessarily saved.
///
/// Each listing refresh throws away every score input, so the last snapshot
/// of the scoring form is replayed onto the new inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedScores {
    entries: FormData,
}

impl SavedScores {
    pub fn capture(inputs: &ScoreInputs) -> Self {
        Self {
            entries: inputs.to_form(),
        }
    }

    pub fn entries(&self) -> &FormData {
        &self.entries
    }

    /// Applies the snapshot to freshly rendered inputs.
    ///
    /// `ans-<id>-custom-score` keys restore the text field with that id;
    /// every other key selects the choice with id `<key>-<value>`. Inputs
    /// that no longer exist are skipped. Returns how many were applied.
    pub fn replay(&self, inputs: &mut ScoreInputs) -> usize {
        let mut applied = 0;
        for (key, value) in self.entries.iter() {
            let hit = if key.ends_with(CUSTOM_SCORE_SUFFIX) {
                inputs.set_text(key, value)
            } else {
                inputs.check(&format!("{}-{}", key, value))
            };
            if hit {
                applied += 1;
            }
        }
        applied
    }
}

/// The rendered answer list of the live question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerListing {
    /// Fragment to show: answer times localized, score inputs reflecting
    /// `inputs`.
    pub html: String,
    pub inputs: ScoreInputs,
}

impl AnswerListing {
    fn rerender(&mut self) {
        self.html = self.inputs.project(&self.html);
    }
}

#[derive(Debug, Default)]
struct BoardState {
    listing: AnswerListing,
    saved: Option<SavedScores>,
}

/// The quizmaster's view of incoming answers for one question.
///
/// Clones share state so the refresh loop and score edits can interleave.
#[derive(Clone)]
pub struct AnswerBoard {
    api: ApiClient,
    question_id: i64,
    offset: FixedOffset,
    state: Arc<Mutex<BoardState>>,
    keep_refreshing: CancellationFlag,
}

impl AnswerBoard {
    pub fn new(api: ApiClient, question_id: i64, offset: FixedOffset) -> Self {
        Self {
            api,
            question_id,
            offset,
            state: Arc::new(Mutex::new(BoardState::default())),
            keep_refreshing: CancellationFlag::new(),
        }
    }

    /// Shares an existing stop flag, e.g. the process-wide one.
    pub fn with_stop_flag(mut self, flag: CancellationFlag) -> Self {
        self.keep_refreshing = flag;
        self
    }

    pub fn question_id(&self) -> i64 {
        self.question_id
    }

    /// Cancelled to stop the refresh loop at its next wake. Resuming it
    /// retires any loop already running, so a fresh `watch` is the only one.
    pub fn keep_refreshing(&self) -> &CancellationFlag {
        &self.keep_refreshing
    }

    pub fn listing(&self) -> AnswerListing {
        self.lock().listing.clone()
    }

    pub fn saved_scores(&self) -> Option<SavedScores> {
        self.lock().saved.clone()
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Fetches the answer listing and re-applies unsaved scores to it.
    pub async fn refresh(&self) -> Result<(), ClientError> {
        let html = self
            .api
            .get_text(&routes::all_answers(self.question_id))
            .await?;
        self.apply_fragment(&html);
        Ok(())
    }

    /// Replaces the listing with a server-rendered fragment.
    pub fn apply_fragment(&self, html: &str) {
        let html = replace_answer_times(html, self.offset);
        let inputs = ScoreInputs::from_fragment(&html);

        let mut state = self.lock();
        let mut listing = AnswerListing { html, inputs };
        if let Some(saved) = &state.saved {
            let applied = saved.replay(&mut listing.inputs);
            tracing::debug!("Restored {} unsaved score inputs", applied);
            listing.rerender();
        }
        state.listing = listing;
    }

    /// Selects a score choice (`ans-<id>-score-<value>`) and snapshots the
    /// form. Returns the id of the text field to focus when the custom score
    /// option was picked.
    pub fn select_score(&self, choice_id: &str) -> Option<String> {
        let mut state = self.lock();
        if !state.listing.inputs.check(choice_id) {
            return None;
        }
        state.listing.rerender();
        let snapshot = SavedScores::capture(&state.listing.inputs);
        state.saved = Some(snapshot);
        choice_id
            .strip_suffix(CUSTOM_CHOICE_SUFFIX)
            .map(|prefix| format!("{}{}", prefix, CUSTOM_SCORE_SUFFIX))
    }

    /// Types a custom score and snapshots the form.
    pub fn set_custom_score(&self, field_id: &str, value: &str) -> bool {
        let mut state = self.lock();
        if !state.listing.inputs.set_text(field_id, value) {
            return false;
        }
        state.listing.rerender();
        let snapshot = SavedScores::capture(&state.listing.inputs);
        state.saved = Some(snapshot);
        true
    }

    /// Posts the scoring form.
    pub async fn save_scores(&self) -> Result<(), ClientError> {
        let form = self.lock().listing.inputs.to_form();
        self.api
            .post_text(&routes::save_scores(self.question_id), &form)
            .await?;
        self.api.status().show("Scores Saved.");
        tracing::info!("Saved scores for question {}", self.question_id);
        Ok(())
    }

    /// Refreshes the listing until `keep_refreshing` is cancelled or
    /// resumed, or the server stays unreachable past the backoff ceiling.
    pub async fn watch(&self) -> LoopExit {
        self.watch_with(BackoffPolicy::QUIZMASTER_ANSWERS).await
    }

    pub async fn watch_with(&self, policy: BackoffPolicy) -> LoopExit {
        let mut backoff = Backoff::new(policy);
        let exit = poll::run(&mut backoff, &self.keep_refreshing, || {
            let board = self.clone();
            async move { board.refresh().await.map(|_| TickOutcome::Continue) }
        })
        .await;

        if exit == LoopExit::Reload(ReloadReason::GaveUp) {
            self.api.status().show(ANSWERS_UNREACHABLE_MESSAGE);
        }
        exit
    }
}
