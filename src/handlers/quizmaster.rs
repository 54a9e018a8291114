// src/handlers/quizmaster.rs

use crate::{
    error::ClientError,
    handlers::choices::ChoiceRows,
    models::{
        form::FormData,
        question::{NewId, Question, QuestionType},
    },
    routes,
    utils::{html::clean_html, http::ApiClient},
};

/// Which form pane of the quizmaster editor is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Quiz,
    Question,
}

/// A question card in the quiz's question list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedQuestion {
    pub id: i64,
    /// Sanitized title markup.
    pub title: String,
    /// Sanitized body markup.
    pub body: String,
}

impl ListedQuestion {
    pub fn new(id: i64, title: &str, body: &str) -> Self {
        Self {
            id,
            title: clean_html(title),
            body: clean_html(body),
        }
    }
}

/// Contents of the question form.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionForm {
    /// Empty for a question that has not been saved yet.
    pub question_id: String,
    pub quiz_id: i64,
    pub title: String,
    pub body: String,
    pub kind: QuestionType,
    pub choices: ChoiceRows,
}

impl QuestionForm {
    pub fn blank(quiz_id: i64) -> Self {
        Self {
            question_id: String::new(),
            quiz_id,
            title: String::new(),
            body: String::new(),
            kind: QuestionType::TextAnswer,
            choices: ChoiceRows::new(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.question_id.is_empty()
    }

    /// The form as the server expects it. Options are only sent for multiple
    /// choice questions.
    pub fn to_form(&self) -> FormData {
        let mut form = FormData::new()
            .with("quiz-id", self.quiz_id.to_string())
            .with("qn-id", self.question_id.as_str())
            .with("qn-title", self.title.as_str())
            .with("qn-body", self.body.as_str())
            .with("qn-type", self.kind.form_code());
        if self.kind == QuestionType::MultipleChoiceAnswer {
            for option in self.choices.values() {
                form.append("mcq-opt", option.as_str());
            }
        }
        form
    }
}

/// Result of submitting the question form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted {
    Created(i64),
    Updated(String),
}

/// The quizmaster's question editor: one reusable form plus the question
/// list it keeps in sync.
pub struct QuestionEditor {
    api: ApiClient,
    form: QuestionForm,
    listing: Vec<ListedQuestion>,
    pane: Pane,
}

impl QuestionEditor {
    pub fn new(api: ApiClient, quiz_id: i64, listing: Vec<ListedQuestion>) -> Self {
        Self {
            api,
            form: QuestionForm::blank(quiz_id),
            listing,
            pane: Pane::Quiz,
        }
    }

    pub fn form(&self) -> &QuestionForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut QuestionForm {
        &mut self.form
    }

    pub fn listing(&self) -> &[ListedQuestion] {
        &self.listing
    }

    pub fn pane(&self) -> Pane {
        self.pane
    }

    pub fn show_quiz_pane(&mut self) {
        self.pane = Pane::Quiz;
    }

    pub fn submit_label(&self) -> &'static str {
        if self.form.is_new() {
            "Add Question"
        } else {
            "Update Question"
        }
    }

    pub fn delete_enabled(&self) -> bool {
        !self.form.is_new()
    }

    /// The option rows are only shown for multiple choice questions.
    pub fn choices_visible(&self) -> bool {
        self.form.kind == QuestionType::MultipleChoiceAnswer
    }

    pub fn set_kind(&mut self, kind: QuestionType) {
        self.form.kind = kind;
    }

    /// Starts a new question in the question pane.
    pub fn new_question(&mut self) {
        self.pane = Pane::Question;
        self.reset();
    }

    /// Clears the form back to a new text question.
    pub fn reset(&mut self) {
        self.form = QuestionForm::blank(self.form.quiz_id);
    }

    /// Loads a listed question into the form.
    ///
    /// `None` stands for a list entry without a usable id.
    pub async fn open_question(&mut self, question_id: Option<i64>) -> Result<(), ClientError> {
        self.pane = Pane::Question;
        let Some(id) = question_id else {
            let msg = "Could not figure out the question ID you wanted.";
            self.api.status().show(msg);
            return Err(ClientError::Invalid(msg.to_string()));
        };
        let question: Question = self.api.get_json(&routes::question(&id.to_string())).await?;
        self.populate(&question);
        Ok(())
    }

    /// Fills the form from a question fetched from the server.
    pub fn populate(&mut self, question: &Question) {
        let kind = match question.kind() {
            Some(kind) => kind,
            None => {
                tracing::warn!("Unknown question type '{}'", question.question_type);
                self.api.status().show("Got a weird question type");
                QuestionType::TextAnswer
            }
        };

        let choices = if kind == QuestionType::MultipleChoiceAnswer {
            ChoiceRows::from_values(question.choices.iter().map(|c| c.html_body.clone()))
        } else {
            ChoiceRows::new()
        };

        self.form = QuestionForm {
            question_id: question.id.to_string(),
            quiz_id: question.quiz_id,
            title: question.title.clone(),
            body: question.html_body.clone(),
            kind,
            choices,
        };
    }

    /// Saves the form: creates a question when it has no id, updates it
    /// otherwise.
    ///
    /// A created question is appended to the list and the form is reset; an
    /// updated one has its list entry patched in place.
    pub async fn submit(&mut self) -> Result<Submitted, ClientError> {
        let form = self.form.to_form();

        if self.form.is_new() {
            let NewId(id) = self.api.post_json(&routes::new_question(), &form).await?;
            self.api.status().show("Saved.");
            self.listing
                .push(ListedQuestion::new(id, &self.form.title, &self.form.body));
            tracing::info!("Created question {} in quiz {}", id, self.form.quiz_id);
            self.reset();
            Ok(Submitted::Created(id))
        } else {
            let question_id = self.form.question_id.clone();
            self.api
                .put_text(&routes::update_question(&question_id), &form)
                .await?;
            self.api.status().show("Saved.");
            let (title, body) = (clean_html(&self.form.title), clean_html(&self.form.body));
            if let Some(listed) = self.find_listed_mut(&question_id) {
                listed.title = title;
                listed.body = body;
            }
            tracing::info!("Updated question {}", question_id);
            Ok(Submitted::Updated(question_id))
        }
    }

    /// Deletes the question currently in the form.
    pub async fn delete_current(&mut self) -> Result<(), ClientError> {
        let question_id = self.form.question_id.clone();
        if question_id.is_empty() {
            return Err(ClientError::Invalid("no question selected".to_string()));
        }
        self.api
            .delete_text(&routes::delete_question(&question_id))
            .await?;
        self.listing.retain(|q| q.id.to_string() != question_id);
        tracing::info!("Deleted question {}", question_id);
        self.reset();
        Ok(())
    }

    fn find_listed_mut(&mut self, question_id: &str) -> Option<&mut ListedQuestion> {
        self.listing
            .iter_mut()
            .find(|q| q.id.to_string() == question_id)
    }
}
