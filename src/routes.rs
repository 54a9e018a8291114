// src/routes.rs

//! Backend paths used by the client, one function per endpoint.
//!
//! All paths are relative to the server root; `ApiClient` joins them onto the
//! configured base URL.

// Participant API

pub fn submit_answer() -> String {
    "/api/participant/submit-answer".to_string()
}

pub fn quiz_status(quiz_id: i64) -> String {
    format!("/api/participant/quiz/{}/getstatus", quiz_id)
}

pub fn set_profile() -> String {
    "/api/participant/set-profile".to_string()
}

/// Page a participant lands on after registering.
pub fn participant_live_page(quiz_id: &str) -> String {
    format!("/participant/quiz/{}/live", quiz_id)
}

// Quizmaster API: questions

pub fn new_question() -> String {
    "/api/quizmaster/question/new".to_string()
}

pub fn update_question(question_id: &str) -> String {
    format!("/api/quizmaster/question/{}/update", question_id)
}

pub fn question(question_id: &str) -> String {
    format!("/api/quizmaster/question/{}", question_id)
}

pub fn delete_question(question_id: &str) -> String {
    format!("/api/quizmaster/question/{}/delete", question_id)
}

pub fn all_answers(question_id: i64) -> String {
    format!("/api/quizmaster/question/{}/getallanswers", question_id)
}

pub fn save_scores(question_id: i64) -> String {
    format!("/api/quizmaster/question/{}/savescores", question_id)
}

// Quizmaster API: quiz lifecycle

pub fn update_quiz_properties(quiz_id: i64) -> String {
    format!("/api/quizmaster/quiz/{}/updateproperties", quiz_id)
}

pub fn delete_quiz(quiz_id: i64) -> String {
    format!("/api/quizmaster/quiz/{}/delete", quiz_id)
}

pub fn reinstate_quiz(quiz_id: i64) -> String {
    format!("/api/quizmaster/quiz/{}/reinstate", quiz_id)
}

pub fn set_active_question(quiz_id: i64, question_id: i64) -> String {
    format!("/api/quizmaster/quiz/{}/setactive/{}", quiz_id, question_id)
}

pub fn set_accepting_responses(quiz_id: i64) -> String {
    format!("/api/quizmaster/quiz/{}/setacceptingresponses", quiz_id)
}
