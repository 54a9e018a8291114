// tests/quizmaster_tests.rs

mod common;

use std::time::Duration;

use chrono::FixedOffset;
use common::{client, spawn_backend};
use quizdrum_client::{
    ClientError,
    handlers::{
        Navigation,
        answers::{ANSWERS_UNREACHABLE_MESSAGE, AnswerBoard},
        quiz::{ACCEPT_AGAIN_LABEL, QuizControls, STOP_ACCEPTING_LABEL},
        quizmaster::{ListedQuestion, Pane, QuestionEditor, Submitted},
    },
    models::question::QuestionType,
    poll::{BackoffPolicy, LoopExit, ReloadReason},
};

const ANSWERS: &str = r#"<div class="answer">
  <span class="anstime" data-timestamp="1600000000">1600000000</span>
  <input type="radio" id="ans-3-score-0" name="ans-3-score" value="0" checked>
  <input type="radio" id="ans-3-score-5" name="ans-3-score" value="5">
  <input type="radio" id="ans-3-score-custom" name="ans-3-score" value="custom">
  <input type="text" id="ans-3-custom-score" name="ans-3-custom-score" value="">
</div>"#;

const MORE_ANSWERS: &str = r#"<div class="answer">
  <span class="anstime" data-timestamp="1600000000">1600000000</span>
  <input type="radio" id="ans-3-score-0" name="ans-3-score" value="0" checked>
  <input type="radio" id="ans-3-score-5" name="ans-3-score" value="5">
  <input type="radio" id="ans-3-score-custom" name="ans-3-score" value="custom">
  <input type="text" id="ans-3-custom-score" name="ans-3-custom-score" value="">
</div>
<div class="answer">
  <span class="anstime" data-timestamp="1600000060">1600000060</span>
  <input type="radio" id="ans-4-score-0" name="ans-4-score" value="0" checked>
  <input type="radio" id="ans-4-score-10" name="ans-4-score" value="10">
  <input type="text" id="ans-4-custom-score" name="ans-4-custom-score" value="">
</div>"#;

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

fn fast_policy() -> BackoffPolicy {
    BackoffPolicy {
        initial: Duration::from_millis(1),
        floor: Duration::from_millis(1),
        ceiling: Duration::from_millis(3),
        factor: 1.3,
    }
}

#[tokio::test]
async fn adding_a_question_appends_it_and_resets_the_form() {
    // Arrange
    let (fake, address) = spawn_backend().await;
    let (api, info) = client(&address);
    let mut editor = QuestionEditor::new(api, 7, Vec::new());
    editor.new_question();
    assert_eq!(editor.pane(), Pane::Question);
    assert_eq!(editor.submit_label(), "Add Question");
    assert!(!editor.delete_enabled());

    editor.form_mut().title = "<i>Colours</i>".to_string();
    editor.form_mut().body = "Pick one<script>alert(1)</script>".to_string();
    editor.set_kind(QuestionType::MultipleChoiceAnswer);
    assert!(editor.choices_visible());
    editor.form_mut().choices.input(1, "red");
    editor.form_mut().choices.input(2, "green");

    // Act
    let outcome = editor.submit().await.unwrap();

    // Assert
    assert_eq!(outcome, Submitted::Created(13));
    assert_eq!(info.text(), "Saved.");

    let req = fake.last_request();
    assert_eq!(req.method, "POST");
    assert_eq!(req.path, "/api/quizmaster/question/new");
    assert_eq!(req.field("qn-id").as_deref(), Some(""));
    assert_eq!(req.field("quiz-id").as_deref(), Some("7"));
    assert_eq!(req.field("qn-type").as_deref(), Some("mcq"));
    let options: Vec<String> = req
        .form()
        .into_iter()
        .filter(|(k, _)| k == "mcq-opt")
        .map(|(_, v)| v)
        .collect();
    assert_eq!(options, vec!["red", "green", ""]);

    assert_eq!(
        editor.listing(),
        &[ListedQuestion {
            id: 13,
            title: "<i>Colours</i>".to_string(),
            body: "Pick one".to_string(),
        }]
    );
    assert!(editor.form().is_new());
    assert_eq!(editor.form().title, "");
    assert_eq!(editor.form().kind, QuestionType::TextAnswer);
    assert!(!editor.choices_visible());

    editor.show_quiz_pane();
    assert_eq!(editor.pane(), Pane::Quiz);
}

#[tokio::test]
async fn opening_a_question_fills_the_form() {
    let (fake, address) = spawn_backend().await;
    fake.with(|b| {
        b.question_json = r#"{"id":"42","quizId":"7","title":"Q1","htmlBody":"Which?",
            "type":"MULTIPLE_CHOICE_ANSWER","choices":[{"htmlBody":"a"},{"htmlBody":"b"}]}"#
            .to_string()
    });
    let (api, _info) = client(&address);
    let mut editor = QuestionEditor::new(api, 7, vec![ListedQuestion::new(42, "Q1", "Which?")]);

    editor.open_question(Some(42)).await.unwrap();

    assert_eq!(fake.last_request().path, "/api/quizmaster/question/42");
    let form = editor.form();
    assert_eq!(form.question_id, "42");
    assert_eq!(form.title, "Q1");
    assert_eq!(form.body, "Which?");
    assert_eq!(form.kind, QuestionType::MultipleChoiceAnswer);
    assert_eq!(form.choices.values(), &["a", "b", ""]);
    assert_eq!(editor.submit_label(), "Update Question");
    assert!(editor.delete_enabled());
}

#[tokio::test]
async fn weird_question_type_falls_back_to_text() {
    let (fake, address) = spawn_backend().await;
    fake.with(|b| b.question_json = r#"{"id":2,"quizId":7,"type":"ESSAY"}"#.to_string());
    let (api, info) = client(&address);
    let mut editor = QuestionEditor::new(api, 7, Vec::new());

    editor.open_question(Some(2)).await.unwrap();

    assert_eq!(info.text(), "Got a weird question type");
    assert_eq!(editor.form().kind, QuestionType::TextAnswer);
    assert!(editor.form().choices.is_empty());
}

#[tokio::test]
async fn opening_without_an_id_is_reported() {
    let (fake, address) = spawn_backend().await;
    let (api, info) = client(&address);
    let mut editor = QuestionEditor::new(api, 7, Vec::new());

    let err = editor.open_question(None).await.unwrap_err();

    assert!(matches!(err, ClientError::Invalid(_)));
    assert_eq!(info.text(), "Could not figure out the question ID you wanted.");
    assert!(fake.requests().is_empty());
}

#[tokio::test]
async fn updating_a_question_patches_its_list_entry() {
    // Arrange
    let (fake, address) = spawn_backend().await;
    fake.with(|b| {
        b.question_json =
            r#"{"id":"42","quizId":"7","title":"Old","htmlBody":"old body","type":"TEXT_ANSWER"}"#
                .to_string()
    });
    let (api, info) = client(&address);
    let listing = vec![
        ListedQuestion::new(41, "Other", "other body"),
        ListedQuestion::new(42, "Old", "old body"),
    ];
    let mut editor = QuestionEditor::new(api, 7, listing);
    editor.open_question(Some(42)).await.unwrap();

    // Act
    editor.form_mut().title = "New <b>title</b>".to_string();
    let outcome = editor.submit().await.unwrap();

    // Assert
    assert_eq!(outcome, Submitted::Updated("42".to_string()));
    assert_eq!(info.text(), "Saved.");
    let req = fake.last_request();
    assert_eq!(req.method, "PUT");
    assert_eq!(req.path, "/api/quizmaster/question/42/update");
    assert_eq!(req.field("qn-id").as_deref(), Some("42"));
    assert_eq!(req.field("qn-title").as_deref(), Some("New <b>title</b>"));
    assert_eq!(req.field("mcq-opt"), None);

    assert_eq!(editor.listing()[0].title, "Other");
    assert_eq!(editor.listing()[1].title, "New <b>title</b>");
    assert_eq!(editor.form().question_id, "42");
}

#[tokio::test]
async fn failed_update_leaves_the_list_alone() {
    let (fake, address) = spawn_backend().await;
    fake.with(|b| {
        b.question_json = r#"{"id":42,"quizId":7,"title":"Old","type":"TEXT_ANSWER"}"#.to_string()
    });
    let (api, info) = client(&address);
    let mut editor = QuestionEditor::new(api, 7, vec![ListedQuestion::new(42, "Old", "")]);
    editor.open_question(Some(42)).await.unwrap();

    fake.with(|b| b.broken = true);
    editor.form_mut().title = "New".to_string();
    assert!(editor.submit().await.is_err());

    assert_eq!(info.text(), "Error HTTP (500): backend down");
    assert_eq!(editor.listing()[0].title, "Old");
}

#[tokio::test]
async fn deleting_the_open_question_removes_it() {
    let (fake, address) = spawn_backend().await;
    fake.with(|b| {
        b.question_json = r#"{"id":42,"quizId":7,"title":"Q","type":"BOOL_ANSWER"}"#.to_string()
    });
    let (api, _info) = client(&address);
    let mut editor = QuestionEditor::new(
        api,
        7,
        vec![ListedQuestion::new(41, "P", ""), ListedQuestion::new(42, "Q", "")],
    );
    editor.open_question(Some(42)).await.unwrap();

    editor.delete_current().await.unwrap();

    let req = fake.last_request();
    assert_eq!(req.method, "DELETE");
    assert_eq!(req.path, "/api/quizmaster/question/42/delete");
    assert_eq!(editor.listing().len(), 1);
    assert_eq!(editor.listing()[0].id, 41);
    assert!(editor.form().is_new());
}

#[tokio::test]
async fn deleting_without_an_open_question_is_refused() {
    let (fake, address) = spawn_backend().await;
    let (api, _info) = client(&address);
    let mut editor = QuestionEditor::new(api, 7, vec![ListedQuestion::new(41, "P", "")]);

    let err = editor.delete_current().await.unwrap_err();

    assert_eq!(err, ClientError::Invalid("no question selected".to_string()));
    assert!(fake.requests().is_empty());
    assert_eq!(editor.listing().len(), 1);
}

#[tokio::test]
async fn quiz_delete_and_undo_swap_buttons() {
    let (fake, address) = spawn_backend().await;
    let (api, info) = client(&address);
    let mut controls = QuizControls::new(api, 7, vec![10, 11], 10);

    controls.delete_quiz().await.unwrap();
    assert_eq!(info.text(), "Deleted Quiz.");
    assert_eq!(fake.last_request().path, "/api/quizmaster/quiz/7/delete");
    assert!(!controls.delete_visible());
    assert!(controls.undo_delete_visible());

    controls.reinstate_quiz().await.unwrap();
    assert_eq!(info.text(), "Reinstated Quiz.");
    let req = fake.last_request();
    assert_eq!((req.method.as_str(), req.path.as_str()), ("PUT", "/api/quizmaster/quiz/7/reinstate"));
    assert!(controls.delete_visible());
    assert!(!controls.undo_delete_visible());
}

#[tokio::test]
async fn quiz_properties_are_saved() {
    let (fake, address) = spawn_backend().await;
    let (api, info) = client(&address);
    let controls = QuizControls::new(api, 7, Vec::new(), 0);

    controls.update_properties("Pub quiz", "Round one").await.unwrap();

    let req = fake.last_request();
    assert_eq!(req.path, "/api/quizmaster/quiz/7/updateproperties");
    assert_eq!(req.field("qz-title").as_deref(), Some("Pub quiz"));
    assert_eq!(req.field("qz-descr").as_deref(), Some("Round one"));
    assert_eq!(info.text(), "Updated Quiz.");
}

#[tokio::test]
async fn next_question_is_marked_active() {
    let (fake, address) = spawn_backend().await;
    let (api, info) = client(&address);
    let controls = QuizControls::new(api, 7, vec![10, 11, 12], 11);

    let next = controls.next_question().await.unwrap();

    assert_eq!(next, Some(Navigation::Reload));
    assert_eq!(fake.last_request().path, "/api/quizmaster/quiz/7/setactive/12");
    assert_eq!(
        info.text(),
        "Next ID has been marked as active. Refresh the page now."
    );

    let previous = controls.previous_question().await.unwrap();
    assert_eq!(previous, Some(Navigation::Reload));
    assert_eq!(fake.last_request().path, "/api/quizmaster/quiz/7/setactive/10");
}

#[tokio::test]
async fn moving_past_the_last_question_does_nothing() {
    let (fake, address) = spawn_backend().await;
    let (api, _info) = client(&address);
    let controls = QuizControls::new(api, 7, vec![10, 11, 12], 12);

    assert_eq!(controls.next_question().await.unwrap(), None);
    assert!(fake.requests().is_empty());
}

#[tokio::test]
async fn stopping_responses_stops_refreshing() {
    // Arrange
    let (fake, address) = spawn_backend().await;
    fake.with(|b| b.answers_html = ANSWERS.to_string());
    let (api, _info) = client(&address);
    let board = AnswerBoard::new(api.clone(), 3, utc());
    let mut controls = QuizControls::new(api, 7, vec![3], 3);
    assert_eq!(controls.accepting_label(), STOP_ACCEPTING_LABEL);

    // Act
    let accepting = controls.toggle_accepting(&board).await.unwrap();

    // Assert
    assert!(!accepting);
    assert_eq!(controls.accepting_label(), ACCEPT_AGAIN_LABEL);
    assert!(board.keep_refreshing().is_cancelled());

    let requests = fake.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].path, "/api/quizmaster/quiz/7/setacceptingresponses");
    assert_eq!(requests[0].field("ar").as_deref(), Some("false"));
    assert_eq!(requests[1].method, "GET");
    assert_eq!(requests[1].path, "/api/quizmaster/question/3/getallanswers");
    assert_eq!(board.listing().inputs.len(), 4);

    // Accepting again clears the stop flag
    assert!(controls.toggle_accepting(&board).await.unwrap());
    assert_eq!(fake.requests()[2].field("ar").as_deref(), Some("true"));
    assert!(!board.keep_refreshing().is_cancelled());
    assert_eq!(controls.accepting_label(), STOP_ACCEPTING_LABEL);
}

#[tokio::test]
async fn unsaved_scores_survive_a_refresh() {
    // Arrange
    let (fake, address) = spawn_backend().await;
    fake.with(|b| b.answers_html = ANSWERS.to_string());
    let (api, info) = client(&address);
    let board = AnswerBoard::new(api, 3, utc());
    board.refresh().await.unwrap();
    assert!(board.listing().html.contains("Sep 13, 12:26:40 PM UTC"));

    // Act
    let focus = board.select_score("ans-3-score-custom");
    assert!(board.set_custom_score("ans-3-custom-score", "7"));
    fake.with(|b| b.answers_html = MORE_ANSWERS.to_string());
    board.refresh().await.unwrap();

    // Assert
    assert_eq!(focus.as_deref(), Some("ans-3-custom-score"));
    let inputs = board.listing().inputs;
    assert_eq!(inputs.len(), 7);
    assert_eq!(inputs.checked_in("ans-3-score"), Some("ans-3-score-custom"));
    assert_eq!(inputs.get("ans-3-custom-score").unwrap().value, "7");
    assert_eq!(inputs.checked_in("ans-4-score"), Some("ans-4-score-0"));
    let html = board.listing().html;
    assert!(html.contains(
        r#"<input type="text" id="ans-3-custom-score" name="ans-3-custom-score" value="7">"#
    ));
    assert!(html.contains(
        r#"<input type="radio" id="ans-3-score-custom" name="ans-3-score" value="custom" checked>"#
    ));
    let saved = board.saved_scores().unwrap();
    assert_eq!(saved.entries().get("ans-3-score"), Some("custom"));
    assert_eq!(saved.entries().get("ans-3-custom-score"), Some("7"));

    board.save_scores().await.unwrap();
    assert_eq!(info.text(), "Scores Saved.");
    let req = fake.last_request();
    assert_eq!(req.path, "/api/quizmaster/question/3/savescores");
    assert_eq!(req.field("ans-3-score").as_deref(), Some("custom"));
    assert_eq!(req.field("ans-3-custom-score").as_deref(), Some("7"));
    assert_eq!(req.field("ans-4-score").as_deref(), Some("0"));
}

#[tokio::test]
async fn restarting_the_answer_watch_retires_the_old_loop() {
    // Arrange
    let (fake, address) = spawn_backend().await;
    fake.with(|b| b.answers_html = ANSWERS.to_string());
    let (api, _info) = client(&address);
    let board = AnswerBoard::new(api.clone(), 3, utc());
    let mut controls = QuizControls::new(api, 7, vec![3], 3);
    let policy = BackoffPolicy {
        initial: Duration::from_millis(20),
        floor: Duration::from_millis(20),
        ceiling: Duration::from_secs(1),
        factor: 1.3,
    };

    let first = tokio::spawn({
        let board = board.clone();
        async move { board.watch_with(policy).await }
    });
    while fake.requests().len() < 2 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    // Act: stop, accept again, then restart the watch
    assert!(!controls.toggle_accepting(&board).await.unwrap());
    assert!(controls.toggle_accepting(&board).await.unwrap());
    let second = tokio::spawn({
        let board = board.clone();
        async move { board.watch_with(policy).await }
    });

    // Assert
    let first_exit = tokio::time::timeout(Duration::from_secs(2), first)
        .await
        .expect("first loop kept running")
        .unwrap();
    assert_eq!(first_exit, LoopExit::Cancelled);
    assert!(!second.is_finished());

    board.keep_refreshing().cancel();
    let second_exit = tokio::time::timeout(Duration::from_secs(2), second)
        .await
        .expect("second loop kept running")
        .unwrap();
    assert_eq!(second_exit, LoopExit::Cancelled);
}

#[tokio::test]
async fn answer_watch_stops_when_flag_is_cleared() {
    let (fake, address) = spawn_backend().await;
    fake.with(|b| b.answers_html = ANSWERS.to_string());
    let (api, _info) = client(&address);
    let board = AnswerBoard::new(api, 3, utc());

    let stopper = board.keep_refreshing().clone();
    let backend = fake.clone();
    tokio::spawn(async move {
        while backend.requests().len() < 2 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        stopper.cancel();
    });

    assert_eq!(board.watch_with(fast_policy()).await, LoopExit::Cancelled);
    assert_eq!(board.listing().inputs.len(), 4);
}

#[tokio::test]
async fn answer_watch_gives_up_on_a_dead_server() {
    let (fake, address) = spawn_backend().await;
    fake.with(|b| b.broken = true);
    let (api, info) = client(&address);
    let board = AnswerBoard::new(api, 3, utc());

    let exit = board.watch_with(fast_policy()).await;

    assert_eq!(exit, LoopExit::Reload(ReloadReason::GaveUp));
    assert_eq!(info.text(), ANSWERS_UNREACHABLE_MESSAGE);
}
