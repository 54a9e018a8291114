// src/main.rs

use dotenvy::dotenv;
use quizdrum_client::config::{Config, WatchMode};
use quizdrum_client::handlers::{answers::AnswerBoard, participant::ParticipantSession};
use quizdrum_client::models::status::QuizStatus;
use quizdrum_client::poll::{BackoffPolicy, CancellationFlag, LoopExit};
use quizdrum_client::routes;
use quizdrum_client::state::AppState;
use quizdrum_client::utils::time::local_offset;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    let file_appender = tracing_appender::rolling::daily("logs", "quizdrum-watch.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let state = match AppState::from_config(config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to build API client: {}", e);
            std::process::exit(2);
        }
    };

    let cancel = CancellationFlag::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, stopping after the current poll");
            on_ctrl_c.cancel();
        }
    });

    tracing::info!(
        "Watching quiz {} on {} ({:?})",
        state.config.quiz_id,
        state.config.base_url,
        state.config.watch
    );

    match state.config.watch {
        WatchMode::Participant => watch_participant(&state, &cancel).await,
        WatchMode::Answers => watch_answers(&state, &cancel).await,
    }
}

/// Participant live page. A reload picks up whatever question is live now.
async fn watch_participant(state: &AppState, cancel: &CancellationFlag) {
    let quiz_id = state.config.quiz_id;
    let mut question_id = state.config.question_id;

    loop {
        let session = ParticipantSession::new(state.api.clone(), quiz_id, question_id);
        match session.watch_status(cancel).await {
            LoopExit::Cancelled => break,
            LoopExit::Reload(reason) => {
                tracing::info!("Reloading participant page ({:?})", reason);
                tokio::time::sleep(BackoffPolicy::PARTICIPANT_STATUS.floor).await;
                if let Ok(status) = state
                    .api
                    .get_json::<QuizStatus>(&routes::quiz_status(quiz_id))
                    .await
                {
                    question_id = status.question_id.unwrap_or(question_id);
                    tracing::info!("Live question is now {}", question_id);
                }
            }
        }
        if cancel.is_cancelled() {
            break;
        }
    }
}

/// Quizmaster answer listing for the configured question.
async fn watch_answers(state: &AppState, cancel: &CancellationFlag) {
    let offset = local_offset();
    loop {
        let board = AnswerBoard::new(state.api.clone(), state.config.question_id, offset)
            .with_stop_flag(cancel.clone());
        let exit = board.watch().await;
        tracing::info!(
            "Answer listing has {} score inputs",
            board.listing().inputs.len()
        );

        match exit {
            LoopExit::Cancelled => break,
            LoopExit::Reload(reason) => {
                tracing::info!("Reloading answer listing ({:?})", reason);
                tokio::time::sleep(BackoffPolicy::QUIZMASTER_ANSWERS.floor).await;
            }
        }
        if cancel.is_cancelled() {
            break;
        }
    }
}
