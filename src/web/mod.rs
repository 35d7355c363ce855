//! Web front end
//!
//! - `GET /`, `GET /index`: lookup form
//! - `POST /lyrics`: fetch and rewrite, render both texts side by side
//! - `GET /about`
//! - `GET /favicon.ico`: 204, no icon is bundled
//!
//! Pipeline failures are appended to the error log and rendered as an error
//! page; the status code reflects who was at fault.

pub mod pages;

use crate::call_site;
use crate::error::RewriteError;
use crate::log_store::LogWriter;
use crate::logging::{log_info, log_warn};
use crate::mode::Mode;
use crate::rewriter::SongRewriter;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub rewriter: SongRewriter,
    pub log_writer: LogWriter,
}

impl AppState {
    pub fn new(rewriter: SongRewriter, log_writer: LogWriter) -> Self {
        Self {
            rewriter,
            log_writer,
        }
    }
}

type AppStateArc = Arc<AppState>;

pub fn router(state: AppStateArc) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/index", get(index))
        .route("/lyrics", post(lyrics))
        .route("/about", get(about))
        .route("/favicon.ico", get(favicon))
        .with_state(state)
}

/// Form posted by the index page.
#[derive(Debug, Clone, Deserialize)]
pub struct LyricsForm {
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub mode: Option<String>,
}

async fn index() -> Html<String> {
    Html(pages::index())
}

async fn about() -> Html<String> {
    Html(pages::about())
}

async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn lyrics(State(state): State<AppStateArc>, Form(form): Form<LyricsForm>) -> Response {
    let mode = match form.mode.as_deref().map(str::parse::<Mode>) {
        None => Mode::default(),
        Some(Ok(mode)) => mode,
        Some(Err(e)) => {
            log_warn!(error = %e, "Rejected lyrics form");
            return (StatusCode::BAD_REQUEST, Html(pages::error(&e.to_string()))).into_response();
        }
    };

    log_info!(
        title = %form.title,
        artist = %form.artist,
        mode = %mode,
        "Lyrics requested"
    );

    match state.rewriter.rewrite_song(&form.artist, &form.title, mode).await {
        Ok(rewrite) => Html(pages::lyrics(&form.title, &form.artist, &rewrite)).into_response(),
        Err(e) => {
            let status = status_for(&e);
            let message = e.user_message();

            let writer = state.log_writer.clone();
            let site = call_site!();
            if let Err(join_error) =
                tokio::task::spawn_blocking(move || writer.record_failure(&e, site)).await
            {
                log_warn!(error = %join_error, "Error recording task failed");
            }

            (status, Html(pages::error(&message))).into_response()
        }
    }
}

/// HTTP status for a pipeline failure.
pub fn status_for(error: &RewriteError) -> StatusCode {
    match error {
        RewriteError::LyricsNotFound { .. } => StatusCode::NOT_FOUND,
        RewriteError::EmptyInput => StatusCode::BAD_REQUEST,
        RewriteError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_GATEWAY,
    }
}
