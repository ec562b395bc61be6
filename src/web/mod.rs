//! The HTTP surface: one page, a handful of form posts.
//!
//! Every interaction re-evaluates the whole page top to bottom (theme,
//! sidebar, mode resolution, model acquisition, main panel), the same
//! rerun model the page has always had. Inference blocks the request;
//! there are no background jobs and no batching.

pub mod page;

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::analyze::{run_analysis, Analysis};
use crate::cache::PipelineCache;
use crate::gate::AccessGate;
use crate::models::Mode;
use crate::session::{apply_mode_selection, ModeChange, Notice, SessionStore};
use crate::sysmon;
use crate::web::page::{ModelStatus, PageContext};

const SESSION_COOKIE: &str = "senti_sid";

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub cache: Arc<PipelineCache>,
    pub gate: Arc<AccessGate>,
}

impl AppState {
    pub fn new(sessions: SessionStore, cache: PipelineCache, gate: AccessGate) -> Self {
        Self {
            sessions: Arc::new(sessions),
            cache: Arc::new(cache),
            gate: Arc::new(gate),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/mode", post(set_mode))
        .route("/unlock", post(unlock))
        .route("/analyze", post(analyze))
        .route("/reload", post(reload))
        .route("/healthz", get(healthz))
        .with_state(state)
}

#[derive(Deserialize)]
struct ModeForm {
    mode: String,
}

#[derive(Deserialize)]
struct UnlockForm {
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
struct AnalyzeForm {
    #[serde(default)]
    text: String,
}

async fn index(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let (sid, cookie) = ensure_session(&headers);
    let html = full_page(&app, sid, String::new(), None).await;
    with_session_cookie(html.into_response(), cookie)
}

async fn set_mode(
    State(app): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ModeForm>,
) -> Response {
    let (sid, cookie) = ensure_session(&headers);

    match Mode::from_tag(&form.mode) {
        None => {
            app.sessions.update(sid, |state| {
                state.push_notice(Notice::error(format!("Unknown mode '{}'.", form.mode)))
            });
        }
        Some(selected) => {
            let change = app
                .sessions
                .update(sid, |state| apply_mode_selection(state, selected));
            if let ModeChange::Changed { previous } = change {
                log::info!("Session {} switched mode {} -> {}", sid, previous, selected);
                app.cache.clear().await;
                if selected == Mode::Advanced {
                    app.sessions.update(sid, |state| {
                        state.push_notice(Notice::info(
                            "Advanced mode requires a password.",
                        ))
                    });
                }
            }
        }
    }

    with_session_cookie(Redirect::to("/").into_response(), cookie)
}

async fn unlock(
    State(app): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<UnlockForm>,
) -> Response {
    let (sid, cookie) = ensure_session(&headers);

    if app.sessions.load(sid).last_mode != Some(Mode::Advanced) {
        return with_session_cookie(Redirect::to("/").into_response(), cookie);
    }

    if app.gate.verify(&form.password) {
        log::info!("Session {} unlocked advanced mode", sid);
        app.sessions.update(sid, |state| {
            state.advanced_unlocked = true;
            state.push_notice(Notice::info("Advanced mode unlocked."));
        });
        // Drop whatever was memoized so the advanced model loads fresh.
        app.cache.clear().await;
    } else {
        log::warn!("Session {} failed the advanced-mode gate", sid);
        app.sessions.update(sid, |state| {
            state.last_mode = Some(Mode::Basic);
            state.advanced_unlocked = false;
            state.push_notice(Notice::error(
                "Incorrect password. Advanced mode is locked.",
            ));
            state.push_notice(Notice::warning("Switching to Basic mode."));
        });
        app.cache.clear().await;
    }

    with_session_cookie(Redirect::to("/").into_response(), cookie)
}

async fn analyze(
    State(app): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<AnalyzeForm>,
) -> Response {
    let (sid, cookie) = ensure_session(&headers);
    let active = app.sessions.update(sid, |state| {
        if state.last_mode.is_none() {
            state.last_mode = Some(Mode::Basic);
        }
        state.active_mode()
    });

    let analysis = match app.cache.get_or_load(active).await {
        Ok(pipeline) => {
            let text = form.text.clone();
            tokio::task::spawn_blocking(move || run_analysis(pipeline.as_ref(), &text))
                .await
                .unwrap_or_else(|e| Analysis::Failed(format!("Analysis task failed: {}", e)))
        }
        Err(e) => {
            log::error!("No pipeline for mode '{}': {}", active, e);
            Analysis::ModelUnavailable(e.to_string())
        }
    };

    let html = full_page(&app, sid, form.text, Some(analysis)).await;
    with_session_cookie(html.into_response(), cookie)
}

async fn reload(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let (sid, cookie) = ensure_session(&headers);
    app.cache.clear().await;
    app.sessions.update(sid, |state| {
        state.push_notice(Notice::info("Caches cleared; models will reload on demand."))
    });
    with_session_cookie(Redirect::to("/").into_response(), cookie)
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Renders the whole page for the session, top to bottom.
async fn full_page(
    app: &AppState,
    sid: Uuid,
    input_text: String,
    analysis: Option<Analysis>,
) -> Html<String> {
    // First render: store the default mode without treating it as a change.
    app.sessions.update(sid, |state| {
        if state.last_mode.is_none() {
            state.last_mode = Some(Mode::Basic);
        }
    });

    let state = app.sessions.load(sid);
    let notices = app.sessions.take_notices(sid);
    let selected_mode = state.selected_mode();
    let active_mode = state.active_mode();
    let gate_pending = selected_mode == Mode::Advanced && !state.advanced_unlocked;

    let model_status = match app.cache.get_or_load(active_mode).await {
        Ok(pipeline) => ModelStatus::Ready {
            model_id: pipeline.model_id().to_string(),
        },
        Err(e) => {
            log::error!("Failed to load model for mode '{}': {}", active_mode, e);
            ModelStatus::Unavailable(e.to_string())
        }
    };

    let ctx = PageContext {
        selected_mode,
        active_mode,
        gate_pending,
        notices,
        memory: sysmon::read_memory(),
        model_status,
        input_text,
        analysis,
    };
    Html(page::render(&ctx))
}

fn session_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|part| {
        let (name, value) = part.trim().split_once('=')?;
        if name == SESSION_COOKIE {
            Uuid::parse_str(value.trim()).ok()
        } else {
            None
        }
    })
}

/// Resolves the session id from the cookie, minting a fresh one (and
/// its `Set-Cookie` header) when absent or unparsable.
fn ensure_session(headers: &HeaderMap) -> (Uuid, Option<HeaderValue>) {
    if let Some(id) = session_from_headers(headers) {
        return (id, None);
    }
    let id = Uuid::new_v4();
    let cookie = format!("{}={}; HttpOnly; SameSite=Lax; Path=/", SESSION_COOKIE, id);
    (id, HeaderValue::from_str(&cookie).ok())
}

fn with_session_cookie(mut response: Response, cookie: Option<HeaderValue>) -> Response {
    if let Some(cookie) = cookie {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_round_trip() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("other=1; {}={}", SESSION_COOKIE, id)).unwrap(),
        );
        assert_eq!(session_from_headers(&headers), Some(id));
    }

    #[test]
    fn test_missing_cookie_mints_session() {
        let headers = HeaderMap::new();
        let (_, cookie) = ensure_session(&headers);
        let cookie = cookie.expect("new session must set a cookie");
        assert!(cookie.to_str().unwrap().starts_with(SESSION_COOKIE));
    }

    #[test]
    fn test_garbage_cookie_mints_session() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("senti_sid=not-a-uuid"),
        );
        let (_, cookie) = ensure_session(&headers);
        assert!(cookie.is_some());
    }
}
