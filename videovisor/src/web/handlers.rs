use crate::favorites;
use crate::feed::FeedVideo;
use crate::watch_later::SaveOutcome;
use crate::web::SharedState;
use crate::web::error::AppError;
use crate::web::session;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

#[derive(Debug, Deserialize)]
pub struct RefreshQuery {
    refresh: Option<String>,
}

impl RefreshQuery {
    fn forced(&self) -> bool {
        self.refresh.as_deref() == Some("true")
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideosResponse {
    pub videos: Arc<[FeedVideo]>,
    pub last_updated: Timestamp,
    pub cached: bool,
    pub favorites: Vec<String>,
}

/// The dashboard page. It loads the feed itself from [`videos`].
pub async fn index(State(state): State<SharedState>, jar: CookieJar) -> Response {
    if !state.has_credential(&jar).await {
        return Redirect::to("/login").into_response();
    }
    Html(INDEX_HTML).into_response()
}

pub async fn videos(
    State(state): State<SharedState>,
    jar: CookieJar,
    Query(query): Query<RefreshQuery>,
) -> Result<Json<VideosResponse>, AppError> {
    let credential = state
        .resolve_credential(&jar)
        .await
        .map_err(AppError::Upstream)?
        .ok_or(AppError::AuthRequired)?;

    tracing::debug!(refresh = query.forced(), "listing videos");
    let api = state.youtube(&credential);
    let listing = state
        .feed
        .listing(&api, query.forced(), Timestamp::now())
        .await
        .map_err(AppError::Upstream)?;

    Ok(Json(VideosResponse {
        videos: listing.snapshot.videos,
        last_updated: listing.snapshot.fetched_at,
        cached: listing.cached,
        favorites: favorites::load(&state.config.favorites).await,
    }))
}

pub async fn login(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    let secrets = state
        .oauth
        .client_secrets()
        .await
        .map_err(AppError::Login)?
        .ok_or_else(|| AppError::MissingClientSecrets(state.oauth.secrets_path().to_path_buf()))?;
    let (url, pending) = state
        .oauth
        .authorize_url(&secrets)
        .map_err(AppError::Login)?;

    let (jar, id) = session::ensure_session(jar);
    state.sessions.begin_login(id, pending, Timestamp::now()).await;
    Ok((jar, Redirect::to(url.as_str())))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    state: Option<String>,
    code: Option<String>,
    /// Set instead of `code` when the user declined.
    error: Option<String>,
}

pub async fn oauth_callback(
    State(state): State<SharedState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Result<Redirect, AppError> {
    if let Some(error) = query.error {
        return Err(AppError::Login(eyre::eyre!("Google refused access: {error}")));
    }
    let pending = match session::session_id(&jar) {
        Some(id) => state
            .sessions
            .take_pending_login(id, Timestamp::now())
            .await
            .map(|p| (id, p)),
        None => None,
    };
    let Some((id, pending)) = pending else {
        return Err(AppError::Login(eyre::eyre!("no login in progress")));
    };
    let Some(code) = query.code else {
        return Err(AppError::Login(eyre::eyre!("no authorization code found")));
    };

    let secrets = state
        .oauth
        .client_secrets()
        .await
        .map_err(AppError::Login)?
        .ok_or_else(|| AppError::MissingClientSecrets(state.oauth.secrets_path().to_path_buf()))?;
    let credential = state
        .oauth
        .exchange_code(
            &secrets,
            pending,
            query.state.as_deref().unwrap_or_default(),
            code,
            Timestamp::now(),
        )
        .await
        .map_err(AppError::Login)?;

    state.sessions.set_credential(id, credential.to_session()).await;
    Ok(Redirect::to("/"))
}

pub async fn watch_later(
    State(state): State<SharedState>,
    jar: CookieJar,
    Path(video_id): Path<String>,
) -> (StatusCode, Json<SaveOutcome>) {
    let credential = match state.resolve_credential(&jar).await {
        Ok(Some(credential)) => credential,
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(SaveOutcome::failed("Auth required")),
            );
        }
        Err(e) => {
            tracing::warn!(error = ?e, "cannot use session credential");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SaveOutcome::failed(format!("{e:#}"))),
            );
        }
    };

    let api = state.youtube(&credential);
    let outcome = state.watch_later.save_outcome(&api, &video_id).await;
    let status = if outcome.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(outcome))
}

pub async fn logout(State(state): State<SharedState>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(id) = session::session_id(&jar) {
        state.sessions.remove(id).await;
    }
    (jar.remove(session::removal_cookie()), Redirect::to("/"))
}
