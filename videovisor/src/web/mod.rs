//! The dashboard's HTTP surface.

pub mod error;
pub mod handlers;
pub mod session;

use crate::cache::ResultCache;
use crate::config::Config;
use crate::credentials::{self, Credential};
use crate::feed::Feed;
use crate::oauth::{self, CALLBACK_PATH, OAuthManager};
use crate::watch_later::WatchLater;
use crate::youtube_api::YouTubeClient;
use axum::Router;
use axum::routing::{get, post};
use axum_extra::extract::CookieJar;
use jiff::Timestamp;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Everything the handlers share. Built once at startup.
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    pub sessions: session::SessionStore,
    pub feed: Feed,
    pub watch_later: WatchLater,
    pub oauth: OAuthManager,
    /// Used for both YouTube and Google's token endpoint.
    pub http: reqwest::Client,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: Config) -> eyre::Result<Self> {
        let http = oauth::http_client(config.request_timeout())?;
        let oauth = OAuthManager::new(&config.client_secrets, &config.public_url, http.clone())?;
        Ok(Self {
            sessions: Default::default(),
            feed: Feed::new(ResultCache::default()),
            watch_later: Default::default(),
            oauth,
            http,
            config,
        })
    }

    /// An API client acting as the holder of `credential`.
    pub fn youtube(&self, credential: &Credential) -> YouTubeClient {
        YouTubeClient::with_base_url(
            credential.access_token().clone(),
            self.http.clone(),
            &self.config.api_base_url,
        )
    }

    /// Whether the browser's session holds a credential at all, usable or not.
    pub async fn has_credential(&self, jar: &CookieJar) -> bool {
        match session::session_id(jar) {
            Some(id) => self.sessions.credential(id).await.is_some(),
            None => false,
        }
    }

    /// The session's credential, refreshed if it had expired.
    ///
    /// A refreshed credential is written back to the session.
    pub async fn resolve_credential(&self, jar: &CookieJar) -> eyre::Result<Option<Credential>> {
        let Some(id) = session::session_id(jar) else {
            return Ok(None);
        };
        let stored = self.sessions.credential(id).await;
        let Some(active) =
            credentials::get_credential(stored.as_ref(), &self.http, Timestamp::now()).await?
        else {
            return Ok(None);
        };
        if active.refreshed {
            self.sessions
                .set_credential(id, active.credential.to_session())
                .await;
        }
        Ok(Some(active.credential))
    }
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/videos", get(handlers::videos))
        .route("/login", get(handlers::login))
        .route(CALLBACK_PATH, get(handlers::oauth_callback))
        .route("/watch-later/{video_id}", post(handlers::watch_later))
        .route("/logout", post(handlers::logout))
        .with_state(state)
        // High level logging of requests and responses
        .layer(TraceLayer::new_for_http())
}
