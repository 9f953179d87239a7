//! In-memory sessions, keyed by a random id kept in a cookie.
//!
//! Sessions do not survive a restart; signing in again is cheap.

use crate::oauth::PendingLogin;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jiff::{SignedDuration, Timestamp};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

pub const COOKIE_NAME: &str = "videovisor_session";

/// How long a login may spend on Google's consent page before it is forgotten.
pub const LOGIN_LIFETIME: SignedDuration = SignedDuration::from_mins(10);

#[derive(Debug)]
struct StartedLogin {
    pending: PendingLogin,
    started_at: Timestamp,
}

impl StartedLogin {
    fn is_stale(&self, now: Timestamp) -> bool {
        now.duration_since(self.started_at) >= LOGIN_LIFETIME
    }
}

#[derive(Debug, Default)]
struct Session {
    /// Credential in its session form, see [`crate::credentials::Credential::to_session`].
    credential: Option<serde_json::Value>,
    login: Option<StartedLogin>,
}

impl Session {
    /// Neither signed in nor on the way to signing in.
    fn is_abandoned(&self, now: Timestamp) -> bool {
        self.credential.is_none() && self.login.as_ref().is_none_or(|login| login.is_stale(now))
    }
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub async fn credential(&self, id: Uuid) -> Option<serde_json::Value> {
        self.sessions
            .lock()
            .await
            .get(&id)
            .and_then(|session| session.credential.clone())
    }

    pub async fn set_credential(&self, id: Uuid, credential: serde_json::Value) {
        self.sessions
            .lock()
            .await
            .entry(id)
            .or_default()
            .credential = Some(credential);
    }

    /// Remembers a login in progress, replacing any earlier one.
    ///
    /// Sessions left behind by logins that were never completed are dropped here.
    pub async fn begin_login(&self, id: Uuid, pending: PendingLogin, now: Timestamp) {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_abandoned(now));
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, "dropped abandoned sessions");
        }

        sessions.entry(id).or_default().login = Some(StartedLogin {
            pending,
            started_at: now,
        });
    }

    /// The login in progress, which can only be completed once and only within
    /// [`LOGIN_LIFETIME`].
    pub async fn take_pending_login(&self, id: Uuid, now: Timestamp) -> Option<PendingLogin> {
        let login = self
            .sessions
            .lock()
            .await
            .get_mut(&id)
            .and_then(|session| session.login.take())?;
        if login.is_stale(now) {
            return None;
        }
        Some(login.pending)
    }

    pub async fn remove(&self, id: Uuid) {
        self.sessions.lock().await.remove(&id);
    }

    /// Number of sessions currently held.
    pub async fn count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

/// The session id the browser presented, if it is one of ours.
pub fn session_id(jar: &CookieJar) -> Option<Uuid> {
    jar.get(COOKIE_NAME)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

/// The presented session id, or a fresh one set on the returned jar.
pub fn ensure_session(jar: CookieJar) -> (CookieJar, Uuid) {
    match session_id(&jar) {
        Some(id) => (jar, id),
        None => {
            let id = Uuid::new_v4();
            (jar.add(session_cookie(id)), id)
        }
    }
}

pub fn session_cookie(id: Uuid) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, id.to_string()))
        .path("/")
        .http_only(true)
        // Lax so the cookie comes along on the redirect back from Google
        .same_site(SameSite::Lax)
        .build()
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(COOKIE_NAME).path("/").build()
}
