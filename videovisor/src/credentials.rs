//! The signed-in user's OAuth credential and how it is kept usable.

use eyre::{Context, OptionExt};
use jiff::{SignedDuration, Timestamp};
use oauth2::basic::{BasicClient, BasicTokenResponse};
use oauth2::{AccessToken, ClientId, ClientSecret, RefreshToken, TokenResponse, TokenUrl};
use serde::{Deserialize, Serialize};

/// A credential is treated as expired this long before Google says it is.
pub const EXPIRY_BUFFER: SignedDuration = SignedDuration::from_mins(5);

/// Everything needed to call the API on the user's behalf, and to refresh
/// that ability once the access token runs out.
///
/// A credential carries its own token endpoint and client, so a refresh does
/// not depend on the client secrets file still being around.
#[derive(Debug, Clone)]
pub struct Credential {
    access_token: AccessToken,
    refresh_token: Option<RefreshToken>,
    token_uri: TokenUrl,
    client_id: ClientId,
    client_secret: ClientSecret,
    scopes: Vec<String>,
    /// `None` means the credential is never considered expired.
    expires_at: Option<Timestamp>,
}

/// Session representation of a [`Credential`].
#[derive(Debug, Serialize, Deserialize)]
struct StoredCredential {
    token: String,
    refresh_token: Option<String>,
    token_uri: String,
    client_id: String,
    client_secret: String,
    #[serde(default)]
    scopes: Vec<String>,
    expiry: Option<Timestamp>,
}

impl Credential {
    /// Builds a credential from a fresh token endpoint response.
    pub fn from_token_response(
        token: &BasicTokenResponse,
        token_uri: TokenUrl,
        client_id: ClientId,
        client_secret: ClientSecret,
        now: Timestamp,
    ) -> Self {
        Self {
            access_token: token.access_token().clone(),
            refresh_token: token.refresh_token().cloned(),
            token_uri,
            client_id,
            client_secret,
            scopes: token
                .scopes()
                .map(|scopes| scopes.iter().map(|s| s.as_str().to_string()).collect())
                .unwrap_or_default(),
            expires_at: expiry(token, now),
        }
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.is_some()
    }

    pub fn expires_at(&self) -> Option<Timestamp> {
        self.expires_at
    }

    /// Whether the access token should no longer be used at `now`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at
            .is_some_and(|expires_at| expires_at.duration_since(now) <= EXPIRY_BUFFER)
    }

    pub fn to_session(&self) -> serde_json::Value {
        let stored = StoredCredential {
            token: self.access_token.secret().clone(),
            refresh_token: self.refresh_token.as_ref().map(|t| t.secret().clone()),
            token_uri: self.token_uri.as_str().to_string(),
            client_id: self.client_id.as_str().to_string(),
            client_secret: self.client_secret.secret().clone(),
            scopes: self.scopes.clone(),
            expiry: self.expires_at,
        };
        serde_json::json!(stored)
    }

    pub fn from_session(value: &serde_json::Value) -> eyre::Result<Self> {
        let stored = StoredCredential::deserialize(value).context("parse stored credential")?;
        Ok(Self {
            access_token: AccessToken::new(stored.token),
            refresh_token: stored.refresh_token.map(RefreshToken::new),
            token_uri: TokenUrl::new(stored.token_uri).context("parse stored token_uri")?,
            client_id: ClientId::new(stored.client_id),
            client_secret: ClientSecret::new(stored.client_secret),
            scopes: stored.scopes,
            expires_at: stored.expiry,
        })
    }

    /// Exchanges the refresh token for a new access token.
    ///
    /// The refresh token is kept when Google does not hand out a new one.
    #[tracing::instrument(skip_all)]
    pub async fn refresh(&self, http: &reqwest::Client, now: Timestamp) -> eyre::Result<Self> {
        let refresh_token = self
            .refresh_token
            .as_ref()
            .ok_or_eyre("credential has no refresh token")?;

        // no redirect or auth endpoint needed to refresh
        let client = BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_token_uri(self.token_uri.clone());

        let token = client
            .exchange_refresh_token(refresh_token)
            .request_async(http)
            .await
            .context("exchange refresh token")?;

        let refreshed = Self {
            access_token: token.access_token().clone(),
            refresh_token: token
                .refresh_token()
                .cloned()
                .or_else(|| self.refresh_token.clone()),
            token_uri: self.token_uri.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            scopes: token
                .scopes()
                .map(|scopes| scopes.iter().map(|s| s.as_str().to_string()).collect())
                .unwrap_or_else(|| self.scopes.clone()),
            expires_at: expiry(&token, now),
        };
        tracing::debug!(expires_at = ?refreshed.expires_at, "refreshed OAuth token");
        Ok(refreshed)
    }
}

fn expiry(token: &BasicTokenResponse, now: Timestamp) -> Option<Timestamp> {
    let expires_in = SignedDuration::try_from(token.expires_in()?).ok()?;
    now.checked_add(expires_in).ok()
}

/// A credential ready for use.
#[derive(Debug, Clone)]
pub struct ActiveCredential {
    pub credential: Credential,
    /// Set when the credential was refreshed on the way and the caller must
    /// store it back in place of the old one.
    pub refreshed: bool,
}

/// Turns whatever the session holds into a usable credential, if possible.
///
/// An expired credential is refreshed exactly once. A failing refresh is
/// returned as an error; an expired credential that cannot be refreshed counts
/// as signed out.
pub async fn get_credential(
    stored: Option<&serde_json::Value>,
    http: &reqwest::Client,
    now: Timestamp,
) -> eyre::Result<Option<ActiveCredential>> {
    let Some(stored) = stored else {
        return Ok(None);
    };
    let credential = match Credential::from_session(stored) {
        Ok(credential) => credential,
        Err(e) => {
            tracing::warn!(error = ?e, "discarding unreadable session credential");
            return Ok(None);
        }
    };

    if !credential.is_expired(now) {
        return Ok(Some(ActiveCredential {
            credential,
            refreshed: false,
        }));
    }
    if !credential.has_refresh_token() {
        tracing::info!("credential expired and cannot be refreshed");
        return Ok(None);
    }

    let credential = credential
        .refresh(http, now)
        .await
        .context("refresh expired credential")?;
    Ok(Some(ActiveCredential {
        credential,
        refreshed: true,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn now() -> Timestamp {
        "2024-06-01T12:00:00Z".parse().unwrap()
    }

    fn stored(expiry: Option<&str>, refresh_token: Option<&str>) -> serde_json::Value {
        serde_json::json!({
            "token": "ya29.access",
            "refresh_token": refresh_token,
            "token_uri": "https://oauth2.googleapis.com/token",
            "client_id": "client.apps.googleusercontent.com",
            "client_secret": "shh",
            "scopes": ["https://www.googleapis.com/auth/youtube.force-ssl"],
            "expiry": expiry,
        })
    }

    #[test]
    fn session_form_is_stable() {
        let value = stored(Some("2024-06-01T13:00:00Z"), Some("1//refresh"));
        let credential = Credential::from_session(&value).unwrap();
        assert_eq!(credential.to_session(), value);
        assert_eq!(credential.access_token().secret(), "ya29.access");
    }

    #[test]
    fn expiry_includes_buffer() {
        let credential =
            Credential::from_session(&stored(Some("2024-06-01T12:10:00Z"), None)).unwrap();
        assert!(!credential.is_expired(now()));
        assert!(!credential.is_expired("2024-06-01T12:04:59Z".parse().unwrap()));
        assert!(credential.is_expired("2024-06-01T12:05:00Z".parse().unwrap()));
        assert!(credential.is_expired("2024-06-01T13:00:00Z".parse().unwrap()));
    }

    #[test]
    fn no_expiry_never_expires() {
        let credential = Credential::from_session(&stored(None, None)).unwrap();
        assert!(!credential.is_expired("2099-01-01T00:00:00Z".parse().unwrap()));
    }

    #[tokio::test]
    async fn nothing_stored_is_signed_out() {
        let http = reqwest::Client::new();
        assert!(get_credential(None, &http, now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn valid_credential_is_returned_unchanged() {
        let http = reqwest::Client::new();
        let value = stored(Some("2024-06-01T13:00:00Z"), Some("1//refresh"));
        let active = get_credential(Some(&value), &http, now())
            .await
            .unwrap()
            .unwrap();
        assert!(!active.refreshed);
        assert_eq!(active.credential.to_session(), value);
    }

    #[tokio::test]
    async fn expired_without_refresh_token_is_signed_out() {
        let http = reqwest::Client::new();
        let value = stored(Some("2024-06-01T11:00:00Z"), None);
        assert!(
            get_credential(Some(&value), &http, now())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn unreadable_credential_is_signed_out() {
        let http = reqwest::Client::new();
        let value = serde_json::json!({"token": 42});
        assert!(
            get_credential(Some(&value), &http, now())
                .await
                .unwrap()
                .is_none()
        );
    }
}
