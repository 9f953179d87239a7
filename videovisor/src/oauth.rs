//! OAuth 2.0 sign-in with Google.
//!
//! The authorization-code flow is split across two HTTP requests: [`OAuthManager::authorize_url`]
//! produces the consent page URL plus the [`PendingLogin`] the session has to hold on to, and
//! [`OAuthManager::exchange_code`] turns the code Google redirects back with into a
//! [`Credential`].
//!
//! Client secrets are read from disk on every login rather than at startup, so the server can
//! run (and explain what is missing) before the file has been put in place.

use crate::credentials::Credential;
use eyre::{Context, OptionExt};
use jiff::Timestamp;
use oauth2::basic::BasicClient;
use oauth2::url::Url;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenUrl,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Lets the dashboard read subscriptions and manage playlists.
pub const SCOPE: &str = "https://www.googleapis.com/auth/youtube.force-ssl";

/// Where Google sends the user back to, relative to the public URL.
pub const CALLBACK_PATH: &str = "/oauth2callback";

type ConfiguredClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// The parts of a Google client secrets file the flow needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
}

/// Google's download format nests the secrets under the application type.
#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    web: Option<ClientSecrets>,
    installed: Option<ClientSecrets>,
}

impl ClientSecrets {
    /// Reads a client secrets file, or `None` if there is none at `path`.
    pub async fn load(path: &Path) -> eyre::Result<Option<Self>> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
        };
        Self::parse(&raw)
            .map(Some)
            .with_context(|| format!("parse client secrets in {}", path.display()))
    }

    pub fn parse(raw: &str) -> eyre::Result<Self> {
        let file: ClientSecretsFile = serde_json::from_str(raw)?;
        file.web
            .or(file.installed)
            .ok_or_eyre("neither a \"web\" nor an \"installed\" section is present")
    }
}

/// State of a login between leaving for Google and coming back.
#[derive(Debug)]
pub struct PendingLogin {
    pub csrf: CsrfToken,
    pub pkce_verifier: PkceCodeVerifier,
}

/// Builds the HTTP client used for both OAuth and API calls.
pub fn http_client(timeout: Duration) -> eyre::Result<reqwest::Client> {
    reqwest::ClientBuilder::new()
        // SSRF no thank you.
        .redirect(reqwest::redirect::Policy::none())
        .timeout(timeout)
        .build()
        .context("build HTTP client")
}

#[derive(Debug, Clone)]
pub struct OAuthManager {
    secrets_path: PathBuf,
    redirect_url: RedirectUrl,
    http: reqwest::Client,
}

impl OAuthManager {
    /// `public_url` is where the dashboard is reachable from the user's browser.
    pub fn new(
        secrets_path: impl Into<PathBuf>,
        public_url: &str,
        http: reqwest::Client,
    ) -> eyre::Result<Self> {
        let redirect_url = RedirectUrl::new(format!(
            "{}{CALLBACK_PATH}",
            public_url.trim_end_matches('/')
        ))
        .context("construct redirect url")?;
        Ok(Self {
            secrets_path: secrets_path.into(),
            redirect_url,
            http,
        })
    }

    pub fn secrets_path(&self) -> &Path {
        &self.secrets_path
    }

    pub async fn client_secrets(&self) -> eyre::Result<Option<ClientSecrets>> {
        ClientSecrets::load(&self.secrets_path).await
    }

    fn client(&self, secrets: &ClientSecrets) -> eyre::Result<ConfiguredClient> {
        Ok(BasicClient::new(ClientId::new(secrets.client_id.clone()))
            .set_client_secret(ClientSecret::new(secrets.client_secret.clone()))
            .set_auth_uri(AuthUrl::new(secrets.auth_uri.clone()).context("parse auth_uri")?)
            .set_token_uri(TokenUrl::new(secrets.token_uri.clone()).context("parse token_uri")?)
            .set_redirect_uri(self.redirect_url.clone()))
    }

    /// The consent page to send the user to.
    ///
    /// Offline access is requested so that Google hands out a refresh token.
    pub fn authorize_url(&self, secrets: &ClientSecrets) -> eyre::Result<(Url, PendingLogin)> {
        let client = self.client(secrets)?;
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let (url, csrf) = client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new(SCOPE.to_string()))
            .add_extra_param("access_type", "offline")
            .add_extra_param("include_granted_scopes", "true")
            .set_pkce_challenge(pkce_challenge)
            .url();

        tracing::debug!(url = %url, "prepared OAuth consent url");
        Ok((
            url,
            PendingLogin {
                csrf,
                pkce_verifier,
            },
        ))
    }

    /// Completes a login once Google has redirected back with `state` and `code`.
    #[tracing::instrument(skip_all)]
    pub async fn exchange_code(
        &self,
        secrets: &ClientSecrets,
        pending: PendingLogin,
        state: &str,
        code: String,
        now: Timestamp,
    ) -> eyre::Result<Credential> {
        eyre::ensure!(
            pending.csrf.secret() == state,
            "OAuth state does not match the login in progress"
        );

        let client = self.client(secrets)?;
        let token = client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pending.pkce_verifier)
            .request_async(&self.http)
            .await
            .context("exchange authorization code with access token")?;

        tracing::info!("user signed in");
        Ok(Credential::from_token_response(
            &token,
            TokenUrl::new(secrets.token_uri.clone()).context("parse token_uri")?,
            ClientId::new(secrets.client_id.clone()),
            ClientSecret::new(secrets.client_secret.clone()),
            now,
        ))
    }
}
