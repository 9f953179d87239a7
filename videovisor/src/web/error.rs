use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the dashboard's routes, one variant per way they can go wrong.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Auth required")]
    AuthRequired,

    /// Anything between us and YouTube failed while building the feed.
    #[error("{0:#}")]
    Upstream(eyre::Report),

    #[error(
        "The client secrets file {} is missing. Create an OAuth client in the Google Cloud console and save its JSON there.",
        .0.display()
    )]
    MissingClientSecrets(PathBuf),

    #[error("Login failed: {0:#}")]
    Login(eyre::Report),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::AuthRequired => StatusCode::UNAUTHORIZED,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::MissingClientSecrets(_) | AppError::Login(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            AppError::AuthRequired => {}
            AppError::Upstream(_) => tracing::error!(error = %self, "feed request failed"),
            AppError::MissingClientSecrets(_) | AppError::Login(_) => {
                tracing::warn!(error = %self, "login failed");
                // the login routes are visited in the browser, so plain text
                return (status, self.to_string()).into_response();
            }
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
