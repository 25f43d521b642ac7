//! Error types for NewsHub
//!
//! Provides:
//! - Distinct error types for each failure mode in the request workflow
//! - User-facing message mapping that never exposes internal detail
//! - An HTML fallback response for errors that escape a handler

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Request parameter was missing, non-numeric, or not positive.
    /// Raised before any datastore access.
    #[error("invalid article id: {raw:?}")]
    InvalidIdentifier { raw: String },

    /// Well-formed id with no matching article row
    #[error("article {id} not found")]
    ArticleNotFound { id: i32 },

    /// Any database/query error (primary fetches, listings, inserts).
    /// Comment-submission rejections are not errors; they are terminal
    /// states of the submission workflow and carry their own messages.
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Session load/store failure
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Template rendering failure
    #[error("template error: {message}")]
    Template { message: String },

    /// Configuration error
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Internal server error
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// The message shown to the user. Internal error text (driver
    /// messages, query text) must never appear here.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::InvalidIdentifier { .. } => {
                "Invalid article ID. Please select a valid article."
            }
            AppError::ArticleNotFound { .. } => "Article not found.",
            AppError::Database(_)
            | AppError::Session(_)
            | AppError::Template { .. }
            | AppError::Configuration { .. }
            | AppError::Internal { .. } => {
                "Sorry, we're experiencing technical difficulties. Please try again later."
            }
        }
    }

    /// Nominal HTTP status for this error. Page handlers mostly bypass
    /// this in favor of redirects or inline rendering; see `IntoResponse`.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidIdentifier { .. } => StatusCode::BAD_REQUEST,
            AppError::ArticleNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Database(_)
            | AppError::Session(_)
            | AppError::Template { .. }
            | AppError::Configuration { .. }
            | AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log based on severity; the full error text stays in the logs.
        if self.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::info!(error = %self, "request rejected");
        }

        // The site surfaces failures inline on a 200 page rather than an
        // HTTP error status.
        let body = format!(
            "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"UTF-8\">\
             <title>NewsHub</title></head><body>\
             <p class=\"error-message\">{}</p>\
             <p><a href=\"/\">Back to NewsHub</a></p></body></html>",
            self.user_message()
        );

        (StatusCode::OK, Html(body)).into_response()
    }
}
