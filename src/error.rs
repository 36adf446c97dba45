use std::ops::Deref;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, RuntimeErr, sqlx};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// Raised by the store when a watchlist insert references a movie that has
    /// never been cached. Only the watchlist coordinator acts on it.
    #[error("movie {0} is not cached")]
    MovieNotCached(String),

    #[error("movie {imdb_id} is already in the watchlist of user {user_id}")]
    DuplicateEntry { user_id: i32, imdb_id: String },

    #[error("provider error: {0}")]
    Provider(String),

    #[error("provider request failed: {0}")]
    Upstream(#[source] reqwest::Error),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to cache movie {imdb_id}: {source}")]
    CacheWrite {
        imdb_id: String,
        #[source]
        source: Box<AppError>,
    },

    #[error("{0}")]
    BadRequest(String),

    #[error("database error: {0}")]
    Database(#[source] DbErr),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConstraintViolation(_) | AppError::DuplicateEntry { .. } => {
                StatusCode::CONFLICT
            },
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Provider(_) | AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::MovieNotCached(_)
            | AppError::Configuration(_)
            | AppError::CacheWrite { .. }
            | AppError::Database(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match constraint_message(&err) {
            Some(msg) => Self::ConstraintViolation(msg),
            None => Self::Database(err),
        }
    }
}

// Request URLs carry the API key; keep them out of messages.
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream(err.without_url())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<jiff::Error> for AppError {
    fn from(err: jiff::Error) -> Self {
        Self::Internal(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Unique, foreign-key and check failures all surface as constraint
/// violations; anything else stays a plain database error.
fn constraint_message(err: &DbErr) -> Option<String> {
    let (DbErr::Exec(RuntimeErr::SqlxError(e)) | DbErr::Query(RuntimeErr::SqlxError(e))) = err
    else {
        return None;
    };
    let sqlx::Error::Database(db) = e.deref() else {
        return None;
    };
    (db.is_unique_violation() || db.is_foreign_key_violation() || db.is_check_violation())
        .then(|| db.message().to_string())
}
