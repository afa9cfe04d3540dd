use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::HeaderMap;
use axum_extra::extract::QueryRejection;
use serde_json::{json, Value};

use crate::prelude::*;
use crate::utils::config::AppConfig;
use crate::utils::headers;

pub const PROBLEM_WITH_MESSAGE: &str = "https://www.jhipster.tech/problem/problem-with-message";
pub const PROBLEM_JSON: &str = "application/problem+json";

/// Semantic app error.
///
/// Every variant renders as an `application/problem+json` body. Anything not
/// caused by the request itself ends up as [`AppError::Internal`] and is
/// reported as a 500.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The request broke an entity invariant, e.g. creating a record with an id.
    #[error("{message}")]
    InvalidRequest {
        message: String,
        entity: String,
        error_key: String,
        /// Failure alert headers sent along with the problem body.
        headers: HeaderMap,
    },
    #[error("Not Found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    /// The request was refused before reaching a handler, e.g. an oversized
    /// body or an unsupported method.
    #[error("{detail}")]
    Rejected { status: StatusCode, detail: String },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// An [`AppError::InvalidRequest`], with failure alert headers for `app`.
    pub fn invalid_request(app: &AppConfig, message: &str, entity: &str, error_key: &str) -> Self {
        match headers::failure_alert(&app.name, app.enable_translation, entity, error_key, message) {
            Ok(headers) => Self::InvalidRequest {
                message: message.to_string(),
                entity: entity.to_string(),
                error_key: error_key.to_string(),
                headers,
            },
            Err(e) => Self::Internal(e),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest { .. } | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Rejected { status, .. } => *status,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The problem document describing this error.
    pub fn problem(&self) -> Value {
        let status = self.status().as_u16();
        match self {
            AppError::InvalidRequest { message, entity, error_key, .. } => json!({
                "type": PROBLEM_WITH_MESSAGE,
                "title": message,
                "status": status,
                "message": format!("error.{error_key}"),
                "entityName": entity,
                "errorKey": error_key,
                "params": entity,
            }),
            AppError::BadRequest(detail) => json!({
                "type": PROBLEM_WITH_MESSAGE,
                "title": "Bad Request",
                "status": status,
                "detail": detail,
                "message": "error.http.400",
            }),
            AppError::Rejected { status: code, detail } => json!({
                "type": PROBLEM_WITH_MESSAGE,
                "title": code.canonical_reason().unwrap_or("Error"),
                "status": status,
                "detail": detail,
                "message": format!("error.http.{status}"),
            }),
            AppError::NotFound => json!({
                "type": PROBLEM_WITH_MESSAGE,
                "title": "Not Found",
                "status": status,
                "message": "error.http.404",
            }),
            AppError::Internal(_) => json!({
                "type": PROBLEM_WITH_MESSAGE,
                "title": "Internal Server Error",
                "status": status,
                "message": "error.http.500",
            }),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Internal(e) => tracing::error!("{e:#}"),
            e => tracing::debug!("{e}"),
        }

        let status = self.status();
        let body = Json(self.problem());
        let headers = match self {
            AppError::InvalidRequest { headers, .. } => headers,
            _ => HeaderMap::new(),
        };
        (status, headers, [(header::CONTENT_TYPE, PROBLEM_JSON)], body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        Self::Internal(e.into())
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        match e {
            // A well-formed body of the wrong shape is a plain 400, not axum's 422
            JsonRejection::JsonDataError(_) => Self::BadRequest(e.body_text()),
            _ => Self::Rejected { status: e.status(), detail: e.body_text() },
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(e: PathRejection) -> Self {
        Self::BadRequest(e.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        Self::Rejected { status: e.status(), detail: e.body_text() }
    }
}
