use std::any::Any;

use axum::{
    body::Body,
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::error;

use crate::validation::FieldError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
    pub timestamp: String,
    pub path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl ErrorBody {
    fn new(status: StatusCode, message: String, errors: Vec<FieldError>) -> Self {
        Self {
            status: status.as_u16(),
            message,
            timestamp: OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_default(),
            path: String::new(),
            errors,
        }
    }

    fn into_response_with(self, status: StatusCode) -> Response {
        let mut res = (status, Json(self.clone())).into_response();
        // picked up by `error_envelope`, which knows the request path
        res.extensions_mut().insert(self);
        res
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Validation(errors) => ErrorBody::new(status, "Validation failed".into(), errors),
            Self::Internal(e) => {
                error!(error = ?e, "internal error");
                ErrorBody::new(status, "Internal Server Error".into(), Vec::new())
            }
            other => ErrorBody::new(status, other.to_string(), Vec::new()),
        };
        body.into_response_with(status)
    }
}

/// Fills `path` into error bodies produced anywhere below this layer.
pub async fn error_envelope(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();
    let res = next.run(req).await;

    let (mut parts, body) = res.into_parts();
    let Some(mut error_body) = parts.extensions.remove::<ErrorBody>() else {
        return Response::from_parts(parts, body);
    };
    error_body.path = path;

    match serde_json::to_vec(&error_body) {
        Ok(bytes) => {
            parts.headers.remove(header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(e) => {
            error!(error = %e, "serialize error body");
            Response::from_parts(parts, body)
        }
    }
}

/// Catch-all for unmatched routes, so they share the error envelope.
pub async fn route_not_found(req: Request) -> AppError {
    AppError::NotFound(format!("Cannot {} {}", req.method(), req.uri().path()))
}

/// Converts a handler panic into a generic 500.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = %detail, "handler panicked");
    let status = StatusCode::INTERNAL_SERVER_ERROR;
    ErrorBody::new(status, "Internal Server Error".into(), Vec::new()).into_response_with(status)
}
