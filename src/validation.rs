use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Input rules for a request body. Reports every failing rule, not just the first.
pub trait Validate {
    fn validate(&self) -> Result<(), Vec<FieldError>>;
}

/// Collects field errors while a `Validate` impl walks its fields.
#[derive(Debug, Default)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    /// Required, non-blank string.
    pub fn required(&mut self, field: &'static str, label: &str, value: &str) -> bool {
        if value.trim().is_empty() {
            self.push(field, format!("{label} is required"));
            return false;
        }
        true
    }

    /// Required, but whitespace counts as content.
    pub fn non_empty(&mut self, field: &'static str, label: &str, value: &str) -> bool {
        if value.is_empty() {
            self.push(field, format!("{label} is required"));
            return false;
        }
        true
    }

    pub fn max_chars(&mut self, field: &'static str, label: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.push(field, format!("{label} must be at most {max} characters"));
        }
    }

    pub fn min_chars(&mut self, field: &'static str, label: &str, value: &str, min: usize) {
        if value.chars().count() < min {
            self.push(field, format!("{label} must be at least {min} characters"));
        }
    }

    pub fn email(&mut self, field: &'static str, value: &str) {
        if !is_valid_email(value) {
            self.push(field, "Invalid email format");
        }
    }

    pub fn finish(self) -> Result<(), Vec<FieldError>> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self.0)
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// JSON body that has passed its `Validate` rules.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        if let Err(errors) = value.validate() {
            debug!(count = errors.len(), "request body failed validation");
            return Err(AppError::Validation(errors));
        }
        Ok(Self(value))
    }
}
