use serde::{Deserialize, Serialize};

use crate::validation::{FieldError, FieldErrors, Validate};

const FULL_NAME_MAX: usize = 50;
const PASSWORD_MIN: usize = 6;
const PASSWORD_MAX: usize = 128;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Response of register, login and refresh. The refresh token travels in a cookie.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if errors.required("email", "Email", email) {
        errors.email("email", email);
    }
}

fn check_password(errors: &mut FieldErrors, password: &str) {
    if errors.non_empty("password", "Password", password) {
        errors.min_chars("password", "Password", password, PASSWORD_MIN);
        errors.max_chars("password", "Password", password, PASSWORD_MAX);
    }
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = FieldErrors::default();
        if errors.required("fullName", "Full name", &self.full_name) {
            errors.max_chars("fullName", "Full name", &self.full_name, FULL_NAME_MAX);
        }
        check_email(&mut errors, &self.email);
        check_password(&mut errors, &self.password);
        errors.finish()
    }
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = FieldErrors::default();
        check_email(&mut errors, &self.email);
        check_password(&mut errors, &self.password);
        errors.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(full_name: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            full_name: full_name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn accepts_valid_registration() {
        assert!(register("Jane Doe", "jane@example.com", "Secret1").validate().is_ok());
    }

    #[test]
    fn missing_fields_deserialize_as_required_errors() {
        let req: RegisterRequest = serde_json::from_str("{}").unwrap();
        let errs = req.validate().unwrap_err();
        let fields: Vec<_> = errs.iter().map(|e| e.field).collect();
        assert_eq!(fields, ["fullName", "email", "password"]);
        assert!(errs.iter().all(|e| e.message.ends_with("is required")));
    }

    #[test]
    fn reads_camel_case_full_name() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"fullName":"Jane Doe","email":"jane@example.com","password":"Secret1"}"#,
        )
        .unwrap();
        assert_eq!(req.full_name, "Jane Doe");
    }

    #[test]
    fn enforces_length_limits() {
        let long_name = "n".repeat(FULL_NAME_MAX + 1);
        let errs = register(&long_name, "jane@example.com", "12345").validate().unwrap_err();
        assert_eq!(errs.len(), 2);
        assert_eq!(errs[0].field, "fullName");
        assert_eq!(errs[1].field, "password");

        let long_password = "p".repeat(PASSWORD_MAX + 1);
        let errs = register("Jane", "jane@example.com", &long_password)
            .validate()
            .unwrap_err();
        assert_eq!(errs, vec![FieldError::new("password", "Password must be at most 128 characters")]);
    }

    #[test]
    fn blank_password_is_not_missing() {
        assert!(register("Jane", "jane@example.com", "      ").validate().is_ok());

        let errs = register("Jane", "jane@example.com", "").validate().unwrap_err();
        assert_eq!(errs, vec![FieldError::new("password", "Password is required")]);

        let errs = register("Jane", "jane@example.com", "   ").validate().unwrap_err();
        assert_eq!(
            errs,
            vec![FieldError::new("password", "Password must be at least 6 characters")]
        );
    }

    #[test]
    fn login_rejects_bad_email() {
        let req = LoginRequest {
            email: "jane.example.com".into(),
            password: "Secret1".into(),
        };
        let errs = req.validate().unwrap_err();
        assert_eq!(errs, vec![FieldError::new("email", "Invalid email format")]);
    }

    #[test]
    fn access_token_serializes_camel_case() {
        let json = serde_json::to_value(AuthResponse {
            access_token: "abc".into(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "accessToken": "abc" }));
    }
}
