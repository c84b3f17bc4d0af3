use std::sync::Arc;

use axum_extra::extract::cookie::Cookie;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    cookies::RefreshCookie,
    dto::{LoginRequest, RegisterRequest},
    jwt::JwtKeys,
    password::{hash_password, verify_against_dummy, verify_password},
};
use crate::{
    config::AppConfig,
    error::AppError,
    users::{CreateUserError, NewUser, User, UserStore},
};

const EMAIL_TAKEN: &str = "User with this email already exists";
const USER_NOT_FOUND: &str = "User not found";
const INVALID_REFRESH: &str = "Invalid refresh token";

/// Result of a successful sign-in: the access token for the body and the
/// refresh token already packed into its cookie.
#[derive(Debug)]
pub struct IssuedSession {
    pub access_token: String,
    pub refresh_cookie: Cookie<'static>,
}

/// Mints access/refresh pairs for verified identities.
///
/// Holds no mutable state: issuance depends only on the identity id and the
/// clock. Refresh tokens are not recorded server side, so logout clears the
/// client cookie and an already issued refresh token stays valid until `exp`.
pub struct SessionIssuer {
    users: Arc<dyn UserStore>,
    keys: JwtKeys,
    cookie: RefreshCookie,
}

impl SessionIssuer {
    pub fn new(users: Arc<dyn UserStore>, config: &AppConfig) -> Self {
        let keys = JwtKeys::new(&config.jwt);
        let cookie = RefreshCookie::new(&config.cookie, config.environment, keys.refresh_ttl());
        Self {
            users,
            keys,
            cookie,
        }
    }

    #[instrument(skip_all, fields(email = %req.email))]
    pub async fn register(&self, req: &RegisterRequest) -> Result<IssuedSession, AppError> {
        if self.users.find_by_email(&req.email).await?.is_some() {
            warn!("email already registered");
            return Err(AppError::Conflict(EMAIL_TAKEN.into()));
        }

        let password_hash = hash_password(&req.password)?;
        let new_user = NewUser {
            full_name: &req.full_name,
            email: &req.email,
            password_hash: &password_hash,
        };
        let user = match self.users.create(new_user).await {
            Ok(u) => u,
            Err(CreateUserError::EmailTaken) => {
                warn!("email registered concurrently");
                return Err(AppError::Conflict(EMAIL_TAKEN.into()));
            }
            Err(CreateUserError::Store(e)) => return Err(e.into()),
        };

        info!(user_id = %user.id, "user registered");
        self.issue(user.id)
    }

    /// Unknown email and wrong password produce the same error.
    #[instrument(skip_all, fields(email = %req.email))]
    pub async fn login(&self, req: &LoginRequest) -> Result<IssuedSession, AppError> {
        let Some(user) = self.users.find_by_email(&req.email).await? else {
            verify_against_dummy(&req.password);
            warn!("login unknown email");
            return Err(AppError::NotFound(USER_NOT_FOUND.into()));
        };

        if !verify_password(&req.password, &user.password_hash)? {
            warn!(user_id = %user.id, "login invalid password");
            return Err(AppError::NotFound(USER_NOT_FOUND.into()));
        }

        info!(user_id = %user.id, "user logged in");
        self.issue(user.id)
    }

    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<IssuedSession, AppError> {
        let Some(token) = refresh_token else {
            warn!("refresh without cookie");
            return Err(AppError::Unauthorized(INVALID_REFRESH.into()));
        };

        let claims = self.keys.verify_refresh(token).map_err(|e| {
            warn!(error = %e, "refresh token rejected");
            AppError::Unauthorized(INVALID_REFRESH.into())
        })?;

        let user = self.validate(claims.id).await?;
        info!(user_id = %user.id, "session refreshed");
        self.issue(user.id)
    }

    /// Cookie that overwrites the client's refresh token.
    pub fn logout(&self) -> Cookie<'static> {
        self.cookie.expired()
    }

    pub async fn validate(&self, id: Uuid) -> Result<User, AppError> {
        match self.users.find_by_id(id).await? {
            Some(user) => Ok(user),
            None => {
                warn!(user_id = %id, "token references missing user");
                Err(AppError::NotFound(USER_NOT_FOUND.into()))
            }
        }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    fn issue(&self, user_id: Uuid) -> Result<IssuedSession, AppError> {
        let access_token = self.keys.sign_access(user_id)?;
        let refresh_token = self.keys.sign_refresh(user_id)?;
        Ok(IssuedSession {
            access_token,
            refresh_cookie: self.cookie.issue(refresh_token)?,
        })
    }
}
