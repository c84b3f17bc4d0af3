use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::instrument;

use super::{
    cookies::read_refresh_token,
    dto::{AuthResponse, LoginRequest, RegisterRequest},
    extractors::AuthUser,
    session::IssuedSession,
};
use crate::{
    error::{route_not_found, AppError},
    state::AppState,
    users::User,
    validation::ValidJson,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register).fallback(route_not_found))
        .route("/auth/login", post(login).fallback(route_not_found))
        .route("/auth/refresh", post(refresh).fallback(route_not_found))
        .route("/auth/logout", post(logout).fallback(route_not_found))
        .route("/auth/@me", get(me).fallback(route_not_found))
}

fn respond(jar: CookieJar, session: IssuedSession) -> (CookieJar, Json<AuthResponse>) {
    (
        jar.add(session.refresh_cookie),
        Json(AuthResponse {
            access_token: session.access_token,
        }),
    )
}

#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidJson(payload): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), AppError> {
    let session = state.sessions.register(&payload).await?;
    let (jar, body) = respond(jar, session);
    Ok((StatusCode::CREATED, jar, body))
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let session = state.sessions.login(&payload).await?;
    Ok(respond(jar, session))
}

#[instrument(skip_all)]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let token = read_refresh_token(&jar);
    let session = state.sessions.refresh(token.as_deref()).await?;
    Ok(respond(jar, session))
}

#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<bool>) {
    (jar.add(state.sessions.logout()), Json(true))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn me(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}
