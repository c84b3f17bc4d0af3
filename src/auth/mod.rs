use crate::state::AppState;
use axum::Router;

mod claims;
mod cookies;
mod dto;
pub(crate) mod extractors;
pub mod handlers;
mod jwt;
mod password;
pub mod session;

pub use session::SessionIssuer;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
