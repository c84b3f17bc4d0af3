mod repo;
mod repo_types;

#[cfg(test)]
pub(crate) mod memory;

pub use repo::{CreateUserError, PgUserStore, UserStore};
pub use repo_types::{NewUser, User};
