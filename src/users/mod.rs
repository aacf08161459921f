use axum::Router;

use crate::state::AppState;

pub mod dto;
pub mod email;
pub mod handlers;
pub mod manager;
pub mod memory;
pub mod model;
pub mod password;
pub mod pg;
pub mod store;

pub use manager::{UserFields, UserManager};
pub use model::{Credentials, Permissions, User};
pub use store::UserStore;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::user_routes())
        .merge(handlers::auth_routes())
}
