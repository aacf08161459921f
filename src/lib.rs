pub mod app;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod state;
pub mod users;

pub use error::{AccountError, Result};
pub use identity::{Identifiable, Identity};
pub use users::{User, UserFields, UserManager, UserStore};
