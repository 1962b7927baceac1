//! Authentication domain types

mod types;

pub use types::{
    LoginCredentials, LoginResponse, RefreshRequest, RefreshResponse, Role, Session, UserProfile,
    token_preview,
};
