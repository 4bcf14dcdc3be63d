pub mod password;
pub mod policy;
pub mod service;
pub mod token;

pub use service::AuthService;
pub use token::{SESSION_COOKIE, TokenCodec, TokenError};
