//! Credential value types guarded by the warden.

pub mod secret;
pub mod token;

pub use secret::TokenSecret;
pub use token::{AccessToken, RefreshToken, TokenPair};
