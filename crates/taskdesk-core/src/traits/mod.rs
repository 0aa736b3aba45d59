//! Core traits.

mod storage;

pub use storage::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, TokenStorage};
