//! HTTP route handlers.

pub mod health;
pub mod songs;
pub mod upload;
