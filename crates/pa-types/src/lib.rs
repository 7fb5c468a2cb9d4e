//! Shared error types for PopupAuth

pub mod errors;

pub use errors::{AppError, AppResult};
