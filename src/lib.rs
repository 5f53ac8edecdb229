pub mod admin;
pub mod config;
pub mod error;
pub mod storage;
pub mod web;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
