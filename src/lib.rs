//! Equipment scanner
//!
//! Scan-to-resolution core of an equipment borrow/return desk: acquires a
//! camera, decodes QR codes from the live feed and resolves each code against
//! the equipment catalog served by the REST API.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod media;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult, ScanError};

/// Application state shared by front-ends embedding the scanner
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
