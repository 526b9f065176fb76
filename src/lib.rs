//! Biblioteca Library Loans Server
//!
//! A Rust implementation of the Biblioteca lending backend, providing a REST
//! JSON API for managing a book catalog, library users, and loans. The loan
//! lifecycle engine keeps book availability counters consistent with the set
//! of open loans across borrow, renew, and return operations.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
