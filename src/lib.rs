pub mod api;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod models;
pub mod report;
pub mod service;

pub use crate::config::AppConfig;
pub use crate::db::{create_pool, MemoryRecapStore, PgRecapStore, RecapStore};
pub use crate::engine::{calculate_recap, RecapInput};
pub use crate::error::{RecapError, RecapResult};
pub use crate::service::RecapService;
