pub mod archive;
pub mod config;
pub mod database;
pub mod errors;
pub mod export;
pub mod import;
pub mod manifest;
pub mod markdown;
pub mod services;
pub mod storage;

pub mod app_context;
pub use app_context::AppContext;
pub use config::{GalleyConfig, ImportConfig};
