pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used items
pub use config::Config;
pub use error::{Error, Result};
pub use models::cache::TtlCache;
pub use services::quote_service::QuoteService;
pub use services::watchlist_service::WatchlistService;
