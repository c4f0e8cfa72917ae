pub mod quote_service;
pub mod watchlist_service;
pub mod watchlist_store;
