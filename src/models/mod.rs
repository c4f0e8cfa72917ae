pub mod cache;
pub mod quote;
pub mod watchlist;
