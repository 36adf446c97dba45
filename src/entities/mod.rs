pub mod movie;
pub mod user;
pub mod watchlist;
