pub mod fixtures;
pub mod listing_server;
