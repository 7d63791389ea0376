pub mod config;
pub mod logging;

// Verification pipeline
pub mod discovery;
pub mod fetch;
pub mod manifest;
pub mod notify;
pub mod pipeline;
pub mod report;
pub mod retry;
pub mod scratch;
pub mod transfer;
pub mod url_model;
