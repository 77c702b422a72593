pub mod config;
pub mod csv;
pub mod scoring_api;
