//! Application service layer - flows, config, webhook handling, export

pub mod app;
pub mod config;
pub mod export;
pub mod repository;
