//! Infrastructure layer - persistence, loaders, and payment webhook payloads

pub mod lemonsqueezy;
pub mod manufacturer_loader;
pub mod persistence;
pub mod vin_csv;
