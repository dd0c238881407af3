//! Domain layer for docuhaul
//!
//! Pure VIN and webhook-signature services, domain models, and the
//! repository traits implemented by the infrastructure layer.

pub mod model;
pub mod repository;
pub mod service;
