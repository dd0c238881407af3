//! Domain services

pub mod claims_policy;
pub mod vin_validator;
pub mod webhook_signature;

pub use claims_policy::{authorize_generation, can_manage_claims, premium_for_status, GenerationDecision};
pub use vin_validator::{check_vin, decode_model_year, validate_vin, VinFailure, UNKNOWN_YEAR};
pub use webhook_signature::{compute_signature, verify_webhook_signature};
