//! Domain model types

pub mod document_request;
pub mod manufacturer;
pub mod vin;

pub use document_request::{BillOfSaleRequest, NvisRequest, VinLabelRequest};
pub use manufacturer::ManufacturerProfile;
pub use vin::{Vin, VinParts};
