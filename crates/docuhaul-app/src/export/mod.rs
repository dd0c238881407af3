//! Export functionality

pub mod excel;

pub use excel::export_documents_to_excel;
