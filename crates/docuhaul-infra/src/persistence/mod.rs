//! Persistence implementations
//!
//! This module provides file-based implementations of the repository traits.

mod file_account_repo;
mod file_document_repo;

pub use file_account_repo::FileAccountRepository;
pub use file_document_repo::FileDocumentRepository;
