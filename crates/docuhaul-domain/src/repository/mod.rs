//! Repository trait definitions for data persistence

use docuhaul_types::Error;
use docuhaul_types::{Account, DocumentKind, GeneratedDocument};

/// Repository for generated documents
pub trait DocumentRepository {
    /// Save a document (insert or replace by id)
    fn save(&self, document: &GeneratedDocument) -> Result<(), Error>;

    /// Find a document by its id
    fn find_by_id(&self, id: &str) -> Result<Option<GeneratedDocument>, Error>;

    /// Find all documents owned by an account, newest first
    fn find_by_owner(&self, owner_id: &str) -> Result<Vec<GeneratedDocument>, Error>;

    /// Find documents of one kind, newest first
    fn find_by_kind(&self, kind: DocumentKind) -> Result<Vec<GeneratedDocument>, Error>;

    /// Find all documents, newest first
    fn find_all(&self) -> Result<Vec<GeneratedDocument>, Error>;
}

/// Repository for user accounts and their claims
pub trait AccountRepository {
    /// Save an account (insert or replace by id)
    fn save(&self, account: &Account) -> Result<(), Error>;

    /// Find an account by id
    fn find_by_id(&self, id: &str) -> Result<Option<Account>, Error>;

    /// Find the account linked to a payment provider subscription
    fn find_by_subscription(&self, subscription_id: &str) -> Result<Option<Account>, Error>;

    /// Find all accounts
    fn find_all(&self) -> Result<Vec<Account>, Error>;
}
