//! Application use cases
//!
//! Each flow takes its collaborators through [`FlowDeps`] so the CLI, the
//! HTTP server and tests can wire in different repositories and backends.

pub mod account_service;
pub mod decode_vin_flow;
pub mod document_flows;
pub mod webhook_service;

use chrono::NaiveDate;
use thiserror::Error;

use docuhaul_ai::AiBackend;
use docuhaul_domain::model::ManufacturerProfile;
use docuhaul_domain::repository::{AccountRepository, DocumentRepository};
use docuhaul_domain::service::{authorize_generation, GenerationDecision};
use docuhaul_types::{Account, Error, GeneratedDocument, StoreError};

pub use account_service::{create_account, get_account, set_claims};
pub use decode_vin_flow::{
    begin_decode, check_vin_input, decode_vin, finish_decode, DecodeStep, DecodedVin,
    PendingDescription,
};
pub use document_flows::{generate_bill_of_sale, generate_nvis, generate_vin_label};
pub use webhook_service::{handle_webhook, WebhookOutcome};

/// Errors surfaced by application flows
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<Error> for FlowError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidVin(msg) | Error::InvalidInput(msg) | Error::Webhook(msg) => {
                FlowError::InvalidInput(msg)
            }
            Error::Unauthorized(msg) => FlowError::Unauthorized(msg),
            Error::NotFound(msg) => FlowError::NotFound(msg),
            Error::Ai(msg) => FlowError::GenerationFailed(msg),
            Error::Io(_) | Error::Json(_) | Error::Store(_) => FlowError::Storage(err.to_string()),
            _ => FlowError::GenerationFailed(err.to_string()),
        }
    }
}

impl From<FlowError> for Error {
    fn from(err: FlowError) -> Self {
        match err {
            FlowError::InvalidInput(msg) => Error::InvalidInput(msg),
            FlowError::Unauthorized(msg) => Error::Unauthorized(msg),
            FlowError::NotFound(msg) => Error::NotFound(msg),
            FlowError::GenerationFailed(msg) => Error::Ai(msg),
            FlowError::Storage(msg) => Error::Store(StoreError::IoError(msg)),
        }
    }
}

/// Collaborators shared by the generation flows
pub struct FlowDeps<'a> {
    pub documents: &'a dyn DocumentRepository,
    pub accounts: &'a dyn AccountRepository,
    pub backend: &'a dyn AiBackend,
    pub profile: Option<&'a ManufacturerProfile>,
    /// Documents a free account may generate
    pub free_quota: u32,
    /// Reference date for "not in the future" checks
    pub today: NaiveDate,
}

impl<'a> FlowDeps<'a> {
    pub fn new(
        documents: &'a dyn DocumentRepository,
        accounts: &'a dyn AccountRepository,
        backend: &'a dyn AiBackend,
    ) -> Self {
        Self {
            documents,
            accounts,
            backend,
            profile: None,
            free_quota: 3,
            today: chrono::Local::now().date_naive(),
        }
    }

    pub fn with_profile(mut self, profile: Option<&'a ManufacturerProfile>) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_free_quota(mut self, quota: u32) -> Self {
        self.free_quota = quota;
        self
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub(crate) fn load_account(&self, user_id: &str) -> Result<Account, FlowError> {
        load_account(self.accounts, user_id)
    }
}

pub(crate) fn load_account(
    accounts: &dyn AccountRepository,
    user_id: &str,
) -> Result<Account, FlowError> {
    accounts
        .find_by_id(user_id)?
        .ok_or_else(|| FlowError::NotFound(format!("account '{}'", user_id)))
}

/// Refuse a generation once a free account has used its quota.
pub(crate) fn authorize(account: &Account, free_quota: u32) -> Result<(), FlowError> {
    match authorize_generation(account, free_quota) {
        GenerationDecision::QuotaExceeded { used, quota } => {
            tracing::info!(user = %account.id, used, quota, "Generation refused");
            Err(FlowError::Unauthorized(format!(
                "free quota used ({} of {} documents); upgrade to premium",
                used, quota
            )))
        }
        GenerationDecision::WithinQuota { remaining } => {
            tracing::debug!(user = %account.id, remaining, "Free generation");
            Ok(())
        }
        GenerationDecision::Unlimited => Ok(()),
    }
}

/// Store a generated document and count it against its owner.
///
/// The owner is re-read first, so claims changed while the AI backend was
/// running are kept and the quota is checked against the current count.
pub(crate) fn commit_generation(
    documents: &dyn DocumentRepository,
    accounts: &dyn AccountRepository,
    free_quota: u32,
    document: &GeneratedDocument,
) -> Result<Account, FlowError> {
    let mut account = load_account(accounts, &document.owner_id)?;
    authorize(&account, free_quota)?;

    documents.save(document)?;
    account.documents_generated = account.documents_generated.saturating_add(1);
    account.touch();
    accounts.save(&account)?;
    Ok(account)
}
