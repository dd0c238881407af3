//! Repository adapters for persistence layer

use std::path::{Path, PathBuf};

use docuhaul_domain::model::ManufacturerProfile;
use docuhaul_infra::manufacturer_loader;
use docuhaul_infra::persistence::{FileAccountRepository, FileDocumentRepository};
use docuhaul_types::Result;

use crate::config::Config;

/// Open file-based document repository
pub fn open_document_repo(config: &Config) -> Result<FileDocumentRepository> {
    open_document_repo_at(config.data_dir()?)
}

/// Open file-based account repository
pub fn open_account_repo(config: &Config) -> Result<FileAccountRepository> {
    open_account_repo_at(config.data_dir()?)
}

/// Open document repository at a custom directory
pub fn open_document_repo_at(data_dir: PathBuf) -> Result<FileDocumentRepository> {
    FileDocumentRepository::open(data_dir)
}

/// Open account repository at a custom directory
pub fn open_account_repo_at(data_dir: PathBuf) -> Result<FileAccountRepository> {
    FileAccountRepository::open(data_dir)
}

/// Load the configured manufacturer profile, if any
pub fn load_manufacturer_profile(config: &Config) -> Result<Option<ManufacturerProfile>> {
    match config.manufacturer_profile.as_deref() {
        Some(path) => load_manufacturer_profile_at(path).map(Some),
        None => Ok(None),
    }
}

pub fn load_manufacturer_profile_at(path: &Path) -> Result<ManufacturerProfile> {
    let profile = manufacturer_loader::load_from_file(path)?;
    tracing::debug!(name = %profile.name, "Loaded manufacturer profile");
    Ok(profile)
}
