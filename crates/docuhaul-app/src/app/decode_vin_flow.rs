//! VIN decode use case

use serde::Serialize;

use docuhaul_ai::{build_vin_description_prompt, parse_vin_description, VinDescription};
use docuhaul_domain::model::{Vin, VinParts};
use docuhaul_domain::repository::{AccountRepository, DocumentRepository};
use docuhaul_domain::service::{check_vin, decode_model_year};
use docuhaul_types::{DocumentKind, GeneratedDocument};

use super::{authorize, commit_generation, load_account, FlowDeps, FlowError};

/// Result of decoding a VIN
#[derive(Debug, Clone, Serialize)]
pub struct DecodedVin {
    /// Normalized (trimmed, upper-cased) input
    pub vin: String,
    pub valid: bool,
    /// Why the VIN failed validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    /// Model year, "Unknown Year" when the code is not in the table
    pub model_year: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parts: Option<VinParts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<VinDescription>,
    /// Id of the stored decode report, when one was saved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
}

/// Validate and decode a VIN without touching accounts or the AI.
///
/// Invalid VINs are reported, not rejected.
pub fn check_vin_input(input: &str) -> DecodedVin {
    let normalized = input.trim().to_ascii_uppercase();
    let failure = check_vin(&normalized).err();
    let parts = match failure {
        None => Vin::parse(&normalized).ok().map(|v| v.parts()),
        Some(_) => None,
    };

    DecodedVin {
        model_year: decode_model_year(&normalized),
        valid: failure.is_none(),
        failure: failure.map(|f| f.to_string()),
        parts,
        description: None,
        document_id: None,
        vin: normalized,
    }
}

/// A decode that passed authorization and waits for the AI description
#[derive(Debug, Clone)]
pub struct PendingDescription {
    user_id: String,
    vin: Vin,
    decoded: DecodedVin,
    prompt: String,
}

impl PendingDescription {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

/// Outcome of [`begin_decode`]
#[derive(Debug, Clone)]
pub enum DecodeStep {
    /// Nothing left to do; no AI call was requested
    Done(DecodedVin),
    /// Send [`PendingDescription::prompt`] to the backend, then call [`finish_decode`]
    NeedsDescription(PendingDescription),
}

/// Load the account, validate the VIN and, with `describe`, check the quota
/// and build the prompt. Only reads the account store.
pub fn begin_decode(
    accounts: &dyn AccountRepository,
    free_quota: u32,
    user_id: &str,
    input: &str,
    describe: bool,
) -> Result<DecodeStep, FlowError> {
    let account = load_account(accounts, user_id)?;
    let vin = Vin::parse(input)?;
    let decoded = check_vin_input(vin.as_str());

    if !describe {
        return Ok(DecodeStep::Done(decoded));
    }

    authorize(&account, free_quota)?;
    Ok(DecodeStep::NeedsDescription(PendingDescription {
        user_id: account.id,
        prompt: build_vin_description_prompt(&vin),
        vin,
        decoded,
    }))
}

/// Save the described decode as a `VinDecode` document and count it.
pub fn finish_decode(
    documents: &dyn DocumentRepository,
    accounts: &dyn AccountRepository,
    free_quota: u32,
    pending: PendingDescription,
    response: &str,
) -> Result<DecodedVin, FlowError> {
    let PendingDescription {
        user_id,
        vin,
        mut decoded,
        ..
    } = pending;
    let description = parse_vin_description(response);

    let document = GeneratedDocument::new(
        &user_id,
        DocumentKind::VinDecode,
        vin.as_str(),
        format!("VIN Decode {}", vin),
        description.description.clone(),
    )
    .with_fields(serde_json::json!({
        "modelYear": vin.model_year_number(),
        "parts": vin.parts(),
        "manufacturer": description.manufacturer,
        "vehicleType": description.vehicle_type,
    }));
    commit_generation(documents, accounts, free_quota, &document)?;

    tracing::info!(user = %user_id, vin = %vin, "VIN decoded with description");
    decoded.description = Some(description);
    decoded.document_id = Some(document.id);
    Ok(decoded)
}

/// Decode a VIN for an account.
///
/// With `describe`, the AI backend is asked for a description; that request
/// is quota-checked, saved as a `VinDecode` document and counted.
pub fn decode_vin(
    deps: &FlowDeps<'_>,
    user_id: &str,
    input: &str,
    describe: bool,
) -> Result<DecodedVin, FlowError> {
    match begin_decode(deps.accounts, deps.free_quota, user_id, input, describe)? {
        DecodeStep::Done(decoded) => Ok(decoded),
        DecodeStep::NeedsDescription(pending) => {
            let response = deps.backend.send_prompt(pending.prompt())?;
            finish_decode(deps.documents, deps.accounts, deps.free_quota, pending, &response)
        }
    }
}
