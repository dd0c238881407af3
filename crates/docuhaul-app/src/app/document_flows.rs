//! Document generation use cases (NVIS certificate, bill of sale, VIN label)

use serde::Serialize;

use docuhaul_ai::{
    build_bill_of_sale_prompt, build_nvis_prompt, build_vin_label_prompt, parse_document_draft,
};
use docuhaul_domain::model::{BillOfSaleRequest, NvisRequest, Vin, VinLabelRequest};
use docuhaul_types::{Account, DocumentKind, GeneratedDocument};

use super::{authorize, commit_generation, FlowDeps, FlowError};

/// How a VIN outside the manufacturer's WMI is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WmiRule {
    /// The manufacturer is certifying the vehicle, so the WMI must match
    Strict,
    /// Resale of another maker's vehicle is allowed
    WarnOnly,
}

fn check_wmi(deps: &FlowDeps<'_>, vin: &Vin, rule: WmiRule) -> Result<(), FlowError> {
    let Some(profile) = deps.profile else {
        return Ok(());
    };
    if profile.owns_vin(vin.as_str()) {
        return Ok(());
    }

    match rule {
        WmiRule::Strict => Err(FlowError::InvalidInput(format!(
            "VIN {} was not issued under {}'s WMI",
            vin,
            profile.name
        ))),
        WmiRule::WarnOnly => {
            tracing::warn!(vin = %vin, manufacturer = %profile.name, "VIN is outside the manufacturer WMI");
            Ok(())
        }
    }
}

/// Shared tail of every generation flow: authorize, prompt, persist, count.
fn generate<F: Serialize>(
    deps: &FlowDeps<'_>,
    account: &Account,
    kind: DocumentKind,
    vin: &Vin,
    prompt: String,
    fields: &F,
) -> Result<GeneratedDocument, FlowError> {
    authorize(account, deps.free_quota)?;

    let response = deps.backend.send_prompt(&prompt)?;
    let fallback_title = format!("{} {}", kind.label(), vin);
    let draft = parse_document_draft(&response, &fallback_title);
    if draft.body.trim().is_empty() {
        return Err(FlowError::GenerationFailed(
            "AI backend returned an empty document".to_string(),
        ));
    }

    let fields = serde_json::to_value(fields)
        .map_err(|e| FlowError::Storage(format!("failed to encode fields: {}", e)))?;
    let document = GeneratedDocument::new(&account.id, kind, vin.as_str(), draft.title, draft.body)
        .with_fields(fields);
    commit_generation(deps.documents, deps.accounts, deps.free_quota, &document)?;

    tracing::info!(user = %account.id, kind = %kind, id = %document.id, "Document generated");
    Ok(document)
}

/// Generate an NVIS compliance certificate
pub fn generate_nvis(
    deps: &FlowDeps<'_>,
    user_id: &str,
    request: &NvisRequest,
) -> Result<GeneratedDocument, FlowError> {
    let account = deps.load_account(user_id)?;
    let vin = request.validate(deps.today)?;
    check_wmi(deps, &vin, WmiRule::Strict)?;
    let prompt = build_nvis_prompt(request, &vin, deps.profile);
    generate(deps, &account, DocumentKind::Nvis, &vin, prompt, request)
}

/// Generate a bill of sale
pub fn generate_bill_of_sale(
    deps: &FlowDeps<'_>,
    user_id: &str,
    request: &BillOfSaleRequest,
) -> Result<GeneratedDocument, FlowError> {
    let account = deps.load_account(user_id)?;
    let vin = request.validate(deps.today)?;
    check_wmi(deps, &vin, WmiRule::WarnOnly)?;
    let prompt = build_bill_of_sale_prompt(request, &vin, deps.profile);
    generate(deps, &account, DocumentKind::BillOfSale, &vin, prompt, request)
}

/// Generate a VIN label
pub fn generate_vin_label(
    deps: &FlowDeps<'_>,
    user_id: &str,
    request: &VinLabelRequest,
) -> Result<GeneratedDocument, FlowError> {
    let account = deps.load_account(user_id)?;
    let vin = request.validate(deps.today)?;
    check_wmi(deps, &vin, WmiRule::Strict)?;
    let prompt = build_vin_label_prompt(request, &vin, deps.profile);
    generate(deps, &account, DocumentKind::VinLabel, &vin, prompt, request)
}
