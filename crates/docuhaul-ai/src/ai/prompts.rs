//! AI prompts for compliance document generation
//!
//! Every prompt hands the model already-validated values and asks for a JSON
//! reply, so the model formats documents but never invents identifiers.
//! The VIN, its decoded model year and all masses are injected verbatim and
//! the model is told not to alter them.

use docuhaul_domain::model::{
    BillOfSaleRequest, ManufacturerProfile, NvisRequest, Vin, VinLabelRequest,
};

// ============================================================================
// Shared prompt fragments
// ============================================================================

const DOCUMENT_JSON_INSTRUCTION: &str = concat!(
    "Reply with JSON only, no markdown: ",
    "{\"title\": \"<document title>\", \"body\": \"<full document text, plain text with line breaks>\"}"
);

const VERBATIM_RULES: &str = concat!(
    "Rules:\n",
    "- Copy the VIN, dates, masses and prices exactly as given. Never recalculate or reformat them.\n",
    "- Do not invent registration numbers, approvals or signatures; leave a labelled blank line instead.\n",
    "- Use Australian English spelling.\n"
);

fn manufacturer_block(profile: Option<&ManufacturerProfile>) -> String {
    match profile {
        Some(p) => {
            let mut block = format!("Manufacturer: {}\nAddress: {}\n", p.name, p.address);
            if let Some(ref wmi) = p.wmi {
                block.push_str(&format!("WMI: {}\n", wmi));
            }
            if let Some(ref licence) = p.dealer_license {
                block.push_str(&format!("Dealer licence: {}\n", licence));
            }
            if let Some(ref phone) = p.phone {
                block.push_str(&format!("Phone: {}\n", phone));
            }
            block
        }
        None => "Manufacturer: (leave blank for handwritten entry)\n".to_string(),
    }
}

fn vin_block(vin: &Vin) -> String {
    let parts = vin.parts();
    format!(
        "VIN: {}\nWMI: {} | VDS: {} | Check digit: {} | Model year: {} | Plant: {} | Serial: {}\n",
        vin,
        parts.wmi,
        parts.vds,
        parts.check_digit,
        vin.model_year(),
        parts.plant_code,
        parts.serial_number
    )
}

fn optional_kg(label: &str, value: Option<u32>) -> String {
    match value {
        Some(kg) => format!("{}: {} kg\n", label, kg),
        None => String::new(),
    }
}

// ============================================================================
// Prompt builders
// ============================================================================

/// Prompt asking for a short plain-language description of a VIN
pub fn build_vin_description_prompt(vin: &Vin) -> String {
    format!(
        concat!(
            "You are decoding a Vehicle Identification Number for a trailer and vehicle manufacturer.\n",
            "{vin_block}",
            "The check digit has already been verified. Describe what the WMI and VDS indicate ",
            "(manufacturer, region, vehicle type) in two or three sentences. ",
            "If the WMI is not one you recognise, say so instead of guessing.\n",
            "Reply with JSON only: ",
            "{{\"manufacturer\": \"<name or null>\", \"vehicleType\": \"<type or null>\", \"description\": \"<text>\"}}"
        ),
        vin_block = vin_block(vin),
    )
}

/// Prompt for an NVIS compliance certificate
pub fn build_nvis_prompt(
    request: &NvisRequest,
    vin: &Vin,
    profile: Option<&ManufacturerProfile>,
) -> String {
    let mut prompt = String::from(
        "Draft a National Vehicle Identification Standard (NVIS) compliance certificate for a newly manufactured vehicle.\n\n",
    );
    prompt.push_str(&manufacturer_block(profile));
    prompt.push_str(&vin_block(vin));
    prompt.push_str(&format!(
        "Make: {}\nModel: {}\nBody type: {}\nAxles: {}\nTyre size: {}\nGVM: {} kg\n",
        request.make,
        request.model,
        request.body_type,
        request.axles,
        request.tyre_size,
        request.gvm_kg
    ));
    prompt.push_str(&optional_kg("ATM", request.atm_kg));
    prompt.push_str(&optional_kg("GTM", request.gtm_kg));
    prompt.push_str(&format!(
        "Date of manufacture: {}\n\n",
        request.date_of_manufacture.format("%d/%m/%Y")
    ));
    prompt.push_str(VERBATIM_RULES);
    prompt.push_str("- Include a declaration section with blank lines for the authorised signatory's name, signature and date.\n\n");
    prompt.push_str(DOCUMENT_JSON_INSTRUCTION);
    prompt
}

/// Prompt for a bill of sale; the seller is the manufacturer profile
pub fn build_bill_of_sale_prompt(
    request: &BillOfSaleRequest,
    vin: &Vin,
    profile: Option<&ManufacturerProfile>,
) -> String {
    let year = request
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| vin.model_year());

    let mut prompt = String::from("Draft a Bill of Sale for the vehicle described below.\n\nSeller\n");
    prompt.push_str(&manufacturer_block(profile));
    prompt.push_str(&format!(
        "\nBuyer\nName: {}\nAddress: {}\n\nVehicle\n",
        request.buyer_name, request.buyer_address
    ));
    prompt.push_str(&vin_block(vin));
    prompt.push_str(&format!(
        "Year: {}\nMake: {}\nModel: {}\n",
        year, request.make, request.model
    ));
    if let Some(km) = request.odometer_km {
        prompt.push_str(&format!("Odometer: {} km\n", km));
    }
    prompt.push_str(&format!(
        "\nSale price: {}\nSale date: {}\n",
        request.price_display(),
        request.sale_date.format("%d/%m/%Y")
    ));
    if let Some(ref notes) = request.notes {
        if !notes.trim().is_empty() {
            prompt.push_str(&format!("Additional terms: {}\n", notes.trim()));
        }
    }
    prompt.push('\n');
    prompt.push_str(VERBATIM_RULES);
    prompt.push_str("- State that the vehicle is sold free of encumbrances unless the additional terms say otherwise.\n");
    prompt.push_str("- Include signature and date lines for both buyer and seller.\n\n");
    prompt.push_str(DOCUMENT_JSON_INSTRUCTION);
    prompt
}

/// Prompt for the text of a VIN label / compliance plate
pub fn build_vin_label_prompt(
    request: &VinLabelRequest,
    vin: &Vin,
    profile: Option<&ManufacturerProfile>,
) -> String {
    let mut prompt = String::from(
        "Lay out the text of a VIN label (compliance plate) to be riveted to the vehicle chassis. Keep each line short; this is a small metal plate.\n\n",
    );
    prompt.push_str(&manufacturer_block(profile));
    prompt.push_str(&vin_block(vin));
    prompt.push_str(&format!(
        "Vehicle type: {}\nDate of manufacture: {}\nGVWR: {} kg\n",
        request.vehicle_type,
        request.date_of_manufacture.format("%m/%Y"),
        request.gvwr_kg
    ));
    prompt.push_str(&optional_kg("GAWR front", request.gawr_front_kg));
    prompt.push_str(&format!(
        "GAWR rear: {} kg\nTyres: {}\nRims: {}\n",
        request.gawr_rear_kg, request.tyre_size, request.rim_size
    ));
    if let Some(kpa) = request.cold_inflation_kpa {
        prompt.push_str(&format!("Cold tyre inflation: {} kPa\n", kpa));
    }
    prompt.push('\n');
    prompt.push_str(VERBATIM_RULES);
    prompt.push_str("- Put the VIN on its own line in capitals.\n\n");
    prompt.push_str(DOCUMENT_JSON_INSTRUCTION);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn vin() -> Vin {
        Vin::parse("1M8GDM9AXKP042788").unwrap()
    }

    fn profile() -> ManufacturerProfile {
        ManufacturerProfile {
            name: "Acme Trailers Pty Ltd".to_string(),
            address: "12 Depot Rd, Geelong VIC".to_string(),
            wmi: Some("1M8".to_string()),
            dealer_license: None,
            phone: None,
        }
    }

    #[test]
    fn test_vin_description_prompt_has_parts() {
        let prompt = build_vin_description_prompt(&vin());
        assert!(prompt.contains("VIN: 1M8GDM9AXKP042788"));
        assert!(prompt.contains("Model year: 2019"));
        assert!(prompt.contains("\"vehicleType\""));
    }

    #[test]
    fn test_nvis_prompt_copies_values() {
        let request = NvisRequest {
            vin: "1M8GDM9AXKP042788".to_string(),
            make: "Acme".to_string(),
            model: "BX8".to_string(),
            body_type: "Box trailer".to_string(),
            gvm_kg: 2000,
            atm_kg: Some(2000),
            gtm_kg: None,
            axles: 1,
            tyre_size: "185R14C".to_string(),
            date_of_manufacture: ymd(2024, 2, 9),
        };
        let prompt = build_nvis_prompt(&request, &vin(), Some(&profile()));
        assert!(prompt.contains("Acme Trailers Pty Ltd"));
        assert!(prompt.contains("GVM: 2000 kg"));
        assert!(prompt.contains("ATM: 2000 kg"));
        assert!(!prompt.contains("GTM:"));
        assert!(prompt.contains("09/02/2024"));
        assert!(prompt.ends_with(DOCUMENT_JSON_INSTRUCTION));
    }

    #[test]
    fn test_bill_of_sale_prompt_year_from_vin() {
        let request = BillOfSaleRequest {
            vin: "1M8GDM9AXKP042788".to_string(),
            make: "Acme".to_string(),
            model: "BX8".to_string(),
            year: None,
            buyer_name: "Sam Buyer".to_string(),
            buyer_address: "3 High St".to_string(),
            price_cents: 450_000,
            sale_date: ymd(2024, 5, 1),
            odometer_km: Some(12),
            notes: None,
        };
        let prompt = build_bill_of_sale_prompt(&request, &vin(), None);
        assert!(prompt.contains("Year: 2019"));
        assert!(prompt.contains("Sale price: $4500.00"));
        assert!(prompt.contains("Odometer: 12 km"));
        assert!(prompt.contains("leave blank for handwritten entry"));
    }

    #[test]
    fn test_vin_label_prompt() {
        let request = VinLabelRequest {
            vin: "1M8GDM9AXKP042788".to_string(),
            vehicle_type: "Trailer".to_string(),
            date_of_manufacture: ymd(2024, 2, 9),
            gvwr_kg: 2000,
            gawr_front_kg: None,
            gawr_rear_kg: 1800,
            tyre_size: "185R14C".to_string(),
            rim_size: "14x5.5".to_string(),
            cold_inflation_kpa: None,
        };
        let prompt = build_vin_label_prompt(&request, &vin(), Some(&profile()));
        assert!(prompt.contains("Date of manufacture: 02/2024"));
        assert!(prompt.contains("GAWR rear: 1800 kg"));
        assert!(!prompt.contains("GAWR front"));
        assert!(!prompt.contains("Cold tyre inflation"));
    }
}
