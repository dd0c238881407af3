//! Output formatting module

use docuhaul_app::app::DecodedVin;
use docuhaul_types::{Account, GeneratedDocument, OutputFormat, Result};
use serde::Serialize;

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    println!("{}", content);
    Ok(())
}

pub fn output_decoded(output_format: OutputFormat, decoded: &DecodedVin) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(decoded);
    }

    println!("\nVIN Check");
    println!("=========");
    println!("VIN:             {}", decoded.vin);
    println!("Valid:           {}", if decoded.valid { "Yes" } else { "No" });
    if let Some(ref failure) = decoded.failure {
        println!("Reason:          {}", failure);
    }
    println!("Model year:      {}", decoded.model_year);

    if let Some(ref parts) = decoded.parts {
        println!("\n--- Sections ---");
        println!("WMI:             {}", parts.wmi);
        println!("VDS:             {}", parts.vds);
        println!("Check digit:     {}", parts.check_digit);
        println!("Plant:           {}", parts.plant_code);
        println!("Serial:          {}", parts.serial_number);
    }

    if let Some(ref description) = decoded.description {
        println!("\n--- Description ---");
        if let Some(ref manufacturer) = description.manufacturer {
            println!("Manufacturer:    {}", manufacturer);
        }
        if let Some(ref vehicle_type) = description.vehicle_type {
            println!("Vehicle type:    {}", vehicle_type);
        }
        println!("{}", description.description);
    }

    if let Some(ref id) = decoded.document_id {
        println!("\nSaved as document {}", id);
    }

    Ok(())
}

pub fn output_document(output_format: OutputFormat, document: &GeneratedDocument) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(document);
    }

    println!("\n{}", document.title);
    println!("{}", "=".repeat(document.title.chars().count().max(3)));
    println!("Kind:     {}", document.kind);
    println!("VIN:      {}", document.vin);
    println!("Account:  {}", document.owner_id);
    println!("Created:  {}", document.created_at.format("%Y-%m-%d %H:%M"));
    println!("ID:       {}", document.id);
    println!();
    println!("{}", document.body);

    Ok(())
}

pub fn output_document_list(output_format: OutputFormat, documents: &[GeneratedDocument]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(documents);
    }

    if documents.is_empty() {
        println!("No documents found");
        return Ok(());
    }

    println!(
        "{:<36}  {:<16}  {:<17}  {:<12}  {}",
        "ID", "Kind", "VIN", "Account", "Created"
    );
    println!("{}", "-".repeat(100));
    for document in documents {
        println!(
            "{:<36}  {:<16}  {:<17}  {:<12}  {}",
            document.id,
            document.kind.label(),
            document.vin,
            truncate(&document.owner_id, 12),
            document.created_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

pub fn output_account(output_format: OutputFormat, account: &Account, free_quota: u32) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(account);
    }

    println!("\nAccount {}", account.id);
    println!("Email:           {}", account.email);
    println!("Role:            {}", account.claims.label());
    if account.claims.premium || account.claims.admin {
        println!("Documents:       {} (unlimited)", account.documents_generated);
    } else {
        println!(
            "Documents:       {} of {} free",
            account.documents_generated, free_quota
        );
    }
    if let Some(ref status) = account.subscription_status {
        println!(
            "Subscription:    {} ({})",
            status,
            account.subscription_id.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}

pub fn output_account_list(output_format: OutputFormat, accounts: &[Account]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(accounts);
    }

    println!("{:<20}  {:<30}  {:<8}  {}", "ID", "Email", "Role", "Documents");
    println!("{}", "-".repeat(72));
    for account in accounts {
        println!(
            "{:<20}  {:<30}  {:<8}  {}",
            truncate(&account.id, 20),
            truncate(&account.email, 30),
            account.claims.label(),
            account.documents_generated
        );
    }

    Ok(())
}

pub fn output_json<T: Serialize>(value: &T) -> Result<()> {
    print_json(value)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}
