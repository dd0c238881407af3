//! Excel export of the generated-document register

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use docuhaul_domain::service::decode_model_year;
use docuhaul_types::{DocumentKind, Error, GeneratedDocument, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

/// Export documents to an Excel file with Summary and Documents sheets
pub fn export_documents_to_excel(documents: &[GeneratedDocument], output_path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    let summary_sheet = workbook.add_worksheet();
    write_summary_sheet(summary_sheet, documents, Utc::now())?;

    let documents_sheet = workbook.add_worksheet();
    write_documents_sheet(documents_sheet, documents)?;

    workbook
        .save(output_path)
        .map_err(|e| Error::Excel(e.to_string()))?;

    tracing::info!(count = documents.len(), path = %output_path.display(), "Exported documents");
    Ok(())
}

fn write_summary_sheet(
    sheet: &mut Worksheet,
    documents: &[GeneratedDocument],
    exported_at: DateTime<Utc>,
) -> Result<()> {
    sheet
        .set_name("Summary")
        .map_err(|e| Error::Excel(e.to_string()))?;

    let header_format = Format::new().set_bold();

    sheet
        .write_string_with_format(0, 0, "DocuHaul Document Register", &header_format)
        .map_err(|e| Error::Excel(e.to_string()))?;

    sheet
        .write_string(2, 0, "Exported:")
        .map_err(|e| Error::Excel(e.to_string()))?;
    sheet
        .write_string(2, 1, exported_at.to_rfc3339())
        .map_err(|e| Error::Excel(e.to_string()))?;

    sheet
        .write_string(3, 0, "Total Documents:")
        .map_err(|e| Error::Excel(e.to_string()))?;
    sheet
        .write_number(3, 1, documents.len() as f64)
        .map_err(|e| Error::Excel(e.to_string()))?;

    // Kind distribution
    sheet
        .write_string_with_format(5, 0, "By Kind", &header_format)
        .map_err(|e| Error::Excel(e.to_string()))?;

    let mut row = 6;
    for kind in DocumentKind::all() {
        let count = documents.iter().filter(|d| d.kind == kind).count();
        sheet
            .write_string(row, 0, kind.label())
            .map_err(|e| Error::Excel(e.to_string()))?;
        sheet
            .write_number(row, 1, count as f64)
            .map_err(|e| Error::Excel(e.to_string()))?;
        row += 1;
    }

    // Owner distribution
    row += 1;
    sheet
        .write_string_with_format(row, 0, "By Account", &header_format)
        .map_err(|e| Error::Excel(e.to_string()))?;
    row += 1;

    let mut owner_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for document in documents {
        *owner_counts.entry(document.owner_id.as_str()).or_insert(0) += 1;
    }
    for (owner, count) in &owner_counts {
        sheet
            .write_string(row, 0, *owner)
            .map_err(|e| Error::Excel(e.to_string()))?;
        sheet
            .write_number(row, 1, *count as f64)
            .map_err(|e| Error::Excel(e.to_string()))?;
        row += 1;
    }

    Ok(())
}

fn write_documents_sheet(sheet: &mut Worksheet, documents: &[GeneratedDocument]) -> Result<()> {
    sheet
        .set_name("Documents")
        .map_err(|e| Error::Excel(e.to_string()))?;

    let header_format = Format::new().set_bold();

    let headers = ["Created", "Kind", "VIN", "Model Year", "Title", "Account", "Document ID"];
    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(|e| Error::Excel(e.to_string()))?;
    }

    for (row_idx, document) in documents.iter().enumerate() {
        let row = (row_idx + 1) as u32;
        let cells = [
            document.created_at.format("%Y-%m-%d %H:%M").to_string(),
            document.kind.label().to_string(),
            document.vin.clone(),
            decode_model_year(&document.vin),
            document.title.clone(),
            document.owner_id.clone(),
            document.id.clone(),
        ];
        for (col, value) in cells.iter().enumerate() {
            sheet
                .write_string(row, col as u16, value)
                .map_err(|e| Error::Excel(e.to_string()))?;
        }
    }

    sheet
        .set_column_width(4, 40)
        .map_err(|e| Error::Excel(e.to_string()))?;
    sheet
        .set_column_width(6, 38)
        .map_err(|e| Error::Excel(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn doc(owner: &str, kind: DocumentKind, vin: &str) -> GeneratedDocument {
        GeneratedDocument::new(owner, kind, vin, format!("{} {}", kind, vin), "body".to_string())
    }

    #[test]
    fn test_export_writes_workbook() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("register.xlsx");
        let documents = vec![
            doc("u1", DocumentKind::Nvis, "1M8GDM9AXKP042788"),
            doc("u2", DocumentKind::BillOfSale, "1HGCM82633A004352"),
        ];

        export_documents_to_excel(&documents, &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        // xlsx is a zip container
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_export_empty_register() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");
        export_documents_to_excel(&[], &path).unwrap();
        assert!(path.exists());
    }
}
