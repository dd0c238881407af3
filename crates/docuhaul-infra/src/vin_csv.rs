//! CSV loader for batch VIN checks
//!
//! Accepts either a headed file with a `vin` column or a bare list where the
//! VIN is the first column. Blank rows are skipped.

use std::io::Read;
use std::path::Path;

use docuhaul_types::Result;
use serde::Serialize;

/// One VIN read from a CSV file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VinRecord {
    /// 1-based line number in the file
    pub row: usize,
    pub vin: String,
}

pub fn load_vins_from_csv(path: &Path) -> Result<Vec<VinRecord>> {
    let file = std::fs::File::open(path)?;
    load_vins_from_reader(file)
}

pub fn load_vins_from_reader<R: Read>(reader: R) -> Result<Vec<VinRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut vin_column = 0usize;

    for (index, result) in csv_reader.records().enumerate() {
        let record = result?;
        let row = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(index + 1);

        if index == 0 {
            if let Some(col) = record.iter().position(|h| h.eq_ignore_ascii_case("vin")) {
                vin_column = col;
                continue;
            }
        }

        match record.get(vin_column) {
            Some(vin) if !vin.is_empty() => records.push(VinRecord {
                row,
                vin: vin.to_string(),
            }),
            _ => continue,
        }
    }

    tracing::debug!(count = records.len(), "Loaded VINs from CSV");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headed_csv() {
        let data = "stock,vin\nA1, 1M8GDM9AXKP042788\nA2,1HGCM82633A004352\n";
        let records = load_vins_from_reader(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], VinRecord { row: 2, vin: "1M8GDM9AXKP042788".to_string() });
        assert_eq!(records[1].row, 3);
    }

    #[test]
    fn test_bare_list() {
        let data = "1M8GDM9AXKP042788\n\nJH4KA7561PC008269,extra\n";
        let records = load_vins_from_reader(data.as_bytes()).unwrap();
        let vins: Vec<_> = records.iter().map(|r| r.vin.as_str()).collect();
        assert_eq!(vins, vec!["1M8GDM9AXKP042788", "JH4KA7561PC008269"]);
    }

    #[test]
    fn test_missing_column_skipped() {
        let data = "name,VIN\nonly-name\nx,11111111111111111\n";
        let records = load_vins_from_reader(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].vin, "11111111111111111");
    }
}
