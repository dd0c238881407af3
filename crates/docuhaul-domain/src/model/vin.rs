//! Validated VIN newtype and its structural sections

use serde::{Deserialize, Serialize};

use crate::service::vin_validator::{check_vin, decode_model_year, model_year};
use docuhaul_types::{Error, Result};

/// A VIN whose length, alphabet and check digit have been verified.
///
/// Stored upper-cased and trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Vin(String);

/// Fixed-offset sections of a VIN
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VinParts {
    /// World Manufacturer Identifier (characters 1-3)
    pub wmi: String,
    /// Vehicle Descriptor Section (characters 4-8)
    pub vds: String,
    pub check_digit: char,
    pub model_year_code: char,
    pub plant_code: char,
    /// Sequential production number (characters 12-17)
    pub serial_number: String,
}

impl Vin {
    pub fn parse(input: &str) -> Result<Self> {
        let normalized = input.trim().to_ascii_uppercase();
        check_vin(&normalized)
            .map_err(|failure| Error::InvalidVin(format!("{}: {}", normalized, failure)))?;
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn parts(&self) -> VinParts {
        let s = self.0.as_str();
        let at = |i: usize| s[i..].chars().next().unwrap_or('?');
        VinParts {
            wmi: s[0..3].to_string(),
            vds: s[3..8].to_string(),
            check_digit: at(8),
            model_year_code: at(9),
            plant_code: at(10),
            serial_number: s[11..17].to_string(),
        }
    }

    /// Model year as a string, `"Unknown Year"` when the code is not in the table
    pub fn model_year(&self) -> String {
        decode_model_year(&self.0)
    }

    pub fn model_year_number(&self) -> Option<u16> {
        model_year(&self.0)
    }
}

impl std::fmt::Display for Vin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Vin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Vin::parse(s)
    }
}

impl TryFrom<String> for Vin {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Vin::parse(&value)
    }
}

impl From<Vin> for String {
    fn from(vin: Vin) -> Self {
        vin.0
    }
}
