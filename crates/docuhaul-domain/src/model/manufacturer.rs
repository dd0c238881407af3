//! Manufacturer profile used on generated documents

use serde::{Deserialize, Serialize};

/// Details of the manufacturer/seller printed on certificates and labels
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManufacturerProfile {
    /// Registered business name
    pub name: String,
    /// Postal address
    pub address: String,
    /// World Manufacturer Identifier assigned to this manufacturer
    #[serde(default)]
    pub wmi: Option<String>,
    #[serde(default)]
    pub dealer_license: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl ManufacturerProfile {
    /// Whether a VIN was issued under this manufacturer's WMI
    pub fn owns_vin(&self, vin: &str) -> bool {
        match self.wmi.as_deref() {
            Some(wmi) => vin.to_ascii_uppercase().starts_with(&wmi.to_ascii_uppercase()),
            None => true,
        }
    }
}
