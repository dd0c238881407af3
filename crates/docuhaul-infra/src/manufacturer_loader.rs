//! Manufacturer profile loader from TOML

use std::fs;
use std::path::Path;

use docuhaul_domain::model::ManufacturerProfile;
use docuhaul_types::{ConfigError, Error, Result};
use serde::Deserialize;

/// Container for parsing manufacturer.toml
#[derive(Debug, Deserialize)]
struct ManufacturerConfig {
    manufacturer: ManufacturerProfile,
}

/// Load the manufacturer profile from a TOML file
pub fn load_from_file(path: &Path) -> Result<ManufacturerProfile> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::Config(ConfigError::ParseError(format!(
            "Failed to read manufacturer profile {}: {}",
            path.display(),
            e
        )))
    })?;

    load_from_str(&content)
}

/// Load the manufacturer profile from a TOML string
pub fn load_from_str(toml_content: &str) -> Result<ManufacturerProfile> {
    let config: ManufacturerConfig = toml::from_str(toml_content)?;
    let profile = config.manufacturer;

    if profile.name.trim().is_empty() {
        return Err(ConfigError::Missing("manufacturer.name".to_string()).into());
    }
    if let Some(ref wmi) = profile.wmi {
        if wmi.chars().count() != 3 {
            return Err(ConfigError::ParseError(format!(
                "manufacturer.wmi must be 3 characters, got '{}'",
                wmi
            ))
            .into());
        }
    }

    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_TOML: &str = r#"
[manufacturer]
name = "Acme Trailers Pty Ltd"
address = "12 Depot Rd, Geelong VIC 3220"
wmi = "6U9"
dealer_license = "LMCT 12345"
"#;

    #[test]
    fn test_load_from_str() {
        let profile = load_from_str(TEST_TOML).unwrap();
        assert_eq!(profile.name, "Acme Trailers Pty Ltd");
        assert_eq!(profile.wmi.as_deref(), Some("6U9"));
        assert!(profile.phone.is_none());
    }

    #[test]
    fn test_owns_vin() {
        let profile = load_from_str(TEST_TOML).unwrap();
        assert!(profile.owns_vin("6u9AAAAAAAAAAAAAA"));
        assert!(!profile.owns_vin("1M8GDM9AXKP042788"));
    }

    #[test]
    fn test_bad_wmi_rejected() {
        let toml = "[manufacturer]\nname = \"X\"\naddress = \"Y\"\nwmi = \"TOOLONG\"\n";
        assert!(matches!(load_from_str(toml), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_section_is_toml_error() {
        assert!(matches!(load_from_str("name = \"X\""), Err(Error::Toml(_))));
    }
}
