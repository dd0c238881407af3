//! Structured input for the document generation flows

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::Vin;
use docuhaul_types::{Error, Result};

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} is required", field)));
    }
    Ok(())
}

fn require_not_future(field: &str, date: NaiveDate, today: NaiveDate) -> Result<()> {
    if date > today {
        return Err(Error::InvalidInput(format!(
            "{} {} is in the future",
            field, date
        )));
    }
    Ok(())
}

/// NVIS compliance certificate input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NvisRequest {
    pub vin: String,
    pub make: String,
    pub model: String,
    /// Body type (e.g. "Box trailer", "Tipper")
    pub body_type: String,
    /// Gross vehicle mass (kg)
    pub gvm_kg: u32,
    /// Aggregate trailer mass (kg)
    #[serde(default)]
    pub atm_kg: Option<u32>,
    /// Gross trailer mass (kg)
    #[serde(default)]
    pub gtm_kg: Option<u32>,
    pub axles: u8,
    pub tyre_size: String,
    pub date_of_manufacture: NaiveDate,
}

impl NvisRequest {
    pub fn validate(&self, today: NaiveDate) -> Result<Vin> {
        let vin = Vin::parse(&self.vin)?;
        require("make", &self.make)?;
        require("model", &self.model)?;
        require("body type", &self.body_type)?;
        require("tyre size", &self.tyre_size)?;
        if self.gvm_kg == 0 {
            return Err(Error::InvalidInput("GVM must be greater than zero".to_string()));
        }
        if self.axles == 0 {
            return Err(Error::InvalidInput("at least one axle is required".to_string()));
        }
        if let (Some(atm), Some(gtm)) = (self.atm_kg, self.gtm_kg) {
            if gtm > atm {
                return Err(Error::InvalidInput(format!(
                    "GTM ({} kg) cannot exceed ATM ({} kg)",
                    gtm, atm
                )));
            }
        }
        require_not_future("date of manufacture", self.date_of_manufacture, today)?;
        Ok(vin)
    }
}

/// Bill of sale input; the seller is the configured manufacturer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillOfSaleRequest {
    pub vin: String,
    pub make: String,
    pub model: String,
    /// Model year; decoded from the VIN when absent
    #[serde(default)]
    pub year: Option<u16>,
    pub buyer_name: String,
    pub buyer_address: String,
    pub price_cents: u64,
    pub sale_date: NaiveDate,
    #[serde(default)]
    pub odometer_km: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl BillOfSaleRequest {
    pub fn validate(&self, today: NaiveDate) -> Result<Vin> {
        let vin = Vin::parse(&self.vin)?;
        require("make", &self.make)?;
        require("model", &self.model)?;
        require("buyer name", &self.buyer_name)?;
        require("buyer address", &self.buyer_address)?;
        require_not_future("sale date", self.sale_date, today)?;
        Ok(vin)
    }

    /// Price formatted as dollars and cents
    pub fn price_display(&self) -> String {
        format!("${}.{:02}", self.price_cents / 100, self.price_cents % 100)
    }
}

/// VIN label (compliance plate) input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VinLabelRequest {
    pub vin: String,
    pub vehicle_type: String,
    pub date_of_manufacture: NaiveDate,
    /// Gross vehicle weight rating (kg)
    pub gvwr_kg: u32,
    #[serde(default)]
    pub gawr_front_kg: Option<u32>,
    pub gawr_rear_kg: u32,
    pub tyre_size: String,
    pub rim_size: String,
    #[serde(default)]
    pub cold_inflation_kpa: Option<u32>,
}

impl VinLabelRequest {
    pub fn validate(&self, today: NaiveDate) -> Result<Vin> {
        let vin = Vin::parse(&self.vin)?;
        require("vehicle type", &self.vehicle_type)?;
        require("tyre size", &self.tyre_size)?;
        require("rim size", &self.rim_size)?;
        if self.gvwr_kg == 0 || self.gawr_rear_kg == 0 {
            return Err(Error::InvalidInput(
                "GVWR and rear GAWR must be greater than zero".to_string(),
            ));
        }
        let axle_total = self.gawr_rear_kg + self.gawr_front_kg.unwrap_or(0);
        if axle_total < self.gvwr_kg && self.gawr_front_kg.is_some() {
            return Err(Error::InvalidInput(format!(
                "axle ratings ({} kg) are below GVWR ({} kg)",
                axle_total, self.gvwr_kg
            )));
        }
        require_not_future("date of manufacture", self.date_of_manufacture, today)?;
        Ok(vin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn nvis() -> NvisRequest {
        NvisRequest {
            vin: "1M8GDM9AXKP042788".to_string(),
            make: "Haulmark".to_string(),
            model: "HT2".to_string(),
            body_type: "Box trailer".to_string(),
            gvm_kg: 3500,
            atm_kg: Some(3500),
            gtm_kg: Some(3200),
            axles: 2,
            tyre_size: "235/75R15".to_string(),
            date_of_manufacture: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        }
    }

    #[test]
    fn test_nvis_valid() {
        let vin = nvis().validate(today()).unwrap();
        assert_eq!(vin.as_str(), "1M8GDM9AXKP042788");
    }

    #[test]
    fn test_nvis_rejects_invalid_vin() {
        let mut req = nvis();
        req.vin = "1M8GDM9A1KP042788".to_string();
        assert!(matches!(req.validate(today()), Err(Error::InvalidVin(_))));
    }

    #[test]
    fn test_nvis_rejects_gtm_above_atm() {
        let mut req = nvis();
        req.gtm_kg = Some(4000);
        assert!(matches!(req.validate(today()), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_nvis_rejects_future_manufacture() {
        let mut req = nvis();
        req.date_of_manufacture = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(req.validate(today()).is_err());
    }

    #[test]
    fn test_bill_of_sale_price_display() {
        let req = BillOfSaleRequest {
            vin: "1HGCM82633A004352".to_string(),
            make: "Honda".to_string(),
            model: "Accord".to_string(),
            year: None,
            buyer_name: "Jo Buyer".to_string(),
            buyer_address: "1 Main St".to_string(),
            price_cents: 1_250_005,
            sale_date: today(),
            odometer_km: None,
            notes: None,
        };
        assert_eq!(req.price_display(), "$12500.05");
        assert!(req.validate(today()).is_ok());
    }

    #[test]
    fn test_bill_of_sale_requires_buyer() {
        let req = BillOfSaleRequest {
            vin: "1HGCM82633A004352".to_string(),
            make: "Honda".to_string(),
            model: "Accord".to_string(),
            year: None,
            buyer_name: "  ".to_string(),
            buyer_address: "1 Main St".to_string(),
            price_cents: 0,
            sale_date: today(),
            odometer_km: None,
            notes: None,
        };
        assert!(matches!(req.validate(today()), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_vin_label_axle_ratings() {
        let mut req = VinLabelRequest {
            vin: "1M8GDM9AXKP042788".to_string(),
            vehicle_type: "Trailer".to_string(),
            date_of_manufacture: today(),
            gvwr_kg: 3500,
            gawr_front_kg: Some(1000),
            gawr_rear_kg: 2000,
            tyre_size: "235/75R15".to_string(),
            rim_size: "15x6".to_string(),
            cold_inflation_kpa: Some(350),
        };
        assert!(req.validate(today()).is_err());
        req.gawr_rear_kg = 2500;
        assert!(req.validate(today()).is_ok());
    }
}
