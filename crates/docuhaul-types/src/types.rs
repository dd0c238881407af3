//! Shared records for accounts and generated documents

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Boolean custom claims attached to an account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountClaims {
    #[serde(default)]
    pub premium: bool,
    #[serde(default)]
    pub admin: bool,
}

impl AccountClaims {
    pub fn label(&self) -> &'static str {
        match (self.admin, self.premium) {
            (true, _) => "admin",
            (false, true) => "premium",
            (false, false) => "free",
        }
    }
}

/// User account with billing state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    pub id: String,
    /// Contact email
    pub email: String,
    /// Custom claims (premium/admin)
    #[serde(default)]
    pub claims: AccountClaims,
    /// Payment provider subscription id
    #[serde(default)]
    pub subscription_id: Option<String>,
    /// Last subscription status reported by the payment provider
    #[serde(default)]
    pub subscription_status: Option<String>,
    /// Number of AI-generated documents produced for this account
    #[serde(default)]
    pub documents_generated: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(id: String, email: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            claims: AccountClaims::default(),
            subscription_id: None,
            subscription_status: None,
            documents_generated: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_claims(mut self, claims: AccountClaims) -> Self {
        self.claims = claims;
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Kind of generated document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// NVIS compliance certificate
    Nvis,
    BillOfSale,
    VinLabel,
    /// VIN decode report
    VinDecode,
}

impl DocumentKind {
    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Nvis => "NVIS Certificate",
            DocumentKind::BillOfSale => "Bill of Sale",
            DocumentKind::VinLabel => "VIN Label",
            DocumentKind::VinDecode => "VIN Decode",
        }
    }

    pub fn all() -> [DocumentKind; 4] {
        [
            DocumentKind::Nvis,
            DocumentKind::BillOfSale,
            DocumentKind::VinLabel,
            DocumentKind::VinDecode,
        ]
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A document produced by one of the generation flows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedDocument {
    pub id: String,
    pub owner_id: String,
    pub kind: DocumentKind,
    pub vin: String,
    pub title: String,
    /// Text body produced by the AI backend
    pub body: String,
    /// Structured input the document was generated from
    #[serde(default)]
    pub fields: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl GeneratedDocument {
    pub fn new(owner_id: &str, kind: DocumentKind, vin: &str, title: String, body: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            kind,
            vin: vin.to_string(),
            title,
            body,
            fields: serde_json::Value::Null,
            created_at: Utc::now(),
        }
    }

    pub fn with_fields(mut self, fields: serde_json::Value) -> Self {
        self.fields = fields;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_label() {
        assert_eq!(AccountClaims::default().label(), "free");
        let premium = AccountClaims { premium: true, admin: false };
        assert_eq!(premium.label(), "premium");
        let admin = AccountClaims { premium: false, admin: true };
        assert_eq!(admin.label(), "admin");
    }

    #[test]
    fn test_account_defaults_missing_fields() {
        let json = r#"{
            "id": "u1",
            "email": "a@example.com",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }"#;
        let account: Account = serde_json::from_str(json).unwrap();
        assert!(!account.claims.premium);
        assert_eq!(account.documents_generated, 0);
        assert!(account.subscription_id.is_none());
    }

    #[test]
    fn test_document_kind_serde_name() {
        let s = serde_json::to_string(&DocumentKind::BillOfSale).unwrap();
        assert_eq!(s, "\"bill_of_sale\"");
    }
}
