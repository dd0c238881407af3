//! Payment webhook payloads (LemonSqueezy format)
//!
//! Only the fields the billing flow reads are modelled; everything else in
//! the payload is ignored.

use serde::Deserialize;

use docuhaul_types::{Error, Result};

/// Header carrying the hex HMAC-SHA256 of the raw body
pub const SIGNATURE_HEADER: &str = "x-signature";

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    pub meta: WebhookMeta,
    pub data: WebhookData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookMeta {
    pub event_name: String,
    #[serde(default)]
    pub test_mode: bool,
    #[serde(default)]
    pub custom_data: Option<CustomData>,
}

/// Checkout custom data; the app passes the account id through here
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomData {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookData {
    pub id: String,
    #[serde(default)]
    pub attributes: WebhookAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookAttributes {
    #[serde(default)]
    pub status: Option<String>,
}

/// Billing-relevant meaning of a webhook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingEvent {
    /// created, updated, resumed, unpaused: premium follows the status
    SubscriptionChanged { subscription_id: String, status: String },
    /// Cancelled but still paid up until the period ends
    SubscriptionCancelled { subscription_id: String, status: String },
    /// expired or paused: premium is revoked
    SubscriptionEnded { subscription_id: String, status: String },
    OrderCreated { order_id: String },
    Ignored { event_name: String },
}

impl BillingEvent {
    /// Subscription id carried by subscription events
    pub fn subscription_id(&self) -> Option<&str> {
        match self {
            BillingEvent::SubscriptionChanged { subscription_id, .. }
            | BillingEvent::SubscriptionCancelled { subscription_id, .. }
            | BillingEvent::SubscriptionEnded { subscription_id, .. } => Some(subscription_id),
            BillingEvent::OrderCreated { .. } | BillingEvent::Ignored { .. } => None,
        }
    }
}

impl WebhookPayload {
    /// Account id passed through checkout custom data
    pub fn user_id(&self) -> Option<&str> {
        self.meta
            .custom_data
            .as_ref()
            .and_then(|c| c.user_id.as_deref())
            .filter(|id| !id.trim().is_empty())
    }

    pub fn event(&self) -> BillingEvent {
        let subscription_id = self.data.id.clone();
        let status = || {
            self.data
                .attributes
                .status
                .clone()
                .unwrap_or_default()
        };

        match self.meta.event_name.as_str() {
            "subscription_created"
            | "subscription_updated"
            | "subscription_resumed"
            | "subscription_unpaused" => BillingEvent::SubscriptionChanged {
                subscription_id,
                status: status(),
            },
            "subscription_cancelled" => BillingEvent::SubscriptionCancelled {
                subscription_id,
                status: status(),
            },
            "subscription_expired" | "subscription_paused" => BillingEvent::SubscriptionEnded {
                subscription_id,
                status: status(),
            },
            "order_created" => BillingEvent::OrderCreated {
                order_id: subscription_id,
            },
            other => BillingEvent::Ignored {
                event_name: other.to_string(),
            },
        }
    }
}

/// Parse a raw (already signature-checked) webhook body
pub fn parse_webhook(raw_body: &[u8]) -> Result<WebhookPayload> {
    serde_json::from_slice(raw_body)
        .map_err(|e| Error::Webhook(format!("malformed webhook payload: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(event: &str, status: &str, user: Option<&str>) -> Vec<u8> {
        let custom = match user {
            Some(u) => format!(",\"custom_data\":{{\"user_id\":\"{}\"}}", u),
            None => String::new(),
        };
        format!(
            "{{\"meta\":{{\"event_name\":\"{}\"{}}},\"data\":{{\"type\":\"subscriptions\",\"id\":\"77\",\"attributes\":{{\"status\":\"{}\",\"user_email\":\"a@example.com\"}}}}}}",
            event, custom, status
        )
        .into_bytes()
    }

    #[test]
    fn test_subscription_created() {
        let payload = parse_webhook(&body("subscription_created", "active", Some("u1"))).unwrap();
        assert_eq!(payload.user_id(), Some("u1"));
        assert_eq!(
            payload.event(),
            BillingEvent::SubscriptionChanged {
                subscription_id: "77".to_string(),
                status: "active".to_string()
            }
        );
    }

    #[test]
    fn test_expired_and_paused_end_subscription() {
        for event in ["subscription_expired", "subscription_paused"] {
            let payload = parse_webhook(&body(event, "expired", Some("u1"))).unwrap();
            assert!(matches!(payload.event(), BillingEvent::SubscriptionEnded { .. }));
        }
    }

    #[test]
    fn test_cancelled() {
        let payload = parse_webhook(&body("subscription_cancelled", "cancelled", None)).unwrap();
        assert!(payload.user_id().is_none());
        assert!(matches!(payload.event(), BillingEvent::SubscriptionCancelled { .. }));
        assert_eq!(payload.event().subscription_id(), Some("77"));
    }

    #[test]
    fn test_unknown_event_ignored() {
        let payload = parse_webhook(&body("license_key_created", "", Some("u1"))).unwrap();
        assert_eq!(
            payload.event(),
            BillingEvent::Ignored {
                event_name: "license_key_created".to_string()
            }
        );
    }

    #[test]
    fn test_blank_user_id_is_none() {
        let payload = parse_webhook(&body("order_created", "paid", Some(" "))).unwrap();
        assert!(payload.user_id().is_none());
        assert_eq!(
            payload.event(),
            BillingEvent::OrderCreated {
                order_id: "77".to_string()
            }
        );
        assert_eq!(payload.event().subscription_id(), None);
    }

    #[test]
    fn test_malformed_payload() {
        assert!(matches!(parse_webhook(b"not json"), Err(Error::Webhook(_))));
        assert!(matches!(parse_webhook(b"{\"meta\":{}}"), Err(Error::Webhook(_))));
    }
}
