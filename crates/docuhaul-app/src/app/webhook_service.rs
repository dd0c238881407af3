//! Payment webhook handling
//!
//! The signature is checked against the raw body before anything is parsed.
//! Subscription events toggle the account's `premium` claim.

use serde::Serialize;

use docuhaul_domain::repository::AccountRepository;
use docuhaul_domain::service::{premium_for_status, verify_webhook_signature};
use docuhaul_infra::lemonsqueezy::{parse_webhook, BillingEvent};

use super::FlowError;

/// What a webhook did to the account store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WebhookOutcome {
    /// Subscription state applied; `premium` is the resulting claim
    Applied { account_id: String, premium: bool },
    /// Event recorded without changing claims
    Recorded { account_id: String },
    /// Event type this app does not act on
    Ignored { event_name: String },
}

/// Verify, parse and apply a payment webhook.
pub fn handle_webhook(
    accounts: &dyn AccountRepository,
    secret: &str,
    raw_body: &[u8],
    signature: Option<&str>,
) -> Result<WebhookOutcome, FlowError> {
    if !verify_webhook_signature(raw_body, secret, signature) {
        tracing::warn!(bytes = raw_body.len(), "Rejected webhook with bad signature");
        return Err(FlowError::Unauthorized("invalid webhook signature".to_string()));
    }

    let payload = parse_webhook(raw_body)?;
    let event = payload.event();
    if let BillingEvent::Ignored { event_name } = &event {
        tracing::debug!(event = %event_name, "Ignoring webhook event");
        return Ok(WebhookOutcome::Ignored {
            event_name: event_name.clone(),
        });
    }

    // Renewals can arrive without checkout custom data; fall back to the
    // account already linked to the subscription.
    let mut account = match payload.user_id() {
        Some(user_id) => accounts
            .find_by_id(user_id)?
            .ok_or_else(|| FlowError::NotFound(format!("account '{}'", user_id)))?,
        None => {
            let linked = match event.subscription_id() {
                Some(subscription_id) => accounts.find_by_subscription(subscription_id)?,
                None => None,
            };
            linked.ok_or_else(|| {
                FlowError::InvalidInput(format!(
                    "{} webhook has no custom_data.user_id",
                    payload.meta.event_name
                ))
            })?
        }
    };

    let outcome = match event {
        BillingEvent::SubscriptionChanged {
            subscription_id,
            status,
        } => {
            account.claims.premium = premium_for_status(&status);
            account.subscription_id = Some(subscription_id);
            account.subscription_status = Some(status);
            WebhookOutcome::Applied {
                account_id: account.id.clone(),
                premium: account.claims.premium,
            }
        }
        BillingEvent::SubscriptionCancelled {
            subscription_id,
            status,
        } => {
            // Premium stays until the provider sends subscription_expired
            account.subscription_id = Some(subscription_id);
            account.subscription_status = Some(status);
            WebhookOutcome::Applied {
                account_id: account.id.clone(),
                premium: account.claims.premium,
            }
        }
        BillingEvent::SubscriptionEnded {
            subscription_id,
            status,
        } => {
            account.claims.premium = false;
            account.subscription_id = Some(subscription_id);
            account.subscription_status = Some(status);
            WebhookOutcome::Applied {
                account_id: account.id.clone(),
                premium: false,
            }
        }
        BillingEvent::OrderCreated { order_id } => {
            tracing::info!(user = %account.id, order = %order_id, "Order recorded");
            WebhookOutcome::Recorded {
                account_id: account.id.clone(),
            }
        }
        BillingEvent::Ignored { event_name } => return Ok(WebhookOutcome::Ignored { event_name }),
    };

    account.touch();
    accounts.save(&account)?;
    tracing::info!(
        user = %account.id,
        event = %payload.meta.event_name,
        premium = account.claims.premium,
        test_mode = payload.meta.test_mode,
        "Webhook applied"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::{account, repos};
    use docuhaul_domain::service::compute_signature;
    use tempfile::tempdir;

    const SECRET: &str = "whsec_test";

    fn body(event: &str, status: &str, user: &str) -> Vec<u8> {
        format!(
            "{{\"meta\":{{\"event_name\":\"{}\",\"custom_data\":{{\"user_id\":\"{}\"}}}},\"data\":{{\"type\":\"subscriptions\",\"id\":\"sub_9\",\"attributes\":{{\"status\":\"{}\"}}}}}}",
            event, user, status
        )
        .into_bytes()
    }

    fn deliver(
        accounts: &dyn AccountRepository,
        raw: &[u8],
    ) -> Result<WebhookOutcome, FlowError> {
        let signature = compute_signature(raw, SECRET);
        handle_webhook(accounts, SECRET, raw, Some(signature.as_str()))
    }

    #[test]
    fn test_subscription_lifecycle_toggles_premium() {
        let dir = tempdir().unwrap();
        let (_, accounts) = repos(dir.path());
        accounts.save(&account("u1", false, false)).unwrap();

        let outcome = deliver(&accounts, &body("subscription_created", "active", "u1")).unwrap();
        assert_eq!(
            outcome,
            WebhookOutcome::Applied { account_id: "u1".to_string(), premium: true }
        );
        let stored = accounts.find_by_id("u1").unwrap().unwrap();
        assert!(stored.claims.premium);
        assert_eq!(stored.subscription_id.as_deref(), Some("sub_9"));

        deliver(&accounts, &body("subscription_cancelled", "cancelled", "u1")).unwrap();
        let stored = accounts.find_by_id("u1").unwrap().unwrap();
        assert!(stored.claims.premium);
        assert_eq!(stored.subscription_status.as_deref(), Some("cancelled"));

        deliver(&accounts, &body("subscription_expired", "expired", "u1")).unwrap();
        assert!(!accounts.find_by_id("u1").unwrap().unwrap().claims.premium);
    }

    #[test]
    fn test_unpaid_update_revokes_premium() {
        let dir = tempdir().unwrap();
        let (_, accounts) = repos(dir.path());
        accounts.save(&account("u1", true, false)).unwrap();

        deliver(&accounts, &body("subscription_updated", "unpaid", "u1")).unwrap();
        assert!(!accounts.find_by_id("u1").unwrap().unwrap().claims.premium);
    }

    #[test]
    fn test_bad_signature_not_processed() {
        let dir = tempdir().unwrap();
        let (_, accounts) = repos(dir.path());
        accounts.save(&account("u1", false, false)).unwrap();
        let raw = body("subscription_created", "active", "u1");
        let other = compute_signature(b"other body", SECRET);

        for signature in [None, Some(""), Some(other.as_str())] {
            let err = handle_webhook(&accounts, SECRET, &raw, signature).unwrap_err();
            assert!(matches!(err, FlowError::Unauthorized(_)));
        }
        assert!(!accounts.find_by_id("u1").unwrap().unwrap().claims.premium);
    }

    #[test]
    fn test_missing_user_and_unknown_account() {
        let dir = tempdir().unwrap();
        let (_, accounts) = repos(dir.path());

        let err = deliver(&accounts, &body("subscription_created", "active", "")).unwrap_err();
        assert!(matches!(err, FlowError::InvalidInput(_)));
        let err = deliver(&accounts, &body("subscription_created", "active", "ghost")).unwrap_err();
        assert!(matches!(err, FlowError::NotFound(_)));
        let err = deliver(&accounts, b"{not json").unwrap_err();
        assert!(matches!(err, FlowError::InvalidInput(_)));
    }

    fn body_without_user(event: &str, status: &str) -> Vec<u8> {
        format!(
            "{{\"meta\":{{\"event_name\":\"{}\"}},\"data\":{{\"type\":\"subscriptions\",\"id\":\"sub_9\",\"attributes\":{{\"status\":\"{}\"}}}}}}",
            event, status
        )
        .into_bytes()
    }

    #[test]
    fn test_event_without_user_uses_linked_subscription() {
        let dir = tempdir().unwrap();
        let (_, accounts) = repos(dir.path());
        accounts.save(&account("u1", false, false)).unwrap();

        let err = deliver(&accounts, &body_without_user("subscription_expired", "expired")).unwrap_err();
        assert!(matches!(err, FlowError::InvalidInput(_)));

        deliver(&accounts, &body("subscription_created", "active", "u1")).unwrap();
        let outcome = deliver(&accounts, &body_without_user("subscription_expired", "expired")).unwrap();
        assert_eq!(
            outcome,
            WebhookOutcome::Applied { account_id: "u1".to_string(), premium: false }
        );
        let stored = accounts.find_by_id("u1").unwrap().unwrap();
        assert!(!stored.claims.premium);
        assert_eq!(stored.subscription_status.as_deref(), Some("expired"));

        let err = deliver(&accounts, &body_without_user("order_created", "paid")).unwrap_err();
        assert!(matches!(err, FlowError::InvalidInput(_)));
    }

    #[test]
    fn test_unknown_event_and_order() {
        let dir = tempdir().unwrap();
        let (_, accounts) = repos(dir.path());
        accounts.save(&account("u1", false, false)).unwrap();

        let outcome = deliver(&accounts, &body("affiliate_activated", "", "nobody")).unwrap();
        assert!(matches!(outcome, WebhookOutcome::Ignored { .. }));
        let outcome = deliver(&accounts, &body("order_created", "paid", "u1")).unwrap();
        assert_eq!(outcome, WebhookOutcome::Recorded { account_id: "u1".to_string() });
        assert!(!accounts.find_by_id("u1").unwrap().unwrap().claims.premium);
    }
}
