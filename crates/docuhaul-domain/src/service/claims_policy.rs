//! Authorization rules driven by account custom claims

use docuhaul_types::Account;

/// Outcome of a generation authorization check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationDecision {
    /// Premium/admin accounts have no limit
    Unlimited,
    /// Free account within quota; `remaining` counts this request
    WithinQuota { remaining: u32 },
    QuotaExceeded { used: u32, quota: u32 },
}

/// Decide whether an account may generate another AI document.
pub fn authorize_generation(account: &Account, free_quota: u32) -> GenerationDecision {
    if account.claims.premium || account.claims.admin {
        return GenerationDecision::Unlimited;
    }

    let used = account.documents_generated;
    if used < free_quota {
        GenerationDecision::WithinQuota {
            remaining: free_quota - used,
        }
    } else {
        GenerationDecision::QuotaExceeded {
            used,
            quota: free_quota,
        }
    }
}

/// Only admins may change claims, including their own.
pub fn can_manage_claims(actor: &Account) -> bool {
    actor.claims.admin
}

/// Premium state implied by a payment provider subscription status
pub fn premium_for_status(status: &str) -> bool {
    matches!(status, "active" | "on_trial" | "past_due")
}
