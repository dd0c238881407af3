//! Account management: creation, lookup and claim changes

use docuhaul_domain::repository::AccountRepository;
use docuhaul_domain::service::can_manage_claims;
use docuhaul_types::{Account, AccountClaims};

use super::FlowError;

/// Create an account.
///
/// The first account may bootstrap itself as admin; afterwards new accounts
/// start on the free tier and claims are granted through [`set_claims`].
pub fn create_account(
    accounts: &dyn AccountRepository,
    id: &str,
    email: &str,
    admin: bool,
) -> Result<Account, FlowError> {
    let id = id.trim();
    let email = email.trim();
    if id.is_empty() {
        return Err(FlowError::InvalidInput("account id is required".to_string()));
    }
    if !email.contains('@') {
        return Err(FlowError::InvalidInput(format!("invalid email '{}'", email)));
    }
    if accounts.find_by_id(id)?.is_some() {
        return Err(FlowError::InvalidInput(format!("account '{}' already exists", id)));
    }

    let mut claims = AccountClaims::default();
    if admin {
        let has_admin = accounts.find_all()?.iter().any(|a| a.claims.admin);
        if has_admin {
            return Err(FlowError::Unauthorized(
                "an admin already exists; ask them to grant admin".to_string(),
            ));
        }
        claims.admin = true;
    }

    let account = Account::new(id.to_string(), email.to_string()).with_claims(claims);
    accounts.save(&account)?;
    tracing::info!(id = %account.id, role = account.claims.label(), "Account created");
    Ok(account)
}

pub fn get_account(accounts: &dyn AccountRepository, id: &str) -> Result<Account, FlowError> {
    accounts
        .find_by_id(id)?
        .ok_or_else(|| FlowError::NotFound(format!("account '{}'", id)))
}

/// Replace a target account's claims; the actor must be an admin.
pub fn set_claims(
    accounts: &dyn AccountRepository,
    actor_id: &str,
    target_id: &str,
    claims: AccountClaims,
) -> Result<Account, FlowError> {
    let actor = get_account(accounts, actor_id)?;
    if !can_manage_claims(&actor) {
        return Err(FlowError::Unauthorized(format!(
            "'{}' is not an admin",
            actor.id
        )));
    }

    let mut target = get_account(accounts, target_id)?;
    target.claims = claims;
    target.touch();
    accounts.save(&target)?;
    tracing::info!(actor = %actor.id, target = %target.id, role = target.claims.label(), "Claims updated");
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::repos;
    use tempfile::tempdir;

    #[test]
    fn test_first_admin_bootstrap_only_once() {
        let dir = tempdir().unwrap();
        let (_, accounts) = repos(dir.path());

        let admin = create_account(&accounts, "root", "root@example.com", true).unwrap();
        assert!(admin.claims.admin);
        let err = create_account(&accounts, "second", "second@example.com", true).unwrap_err();
        assert!(matches!(err, FlowError::Unauthorized(_)));
    }

    #[test]
    fn test_create_validates_input() {
        let dir = tempdir().unwrap();
        let (_, accounts) = repos(dir.path());

        assert!(matches!(
            create_account(&accounts, " ", "a@example.com", false),
            Err(FlowError::InvalidInput(_))
        ));
        assert!(matches!(
            create_account(&accounts, "u1", "not-an-email", false),
            Err(FlowError::InvalidInput(_))
        ));
        create_account(&accounts, "u1", "u1@example.com", false).unwrap();
        assert!(matches!(
            create_account(&accounts, "u1", "u1@example.com", false),
            Err(FlowError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_admin_grants_premium() {
        let dir = tempdir().unwrap();
        let (_, accounts) = repos(dir.path());
        create_account(&accounts, "root", "root@example.com", true).unwrap();
        create_account(&accounts, "u1", "u1@example.com", false).unwrap();

        let updated = set_claims(
            &accounts,
            "root",
            "u1",
            AccountClaims { premium: true, admin: false },
        )
        .unwrap();
        assert_eq!(updated.claims.label(), "premium");
        assert!(get_account(&accounts, "u1").unwrap().claims.premium);
    }

    #[test]
    fn test_non_admin_cannot_change_claims() {
        let dir = tempdir().unwrap();
        let (_, accounts) = repos(dir.path());
        create_account(&accounts, "u1", "u1@example.com", false).unwrap();

        let err = set_claims(
            &accounts,
            "u1",
            "u1",
            AccountClaims { premium: true, admin: true },
        )
        .unwrap_err();
        assert!(matches!(err, FlowError::Unauthorized(_)));
        assert_eq!(get_account(&accounts, "u1").unwrap().claims.label(), "free");
    }

    #[test]
    fn test_missing_target() {
        let dir = tempdir().unwrap();
        let (_, accounts) = repos(dir.path());
        create_account(&accounts, "root", "root@example.com", true).unwrap();
        assert!(matches!(
            set_claims(&accounts, "root", "ghost", AccountClaims::default()),
            Err(FlowError::NotFound(_))
        ));
    }
}
