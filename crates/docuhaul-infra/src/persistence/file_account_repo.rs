//! File-based account repository implementation

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use docuhaul_domain::repository::AccountRepository;
use docuhaul_types::{Account, Error, Result};

use super::file_document_repo::{commit, load_map};

/// Stores accounts and their claims in `accounts.json`, keyed by account id.
pub struct FileAccountRepository {
    store_path: PathBuf,
    accounts: RefCell<HashMap<String, Account>>,
}

impl FileAccountRepository {
    /// Create or load an account repository
    pub fn open(store_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&store_dir)?;
        let store_path = store_dir.join("accounts.json");
        let accounts = load_map(&store_path)?;

        Ok(Self {
            store_path,
            accounts: RefCell::new(accounts),
        })
    }
}

impl AccountRepository for FileAccountRepository {
    fn save(&self, account: &Account) -> std::result::Result<(), Error> {
        commit(&self.store_path, &self.accounts, |accounts| {
            accounts.insert(account.id.clone(), account.clone());
        })
    }

    fn find_by_id(&self, id: &str) -> std::result::Result<Option<Account>, Error> {
        Ok(self.accounts.borrow().get(id).cloned())
    }

    fn find_by_subscription(&self, subscription_id: &str) -> std::result::Result<Option<Account>, Error> {
        Ok(self
            .accounts
            .borrow()
            .values()
            .find(|a| a.subscription_id.as_deref() == Some(subscription_id))
            .cloned())
    }

    fn find_all(&self) -> std::result::Result<Vec<Account>, Error> {
        let mut accounts: Vec<_> = self.accounts.borrow().values().cloned().collect();
        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docuhaul_types::AccountClaims;
    use tempfile::tempdir;

    #[test]
    fn test_claims_survive_reopen() {
        let dir = tempdir().unwrap();
        {
            let repo = FileAccountRepository::open(dir.path().to_path_buf()).unwrap();
            let account = Account::new("u1".to_string(), "u1@example.com".to_string())
                .with_claims(AccountClaims { premium: true, admin: false });
            repo.save(&account).unwrap();
        }
        let repo = FileAccountRepository::open(dir.path().to_path_buf()).unwrap();
        let account = repo.find_by_id("u1").unwrap().unwrap();
        assert!(account.claims.premium);
        assert!(!account.claims.admin);
    }

    #[test]
    fn test_find_by_subscription() {
        let dir = tempdir().unwrap();
        let repo = FileAccountRepository::open(dir.path().to_path_buf()).unwrap();
        let mut account = Account::new("u1".to_string(), "u1@example.com".to_string());
        account.subscription_id = Some("sub_42".to_string());
        repo.save(&account).unwrap();
        repo.save(&Account::new("u2".to_string(), "u2@example.com".to_string()))
            .unwrap();

        let found = repo.find_by_subscription("sub_42").unwrap().unwrap();
        assert_eq!(found.id, "u1");
        assert!(repo.find_by_subscription("sub_0").unwrap().is_none());
        assert_eq!(repo.find_all().unwrap().len(), 2);
    }

    #[test]
    fn test_failed_write_keeps_previous_claims() {
        let dir = tempdir().unwrap();
        let repo = FileAccountRepository::open(dir.path().to_path_buf()).unwrap();
        let mut account = Account::new("u1".to_string(), "u1@example.com".to_string());
        repo.save(&account).unwrap();

        std::fs::create_dir(dir.path().join("accounts.json.tmp")).unwrap();
        account.claims.premium = true;
        assert!(repo.save(&account).is_err());
        assert!(!repo.find_by_id("u1").unwrap().unwrap().claims.premium);
    }
}
