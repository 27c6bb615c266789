use tracing::{debug, info, instrument};

use crate::contract::model::Account;
use crate::domain::error::DomainError;
use crate::infra::storage::snapshot::Store;

/// The current authenticated identity.
///
/// Only the identity's email is held; the account itself is looked up in the
/// [`Store`] on every access, so role or name edits take effect immediately and a
/// removed account reads as logged out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    current: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the session from the persisted token (process start).
    pub fn restore(store: &mut Store) -> Self {
        let mut session = Self::new();
        session.restore_from(store);
        session
    }

    /// Adopt the persisted token if it still names a verified account; otherwise drop
    /// the stale token.
    #[instrument(name = "hr_portal.session.restore", skip_all)]
    pub fn restore_from(&mut self, store: &mut Store) {
        let Some(token) = store.session_token() else {
            return;
        };
        let email = store
            .collections()
            .account(&token)
            .filter(|a| a.verified)
            .map(|a| a.email.clone());
        match email {
            Some(email) => {
                debug!(email = %email, "session restored");
                self.current = Some(email);
            }
            None => {
                debug!(token = %token, "stale session token cleared");
                self.current = None;
                store.clear_session_token();
            }
        }
    }

    /// Log in with a case-folded email, exact password and a verified account.
    #[instrument(name = "hr_portal.session.authenticate", skip(self, store, password))]
    pub fn authenticate(
        &mut self,
        store: &mut Store,
        email: &str,
        password: &str,
    ) -> Result<Account, DomainError> {
        let wanted = email.trim().to_lowercase();
        let account = store
            .collections()
            .accounts
            .iter()
            .find(|a| a.email.to_lowercase() == wanted && a.password == password && a.verified)
            .cloned()
            .ok_or(DomainError::InvalidCredentials)?;

        store.set_session_token(&account.email);
        self.current = Some(account.email.clone());
        info!("Login successful");
        Ok(account)
    }

    /// Drop the identity and the persisted token.
    pub fn clear(&mut self, store: &mut Store) {
        self.current = None;
        store.clear_session_token();
    }

    pub fn current<'a>(&self, store: &'a Store) -> Option<&'a Account> {
        self.current
            .as_deref()
            .and_then(|email| store.collections().account(email))
    }

    pub fn is_authenticated(&self, store: &Store) -> bool {
        self.current(store).is_some()
    }

    pub fn is_admin(&self, store: &Store) -> bool {
        self.current(store).is_some_and(Account::is_admin)
    }

    /// Follow an edit of the current identity's email.
    pub(crate) fn rekey(&mut self, from: &str, to: &str) {
        if self
            .current
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(from))
        {
            self.current = Some(to.to_string());
        }
    }
}
