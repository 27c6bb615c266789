use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::contract::model::{Account, Collections, Department, Role};
use crate::domain::ports::{KeyValueStorage, Notice, Notifier};
use crate::infra::storage::entity::SnapshotDocument;
use crate::infra::storage::mapper::{collections_to_document, document_to_collections};

/// Names of the persisted slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreKeys {
    /// Whole-store snapshot document.
    pub snapshot: String,
    /// Remembered identity (an account email).
    pub session: String,
    /// Most recent registration awaiting verification.
    pub unverified: String,
}

impl Default for StoreKeys {
    fn default() -> Self {
        Self {
            snapshot: "ipt_demo_v1".to_string(),
            session: "auth_token".to_string(),
            unverified: "unverified_email".to_string(),
        }
    }
}

/// Owner of the canonical collections and of the storage slots they persist to.
///
/// Load and save are all-or-nothing over the whole snapshot and never fail the caller:
/// errors are logged and surfaced as a danger notice, and the in-memory state is kept.
pub struct Store {
    storage: Box<dyn KeyValueStorage>,
    keys: StoreKeys,
    collections: Collections,
    notifier: Arc<dyn Notifier>,
}

impl Store {
    /// A store with empty collections; nothing is read until [`Store::load`].
    pub fn new(
        storage: Box<dyn KeyValueStorage>,
        keys: StoreKeys,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            storage,
            keys,
            collections: Collections::default(),
            notifier,
        }
    }

    /// Construct and load in one step (process start).
    pub fn open(
        storage: Box<dyn KeyValueStorage>,
        keys: StoreKeys,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let mut store = Self::new(storage, keys, notifier);
        store.load();
        store
    }

    /// Fixed initial data used when no snapshot exists.
    pub fn seed() -> Collections {
        Collections {
            accounts: vec![Account {
                first_name: "Admin".to_string(),
                last_name: "User".to_string(),
                email: "admin@example.com".to_string(),
                password: "Password123!".to_string(),
                role: Role::Admin,
                verified: true,
            }],
            departments: vec![
                Department {
                    id: 1,
                    name: "Engineering".to_string(),
                    description: "Software team".to_string(),
                },
                Department {
                    id: 2,
                    name: "HR".to_string(),
                    description: "Human Resources".to_string(),
                },
            ],
            employees: Vec::new(),
            requests: Vec::new(),
        }
    }

    #[instrument(name = "hr_portal.store.load", skip(self), fields(key = %self.keys.snapshot))]
    pub fn load(&mut self) {
        let raw = match self.storage.get(&self.keys.snapshot) {
            Ok(raw) => raw,
            Err(e) => {
                self.load_failed(e);
                return;
            }
        };

        match raw {
            Some(raw) => {
                let decoded = serde_json::from_str::<SnapshotDocument>(&raw)
                    .map_err(anyhow::Error::from)
                    .and_then(document_to_collections);
                match decoded {
                    Ok(collections) => {
                        debug!(
                            accounts = collections.accounts.len(),
                            employees = collections.employees.len(),
                            requests = collections.requests.len(),
                            "snapshot loaded"
                        );
                        self.collections = collections;
                    }
                    Err(e) => self.load_failed(e),
                }
            }
            None => {
                info!("no snapshot found, seeding initial data");
                self.collections = Self::seed();
                self.save();
            }
        }
    }

    /// Serialize everything and write it as one unit. Returns whether the write landed.
    #[instrument(name = "hr_portal.store.save", skip(self), fields(key = %self.keys.snapshot))]
    pub fn save(&mut self) -> bool {
        let doc = collections_to_document(&self.collections);
        let result = serde_json::to_string(&doc)
            .map_err(anyhow::Error::from)
            .and_then(|json| self.storage.set(&self.keys.snapshot, &json));

        match result {
            Ok(()) => {
                debug!("snapshot saved");
                true
            }
            Err(e) => {
                error!(error = %format!("{e:#}"), "Error saving to storage");
                self.notifier.notify(Notice::danger("Error saving data"));
                false
            }
        }
    }

    fn load_failed(&self, e: anyhow::Error) {
        error!(error = %format!("{e:#}"), "Error loading from storage");
        self.notifier.notify(Notice::danger("Error loading data"));
    }

    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    pub(crate) fn collections_mut(&mut self) -> &mut Collections {
        &mut self.collections
    }

    pub(crate) fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }

    // --- auxiliary slots ---

    pub fn session_token(&self) -> Option<String> {
        self.read_slot(&self.keys.session)
    }

    pub fn set_session_token(&mut self, email: &str) {
        let key = self.keys.session.clone();
        self.write_slot(&key, Some(email));
    }

    pub fn clear_session_token(&mut self) {
        let key = self.keys.session.clone();
        self.write_slot(&key, None);
    }

    pub fn pending_verification(&self) -> Option<String> {
        self.read_slot(&self.keys.unverified)
    }

    pub fn set_pending_verification(&mut self, email: &str) {
        let key = self.keys.unverified.clone();
        self.write_slot(&key, Some(email));
    }

    pub fn clear_pending_verification(&mut self) {
        let key = self.keys.unverified.clone();
        self.write_slot(&key, None);
    }

    fn read_slot(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(v) => v.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(key, error = %e, "cannot read storage slot");
                None
            }
        }
    }

    fn write_slot(&mut self, key: &str, value: Option<&str>) {
        let result = match value {
            Some(v) => self.storage.set(key, v),
            None => self.storage.remove(key),
        };
        if let Err(e) = result {
            warn!(key, error = %e, "cannot write storage slot");
        }
    }
}
