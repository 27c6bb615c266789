// === PUBLIC CONTRACT ===
// Plain records exchanged with the presentation layer and form adapters.
pub mod contract;

pub use contract::model;

// === CORE ===
// Session, domain operations, router and the ports they depend on.
pub mod domain;

pub use domain::error::DomainError;
pub use domain::ports::{
    Confirmer, KeyValueStorage, Notice, NoticeLevel, Notifier, RenderContext, Renderer,
};
pub use domain::router::{Navigation, Router, View};
pub use domain::service::{Service, ServiceConfig};
pub use domain::session::Session;

// === INFRASTRUCTURE ===
// Snapshot store and key-value storage backends.
pub mod infra;

pub use infra::notify::RecordingNotifier;
pub use infra::storage::file::JsonFileStorage;
pub use infra::storage::memory::InMemoryStorage;
pub use infra::storage::snapshot::{Store, StoreKeys};
