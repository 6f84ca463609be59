//! Shared application state injected into all handlers.

use crate::services::{auth::AuthClient, index::MetadataIndex, store::ObjectStore};

/// Long-lived service clients, constructed once at startup.
///
/// Cloning is cheap (each client is a handle) and every field is safe for
/// concurrent use by many simultaneous requests.
#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: AuthClient,
    pub store: ObjectStore,
    pub index: MetadataIndex,
}

impl AppState {
    pub fn new(auth: AuthClient, store: ObjectStore, index: MetadataIndex) -> Self {
        Self { auth, store, index }
    }
}
