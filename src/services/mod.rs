//! Service clients: credential authority, blob store, metadata index,
//! identifier generation. Constructed once at startup and injected into the
//! router state; each is cheap to clone and safe for concurrent use.

pub mod auth;
pub mod ids;
pub mod index;
pub mod store;
