//! Opaque identifier generation for stored blobs.
//!
//! Identifiers are generated server-side (UUID v4, hyphenated) rather than
//! delegated to the metadata index. Generation is infallible; collisions are
//! negligible at 122 bits of randomness.

use uuid::Uuid;

/// Produce a fresh opaque identifier.
pub fn generate() -> String {
    Uuid::new_v4().to_string()
}
