//! Persisted draft entities
//!
//! The whole collection is stored as a JSON array of [`Draft`] records; the
//! wire format uses camelCase field names and millisecond-integer
//! timestamps so it matches what browser hosts already persist.

pub mod draft;
pub mod metadata;
pub mod version;

pub use draft::{Draft, title_from_form_data};
pub use metadata::{DRAFT_SCHEMA_VERSION, DraftMetadata};
pub use version::{DraftVersion, NavigationState};
