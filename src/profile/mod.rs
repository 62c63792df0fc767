//! Profile records, lightweight references, and the file-backed store.
//!
//! A profile is the unit of storage: a named aggregate of the four therapy
//! schedules. References are (name, storage key) pairs produced by listing,
//! cheap enough to enumerate without loading record bodies.

mod schema;
mod store;

pub use schema::{Profile, ProfileReference};
pub use store::{ProfileStore, default_store_dir};
