//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in a DB-friendly way, e.g.:
//!
//! - datetimes are serialised in MongoDB's own format;
//! - the election code doubles as the primary key, so uniqueness is enforced by the store.

pub mod election;
pub mod photo;
