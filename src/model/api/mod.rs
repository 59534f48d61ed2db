//! API-compatible (e.g. de/serialisable) types.
//!
//! Field names follow the camelCase convention the web client uses.

pub mod election;
