//! Types shared between the database, API and domain layers.

pub mod election;
pub mod photo;
