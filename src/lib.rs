#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use std::sync::Arc;

use rocket::{Build, Rocket};

use crate::config::{ConfigFairing, StorageFairing};
use crate::logging::LoggerFairing;
use crate::model::store::ElectionStore;

pub mod api;
pub mod code;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod photo;
pub mod repository;
pub mod retention;
pub mod service;
pub mod view;
pub mod voting;

/// Build a server backed by the MongoDB instance named in the config.
pub fn build() -> Rocket<Build> {
    assemble(StorageFairing::mongodb())
}

/// Build a server backed by an existing store.
pub fn build_with_store(store: Arc<dyn ElectionStore>) -> Rocket<Build> {
    assemble(StorageFairing::with_store(store))
}

fn assemble(storage: StorageFairing) -> Rocket<Build> {
    rocket::build()
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(storage)
        .mount("/", api::routes())
}
