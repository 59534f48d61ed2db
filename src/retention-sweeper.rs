//! Deletes elections nobody has used for a day. Run periodically, e.g. from cron.

use std::sync::Arc;

use elections_backend::{
    config::{connect_database, DbConfig},
    model::store::MongoStore,
    repository::ElectionRepository,
    retention::RetentionSweeper,
};
use log::{error, info};
use mongodb::error::Error as DbError;
use thiserror::Error;

#[derive(Debug, Error)]
enum Error {
    #[error("Failed to load database config: {0}")]
    Config(#[from] rocket::figment::Error),
    #[error("Failed to contact database: {0}")]
    Db(#[from] DbError),
    #[error(transparent)]
    Sweep(#[from] elections_backend::error::Error),
}

async fn run() -> Result<usize, Error> {
    let config: DbConfig = rocket::Config::figment().extract()?;
    let db = connect_database(&config).await?;
    let repository = ElectionRepository::new(Arc::new(MongoStore::new(&db)));
    let deleted = RetentionSweeper::new(repository).sweep().await?;
    Ok(deleted)
}

#[rocket::main]
async fn main() {
    log4rs::init_file("log4rs.yaml", log4rs_dynamic_filters::default_deserializers())
        .expect("Failed to initialise logging");

    match run().await {
        Ok(deleted) => info!("Sweep complete, {deleted} stale elections removed"),
        Err(err) => {
            error!("{err}");
            std::process::exit(1)
        }
    }
}
