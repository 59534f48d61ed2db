use std::sync::Arc;

use mongodb::{error::Error as DbError, Client as MongoClient, Database};
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::code::DEFAULT_CODE_ATTEMPTS;
use crate::model::{
    mongodb::{ensure_indexes_exist, ensure_photo_id_counter_exists, Coll},
    store::{ElectionStore, MongoStore},
};
use crate::repository::DEFAULT_MUTATION_ATTEMPTS;
use crate::service::ElectionService;

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_code_attempts")]
    code_attempts: u32,
    #[serde(default = "default_mutation_attempts")]
    mutation_attempts: u32,
}

fn default_code_attempts() -> u32 {
    DEFAULT_CODE_ATTEMPTS
}

fn default_mutation_attempts() -> u32 {
    DEFAULT_MUTATION_ATTEMPTS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            code_attempts: DEFAULT_CODE_ATTEMPTS,
            mutation_attempts: DEFAULT_MUTATION_ATTEMPTS,
        }
    }
}

impl Config {
    /// How many random codes to try when creating an election.
    pub fn code_attempts(&self) -> u32 {
        self.code_attempts
    }

    /// How many times a conflicting read-modify-write is retried.
    pub fn mutation_attempts(&self) -> u32 {
        self.mutation_attempts
    }
}

/// A fairing that loads the application config and puts it in managed state.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        debug!("Loaded {config:?}");
        Ok(rocket.manage(config))
    }
}

/// Configuration for the database.
#[derive(Deserialize)]
pub struct DbConfig {
    db_uri: String,
    #[serde(default = "default_db_name")]
    db_name: String,
}

fn default_db_name() -> String {
    "elections".to_string()
}

/// Connect to the configured database, creating indexes and counters as needed.
pub async fn connect_database(config: &DbConfig) -> Result<Database, DbError> {
    let client = MongoClient::with_uri_str(&config.db_uri).await?;
    let db = client.database(&config.db_name);
    ensure_indexes_exist(&db).await?;
    ensure_photo_id_counter_exists(&Coll::from_db(&db)).await?;
    Ok(db)
}

/// Where the [`StorageFairing`] gets its store from.
enum Backend {
    Mongo,
    Provided(Arc<dyn ElectionStore>),
}

/// A fairing that sets up storage and places an [`ElectionService`] into
/// managed state. Must be attached after [`ConfigFairing`].
pub struct StorageFairing {
    backend: Backend,
}

impl StorageFairing {
    /// Connect to MongoDB using the `db_uri` and `db_name` config keys.
    pub fn mongodb() -> Self {
        Self {
            backend: Backend::Mongo,
        }
    }

    /// Use an already constructed store.
    pub fn with_store(store: Arc<dyn ElectionStore>) -> Self {
        Self {
            backend: Backend::Provided(store),
        }
    }
}

#[rocket::async_trait]
impl Fairing for StorageFairing {
    fn info(&self) -> Info {
        Info {
            name: "Storage",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let store: Arc<dyn ElectionStore> = match &self.backend {
            Backend::Provided(store) => store.clone(),
            Backend::Mongo => {
                let config = match rocket.figment().extract::<DbConfig>() {
                    Ok(config) => config,
                    Err(e) => {
                        error!("Failed to load database config");
                        rocket::config::pretty_print_error(e);
                        return Err(rocket);
                    }
                };
                info!("Loaded database config, connecting...");
                let db = match connect_database(&config).await {
                    Ok(db) => db,
                    Err(e) => {
                        error!("Failed to connect to database: {e}");
                        return Err(rocket);
                    }
                };
                info!("...database connection online!");
                Arc::new(MongoStore::new(&db))
            }
        };

        let service = match rocket.state::<Config>() {
            Some(config) => ElectionService::new(store, config),
            None => {
                error!("Storage set up before the application config was loaded");
                return Err(rocket);
            }
        };
        Ok(rocket.manage(service))
    }
}
