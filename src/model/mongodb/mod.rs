mod collection;
mod counter;
mod errors;

pub use collection::{ensure_indexes_exist, Coll, MongoCollection};
pub use counter::{ensure_photo_id_counter_exists, Counter, PHOTO_ID_COUNTER_ID};
pub use errors::is_duplicate_key_error;
