//! The mongodb crate doesn't provide error code constants.
//! This module fills in the ones we rely on.

use mongodb::error::{Error as DbError, ErrorKind, WriteFailure};

/// Server error code for a unique index (including `_id`) violation.
pub const DUPLICATE_KEY: i32 = 11000;

/// Return true if the given error is a duplicate key write error.
pub fn is_duplicate_key_error(err: &DbError) -> bool {
    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref e)) if e.code == DUPLICATE_KEY
    )
}
