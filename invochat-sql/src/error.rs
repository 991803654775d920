use thiserror::Error;

use crate::guard::SqlGuardError;

#[derive(Debug, Error)]
pub enum SqlError {
    #[error(transparent)]
    Guard(#[from] SqlGuardError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
