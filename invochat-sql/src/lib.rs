mod csv;
mod error;
mod executor;
mod guard;
mod rewrite;

pub use csv::to_csv;
pub use error::SqlError;
pub use executor::{QueryExecutor, QueryOutput};
pub use guard::{check_read_only, SqlGuardError};
pub use rewrite::rewrite_similarity;
