mod email;
mod export;
mod sql;

pub use email::SendEmailTool;
pub use export::SqlExportTool;
pub use sql::SqlQueryTool;
