mod config;
mod routes;
mod session;
mod store;

pub use config::ServerConfig;
pub use routes::{router, AppState};
pub use session::{InMemorySessionStore, SessionStore};
pub use store::FsObjectStore;
