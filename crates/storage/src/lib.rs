#![forbid(unsafe_code)]

pub mod repository;
pub mod seed;
pub mod session_store;
pub mod sqlite;

pub use repository::{ProgressRepository, Storage, StorageError, UserRepository};
pub use seed::{SeedReport, seed_defaults};
pub use session_store::{FileSessionStore, InMemorySessionStore, SessionStore};
