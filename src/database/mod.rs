pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod resource;
pub mod seed;
pub mod store;

pub use manager::DatabaseManager;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use resource::{Resource, SqlParam};
pub use store::{MutationError, Page, Store, StoreError, Upserted};
