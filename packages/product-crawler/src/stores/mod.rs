//! URL store implementations.

pub mod memory;
pub mod postgres;

pub use memory::MemoryUrlStore;
pub use postgres::PostgresUrlStore;
