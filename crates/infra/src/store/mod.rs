//! Store adapters implementing the domain's repository ports.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
