//! Infrastructure layer: persistence adapters and seeding.

pub mod seed;
pub mod store;

pub use seed::{seed_demo_data, DemoAccounts};
pub use store::{InMemoryStore, PostgresStore};
