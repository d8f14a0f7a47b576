//! Profile document stores.

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use in_memory::InMemoryProfileStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresProfileStore;
