//! Durable storage backends

pub mod sqlite;

pub use sqlite::SqliteVectorStore;
