//! Field persistence: Postgres primary, in-process cache fallback

pub mod cache;
pub mod field_store;

pub use cache::LocalCache;
pub use field_store::FieldStore;
