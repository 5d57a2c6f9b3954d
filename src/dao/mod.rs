//! Persistence layer: quiz store abstraction and entities.

/// Database model definitions.
pub mod models;
/// Quiz and result storage operations.
pub mod quiz_store;
/// Storage abstraction layer for backend errors.
pub mod storage;
