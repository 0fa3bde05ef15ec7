//! Error types for Phi Junior.
//!
//! None of these are fatal: the controller either recovers with a default or
//! waits in a safe phase.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Catalog load failed: {0}")]
    CatalogLoad(String),

    #[error("Insufficient catalog: {0}")]
    InsufficientCatalog(String),

    #[error("Saved session is corrupt: {0}")]
    PersistenceCorrupt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
