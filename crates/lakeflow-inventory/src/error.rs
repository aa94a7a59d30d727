//! Inventory error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Host variable template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Invalid host name '{0}': must not contain whitespace")]
    InvalidHostName(String),
}

pub type Result<T> = std::result::Result<T, InventoryError>;
