use octane::InventoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Remote inventory error: {0}")]
    Inventory(#[from] InventoryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid scan path: {message}")]
    InvalidPath { message: String },
}

pub type DiscoveryResult<T> = Result<T, DiscoveryError>;
