use thiserror::Error;

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Remote API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Not found: {what}")]
    NotFound { what: String },
}

pub type InventoryResult<T> = Result<T, InventoryError>;
