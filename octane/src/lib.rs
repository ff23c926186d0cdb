pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use api::{InventoryApi, TestScope};
pub use client::OctaneClient;
pub use config::OctaneConfig;
pub use error::{InventoryError, InventoryResult};
pub use types::{
    ChangeType, DataTableChange, DataTableRecord, RenamePair, TestChange, TestRecord,
};
