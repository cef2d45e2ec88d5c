// ResourceStore - Generic in-memory CRUD store with an HTTP front end

pub mod config;
pub mod error;
pub mod filter;
pub mod http;
pub mod id;
pub mod models;
pub mod record;
pub mod store;

// Re-export main types for convenience
pub use config::{Config, PutMode, ResourceConfig, ResourcesConfig};
pub use error::{Result, StoreError};
pub use filter::Filter;
pub use http::{Stores, build_router, cors_layer};
pub use id::{IdGenerator, IdPolicy};
pub use models::{BlogPost, Fruit, Task};
pub use record::{Record, RecordId, Validate};
pub use store::Store;
