pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod flows;
pub mod models;
pub mod referral;
pub mod routes;
pub mod session;
pub mod storage;
pub mod store;
pub mod telemetry;

pub use api::ApiClient;
pub use config::AppConfig;
pub use error::{AccessError, ApiError, StorageError, StoreError, ValidationError};
pub use models::Role;
pub use routes::Route;
pub use session::Session;
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::LocalStore;
