// REST client for the instance-manager backend
pub mod auth;
pub mod client;
pub mod error;
pub mod images;
pub mod instances;
pub mod normalize;
pub mod servers;

pub use client::{ApiClient, ApiResponse};
pub use error::{status_phrase, ApiError, ErrorPayload};
pub use instances::InstanceBackend;
pub use normalize::normalize_collection;
