//! HTTP API layer: REST endpoints, error taxonomy, health probes, OpenAPI
//! document, and the realtime event stream

pub mod error;
pub mod events;
pub mod health;
pub mod openapi;
pub mod proposals;
pub mod rfps;
pub mod vendors;
pub mod webhooks;

pub use error::ApiError;
