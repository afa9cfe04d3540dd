pub mod config;
pub mod error;
pub mod headers;
pub mod pagination;
pub mod routing;
pub mod tracing;
pub mod types;
