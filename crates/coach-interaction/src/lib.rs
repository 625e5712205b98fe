//! Network adapters for the mentor backend.

pub mod http_gateway;

pub use http_gateway::HttpBackendGateway;
