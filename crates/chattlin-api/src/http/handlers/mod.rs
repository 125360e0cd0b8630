//! HTTP request handlers for the REST API.

pub mod analytics;
pub mod health;
pub mod relay;
pub mod version;
