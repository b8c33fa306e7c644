//! Web API module for Filebox.
//!
//! This module provides the REST API over the file store, the static
//! frontend and the OpenAPI documentation.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
