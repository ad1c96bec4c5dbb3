//! # TodoFlow API Server Library
//!
//! HTTP surface for the TodoFlow todo service.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder and auth layer
//! - `config`: Configuration from environment variables
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Query and path extractors with JSON rejections
//! - `routes`: Route handlers (health, todos, change stream)

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
