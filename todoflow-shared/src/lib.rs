//! # TodoFlow Shared Library
//!
//! This crate contains the domain types and business logic behind the
//! TodoFlow API server.
//!
//! ## Module Organization
//!
//! - `models`: Todo record, priority and stats snapshot
//! - `auth`: Session tokens, auth context and the ownership guard
//! - `db`: PostgreSQL pool and migrations
//! - `store`: Storage trait with Postgres and in-memory backends
//! - `events`: Per-owner change notifications
//! - `filter`: Search/status/priority view filter
//! - `service`: The todo operations (list, create, toggle, update, delete, stats)

pub mod auth;
pub mod db;
pub mod events;
pub mod filter;
pub mod models;
pub mod service;
pub mod store;

/// Current version of the TodoFlow shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
