//! Hostel Manager - backend for hostel administration.
//!
//! Hostels and their room type templates, room inventory, the room
//! request and allocation workflow, complaints, leave requests, payments
//! and in-app notifications.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Entities and lifecycle rules
//! - **services**: Use cases over the unit of work
//! - **infra**: Database, Redis, repositories
//! - **api**: HTTP handlers, middleware, and routes
//! - **client**: Typed HTTP client for the allocation endpoints
//! - **jobs**: Background notification jobs
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! hostel-manager serve
//!
//! # Run migrations
//! hostel-manager migrate up
//!
//! # Approve a room request through the API
//! hostel-manager requests --token $TOKEN approve <REQUEST_ID> --room-id <ROOM_ID>
//! ```

pub mod api;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod jobs;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Room, RoomRequest, User, UserRole};
pub use errors::{AppError, AppResult};
pub use infra::Cache;
