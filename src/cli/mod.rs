//! CLI module - Command-line interface for the application.
//!
//! - `serve` - Start the HTTP server
//! - `migrate` - Database migrations
//! - `jobs` - Background job management
//! - `requests` - Approve or cancel room requests over HTTP

pub mod args;

pub use args::{Cli, Commands};
