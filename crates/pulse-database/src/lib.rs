//! # pulse-database
//!
//! PostgreSQL database connection management and concrete repository
//! implementations for the AI job queue and the content it enriches.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
