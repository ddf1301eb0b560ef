//! # pulse-entity
//!
//! Domain entity models for Pulse. Every struct in this crate represents a
//! database table row or a domain value object. Database entities derive
//! `sqlx::FromRow`.

pub mod content;
pub mod discovery;
pub mod job;
pub mod subject;
