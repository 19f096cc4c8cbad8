//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Own in-memory member state and its invalidation rules.

pub mod member_service;
