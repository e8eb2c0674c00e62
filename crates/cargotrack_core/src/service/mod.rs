//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate filter, path and repository calls into use-case APIs.
//! - Keep FFI/CLI layers decoupled from storage details.

pub mod history_service;
pub mod sync_service;
pub mod tracking_service;
