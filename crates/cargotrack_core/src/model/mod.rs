//! Location tracking domain model.
//!
//! # Responsibility
//! - Define the canonical sample record shared by filter, path and storage.
//! - Keep the remote document projection next to the local record.
//!
//! # Invariants
//! - Every persisted sample is identified by a stable `LocationId`.

pub mod sample;
