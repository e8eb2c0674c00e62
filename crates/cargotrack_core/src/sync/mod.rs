//! Remote document-store upload seam.
//!
//! # Responsibility
//! - Describe when the periodic upload job may run.
//! - Abstract the vendor document store behind a small sink trait.
//!
//! # Invariants
//! - Core never talks to the vendor store directly; hosts plug in a sink.

pub mod policy;
pub mod sink;
