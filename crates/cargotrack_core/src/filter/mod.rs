//! Raw sample admission checks.
//!
//! # Responsibility
//! - Decide whether a provider sample is trustworthy enough to use.
//!
//! # Invariants
//! - Filtering is pure and stateless; accepted samples are never modified.

pub mod sample_filter;
