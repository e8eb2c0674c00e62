//! Flutter-facing bindings for the CargoTrack core.

pub mod api;
