//! Flutter-facing bindings over `tasktime_core`.

pub mod api;
