//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and rollups into use-case level APIs.
//! - Keep presentation/FFI layers decoupled from storage details.

pub mod error;
pub mod tracker_service;
pub mod view_refresh;
