//! Core types for Beacon.
//!
//! This module provides type-safe wrappers for upstream identifiers.

pub mod id;

pub use id::*;
