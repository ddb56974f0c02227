//! Beacon Core - report reshaping and aggregation.
//!
//! This crate holds everything Beacon does to upstream analytics data once it
//! has been fetched:
//! - [`report`] - report request and response wire types, metric parsing
//! - [`marketing`] - per-property marketing summaries (rankings, trend)
//! - [`consolidate`] - cross-property totals and merged rankings
//! - [`snapshot`] - the aggregate account snapshot document
//! - [`dashboard`] - the single-property dashboard payload
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no session access. The server crate fetches, this crate shapes.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod consolidate;
pub mod dashboard;
pub mod marketing;
pub mod report;
pub mod snapshot;
mod tally;
pub mod types;

pub use types::*;
