//! Request-scoped models.

pub mod session;

pub use session::{DashboardSession, keys as session_keys};
