//! HTTP middleware components.

/// Cross-origin policy for the browser client
pub mod cors;
