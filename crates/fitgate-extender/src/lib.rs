//! Fitgate Extender - HTTP transport for the kube-scheduler extender protocol
//!
//! This crate provides:
//! - Axum-based HTTP server exposing the filter verb
//! - ExtenderArgs / ExtenderFilterResult wire types
//! - Request validation ahead of the filter service
//! - Optional TLS (provided PEM files or a self-signed certificate)

pub mod error;
pub mod handlers;
pub mod server;
pub mod state;
pub mod tls;
pub mod validation;
pub mod wire;

// Re-export commonly used types
pub use error::{ApiError, Result};
pub use handlers::filter_args;
pub use server::{Config, ExtenderServer};
pub use state::AppState;
pub use tls::TlsMode;
pub use wire::{ExtenderArgs, ExtenderFilterResult, NodeList};
