//! Server shell: wires CLI args into a [`ServerConfig`], bootstraps the
//! registry and pools, and drives the TCP accept loop that hands each
//! connection to a [`Dispatcher`] (here, a minimal logging one).
//!
//! Concrete handler/routing logic, firewalling, rate limiting and TLS
//! termination are out of scope — this crate only proves the seam.

pub mod config;
pub mod dispatcher;
pub mod server;

pub use config::{Args, ConfigError, ServerConfig};
pub use dispatcher::LoggingDispatcher;
pub use server::{Server, ServerError};
