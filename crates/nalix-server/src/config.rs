//! Server shell configuration, constructed from `clap`-parsed CLI args
//! in `main`. No INI/file-based binding — that collaborator is out of
//! scope for this shell.

use std::net::SocketAddr;

use clap::Parser;

use nalix_core::buffer_pool::{DEFAULT_CLASS_CAPACITY, DEFAULT_MAX_CLASS, DEFAULT_MIN_CLASS};

/// CLI arguments for the Nalix server shell.
#[derive(Parser, Debug)]
#[command(name = "nalix-server")]
#[command(about = "Nalix connection-oriented messaging subsystem server")]
#[command(version)]
pub struct Args {
    /// TCP address to accept connections on.
    #[arg(short, long, default_value = "0.0.0.0:7878")]
    pub bind: String,

    /// Open a UDP transport alongside each accepted TCP connection,
    /// bound to the same peer address.
    #[arg(long, default_value_t = false)]
    pub enable_udp: bool,

    /// Smallest buffer pool size class, in bytes.
    #[arg(long, default_value_t = DEFAULT_MIN_CLASS)]
    pub min_buffer_class: usize,

    /// Largest buffer pool size class, in bytes. Also the cap on any
    /// single accepted frame.
    #[arg(long, default_value_t = DEFAULT_MAX_CLASS)]
    pub max_buffer_class: usize,

    /// Buffers cached per size class before renting falls back to a
    /// fresh allocation.
    #[arg(long, default_value_t = DEFAULT_CLASS_CAPACITY)]
    pub buffer_class_capacity: usize,

    /// Log level passed to `tracing-subscriber` when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Resolved server configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP address to accept connections on.
    pub bind: SocketAddr,
    /// Whether to open a UDP transport per accepted connection.
    pub enable_udp: bool,
    /// Smallest buffer pool size class, in bytes.
    pub min_buffer_class: usize,
    /// Largest buffer pool size class, in bytes; also the maximum
    /// accepted frame size.
    pub max_buffer_class: usize,
    /// Buffers cached per size class.
    pub buffer_class_capacity: usize,
    /// Log level used when `RUST_LOG` is unset.
    pub log_level: String,
}

/// Errors building a [`ServerConfig`] from parsed CLI args.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The `--bind` argument did not parse as a socket address.
    #[error("invalid bind address {0:?}: {1}")]
    InvalidBindAddress(String, std::net::AddrParseError),
}

impl TryFrom<Args> for ServerConfig {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let bind = args
            .bind
            .parse()
            .map_err(|e| ConfigError::InvalidBindAddress(args.bind.clone(), e))?;
        Ok(Self {
            bind,
            enable_udp: args.enable_udp,
            min_buffer_class: args.min_buffer_class,
            max_buffer_class: args.max_buffer_class,
            buffer_class_capacity: args.buffer_class_capacity,
            log_level: args.log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_bind_address_parses() {
        let args = Args {
            bind: "127.0.0.1:9000".to_string(),
            enable_udp: false,
            min_buffer_class: 256,
            max_buffer_class: 1024,
            buffer_class_capacity: 4,
            log_level: "info".to_string(),
        };
        let config = ServerConfig::try_from(args).expect("valid address");
        assert_eq!(config.bind, "127.0.0.1:9000".parse().unwrap());
    }

    #[test]
    fn invalid_bind_address_is_rejected() {
        let args = Args {
            bind: "not-an-address".to_string(),
            enable_udp: false,
            min_buffer_class: 256,
            max_buffer_class: 1024,
            buffer_class_capacity: 4,
            log_level: "info".to_string(),
        };
        assert!(ServerConfig::try_from(args).is_err());
    }
}
