//! Cryptographic primitives consumed by the Nalix transformer pipeline.
//!
//! Every function here is pure and free of I/O: callers (the transform
//! pipeline wired up in `nalix-net`) own pool rental, flag-bit mutation
//! and wire placement. This crate only turns bytes into other bytes.

pub mod chacha;
pub mod compress;
pub mod error;
pub mod kdf;
pub mod signing;
pub mod xtea;

pub use error::{CryptoError, Result};
