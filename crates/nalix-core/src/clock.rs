//! Clock and randomness abstraction, decoupling timestamps and entropy
//! from the system so connection logic can be exercised deterministically
//! in tests.

use std::time::{Duration, Instant};

/// Source of time and randomness for the rest of the crate.
///
/// Production code uses [`SystemClock`]; tests can substitute a fixed or
/// stepped implementation without touching connection or pool logic.
pub trait Clock: Clone + Send + Sync + 'static {
    /// Monotonic instant, used for RTT and idle-timeout accounting.
    ///
    /// Must never go backwards within a single process.
    fn monotonic(&self) -> Instant;

    /// Wall-clock time, milliseconds since the Unix epoch, used in
    /// [`nalix_proto::families::control::ControlPacket::unix_millis`].
    fn unix_millis(&self) -> i64;

    /// Fill `buffer` with bytes suitable for nonces and connection ids.
    ///
    /// Production implementations must use a cryptographically secure
    /// source; this is not a requirement for deterministic test clocks.
    fn fill_random(&self, buffer: &mut [u8]);

    /// Convenience wrapper generating a random `u64`, used for connection
    /// and sequence identifiers.
    fn random_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        self.fill_random(&mut bytes);
        u64::from_le_bytes(bytes)
    }
}

/// Production [`Clock`] backed by the OS clock and a cryptographic RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Construct a new system clock.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    #[allow(clippy::disallowed_methods)]
    fn monotonic(&self) -> Instant {
        Instant::now()
    }

    #[allow(clippy::disallowed_methods, clippy::expect_used)]
    fn unix_millis(&self) -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system clock is after the Unix epoch")
            .as_millis() as i64
    }

    #[allow(clippy::expect_used)]
    fn fill_random(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer).expect("OS RNG is unavailable");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_never_goes_backwards() {
        let clock = SystemClock::new();
        let first = clock.monotonic();
        let second = clock.monotonic();
        assert!(second >= first);
    }

    #[test]
    fn random_bytes_are_not_all_zero() {
        let clock = SystemClock::new();
        let mut buffer = [0u8; 32];
        clock.fill_random(&mut buffer);
        assert!(buffer.iter().any(|&b| b != 0));
    }

    #[test]
    fn duration_since_is_nonnegative() {
        let clock = SystemClock::new();
        let start = clock.monotonic();
        let elapsed: Duration = clock.monotonic() - start;
        assert!(elapsed >= Duration::ZERO);
    }
}
