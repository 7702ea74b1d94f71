//! Time abstraction traits for platform-agnostic timing operations.
//!
//! This module provides the `TimeSource` trait that abstracts over the
//! monotonic millisecond tick of the target (e.g. the board's `millis()`
//! counter) so that duty-cycle and retry timing can be tested on the host.

use core::cell::Cell;

/// Monotonic millisecond clock.
///
/// The counter is 32 bits wide and wraps after ~49.7 days. All elapsed-time
/// comparisons must go through [`TimeSource::elapsed_since`], which uses
/// wrapping subtraction and therefore stays correct across the wrap.
///
/// # Example
///
/// ```
/// use geotrack_core::traits::{MockTime, TimeSource};
///
/// fn interval_elapsed<T: TimeSource>(time: &T, last_ms: u32, interval_ms: u32) -> bool {
///     time.elapsed_since(last_ms) >= interval_ms
/// }
///
/// let time = MockTime::new();
/// time.advance(60_000);
/// assert!(interval_elapsed(&time, 0, 60_000));
/// ```
pub trait TimeSource {
    /// Returns current time in milliseconds since system start.
    fn now_ms(&self) -> u32;

    /// Returns milliseconds elapsed since `reference_ms`.
    ///
    /// Uses wrapping subtraction to handle counter overflow.
    fn elapsed_since(&self, reference_ms: u32) -> u32 {
        self.now_ms().wrapping_sub(reference_ms)
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Mock time source for testing with controllable time advancement.
///
/// Components take their clock by value; pass `&MockTime` so the test keeps a
/// handle it can advance while the component owns the reference.
///
/// # Example
///
/// ```
/// use geotrack_core::traits::{MockTime, TimeSource};
///
/// let time = MockTime::new();
/// assert_eq!(time.now_ms(), 0);
///
/// time.advance(1500);
/// assert_eq!(time.now_ms(), 1500);
/// ```
#[derive(Debug, Default)]
pub struct MockTime {
    current_ms: Cell<u32>,
}

impl MockTime {
    /// Creates a new `MockTime` starting at time 0.
    pub fn new() -> Self {
        Self {
            current_ms: Cell::new(0),
        }
    }

    /// Creates a new `MockTime` starting at the specified time.
    pub fn with_initial(ms: u32) -> Self {
        Self {
            current_ms: Cell::new(ms),
        }
    }

    /// Sets the current time to an absolute value.
    pub fn set(&self, ms: u32) {
        self.current_ms.set(ms);
    }

    /// Advances the current time, wrapping like the hardware counter.
    pub fn advance(&self, ms: u32) {
        self.current_ms.set(self.current_ms.get().wrapping_add(ms));
    }
}

impl TimeSource for MockTime {
    fn now_ms(&self) -> u32 {
        self.current_ms.get()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_time_initial_value() {
        let time = MockTime::new();
        assert_eq!(time.now_ms(), 0);
    }

    #[test]
    fn mock_time_with_initial() {
        let time = MockTime::with_initial(5_000);
        assert_eq!(time.now_ms(), 5_000);
    }

    #[test]
    fn mock_time_set_and_advance() {
        let time = MockTime::new();
        time.set(1_000);
        time.advance(500);
        assert_eq!(time.now_ms(), 1_500);
    }

    #[test]
    fn elapsed_since_survives_wraparound() {
        let time = MockTime::with_initial(u32::MAX - 99);
        let reference = time.now_ms();

        time.advance(250);
        assert_eq!(time.now_ms(), 150);
        assert_eq!(time.elapsed_since(reference), 250);
    }

    #[test]
    fn reference_forwards_to_inner_clock() {
        let time = MockTime::new();
        let by_ref = &time;
        time.advance(42);
        assert_eq!(by_ref.now_ms(), 42);
        assert_eq!(by_ref.elapsed_since(2), 40);
    }
}
