//! Platform abstraction layer
//!
//! Board-facing interfaces the tracker needs beyond the radio: currently the
//! Flash used for session persistence.

pub mod error;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{FlashError, PlatformError, Result};
pub use traits::FlashInterface;
