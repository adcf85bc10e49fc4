//! Filter operations
//!
//! This module provides the 3x3 Sobel gradient used by the strip workers.

/// Filter kernels
pub mod kernels;

/// Sobel gradient magnitude
mod sobel;
pub use sobel::*;
