#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color transformations module.
pub mod color;

/// Error types for the strip pipeline.
pub mod error;

/// image filtering module.
pub mod filter;

/// module containing the per-strip worker and the thread coordinator.
pub mod parallel;

/// frame-level edge detection entry point.
pub mod pipeline;

/// frame partitioning into overlapping strips and reassembly.
pub mod strip;

pub use crate::error::StripError;
pub use crate::pipeline::StripSobel;
