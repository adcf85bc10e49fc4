#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
///
/// Defines [`error::IoError`] variants for file access and PNG encoding/decoding failures.
pub mod error;

/// Frame rate counter for video processing.
///
/// Track and measure frames per second (FPS) during stream processing.
pub mod fps_counter;

/// PNG image encoding and decoding.
///
/// Read RGB8 frames and write mono8 edge maps.
pub mod png;

/// Frame sources, display sinks and the frame-serial driving loop.
///
/// See [`stream::run_stream`] for the per-cycle contract.
pub mod stream;
