//! Frame sinks.
//!
//! Sinks consume composed frames in output order and are driven by the render pipeline.

/// `ffmpeg`-based video output via the system `ffmpeg` binary.
pub mod ffmpeg;
/// Numbered PNG files.
pub mod image_seq;
/// Generic frame sink trait and the in-memory sink.
pub mod sink;
