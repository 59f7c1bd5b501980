//! Frame sinks.

/// MP4 output through the system `ffmpeg`.
pub mod ffmpeg;
/// Sink trait and the in-memory sink.
pub mod sink;
