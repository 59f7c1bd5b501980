//! Soundtrack preparation: decode, fit to the video length, fade out.

/// Decode and shape one music track.
pub mod track;
