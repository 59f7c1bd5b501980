//! Text effects: premultiplied compositing, resampled copies and the fade timeline.

/// Premultiplied source-over.
pub mod composite;
/// Effect stacks, glow and opacity timeline.
pub mod compositor;
/// Resampled copies used by the blur effects.
pub mod scale;
