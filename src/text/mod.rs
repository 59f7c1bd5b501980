//! Text layout and rasterization.
//!
//! Wrapping and placement are pure functions over a width measure. [`engine::TextEngine`] supplies
//! the measure through Parley shaping and draws the placed lines with `vello_cpu`.

/// Parley shaping and `vello_cpu` glyph rasterization.
pub mod engine;
/// Font resolution with system fallback.
pub mod font;
/// Greedy wrap and margin-clamped placement.
pub mod layout;
