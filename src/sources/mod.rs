//! Quote table and music collection adapters.

/// Music collections.
pub mod music;
/// Quote tables.
pub mod quotes;
