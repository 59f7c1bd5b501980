//! Rotation cursors: persistence, selection and the weekly reset.

/// Round-robin selection.
pub mod rotation;
/// Progress file and run lock.
pub mod store;
