//! Posting the rendered artifact: caption text, the Graph API client and the
//! create → poll → publish state machine.

/// Caption assembly from config.
pub mod caption;
/// Instagram Graph API client.
pub mod graph;
/// Bounded publish workflow over any [`machine::PublishApi`].
pub mod machine;
