//! Cloud storage for the rendered artifact.

use std::path::Path;

use crate::foundation::error::ReelResult;

/// Google Drive v3 adapter.
pub mod drive;

/// Upload, share and delete one artifact.
pub trait ObjectStore {
    /// Upload `path` under `name`; returns the remote id.
    fn upload(&mut self, path: &Path, name: &str) -> ReelResult<String>;
    /// Make the object publicly readable; returns its public URL.
    fn set_public(&mut self, id: &str) -> ReelResult<String>;
    /// Remove the object.
    fn delete(&mut self, id: &str) -> ReelResult<()>;
}
