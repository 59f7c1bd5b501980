use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{ReelError, ReelResult};
use crate::storage::drive::DriveClient;

/// One track in the collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicAsset {
    /// Backend-specific handle (a path or a remote file id).
    pub id: String,
    /// Name used for ordering and for the working copy.
    pub display_name: String,
}

/// Music collection.
pub trait MusicSource {
    /// List tracks sorted by display name.
    fn list(&mut self) -> ReelResult<Vec<MusicAsset>>;
    /// Materialize `asset` as `dest_dir/temp_<display_name>` and return that path.
    fn fetch(&mut self, asset: &MusicAsset, dest_dir: &Path) -> ReelResult<PathBuf>;
}

/// Working-copy path for `asset` inside `dest_dir`.
pub fn temp_music_path(dest_dir: &Path, asset: &MusicAsset) -> PathBuf {
    dest_dir.join(format!("temp_{}", asset.display_name))
}

fn sort_assets(assets: &mut [MusicAsset]) {
    assets.sort_by(|a, b| {
        a.display_name
            .cmp(&b.display_name)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Audio files in a local directory (non-recursive).
#[derive(Clone, Debug)]
pub struct LocalMusicDir {
    dir: PathBuf,
    extensions: Vec<String>,
}

impl LocalMusicDir {
    /// Scan `dir` for files with one of `extensions` (case-insensitive, no dot).
    pub fn new(dir: impl Into<PathBuf>, extensions: &[String]) -> Self {
        Self {
            dir: dir.into(),
            extensions: extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.contains(&e.to_ascii_lowercase()))
    }
}

impl MusicSource for LocalMusicDir {
    fn list(&mut self) -> ReelResult<Vec<MusicAsset>> {
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("read music directory '{}'", self.dir.display()))?;
        let mut out = Vec::new();
        for entry in entries {
            let entry = entry.context("read music directory entry")?;
            let path = entry.path();
            if !path.is_file() || !self.accepts(&path) {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                tracing::warn!(path = %path.display(), "skipping music file with non-UTF-8 name");
                continue;
            };
            out.push(MusicAsset {
                id: path.display().to_string(),
                display_name: name.to_owned(),
            });
        }
        sort_assets(&mut out);
        tracing::debug!(count = out.len(), dir = %self.dir.display(), "listed local music");
        Ok(out)
    }

    fn fetch(&mut self, asset: &MusicAsset, dest_dir: &Path) -> ReelResult<PathBuf> {
        let dest = temp_music_path(dest_dir, asset);
        std::fs::create_dir_all(dest_dir)
            .with_context(|| format!("create '{}'", dest_dir.display()))?;
        std::fs::copy(&asset.id, &dest)
            .with_context(|| format!("copy '{}' to '{}'", asset.id, dest.display()))?;
        Ok(dest)
    }
}

/// `audio/mpeg` files in a Google Drive folder.
#[derive(Clone, Debug)]
pub struct DriveMusicFolder {
    client: DriveClient,
    folder_id: String,
}

impl DriveMusicFolder {
    /// Listing of `folder_id` through `client`.
    pub fn new(client: DriveClient, folder_id: impl Into<String>) -> Self {
        Self {
            client,
            folder_id: folder_id.into(),
        }
    }
}

impl MusicSource for DriveMusicFolder {
    fn list(&mut self) -> ReelResult<Vec<MusicAsset>> {
        let files = self.client.list_folder(&self.folder_id, Some("audio/mpeg"))?;
        let mut out: Vec<MusicAsset> = files
            .into_iter()
            .map(|f| MusicAsset {
                id: f.id,
                display_name: f.name,
            })
            .collect();
        sort_assets(&mut out);
        tracing::debug!(count = out.len(), folder = %self.folder_id, "listed drive music");
        Ok(out)
    }

    fn fetch(&mut self, asset: &MusicAsset, dest_dir: &Path) -> ReelResult<PathBuf> {
        let dest = temp_music_path(dest_dir, asset);
        std::fs::create_dir_all(dest_dir)
            .with_context(|| format!("create '{}'", dest_dir.display()))?;
        self.client
            .download(&asset.id, &dest)
            .map_err(|e| ReelError::render(format!("download music '{}': {e}", asset.display_name)))?;
        Ok(dest)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sources/music.rs"]
mod tests;
