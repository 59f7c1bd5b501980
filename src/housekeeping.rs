use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::Context as _;

use crate::config::TextConfig;
use crate::encode::ffmpeg::is_ffmpeg_on_path;
use crate::foundation::error::ReelResult;
use crate::sources::music::MusicSource;
use crate::text::engine::TextEngine;
use crate::text::font::FontSource;

/// Keep the `keep` newest `<prefix>_*.mp4` files in `dir` and delete the rest.
///
/// Newest means latest modification time, ties broken by name. Returns the deleted paths;
/// individual delete failures are logged and skipped.
pub fn cleanup_old_videos(dir: &Path, prefix: &str, keep: usize) -> ReelResult<Vec<PathBuf>> {
    let stem = format!("{prefix}_");
    let mut videos: Vec<(SystemTime, PathBuf)> = Vec::new();
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to list video directory '{}'", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read '{}'", dir.display()))?;
        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(&stem) && n.ends_with(".mp4"));
        if !matches || !path.is_file() {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        videos.push((modified, path));
    }

    videos.sort_by(|a, b| b.cmp(a));
    let mut removed = Vec::new();
    for (_, path) in videos.into_iter().skip(keep) {
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "removed old video");
                removed.push(path);
            }
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not remove old video"),
        }
    }
    Ok(removed)
}

/// Outcome of [`check_prerequisites`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrerequisiteReport {
    /// Tracks the music source lists.
    pub music_tracks: usize,
    /// `ffmpeg -version` ran.
    pub ffmpeg: bool,
    /// Resolved font, if any.
    pub font: Option<FontSource>,
    /// Human-readable failures. Empty when everything is in place.
    pub problems: Vec<String>,
}

impl PrerequisiteReport {
    /// Whether a run can proceed.
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Check that a run has music, an encoder and a font. A degraded font is not a problem.
pub fn check_prerequisites(music: &mut dyn MusicSource, text: &TextConfig) -> PrerequisiteReport {
    let mut problems = Vec::new();

    let music_tracks = match music.list() {
        Ok(tracks) if tracks.is_empty() => {
            problems.push("music source has no tracks".to_owned());
            0
        }
        Ok(tracks) => tracks.len(),
        Err(e) => {
            problems.push(format!("music source unavailable: {e}"));
            0
        }
    };

    let ffmpeg = is_ffmpeg_on_path();
    if !ffmpeg {
        problems.push("ffmpeg not found on PATH".to_owned());
    }

    let font = match TextEngine::new(&text.font_candidates) {
        Ok(engine) => Some(engine.source().clone()),
        Err(e) => {
            problems.push(format!("no usable font: {e}"));
            None
        }
    };

    if problems.is_empty() {
        tracing::info!(music_tracks, "prerequisites check passed");
    } else {
        for p in &problems {
            tracing::error!(problem = %p, "prerequisite missing");
        }
    }
    PrerequisiteReport {
        music_tracks,
        ffmpeg,
        font,
        problems,
    }
}

#[cfg(test)]
#[path = "../tests/unit/housekeeping.rs"]
mod tests;
