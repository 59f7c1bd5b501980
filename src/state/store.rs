use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone as _, Utc};
use serde::{Deserialize, Serialize};

use crate::foundation::error::{ReelError, ReelResult};

/// Persisted rotation cursors.
///
/// Indices are positions in the quote table, the sorted music listing and the configured effect
/// list. They may be out of range after a pool shrinks; selection wraps them back to zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationState {
    /// Next quote row.
    #[serde(default)]
    pub quote_index: usize,
    /// Next music track.
    #[serde(default)]
    pub music_index: usize,
    /// Next effect.
    #[serde(default)]
    pub effect_index: usize,
    /// Start of the current weekly cycle.
    #[serde(default = "Utc::now", deserialize_with = "de_timestamp")]
    pub last_reset: DateTime<Utc>,
}

impl RotationState {
    /// Zero cursors with the cycle starting at `now`.
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            quote_index: 0,
            music_index: 0,
            effect_index: 0,
            last_reset: now,
        }
    }
}

/// Accept RFC 3339 timestamps and naive ISO-8601 ones, reading the latter as local time.
fn de_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_timestamp(&s).map_err(serde::de::Error::custom)
}

pub(crate) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|e| format!("invalid timestamp '{s}': {e}"))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| format!("timestamp '{s}' does not exist in the local time zone"))
}

/// JSON file holding one [`RotationState`].
#[derive(Clone, Debug)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    /// Store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the state. An absent file yields fresh cursors; an unreadable one is logged and also
    /// yields fresh cursors.
    pub fn load(&self, now: DateTime<Utc>) -> RotationState {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no progress file, starting fresh");
                return RotationState::fresh(now);
            }
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "failed to read progress file");
                return RotationState::fresh(now);
            }
        };
        match serde_json::from_slice::<RotationState>(&bytes) {
            Ok(state) => {
                tracing::info!(
                    quote = state.quote_index,
                    music = state.music_index,
                    effect = state.effect_index,
                    "loaded progress"
                );
                state
            }
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "failed to parse progress file");
                RotationState::fresh(now)
            }
        }
    }

    /// Write `state` atomically (temp file, then rename).
    pub fn save(&self, state: &RotationState) -> ReelResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create progress directory '{}'", parent.display())
            })?;
        }
        let tmp = with_suffix(&self.path, ".tmp");
        let json = serde_json::to_vec_pretty(state).context("serialize progress")?;
        std::fs::write(&tmp, json)
            .with_context(|| format!("failed to write '{}'", tmp.display()))?;
        std::fs::rename(&tmp, &self.path).with_context(|| {
            format!(
                "failed to move '{}' over '{}'",
                tmp.display(),
                self.path.display()
            )
        })?;
        tracing::debug!(path = %self.path.display(), "saved progress");
        Ok(())
    }

    /// Take the exclusive run lock next to the progress file.
    pub fn lock(&self) -> ReelResult<RunLock> {
        RunLock::acquire(with_suffix(&self.path, ".lock"))
    }
}

/// Exclusive marker file held for the duration of one run. Removed on drop.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    fn acquire(path: PathBuf) -> ReelResult<Self> {
        let mut f = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(ReelError::Locked(path.display().to_string()));
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("failed to create lock '{}'", path.display()))
                    .into());
            }
        };
        // Pid is informational only.
        let _ = writeln!(f, "{}", std::process::id());
        Ok(Self { path })
    }

    /// Lock file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove run lock");
        }
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

#[cfg(test)]
#[path = "../../tests/unit/state/store.rs"]
mod tests;
