//! Runtime configuration.
//!
//! One JSON document, every section optional. Missing fields take the defaults below. The loaded
//! [`Config`] is immutable and handed to each component when it is constructed.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::effects::compositor::Effect;
use crate::foundation::color::Rgba8;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ReelError, ReelResult};
use crate::sources::quotes::RowPolicy;

/// Environment variable overriding [`PublishConfig::access_token`].
pub const ACCESS_TOKEN_ENV: &str = "QUOTEREEL_ACCESS_TOKEN";
/// Environment variable overriding [`StorageConfig::drive_token`].
pub const DRIVE_TOKEN_ENV: &str = "QUOTEREEL_DRIVE_TOKEN";

/// Top-level configuration document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Canvas, timing and output file settings.
    pub video: VideoConfig,
    /// Fonts, sizes and text animation.
    pub text: TextConfig,
    /// Rotation behavior and the effect list.
    pub rotation: RotationConfig,
    /// Where quotes come from.
    pub quotes: QuotesConfig,
    /// Where music comes from.
    pub music: MusicConfig,
    /// Cloud storage for the rendered artifact.
    pub storage: StorageConfig,
    /// Remote publish API.
    pub publish: PublishConfig,
    /// Caption assembly.
    pub caption: CaptionConfig,
    /// Post-run housekeeping.
    pub cleanup: CleanupConfig,
    /// Daemon posting times.
    pub schedule: ScheduleConfig,
    /// Local state files.
    pub paths: PathsConfig,
}

/// Video canvas and output settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VideoConfig {
    /// Canvas width in pixels (even).
    pub width: u32,
    /// Canvas height in pixels (even).
    pub height: u32,
    /// Whole frames per second.
    pub fps: u32,
    /// Fixed video duration in seconds.
    pub duration_secs: f64,
    /// Solid background color.
    pub background: Rgba8,
    /// Directory receiving rendered MP4 files.
    pub output_dir: PathBuf,
    /// File name prefix, `<prefix>_<YYYYmmdd_HHMMSS>.mp4`.
    pub output_prefix: String,
    /// Length of the audio fade at the end of the video.
    pub audio_fade_out_secs: f64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            fps: 30,
            duration_secs: 15.0,
            background: Rgba8::rgb(0, 0, 0),
            output_dir: PathBuf::from("videos"),
            output_prefix: "quote_video".to_owned(),
            audio_fade_out_secs: 2.0,
        }
    }
}

impl VideoConfig {
    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Output frame rate.
    pub fn frame_rate(&self) -> ReelResult<Fps> {
        Fps::whole(self.fps)
    }
}

/// Text styling and animation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextConfig {
    /// Font files tried in order; the first that loads wins.
    pub font_candidates: Vec<PathBuf>,
    /// Quote font size in pixels.
    pub quote_font_size: f32,
    /// Author font size in pixels.
    pub author_font_size: f32,
    /// Quote fill color.
    pub quote_color: Rgba8,
    /// Author fill color.
    pub author_color: Rgba8,
    /// Extra spacing added to the font size to get the line height.
    pub line_spacing: f32,
    /// Minimum distance between the text block and the canvas edge.
    pub margin: f32,
    /// Quote wrap width is `width - quote_wrap_inset`.
    pub quote_wrap_inset: f32,
    /// Author wrap width is `width - author_wrap_inset`.
    pub author_wrap_inset: f32,
    /// Top of the author block as a fraction of canvas height.
    pub author_top_ratio: f32,
    /// Text fade-in length.
    pub fade_in_secs: f64,
    /// Text fade-out length.
    pub fade_out_secs: f64,
    /// Delay before the author starts appearing.
    pub stagger_secs: f64,
    /// Render a soft enlarged copy beneath each text block.
    pub glow: bool,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            font_candidates: vec![
                PathBuf::from("fonts/Montserrat-Bold.ttf"),
                PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"),
                PathBuf::from("/System/Library/Fonts/Helvetica.ttc"),
            ],
            quote_font_size: 70.0,
            author_font_size: 50.0,
            quote_color: Rgba8::rgb(255, 255, 255),
            author_color: Rgba8::rgb(200, 200, 200),
            line_spacing: 15.0,
            margin: 50.0,
            quote_wrap_inset: 300.0,
            author_wrap_inset: 200.0,
            author_top_ratio: 0.75,
            fade_in_secs: 1.0,
            fade_out_secs: 1.0,
            stagger_secs: 1.5,
            glow: true,
        }
    }
}

/// Rotation settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RotationConfig {
    /// Reset quote and music cursors once a week.
    pub weekly_reset: bool,
    /// Ordered effect list cycled by `effect_index`.
    pub effects: Vec<Effect>,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            weekly_reset: true,
            effects: vec![Effect::Fade, Effect::Blur, Effect::DiamondBlur],
        }
    }
}

/// Quote table location.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuoteSourceConfig {
    /// JSON records file.
    File {
        /// Path to the JSON array of row objects.
        path: PathBuf,
    },
    /// HTTP endpoint returning a JSON array of row objects.
    Http {
        /// Endpoint URL.
        url: String,
    },
}

/// Quote settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuotesConfig {
    /// Table location.
    pub source: QuoteSourceConfig,
    /// What happens to the row after a confirmed publish.
    pub manage_rows: RowPolicy,
}

impl Default for QuotesConfig {
    fn default() -> Self {
        Self {
            source: QuoteSourceConfig::File {
                path: PathBuf::from("quotes.json"),
            },
            manage_rows: RowPolicy::Off,
        }
    }
}

/// Music collection location.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MusicSourceConfig {
    /// Local directory of audio files.
    Local {
        /// Directory to scan (non-recursive).
        dir: PathBuf,
        /// Accepted file extensions, case-insensitive.
        #[serde(default = "default_music_extensions")]
        extensions: Vec<String>,
    },
    /// Google Drive folder of `audio/mpeg` files.
    Drive {
        /// Folder id.
        folder_id: String,
    },
}

fn default_music_extensions() -> Vec<String> {
    vec!["mp3".to_owned()]
}

/// Music settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MusicConfig {
    /// Collection location.
    pub source: MusicSourceConfig,
    /// Directory receiving the `temp_<name>` working copy.
    pub temp_dir: PathBuf,
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self {
            source: MusicSourceConfig::Local {
                dir: PathBuf::from("music"),
                extensions: default_music_extensions(),
            },
            temp_dir: PathBuf::from("."),
        }
    }
}

/// Storage backend choice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Keep the artifact local only.
    #[default]
    None,
    /// Google Drive v3.
    Drive,
}

/// Cloud storage settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Selected backend.
    pub backend: StorageBackend,
    /// Destination folder; the drive root when absent.
    pub folder_id: Option<String>,
    /// OAuth bearer token used for Drive calls (storage and the Drive music source).
    pub drive_token: Option<String>,
    /// Drive metadata API base.
    pub api_base: String,
    /// Drive upload API base.
    pub upload_base: String,
    /// Request timeout.
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::None,
            folder_id: None,
            drive_token: None,
            api_base: "https://www.googleapis.com/drive/v3".to_owned(),
            upload_base: "https://www.googleapis.com/upload/drive/v3".to_owned(),
            timeout_secs: 300,
        }
    }
}

/// Remote publish API settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    /// When false the run ends after rendering and upload.
    pub enabled: bool,
    /// Account the reel is published under.
    pub ig_user_id: String,
    /// Long-lived access token.
    pub access_token: Option<String>,
    /// Graph API base URL.
    pub api_base: String,
    /// Seconds between status polls.
    pub poll_interval_secs: u64,
    /// Status polls before giving up.
    pub max_poll_attempts: u32,
    /// Request timeout.
    pub timeout_secs: u64,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ig_user_id: String::new(),
            access_token: None,
            api_base: "https://graph.facebook.com/v19.0".to_owned(),
            poll_interval_secs: 10,
            max_poll_attempts: 12,
            timeout_secs: 60,
        }
    }
}

/// Caption assembly settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptionConfig {
    /// Include the quoted text.
    pub include_quote: bool,
    /// Include `- author`.
    pub include_author: bool,
    /// Hashtags appended after a blank line, space separated.
    pub hashtags: Vec<String>,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            include_quote: true,
            include_author: true,
            hashtags: ["#quotes", "#motivation", "#inspiration", "#quoteoftheday"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

/// Post-run housekeeping settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleanupConfig {
    /// Delete the uploaded artifact once published.
    pub delete_uploaded: bool,
    /// Keep only this many newest local videos.
    pub keep_videos: usize,
    /// Remove the `temp_<name>` music copy after each run.
    pub delete_temp_music: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            delete_uploaded: true,
            keep_videos: 5,
            delete_temp_music: true,
        }
    }
}

/// Posting times for the daemon.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduleConfig {
    /// Local `HH:MM` times.
    pub times: Vec<String>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            times: ["09:00", "12:00", "18:00", "21:00"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

impl ScheduleConfig {
    /// Parse and sort the configured times.
    pub fn parsed_times(&self) -> ReelResult<Vec<NaiveTime>> {
        let mut out = self
            .times
            .iter()
            .map(|s| {
                NaiveTime::parse_from_str(s.trim(), "%H:%M").map_err(|e| {
                    ReelError::config(format!("schedule time '{s}' is not HH:MM: {e}"))
                })
            })
            .collect::<ReelResult<Vec<_>>>()?;
        out.sort();
        out.dedup();
        Ok(out)
    }
}

/// Local state file locations.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Rotation progress file.
    pub progress_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            progress_file: PathBuf::from("progress.json"),
        }
    }
}

impl Config {
    /// Load, apply environment overrides and validate.
    pub fn load(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelError::config(format!("open config '{}': {e}", path.display()))
        })?;
        let mut cfg: Self = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            ReelError::config(format!("parse config '{}': {e}", path.display()))
        })?;
        cfg.apply_env_overrides(|k| std::env::var(k).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    /// Replace secrets with values from the environment when present and non-empty.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup(ACCESS_TOKEN_ENV).filter(|v| !v.trim().is_empty()) {
            self.publish.access_token = Some(v);
        }
        if let Some(v) = lookup(DRIVE_TOKEN_ENV).filter(|v| !v.trim().is_empty()) {
            self.storage.drive_token = Some(v);
        }
    }

    /// Reject configurations no run could succeed with.
    pub fn validate(&self) -> ReelResult<()> {
        let v = &self.video;
        if v.width == 0 || v.height == 0 {
            return Err(ReelError::config("video width/height must be non-zero"));
        }
        if !v.width.is_multiple_of(2) || !v.height.is_multiple_of(2) {
            return Err(ReelError::config(
                "video width/height must be even (required for yuv420p output)",
            ));
        }
        if v.width > u32::from(u16::MAX) || v.height > u32::from(u16::MAX) {
            return Err(ReelError::config("video width/height must fit in u16"));
        }
        v.frame_rate()
            .map_err(|e| ReelError::config(format!("video fps: {e}")))?;
        if !v.duration_secs.is_finite() || v.duration_secs <= 0.0 {
            return Err(ReelError::config("video duration_secs must be > 0"));
        }
        if !v.audio_fade_out_secs.is_finite() || v.audio_fade_out_secs < 0.0 {
            return Err(ReelError::config("video audio_fade_out_secs must be >= 0"));
        }
        if v.output_prefix.trim().is_empty() {
            return Err(ReelError::config("video output_prefix must be non-empty"));
        }

        let t = &self.text;
        for (name, size) in [
            ("quote_font_size", t.quote_font_size),
            ("author_font_size", t.author_font_size),
        ] {
            if !size.is_finite() || size <= 0.0 {
                return Err(ReelError::config(format!("text {name} must be > 0")));
            }
        }
        if !(t.stagger_secs.is_finite() && t.stagger_secs > 0.0) {
            return Err(ReelError::config("text stagger_secs must be > 0"));
        }
        if t.stagger_secs >= v.duration_secs {
            return Err(ReelError::config(
                "text stagger_secs must be shorter than video duration_secs",
            ));
        }
        if !(t.fade_in_secs >= 0.0 && t.fade_out_secs >= 0.0) {
            return Err(ReelError::config("text fade durations must be >= 0"));
        }
        if !(0.0..=1.0).contains(&t.author_top_ratio) {
            return Err(ReelError::config("text author_top_ratio must be within 0..=1"));
        }

        if self.rotation.effects.is_empty() {
            return Err(ReelError::config("rotation effects must be non-empty"));
        }

        if let MusicSourceConfig::Local { extensions, .. } = &self.music.source
            && extensions.is_empty()
        {
            return Err(ReelError::config("music extensions must be non-empty"));
        }

        let p = &self.publish;
        if p.max_poll_attempts == 0 {
            return Err(ReelError::config("publish max_poll_attempts must be > 0"));
        }
        if p.enabled {
            if p.ig_user_id.trim().is_empty() {
                return Err(ReelError::config(
                    "publish ig_user_id is required when publishing is enabled",
                ));
            }
            if p.access_token.as_deref().is_none_or(|s| s.trim().is_empty()) {
                return Err(ReelError::config(format!(
                    "publish access_token (or {ACCESS_TOKEN_ENV}) is required when publishing is enabled"
                )));
            }
            if self.storage.backend == StorageBackend::None {
                return Err(ReelError::config(
                    "publishing needs a public video URL; configure a storage backend",
                ));
            }
        }

        let needs_drive = self.storage.backend == StorageBackend::Drive
            || matches!(self.music.source, MusicSourceConfig::Drive { .. });
        if needs_drive
            && self
                .storage
                .drive_token
                .as_deref()
                .is_none_or(|s| s.trim().is_empty())
        {
            return Err(ReelError::config(format!(
                "storage drive_token (or {DRIVE_TOKEN_ENV}) is required for Drive access"
            )));
        }

        self.schedule.parsed_times()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
