use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::Serialize;

use crate::config::{Config, MusicSourceConfig, QuoteSourceConfig, StorageBackend};
use crate::effects::compositor::Effect;
use crate::foundation::error::{ReelError, ReelResult};
use crate::housekeeping::cleanup_old_videos;
use crate::publish::caption::build_caption;
use crate::publish::graph::GraphApiClient;
use crate::publish::machine::{PollPolicy, PublishApi, PublishJob, run_publish};
use crate::render::pipeline::{RenderJob, Renderer, VideoRenderer};
use crate::schedule::next_posting_time;
use crate::sources::music::{DriveMusicFolder, LocalMusicDir, MusicSource};
use crate::sources::quotes::{
    HttpTableSource, JsonTableSource, QuoteSource, RowOutcome, apply_row_policy,
};
use crate::state::rotation::{Selection, check_weekly_reset};
use crate::state::store::{ProgressStore, RotationState};
use crate::storage::ObjectStore;
use crate::storage::drive::{DriveClient, DriveStore};

/// Collaborators of one [`Agent`]. Built from config by [`Agent::from_config`] or supplied directly.
pub struct AgentParts {
    /// Quote table.
    pub quotes: Box<dyn QuoteSource>,
    /// Music collection.
    pub music: Box<dyn MusicSource>,
    /// Video renderer.
    pub renderer: Box<dyn Renderer>,
    /// Cloud storage, when configured.
    pub storage: Option<Box<dyn ObjectStore>>,
    /// Remote publish API, when publishing is enabled.
    pub publisher: Option<Box<dyn PublishApi>>,
    /// Pause between status polls.
    pub sleep: Box<dyn FnMut(Duration)>,
}

/// Summary of a completed run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunReport {
    /// Row of the quote used.
    pub quote_row: usize,
    /// Author of the quote used.
    pub author: String,
    /// Display name of the track used.
    pub music: String,
    /// Effect used.
    pub effect: Effect,
    /// Rendered MP4.
    pub artifact: PathBuf,
    /// Public URL of the uploaded artifact.
    pub public_url: Option<String>,
    /// Published media id.
    pub media_id: Option<String>,
    /// What happened to the quote row.
    pub row_outcome: RowOutcome,
    /// State persisted for the next run.
    pub next_state: RotationState,
}

/// Progress and schedule as printed by `status`.
#[derive(Clone, Debug, Serialize)]
pub struct StatusSnapshot {
    /// Local time of the snapshot.
    pub current_time: DateTime<Local>,
    /// Next posting slot, local time.
    pub next_run: Option<NaiveDateTime>,
    /// Persisted rotation state.
    pub progress: RotationState,
}

#[derive(Default)]
struct Delivery {
    public_url: Option<String>,
    media_id: Option<String>,
    row_outcome: Option<RowOutcome>,
}

/// Orchestrates one production run: select, render, upload, publish, then persist.
pub struct Agent {
    config: Config,
    store: ProgressStore,
    parts: AgentParts,
}

impl Agent {
    /// Agent over explicit collaborators.
    pub fn new(config: Config, parts: AgentParts) -> Self {
        let store = ProgressStore::new(config.paths.progress_file.clone());
        Self {
            config,
            store,
            parts,
        }
    }

    /// Production agent: sources, Drive storage, Graph API and the `ffmpeg` renderer per `config`.
    pub fn from_config(config: Config) -> ReelResult<Self> {
        let quotes: Box<dyn QuoteSource> = match &config.quotes.source {
            QuoteSourceConfig::File { path } => Box::new(JsonTableSource::new(path.clone())),
            QuoteSourceConfig::Http { url } => Box::new(HttpTableSource::new(
                url.clone(),
                config.storage.timeout_secs,
            )?),
        };
        let music = music_source(&config)?;
        let storage: Option<Box<dyn ObjectStore>> = match config.storage.backend {
            StorageBackend::None => None,
            StorageBackend::Drive => Some(Box::new(DriveStore::new(
                drive_client(&config)?,
                config.storage.folder_id.clone(),
            ))),
        };
        let publisher: Option<Box<dyn PublishApi>> = if config.publish.enabled {
            Some(Box::new(GraphApiClient::from_config(&config.publish)?))
        } else {
            None
        };
        let renderer = Box::new(VideoRenderer::new(
            config.video.clone(),
            config.text.clone(),
        ));

        Ok(Self::new(
            config,
            AgentParts {
                quotes,
                music,
                renderer,
                storage,
                publisher,
                sleep: Box::new(std::thread::sleep),
            },
        ))
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Progress and next posting slot.
    pub fn status(&self) -> ReelResult<StatusSnapshot> {
        let now = Local::now();
        let times = self.config.schedule.parsed_times()?;
        Ok(StatusSnapshot {
            current_time: now,
            next_run: next_posting_time(&times, now.naive_local()),
            progress: self.store.load(now.with_timezone(&Utc)),
        })
    }

    /// One full run. Rotation state advances only when every stage succeeded.
    #[tracing::instrument(skip_all, fields(progress = %self.store.path().display()))]
    pub fn run_once(&mut self) -> ReelResult<RunReport> {
        let _lock = self.store.lock()?;
        let now = Utc::now();
        let mut state = self.store.load(now);
        if check_weekly_reset(&mut state, now, self.config.rotation.weekly_reset) {
            tracing::info!("weekly reset: quote and music cycles restart");
            self.store.save(&state)?;
        }

        let quotes = self.parts.quotes.fetch()?;
        let tracks = self.parts.music.list()?;
        tracing::info!(quotes = quotes.len(), tracks = tracks.len(), "pools loaded");
        let selection = Selection::compute(&state, &quotes, &tracks, &self.config.rotation.effects)?;
        tracing::info!(
            row = selection.quote_row,
            author = %selection.quote.author,
            music = %selection.music.display_name,
            effect = %selection.effect,
            "selected"
        );

        let music_path = self
            .parts
            .music
            .fetch(&selection.music, &self.config.music.temp_dir)?;
        let _music_guard = ScratchFile::new(music_path.clone(), self.config.cleanup.delete_temp_music);

        let job = RenderJob {
            quote_text: selection.quote.text.clone(),
            author_text: selection.quote.author.clone(),
            music_path,
            effect: selection.effect,
            duration_secs: self.config.video.duration_secs,
            canvas: self.config.video.canvas(),
        };
        let artifact = self.parts.renderer.render(&job)?;
        tracing::info!(artifact = %artifact.display(), "video ready");

        let delivery = self.deliver(&artifact, &selection)?;
        let row_outcome = delivery.row_outcome.unwrap_or(RowOutcome::Untouched);

        let next_state = selection.next_state(row_outcome == RowOutcome::Deleted);
        self.store.save(&next_state)?;
        tracing::info!(
            quote = next_state.quote_index,
            music = next_state.music_index,
            effect = next_state.effect_index,
            "progress saved"
        );

        let video = &self.config.video;
        if let Err(e) = cleanup_old_videos(
            &video.output_dir,
            &video.output_prefix,
            self.config.cleanup.keep_videos,
        ) {
            tracing::warn!(error = %e, "old video cleanup failed");
        }

        Ok(RunReport {
            quote_row: selection.quote_row,
            author: selection.quote.author,
            music: selection.music.display_name,
            effect: selection.effect,
            artifact,
            public_url: delivery.public_url,
            media_id: delivery.media_id,
            row_outcome,
            next_state,
        })
    }

    fn deliver(&mut self, artifact: &Path, selection: &Selection) -> ReelResult<Delivery> {
        let Some(storage) = self.parts.storage.as_mut() else {
            tracing::info!("no storage backend configured, keeping the video local");
            return Ok(Delivery::default());
        };

        let name = artifact
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ReelError::upload(format!("bad artifact path '{}'", artifact.display())))?;
        let remote_id = storage.upload(artifact, name)?;
        let public_url = storage.set_public(&remote_id)?;
        tracing::info!(remote_id = %remote_id, url = %public_url, "uploaded");

        let Some(publisher) = self.parts.publisher.as_mut() else {
            tracing::info!("publishing disabled, run complete after upload");
            return Ok(Delivery {
                public_url: Some(public_url),
                ..Delivery::default()
            });
        };

        let caption = build_caption(
            &selection.quote.text,
            &selection.quote.author,
            &self.config.caption,
        );
        let mut job = PublishJob::new(remote_id.clone(), public_url.clone(), caption);
        let policy = PollPolicy {
            interval: Duration::from_secs(self.config.publish.poll_interval_secs),
            max_attempts: self.config.publish.max_poll_attempts,
        };
        let outcome = run_publish(publisher.as_mut(), &mut job, policy, &mut *self.parts.sleep)?;

        if self.config.cleanup.delete_uploaded
            && let Err(e) = storage.delete(&remote_id)
        {
            tracing::warn!(remote_id = %remote_id, error = %e, "could not delete uploaded video");
        }
        let row_outcome = apply_row_policy(
            self.parts.quotes.as_mut(),
            self.config.quotes.manage_rows,
            selection.quote_row,
        );

        Ok(Delivery {
            public_url: Some(public_url),
            media_id: Some(outcome.media_id),
            row_outcome: Some(row_outcome),
        })
    }
}

fn drive_client(config: &Config) -> ReelResult<DriveClient> {
    let s = &config.storage;
    let token = s
        .drive_token
        .as_deref()
        .ok_or_else(|| ReelError::config("storage.drive_token is not set"))?;
    DriveClient::new(token, &s.api_base, &s.upload_base, s.timeout_secs)
}

/// Music source selected by `config.music.source`.
pub fn music_source(config: &Config) -> ReelResult<Box<dyn MusicSource>> {
    Ok(match &config.music.source {
        MusicSourceConfig::Local { dir, extensions } => {
            Box::new(LocalMusicDir::new(dir.clone(), extensions))
        }
        MusicSourceConfig::Drive { folder_id } => Box::new(DriveMusicFolder::new(
            drive_client(config)?,
            folder_id.clone(),
        )),
    })
}

/// Removes a working file on drop when `enabled`.
struct ScratchFile {
    path: PathBuf,
    enabled: bool,
}

impl ScratchFile {
    fn new(path: PathBuf, enabled: bool) -> Self {
        Self { path, enabled }
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if !self.enabled {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::info!(path = %self.path.display(), "removed temporary music file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "could not remove temporary music file")
            }
        }
    }
}
