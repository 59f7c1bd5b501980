//! `quotereel` produces short quote-narration videos and posts them as reels.
//!
//! One run picks the next quote, music track and effect from round-robin cursors, renders the
//! text over a solid background into an MP4 with `ffmpeg`, uploads it to cloud storage, drives
//! the Graph API create/poll/publish workflow and only then persists the advanced cursors.
//!
//! The pieces are usable on their own: [`text`] lays out and rasterizes text blocks, [`effects`]
//! builds the effect stacks and opacity timelines, [`render`] streams frames into any
//! [`encode::sink::FrameSink`], and [`publish::machine::run_publish`] runs against any
//! [`publish::machine::PublishApi`].
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;
pub(crate) mod http;

/// Run orchestration.
pub mod agent;
/// Soundtrack preparation.
pub mod audio;
/// JSON configuration.
pub mod config;
/// Text effects and compositing.
pub mod effects;
/// Frame sinks and the `ffmpeg` encoder.
pub mod encode;
/// Old-video cleanup and prerequisite checks.
pub mod housekeeping;
/// Caption, Graph API client and publish state machine.
pub mod publish;
/// Layers and the render pipeline.
pub mod render;
/// Posting-slot scheduling.
pub mod schedule;
/// Quote and music sources.
pub mod sources;
/// Progress persistence and rotation.
pub mod state;
/// Cloud storage for the rendered artifact.
pub mod storage;
/// Font resolution, layout and rasterization.
pub mod text;

pub use agent::{Agent, AgentParts, RunReport, StatusSnapshot};
pub use config::Config;
pub use effects::compositor::{Effect, Timeline};
pub use foundation::color::Rgba8;
pub use foundation::core::{Canvas, Fps, FrameIndex};
pub use foundation::error::{ReelError, ReelResult};
pub use render::layer::Layer;
pub use render::pipeline::{RenderJob, Renderer, VideoRenderer};
pub use sources::music::{MusicAsset, MusicSource};
pub use sources::quotes::{Quote, QuoteSource, RowOutcome, RowPolicy};
pub use state::rotation::Selection;
pub use state::store::{ProgressStore, RotationState};
pub use storage::ObjectStore;
