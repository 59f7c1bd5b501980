use std::fmt;
use std::time::Duration;

use serde_json::Value;

use crate::foundation::error::{ReelError, ReelResult};

/// `status_code` of a media container as reported by the platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContainerStatus {
    /// Still processing.
    InProgress,
    /// Ready to publish.
    Finished,
    /// Already published.
    Published,
    /// Processing failed.
    Error,
    /// The container was not published within its lifetime.
    Expired,
    /// Anything else, kept verbatim. Not terminal.
    Unknown(String),
}

impl ContainerStatus {
    /// Parse a `status_code` string.
    pub fn parse(code: &str) -> Self {
        match code {
            "IN_PROGRESS" => Self::InProgress,
            "FINISHED" => Self::Finished,
            "PUBLISHED" => Self::Published,
            "ERROR" => Self::Error,
            "EXPIRED" => Self::Expired,
            other => Self::Unknown(other.to_owned()),
        }
    }

    /// Terminal and ready for the publish call.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Finished)
    }

    /// Terminal failure.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Error | Self::Expired)
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InProgress => "IN_PROGRESS",
            Self::Finished => "FINISHED",
            Self::Published => "PUBLISHED",
            Self::Error => "ERROR",
            Self::Expired => "EXPIRED",
            Self::Unknown(s) => s,
        };
        f.write_str(s)
    }
}

/// One status poll: the parsed code plus the raw payload for error reporting.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusReport {
    /// Parsed `status_code`.
    pub status: ContainerStatus,
    /// Full response body.
    pub payload: Value,
}

/// The three remote calls of the publish workflow.
pub trait PublishApi {
    /// Create a reels container for `video_url`; returns the creation id.
    fn create_container(&mut self, video_url: &str, caption: &str) -> ReelResult<String>;
    /// Current status of a container.
    fn container_status(&mut self, creation_id: &str) -> ReelResult<StatusReport>;
    /// Publish a finished container; returns the media id.
    fn publish(&mut self, creation_id: &str) -> ReelResult<String>;
}

/// How often and how long to poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    /// Pause between polls.
    pub interval: Duration,
    /// Upper bound on status requests.
    pub max_attempts: u32,
}

/// Where a [`PublishJob`] is in its lifecycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PublishStage {
    /// Not yet submitted.
    Pending,
    /// Container created, waiting for a terminal status.
    Polling {
        /// Polls issued so far.
        attempts: u32,
    },
    /// Published with this media id.
    Published(String),
    /// Remote processing failed.
    Failed,
    /// Attempts exhausted without a terminal status.
    TimedOut,
}

/// One artifact moving through create → poll → publish.
#[derive(Clone, Debug, PartialEq)]
pub struct PublishJob {
    /// Storage id of the uploaded artifact.
    pub remote_asset_id: String,
    /// Public URL the platform downloads from.
    pub video_url: String,
    /// Post caption.
    pub caption: String,
    /// Container id once created.
    pub creation_id: Option<String>,
    /// Last status seen.
    pub status: Option<ContainerStatus>,
    /// Lifecycle position.
    pub stage: PublishStage,
}

impl PublishJob {
    /// Job for an uploaded artifact.
    pub fn new(
        remote_asset_id: impl Into<String>,
        video_url: impl Into<String>,
        caption: impl Into<String>,
    ) -> Self {
        Self {
            remote_asset_id: remote_asset_id.into(),
            video_url: video_url.into(),
            caption: caption.into(),
            creation_id: None,
            status: None,
            stage: PublishStage::Pending,
        }
    }
}

/// Result of a confirmed publish.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Container id.
    pub creation_id: String,
    /// Published media id.
    pub media_id: String,
    /// Status polls issued.
    pub polls: u32,
}

/// Drive `job` to a terminal state. `sleep` runs between non-terminal polls.
///
/// `ERROR`/`EXPIRED` become [`ReelError::RemoteProcessing`] carrying the payload, and running out
/// of attempts becomes [`ReelError::Timeout`]. Neither issues the publish call. A failed status
/// request counts as a non-terminal attempt. A container already `PUBLISHED` is not published
/// again; its creation id stands in for the media id.
#[tracing::instrument(skip_all, fields(asset = %job.remote_asset_id))]
pub fn run_publish(
    api: &mut dyn PublishApi,
    job: &mut PublishJob,
    policy: PollPolicy,
    sleep: &mut dyn FnMut(Duration),
) -> ReelResult<PublishOutcome> {
    let creation_id = api.create_container(&job.video_url, &job.caption)?;
    tracing::info!(creation_id = %creation_id, "media container created");
    job.creation_id = Some(creation_id.clone());
    job.stage = PublishStage::Polling { attempts: 0 };

    let mut attempts = 0;
    while attempts < policy.max_attempts {
        let polled = api.container_status(&creation_id);
        attempts += 1;
        job.stage = PublishStage::Polling { attempts };

        let report = match polled {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(attempt = attempts, error = %e, "status poll failed; retrying");
                if attempts < policy.max_attempts {
                    sleep(policy.interval);
                }
                continue;
            }
        };
        job.status = Some(report.status.clone());
        tracing::info!(attempt = attempts, status = %report.status, "container status");

        if report.status == ContainerStatus::Published {
            tracing::info!("container already published");
            job.stage = PublishStage::Published(creation_id.clone());
            return Ok(PublishOutcome {
                media_id: creation_id.clone(),
                creation_id,
                polls: attempts,
            });
        }
        if report.status.is_ready() {
            let media_id = api.publish(&creation_id)?;
            tracing::info!(media_id = %media_id, "published");
            job.stage = PublishStage::Published(media_id.clone());
            return Ok(PublishOutcome {
                creation_id,
                media_id,
                polls: attempts,
            });
        }
        if report.status.is_failed() {
            job.stage = PublishStage::Failed;
            return Err(ReelError::remote_processing(format!(
                "container {creation_id} reported {}: {}",
                report.status, report.payload
            )));
        }
        if attempts < policy.max_attempts {
            sleep(policy.interval);
        }
    }

    job.stage = PublishStage::TimedOut;
    tracing::error!(attempts, "container never reached a terminal status");
    Err(ReelError::Timeout { attempts })
}

#[cfg(test)]
#[path = "../../tests/unit/publish/machine.rs"]
mod tests;
