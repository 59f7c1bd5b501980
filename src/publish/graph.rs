use reqwest::blocking::Client;
use serde_json::Value;

use crate::config::PublishConfig;
use crate::foundation::error::{ReelError, ReelResult};
use crate::http::{build_client, expect_success, trim_base};
use crate::publish::machine::{ContainerStatus, PublishApi, StatusReport};

/// Instagram Graph API client for reels publishing.
#[derive(Clone, Debug)]
pub struct GraphApiClient {
    http: Client,
    api_base: String,
    ig_user_id: String,
    access_token: String,
}

impl GraphApiClient {
    /// Client for `ig_user_id` against `api_base`.
    pub fn new(
        ig_user_id: impl Into<String>,
        access_token: impl Into<String>,
        api_base: &str,
        timeout_secs: u64,
    ) -> ReelResult<Self> {
        Ok(Self {
            http: build_client(timeout_secs)?,
            api_base: trim_base(api_base),
            ig_user_id: ig_user_id.into(),
            access_token: access_token.into(),
        })
    }

    /// Client built from the publish section; the access token must be set.
    pub fn from_config(cfg: &PublishConfig) -> ReelResult<Self> {
        let token = cfg
            .access_token
            .as_deref()
            .ok_or_else(|| ReelError::config("publish.access_token is not set"))?;
        Self::new(&cfg.ig_user_id, token, &cfg.api_base, cfg.timeout_secs)
    }

    fn post_form(&self, path: &str, form: &[(&str, &str)]) -> ReelResult<Value> {
        let response = self
            .http
            .post(format!("{}/{path}", self.api_base))
            .form(form)
            .send()?;
        Ok(expect_success(response)?.json()?)
    }
}

impl PublishApi for GraphApiClient {
    fn create_container(&mut self, video_url: &str, caption: &str) -> ReelResult<String> {
        let body = self.post_form(
            &format!("{}/media", self.ig_user_id),
            &[
                ("media_type", "REELS"),
                ("video_url", video_url),
                ("caption", caption),
                ("access_token", self.access_token.as_str()),
            ],
        )?;
        id_field(&body, "media container")
    }

    fn container_status(&mut self, creation_id: &str) -> ReelResult<StatusReport> {
        let response = self
            .http
            .get(format!("{}/{creation_id}", self.api_base))
            .query(&[
                ("fields", "status_code"),
                ("access_token", self.access_token.as_str()),
            ])
            .send()?;
        let body: Value = expect_success(response)?.json()?;
        Ok(status_report(body))
    }

    fn publish(&mut self, creation_id: &str) -> ReelResult<String> {
        let body = self.post_form(
            &format!("{}/media_publish", self.ig_user_id),
            &[
                ("creation_id", creation_id),
                ("access_token", self.access_token.as_str()),
            ],
        )?;
        id_field(&body, "media publish")
    }
}

/// The `id` of a Graph API response; a missing id is a remote failure carrying the body.
pub(crate) fn id_field(body: &Value, call: &str) -> ReelResult<String> {
    match body.get("id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => Ok(id.to_owned()),
        _ => Err(ReelError::remote_processing(format!(
            "{call} returned no id: {body}"
        ))),
    }
}

/// Status poll body to a report. An absent `status_code` is an unknown, non-terminal status.
pub(crate) fn status_report(body: Value) -> StatusReport {
    let code = body
        .get("status_code")
        .and_then(Value::as_str)
        .unwrap_or_default();
    StatusReport {
        status: ContainerStatus::parse(code),
        payload: body,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/publish/graph.rs"]
mod tests;
