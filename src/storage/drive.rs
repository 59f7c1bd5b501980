use std::fs::File;
use std::path::Path;

use anyhow::Context as _;
use reqwest::blocking::{Body, Client};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use serde::Deserialize;
use serde_json::json;

use crate::foundation::error::{ReelError, ReelResult};
use crate::http::{bearer, build_client, expect_success, trim_base};
use crate::storage::ObjectStore;

/// Drive's error reason when the caller may read a file but not delete it.
const INSUFFICIENT_PERMISSIONS: &str = "insufficientFilePermissions";

/// Public download link for a Drive file shared with `anyone/reader`.
pub fn public_url(file_id: &str) -> String {
    format!("https://drive.google.com/uc?id={file_id}&export=download")
}

/// File entry returned by a folder listing.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct DriveFile {
    /// Drive file id.
    pub id: String,
    /// File name.
    pub name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct CreatedFile {
    id: String,
}

/// Thin Google Drive v3 REST client authenticated with a bearer token.
#[derive(Clone, Debug)]
pub struct DriveClient {
    http: Client,
    token: String,
    api_base: String,
    upload_base: String,
}

impl DriveClient {
    /// Create a client against the given API bases.
    pub fn new(
        token: impl Into<String>,
        api_base: &str,
        upload_base: &str,
        timeout_secs: u64,
    ) -> ReelResult<Self> {
        Ok(Self {
            http: build_client(timeout_secs)?,
            token: token.into(),
            api_base: trim_base(api_base),
            upload_base: trim_base(upload_base),
        })
    }

    /// List non-trashed files in `folder_id`, optionally filtered by MIME type. Follows paging.
    pub fn list_folder(&self, folder_id: &str, mime_type: Option<&str>) -> ReelResult<Vec<DriveFile>> {
        let mut q = format!("'{folder_id}' in parents and trashed=false");
        if let Some(m) = mime_type {
            q.push_str(&format!(" and mimeType='{m}'"));
        }

        let mut out = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut query = vec![
                ("q", q.clone()),
                ("fields", "nextPageToken, files(id, name)".to_owned()),
                ("pageSize", "1000".to_owned()),
            ];
            if let Some(t) = page_token.take() {
                query.push(("pageToken", t));
            }
            let request = self
                .http
                .get(format!("{}/files", self.api_base))
                .query(&query);
            let page: FileList = expect_success(bearer(request, &self.token).send()?)?.json()?;
            out.extend(page.files);
            match page.next_page_token {
                Some(t) if !t.is_empty() => page_token = Some(t),
                _ => break,
            }
        }
        Ok(out)
    }

    /// Download file content to `dest`.
    pub fn download(&self, file_id: &str, dest: &Path) -> ReelResult<()> {
        let request = self
            .http
            .get(format!("{}/files/{file_id}", self.api_base))
            .query(&[("alt", "media")]);
        let mut response = expect_success(bearer(request, &self.token).send()?)?;
        let mut f =
            File::create(dest).with_context(|| format!("create '{}'", dest.display()))?;
        response.copy_to(&mut f)?;
        Ok(())
    }

    /// Resumable upload: open a session with the metadata, then PUT the bytes to its URI.
    pub fn upload_resumable(
        &self,
        path: &Path,
        name: &str,
        folder_id: Option<&str>,
        mime_type: &str,
    ) -> ReelResult<String> {
        let f = File::open(path).with_context(|| format!("open '{}'", path.display()))?;
        let len = f
            .metadata()
            .with_context(|| format!("stat '{}'", path.display()))?
            .len();

        let mut metadata = json!({ "name": name });
        if let Some(folder) = folder_id {
            metadata["parents"] = json!([folder]);
        }

        let request = self
            .http
            .post(format!("{}/files", self.upload_base))
            .query(&[("uploadType", "resumable"), ("fields", "id")])
            .header("X-Upload-Content-Type", mime_type)
            .header("X-Upload-Content-Length", len.to_string())
            .json(&metadata);
        let session = expect_success(bearer(request, &self.token).send()?)?;
        let location = session
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ReelError::upload("resumable session returned no Location header"))?
            .to_owned();
        tracing::debug!(bytes = len, "opened resumable upload session");

        let request = self
            .http
            .put(location)
            .header(CONTENT_TYPE, mime_type)
            .header(CONTENT_LENGTH, len.to_string())
            .body(Body::sized(f, len));
        let created: CreatedFile = expect_success(bearer(request, &self.token).send()?)?.json()?;
        Ok(created.id)
    }

    /// Grant `anyone` the `reader` role.
    pub fn share_publicly(&self, file_id: &str) -> ReelResult<()> {
        let request = self
            .http
            .post(format!("{}/files/{file_id}/permissions", self.api_base))
            .json(&json!({ "type": "anyone", "role": "reader" }));
        expect_success(bearer(request, &self.token).send()?)?;
        Ok(())
    }

    /// Permanently delete a file.
    pub fn delete(&self, file_id: &str) -> ReelResult<()> {
        let request = self
            .http
            .delete(format!("{}/files/{file_id}", self.api_base));
        expect_success(bearer(request, &self.token).send()?)?;
        Ok(())
    }
}

/// [`ObjectStore`] writing into one Drive folder.
#[derive(Clone, Debug)]
pub struct DriveStore {
    client: DriveClient,
    folder_id: Option<String>,
}

impl DriveStore {
    /// Store uploading into `folder_id` (the drive root when `None`).
    pub fn new(client: DriveClient, folder_id: Option<String>) -> Self {
        Self { client, folder_id }
    }
}

impl ObjectStore for DriveStore {
    fn upload(&mut self, path: &Path, name: &str) -> ReelResult<String> {
        let id = self
            .client
            .upload_resumable(path, name, self.folder_id.as_deref(), "video/mp4")
            .map_err(|e| ReelError::upload(format!("drive upload of '{name}' failed: {e}")))?;
        tracing::info!(file_id = %id, name, "uploaded video to drive");
        Ok(id)
    }

    fn set_public(&mut self, id: &str) -> ReelResult<String> {
        self.client
            .share_publicly(id)
            .map_err(|e| ReelError::upload(format!("sharing drive file {id} failed: {e}")))?;
        Ok(public_url(id))
    }

    fn delete(&mut self, id: &str) -> ReelResult<()> {
        match self.client.delete(id) {
            Ok(()) => {
                tracing::info!(file_id = %id, "deleted uploaded video from drive");
                Ok(())
            }
            Err(e) if e.to_string().contains(INSUFFICIENT_PERMISSIONS) => {
                tracing::warn!(
                    file_id = %id,
                    "drive refused deletion (insufficient permissions); leaving file in place"
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/storage/drive.rs"]
mod tests;
