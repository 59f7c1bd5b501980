use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::AUTHORIZATION;

use crate::foundation::error::{ReelError, ReelResult};

/// Blocking client with a whole-request timeout.
pub(crate) fn build_client(timeout_secs: u64) -> ReelResult<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

/// Pass successful responses through; turn anything else into [`ReelError::Http`] carrying the body.
pub(crate) fn expect_success(response: Response) -> ReelResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().unwrap_or_default();
    Err(ReelError::http(format!("unexpected status {status}: {body}")))
}

pub(crate) fn bearer(request: RequestBuilder, token: &str) -> RequestBuilder {
    request.header(AUTHORIZATION, format!("Bearer {token}"))
}

pub(crate) fn trim_base(base: &str) -> String {
    base.trim_end_matches('/').to_owned()
}
