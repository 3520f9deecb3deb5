//! Downloads for sheets and music.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_DISPOSITION;

use crate::{ScheduleError, ScheduleResult};

/// A downloaded body and the filename the server suggested for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fetched {
    pub bytes: Vec<u8>,
    pub filename: Option<String>,
}

/// Source of remote bytes.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> ScheduleResult<Fetched>;
}

/// Blocking HTTP fetcher.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> ScheduleResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("skate-schedule/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ScheduleError::Message(format!("failed to build http client: {e}")))?;
        Ok(HttpFetcher { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> ScheduleResult<Fetched> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| ScheduleError::Message(format!("download of {url} failed: {e}")))?;
        if !response.status().is_success() {
            return Err(ScheduleError::Message(format!(
                "download of {url} failed with status {}",
                response.status()
            )));
        }
        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(content_disposition_filename);
        let bytes = response
            .bytes()
            .map_err(|e| ScheduleError::Message(format!("download of {url} failed: {e}")))?
            .to_vec();
        Ok(Fetched { bytes, filename })
    }
}

/// Pull `filename=...` out of a `Content-Disposition` header value.
pub fn content_disposition_filename(header: &str) -> Option<String> {
    header.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        if key.trim() != "filename" {
            return None;
        }
        let value = value.trim().trim_matches('"');
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// Canned responses keyed by URL, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MockFetcher {
    responses: HashMap<String, Fetched>,
    requests: RefCell<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, url: impl Into<String>, response: Fetched) -> Self {
        self.responses.insert(url.into(), response);
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Fetcher for MockFetcher {
    fn fetch(&self, url: &str) -> ScheduleResult<Fetched> {
        self.requests.borrow_mut().push(url.to_string());
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| ScheduleError::Message(format!("no mock response for {url}")))
    }
}
