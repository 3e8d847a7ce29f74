//! The only I/O in the pipeline: remote dataset files and the local sample.

use std::{fs, io, path::Path, time::Duration};

use reqwest::blocking::Client;

use crate::config::DEFAULT_SAMPLE_PATH;
use crate::error::{LoadError, Result};
use crate::sanitize::normalize_input;

/// Copy of the sample dataset compiled into the binary.
pub const BUNDLED_SAMPLE: &str = include_str!("../data/sample-questions.json");

pub type Headers = Vec<(&'static str, String)>;

/// Retrieves raw text for a URL.
pub trait Fetcher: Send + Sync {
    fn get_text(&self, url: &str, headers: &Headers) -> Result<String>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        // reqwest's blocking client defaults to 30s; `None` waits forever.
        let client = Client::builder()
            .user_agent(concat!("qbank/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| LoadError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn get_text(&self, url: &str, headers: &Headers) -> Result<String> {
        let mut req = self.client.get(url);
        for (name, value) in headers {
            req = req.header(*name, value);
        }
        let resp = req.send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(LoadError::RequestFailed(status.as_u16()));
        }
        Ok(resp.text()?)
    }
}

/// A validated request for a file inside a hosted dataset repo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRequest {
    pub url: String,
    pub file_path: String,
    pub headers: Headers,
}

impl RemoteRequest {
    /// Sanitizes the user-typed fields and builds the resolve URL.
    ///
    /// Fails with [`LoadError::MissingField`] before anything is sent.
    pub fn new(host: &str, repo_id: &str, file_path: &str, token: Option<&str>) -> Result<Self> {
        let repo_id = normalize_input(repo_id);
        let file_path = normalize_input(file_path);
        if repo_id.is_empty() {
            return Err(LoadError::MissingField("repo id"));
        }
        if file_path.is_empty() {
            return Err(LoadError::MissingField("file path"));
        }
        Ok(Self {
            url: resolve_url(host, &repo_id, &file_path),
            file_path,
            headers: auth_headers(token),
        })
    }

    pub fn fetch(&self, fetcher: &dyn Fetcher) -> Result<String> {
        fetcher.get_text(&self.url, &self.headers)
    }
}

pub fn resolve_url(host: &str, repo_id: &str, file_path: &str) -> String {
    format!(
        "https://{}/datasets/{}/resolve/main/{}",
        host.trim_end_matches('/'),
        repo_id,
        file_path
    )
}

pub fn auth_headers(token: Option<&str>) -> Headers {
    match token.map(str::trim) {
        Some(t) if !t.is_empty() => vec![("Authorization", format!("Bearer {}", t))],
        _ => Vec::new(),
    }
}

/// Reads the sample file. The default path falls back to [`BUNDLED_SAMPLE`]
/// when it does not exist on disk; any other missing path is an error.
pub fn read_sample(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == io::ErrorKind::NotFound && path == Path::new(DEFAULT_SAMPLE_PATH) => {
            Ok(BUNDLED_SAMPLE.to_string())
        }
        Err(e) => Err(LoadError::SampleUnavailable(e)),
    }
}
