//! HTTP access to the GitHub Actions artifact API.
//!
//! Provides a trait-based abstraction over the two requests the packager
//! makes, listing a repository's artifacts and streaming one artifact
//! archive to disk, so the pipeline can be exercised without network
//! access.

use crate::catalogue::RepoSlug;
use crate::token::GithubToken;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

/// Base URL of the GitHub REST API.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Size of each chunk written while streaming an archive.
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Time allowed to establish a connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Time allowed between sending a request and receiving response headers.
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(60);

/// Trait for talking to the CI provider.
///
/// # Examples
///
/// ```
/// use bliss_packager::artefact::client::HttpClient;
///
/// let client = HttpClient::default();
/// // Use client.list_artifacts(&repository) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArtifactApi {
    /// Fetch the raw JSON listing of `repository`'s workflow artifacts.
    ///
    /// The listing endpoint is queried without credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn list_artifacts(&self, repository: &RepoSlug) -> Result<String, DownloadError>;

    /// Stream the archive at `url` into `dest`, authenticating with `token`.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or the file write fails.
    fn download_archive(
        &self,
        url: &str,
        token: &GithubToken,
        dest: &Path,
    ) -> Result<u64, DownloadError>;
}

/// Errors arising from CI provider requests.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// HTTP request failed.
    #[error("download failed for {url}: {reason}")]
    HttpError {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The requested resource was not found (HTTP 404).
    #[error("not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// I/O error writing the downloaded file.
    #[error("I/O error writing download: {0}")]
    Io(#[from] std::io::Error),
}

/// Blocking HTTP client using `ureq`.
#[derive(Debug, Clone)]
pub struct HttpClient {
    api_base: String,
}

impl HttpClient {
    /// Create a client targeting a different API host.
    #[must_use]
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
        }
    }

    /// Construct the artifact listing URL for `repository`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bliss_packager::artefact::client::HttpClient;
    /// use bliss_packager::catalogue::RepoSlug;
    ///
    /// let repository = RepoSlug::try_from("CDrummond/bliss-analyser").expect("valid slug");
    /// let url = HttpClient::default().artifacts_url(&repository);
    /// assert_eq!(
    ///     url,
    ///     "https://api.github.com/repos/CDrummond/bliss-analyser/actions/artifacts"
    /// );
    /// ```
    #[must_use]
    pub fn artifacts_url(&self, repository: &RepoSlug) -> String {
        format!(
            "{}/repos/{repository}/actions/artifacts",
            self.api_base.trim_end_matches('/')
        )
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::with_api_base(GITHUB_API_BASE)
    }
}

impl ArtifactApi for HttpClient {
    fn list_artifacts(&self, repository: &RepoSlug) -> Result<String, DownloadError> {
        let url = self.artifacts_url(repository);
        log::debug!("listing artifacts from {url}");
        let response = http_agent()
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .call()
            .map_err(|e| map_ureq_error(&url, &e))?;
        response
            .into_body()
            .read_to_string()
            .map_err(|e| DownloadError::HttpError {
                url: url.clone(),
                reason: e.to_string(),
            })
    }

    fn download_archive(
        &self,
        url: &str,
        token: &GithubToken,
        dest: &Path,
    ) -> Result<u64, DownloadError> {
        log::debug!("downloading {url} to {}", dest.display());
        let response = http_agent()
            .get(url)
            .header("Authorization", token.authorization_header())
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        let mut reader = response.into_body().into_reader();
        let mut file = std::fs::File::create(dest)?;
        let written = copy_in_chunks(&mut reader, &mut file)?;
        file.flush()?;
        log::trace!("wrote {written} bytes to {}", dest.display());
        Ok(written)
    }
}

/// Copy `reader` into `writer` one [`CHUNK_SIZE`] buffer at a time.
///
/// Empty reads end the copy; interrupted reads are retried.
///
/// # Errors
///
/// Returns any read or write error other than [`ErrorKind::Interrupted`].
pub fn copy_in_chunks(reader: &mut dyn Read, writer: &mut dyn Write) -> std::io::Result<u64> {
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut total: u64 = 0;
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        let chunk = buffer.get(..read).unwrap_or_default();
        writer.write_all(chunk)?;
        total += u64::try_from(read).unwrap_or(u64::MAX);
    }
    Ok(total)
}

/// Shared `ureq` agent with timeout configuration.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_connect(Some(CONNECT_TIMEOUT))
            .timeout_recv_response(Some(RESPONSE_TIMEOUT))
            .build();
        ureq::Agent::new_with_config(config)
    })
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        ureq::Error::StatusCode(code @ (401 | 403)) => DownloadError::HttpError {
            url: url.to_owned(),
            reason: format!("access denied (HTTP {code})"),
        },
        other => DownloadError::HttpError {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
