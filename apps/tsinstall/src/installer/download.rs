//! HTTP download of release archives.
//!
//! Downloads are blocking and stream the response body to disk in fixed-size
//! chunks. A failed download never leaves a partial file behind. Small text
//! assets are fetched into memory with [`fetch_text`].

use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::errors::InstallError;

/// Size of the chunks copied from the response body to disk.
const CHUNK_SIZE: usize = 8192;

/// Default bound on connecting and on each read of the response.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// User-Agent header for HTTP requests.
const USER_AGENT: &str = concat!("tsinstall/", env!("CARGO_PKG_VERSION"));

/// Downloads `url` into `dest` and returns the number of bytes written.
///
/// # Errors
///
/// Returns [`InstallError::Http`] for transport failures and non-success
/// status codes, [`InstallError::Timeout`] when the server does not answer
/// within `timeout`, or an I/O error if `dest` cannot be written. In every
/// case `dest` is removed before the error is returned.
pub fn download_file(url: &str, dest: &Path, timeout: Duration) -> Result<u64> {
    match stream_to_file(url, dest, timeout) {
        Ok(bytes) => {
            tracing::debug!(url, bytes, path = %dest.display(), "download complete");
            Ok(bytes)
        }
        Err(e) => {
            remove_partial(dest);
            Err(e)
        }
    }
}

/// Fetches a small text asset such as a release `checksums.txt`.
///
/// # Errors
///
/// Returns [`InstallError::Http`] for transport failures and non-success
/// status codes, or [`InstallError::Timeout`] when the server does not answer
/// within `timeout`.
pub fn fetch_text(url: &str, timeout: Duration) -> Result<String> {
    let response = get(url, timeout)?;
    let text = response.text().map_err(|e| request_error(url, &e, timeout))?;
    tracing::debug!(url, bytes = text.len(), "fetched text asset");
    Ok(text)
}

/// Sends a GET request and rejects non-success responses.
fn get(url: &str, timeout: Duration) -> Result<reqwest::blocking::Response> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to create HTTP client")?;

    let response = client
        .get(url)
        .send()
        .map_err(|e| request_error(url, &e, timeout))?;

    let status = response.status();
    if !status.is_success() {
        return Err(InstallError::http(url, format!("HTTP error {status}")).into());
    }
    Ok(response)
}

fn stream_to_file(url: &str, dest: &Path, timeout: Duration) -> Result<u64> {
    let mut response = get(url, timeout)?;
    let expected_len = response.content_length();

    let mut file = std::fs::File::create(dest)
        .with_context(|| format!("Failed to create file: {}", dest.display()))?;

    let mut buffer = [0u8; CHUNK_SIZE];
    let mut downloaded: u64 = 0;

    loop {
        let n = match response.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(read_error(url, &e, timeout)),
        };

        file.write_all(&buffer[..n])
            .with_context(|| format!("Failed to write to {}", dest.display()))?;
        downloaded += n as u64;
    }

    if let Some(total) = expected_len
        && downloaded < total
    {
        return Err(InstallError::http(
            url,
            format!("connection closed after {downloaded} of {total} bytes"),
        )
        .into());
    }

    file.flush()
        .with_context(|| format!("Failed to flush {}", dest.display()))?;

    Ok(downloaded)
}

fn request_error(url: &str, err: &reqwest::Error, timeout: Duration) -> anyhow::Error {
    if err.is_timeout() {
        InstallError::timeout(url, timeout.as_secs()).into()
    } else {
        InstallError::http(url, describe(err)).into()
    }
}

fn read_error(url: &str, err: &std::io::Error, timeout: Duration) -> anyhow::Error {
    let timed_out = err.kind() == ErrorKind::TimedOut
        || err
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<reqwest::Error>())
            .is_some_and(reqwest::Error::is_timeout);

    if timed_out {
        InstallError::timeout(url, timeout.as_secs()).into()
    } else {
        InstallError::http(url, describe(err)).into()
    }
}

/// Joins an error and its sources into one line.
fn describe(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

fn remove_partial(dest: &Path) {
    match std::fs::remove_file(dest) {
        Ok(()) => tracing::debug!(path = %dest.display(), "removed partial download"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            path = %dest.display(),
            error = %e,
            "failed to remove partial download"
        ),
    }
}
