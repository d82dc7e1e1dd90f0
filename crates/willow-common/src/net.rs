//! Fetch utilities for the Willow engine's host glue.
//!
//! The core style/layout pipeline never performs I/O; everything here is
//! invoked by host code (document loader, stylesheet fetcher, image loader)
//! which then hands the resulting bytes to pure parsing entry points.
//!
//! Supported URL shapes: `http(s)://`, `data:` (optionally base64), and
//! bare filesystem paths (with or without a `file://` prefix).

use std::fs;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use thiserror::Error;

/// User-Agent header sent with all requests.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; Willow/0.1)";

/// Default request timeout.
const TIMEOUT: Duration = Duration::from_secs(30);

/// Errors produced while fetching a resource.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP request could not be built or sent.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The server answered with a non-success status code.
    #[error("HTTP error: {0}")]
    Status(reqwest::StatusCode),
    /// A `data:` URL could not be decoded.
    #[error("invalid data URL: {0}")]
    DataUrl(String),
    /// A filesystem path could not be read.
    #[error("file error: {0}")]
    File(#[from] std::io::Error),
    /// The fetched bytes were not valid UTF-8.
    #[error("response was not valid UTF-8")]
    Encoding,
}

/// Fetch a URL and return its body as raw bytes.
///
/// # Errors
///
/// Returns a [`FetchError`] if the resource cannot be retrieved or decoded.
pub fn fetch(url: &str) -> Result<Vec<u8>, FetchError> {
    if let Some(rest) = url.strip_prefix("data:") {
        return decode_data_url(rest);
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        let client = reqwest::blocking::Client::builder()
            .timeout(TIMEOUT)
            .build()?;
        let response = client.get(url).header("User-Agent", USER_AGENT).send()?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        return Ok(response.bytes()?.to_vec());
    }
    let path = url.strip_prefix("file://").unwrap_or(url);
    Ok(fs::read(path)?)
}

/// Fetch a URL and return its body as text.
///
/// # Errors
///
/// Returns a [`FetchError`] if the resource cannot be retrieved, decoded,
/// or is not valid UTF-8.
pub fn fetch_text(url: &str) -> Result<String, FetchError> {
    String::from_utf8(fetch(url)?).map_err(|_| FetchError::Encoding)
}

/// Decode the payload of a `data:` URL (the part after the scheme).
///
/// `data:[<mediatype>][;base64],<data>`
fn decode_data_url(rest: &str) -> Result<Vec<u8>, FetchError> {
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| FetchError::DataUrl("missing ','".to_string()))?;
    if meta.ends_with(";base64") {
        BASE64
            .decode(payload)
            .map_err(|e| FetchError::DataUrl(e.to_string()))
    } else {
        // Percent-decoding is deliberately minimal: only %XX escapes.
        let mut out = Vec::with_capacity(payload.len());
        let bytes = payload.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'%' {
                let hex = payload
                    .get(i + 1..i + 3)
                    .ok_or_else(|| FetchError::DataUrl("truncated escape".to_string()))?;
                let byte = u8::from_str_radix(hex, 16)
                    .map_err(|e| FetchError::DataUrl(e.to_string()))?;
                out.push(byte);
                i += 3;
            } else {
                out.push(bytes[i]);
                i += 1;
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_base64() {
        let bytes = fetch("data:text/plain;base64,aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn data_url_plain() {
        let text = fetch_text("data:,hello%20world").unwrap();
        assert_eq!(text, "hello world");
    }

    #[test]
    fn data_url_without_comma_is_invalid() {
        assert!(matches!(fetch("data:nope"), Err(FetchError::DataUrl(_))));
    }
}
