//! Client for the remote quantum entropy provider.
//!
//! Every fetch is a single blocking GET with no retries and no caching. The
//! provider answers with a JSON envelope; anything other than a well-formed
//! envelope with `success: true` and exactly the requested number of values
//! is reported as an error for the caller to deal with.

use crate::config::EntropyConfig;
use crate::error::{ChainError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// Anything that can hand out externally sourced random values.
pub trait EntropySource: Send + Sync {
    /// `count` hex strings, each carrying 32 bits of entropy.
    fn fetch_hex_values(&self, count: usize) -> Result<Vec<String>>;

    /// `count` random bytes.
    fn fetch_byte_values(&self, count: usize) -> Result<Vec<u8>>;
}

impl<S: EntropySource + ?Sized> EntropySource for Box<S> {
    fn fetch_hex_values(&self, count: usize) -> Result<Vec<String>> {
        (**self).fetch_hex_values(count)
    }

    fn fetch_byte_values(&self, count: usize) -> Result<Vec<u8>> {
        (**self).fetch_byte_values(count)
    }
}

/// JSON envelope returned by the provider.
#[derive(Debug, Deserialize)]
struct QrngResponse<T> {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    length: usize,
    #[serde(default)]
    #[allow(dead_code)]
    size: Option<u32>,
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    success: bool,
}

/// HTTP client for the ANU QRNG JSON API.
pub struct QrngClient {
    http: reqwest::blocking::Client,
    config: EntropyConfig,
}

impl QrngClient {
    pub fn new(config: EntropyConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("qrchain/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &EntropyConfig {
        &self.config
    }

    fn request<T: DeserializeOwned>(&self, count: usize, params: &[(&str, &str)]) -> Result<Vec<T>> {
        if count == 0 {
            return Err(ChainError::InvalidCount(count));
        }
        let length = count.to_string();
        let mut query = vec![("length", length.as_str())];
        query.extend_from_slice(params);

        debug!(url = %self.config.base_url, count, "requesting entropy");
        let body = self
            .http
            .get(&self.config.base_url)
            .query(&query)
            .send()?
            .error_for_status()?
            .text()?;
        decode_envelope(&body, count)
    }
}

impl EntropySource for QrngClient {
    fn fetch_hex_values(&self, count: usize) -> Result<Vec<String>> {
        let values: Vec<String> = self.request(count, &[("type", "hex16"), ("size", "32")])?;
        if let Some(bad) = values
            .iter()
            .find(|v| v.is_empty() || !v.chars().all(|c| c.is_ascii_hexdigit()))
        {
            return Err(ChainError::Decode(format!("not a hex value: {:?}", bad)));
        }
        Ok(values)
    }

    fn fetch_byte_values(&self, count: usize) -> Result<Vec<u8>> {
        self.request(count, &[("type", "uint8")])
    }
}

/// Parse a provider response body and check it carries `count` values.
fn decode_envelope<T: DeserializeOwned>(body: &str, count: usize) -> Result<Vec<T>> {
    let envelope: QrngResponse<T> =
        serde_json::from_str(body).map_err(|e| ChainError::Decode(e.to_string()))?;
    if !envelope.success {
        return Err(ChainError::Provider(format!(
            "request for {} value(s) refused (type={:?}, length={})",
            count, envelope.kind, envelope.length
        )));
    }
    if envelope.data.len() != count {
        return Err(ChainError::Decode(format!(
            "expected {} value(s), got {}",
            count,
            envelope.data.len()
        )));
    }
    Ok(envelope.data)
}

/// A source that never answers. Selected in offline mode; every block then
/// carries a fallback nonce.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unavailable;

impl EntropySource for Unavailable {
    fn fetch_hex_values(&self, _count: usize) -> Result<Vec<String>> {
        Err(ChainError::Provider("entropy source disabled".into()))
    }

    fn fetch_byte_values(&self, _count: usize) -> Result<Vec<u8>> {
        Err(ChainError::Provider("entropy source disabled".into()))
    }
}
