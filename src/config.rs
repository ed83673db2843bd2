use serde::{Deserialize, Serialize};
use std::time::Duration;

/// ANU quantum random number generator, JSON interface.
pub const DEFAULT_ENTROPY_URL: &str = "https://qrng.anu.edu.au/API/jsonI.php";

/// Upper bound on a single entropy request before falling back.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for reaching the entropy provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntropyConfig {
    /// Endpoint queried with `length` and `type` parameters.
    pub base_url: String,
    /// Whole-request timeout (connect, send, and read body).
    pub timeout: Duration,
}

impl Default for EntropyConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ENTROPY_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl EntropyConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
