/// Loading remote images referenced by a frame

use std::collections::HashMap;
#[cfg(feature = "http")]
use std::time::Duration;

use crate::{Error, Result};

/// Fetches the raw bytes behind a URL. Called from blocking contexts only.
pub trait AssetLoader: Send + Sync {
    fn load(&self, url: &str) -> Result<Vec<u8>>;
}

/// Blocking HTTP loader.
///
/// A client is built per request so it is always created and dropped on the
/// calling (blocking) thread, never inside the async runtime.
#[cfg(feature = "http")]
pub struct HttpAssetLoader {
    user_agent: String,
    timeout: Duration,
}

#[cfg(feature = "http")]
impl HttpAssetLoader {
    pub fn new(user_agent: &str, timeout: Duration) -> Self {
        Self {
            user_agent: user_agent.to_string(),
            timeout,
        }
    }
}

#[cfg(feature = "http")]
impl AssetLoader for HttpAssetLoader {
    fn load(&self, url: &str) -> Result<Vec<u8>> {
        let fail = |reason: String| Error::AssetError {
            url: url.to_string(),
            reason,
        };
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.clone())
            .build()
            .map_err(|e| fail(format!("failed to build HTTP client: {}", e)))?;

        let res = client
            .get(url)
            .send()
            .map_err(|e| fail(format!("HTTP GET failed: {}", e)))?;
        let status = res.status();
        if !status.is_success() {
            return Err(fail(format!("HTTP status {}", status)));
        }
        let body = res
            .bytes()
            .map_err(|e| fail(format!("failed to read response body: {}", e)))?;
        log::debug!("Fetched {} ({} bytes)", url, body.len());
        Ok(body.to_vec())
    }
}

/// In-memory assets keyed by URL; unknown URLs fail to load.
#[derive(Default, Clone)]
pub struct StaticAssets {
    entries: HashMap<String, Vec<u8>>,
}

impl StaticAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.entries.insert(url.into(), bytes);
        self
    }
}

impl AssetLoader for StaticAssets {
    fn load(&self, url: &str) -> Result<Vec<u8>> {
        self.entries.get(url).cloned().ok_or_else(|| Error::AssetError {
            url: url.to_string(),
            reason: "not found".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_assets_serve_known_urls_only() {
        let assets = StaticAssets::new().with("https://img.test/a.png", vec![1, 2, 3]);
        assert_eq!(assets.load("https://img.test/a.png").unwrap(), vec![1, 2, 3]);
        assert!(matches!(
            assets.load("https://img.test/b.png"),
            Err(Error::AssetError { .. })
        ));
    }
}
