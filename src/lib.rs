//! Jelly with Wobbles
//!
//! Compose a two-panel "phone screenshot": a fixed top image of @wobbles and a
//! user-supplied bottom image, each with overlaid handle text, then export the
//! whole mockup as a PNG.
//!
//! # Features
//!
//! - **Explicit state**: `CompositionState` holds the uploaded image and handle
//! - **Renderable surface**: `rendering::render` turns state into a `Frame`
//!   display list that any `Rasterizer` can paint
//! - **Swappable collaborators**: file reading, notifications, downloads and
//!   remote assets are traits in `platform`
//!
//! # Example
//!
//! ```no_run
//! use jelly_wobbles::{Composer, ComposerConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ComposerConfig {
//!     download_dir: "out".into(),
//!     ..Default::default()
//! };
//!
//! let mut composer = Composer::with_defaults(config)?;
//! composer.upload_image(Some(std::path::Path::new("me.jpg"))).await;
//! composer.set_handle("alice");
//! let outcome = composer.export().await;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::time::Duration;

pub mod error;
pub use error::{Error, Result};

pub mod composer;
pub mod data_url;
pub mod platform;
pub mod rendering;
pub mod state;

pub use composer::{Composer, ExportOutcome};
pub use data_url::DataUrl;
pub use rendering::{Bitmap, Frame, FrameGeometry, RasterOptions};
pub use state::{display_handle, CompositionState};

/// Image shown in the top panel of every composition
pub const DEFAULT_TOP_IMAGE_URL: &str = "https://pbs.twimg.com/media/G5ElK73XUAEWx6F?format=jpg&name=small";

/// Name every export is saved under
pub const DOWNLOAD_FILENAME: &str = "jelly-with-wobbles.png";

/// Configuration for a composer session
///
/// The defaults reproduce the published tool: the fixed top image, the fixed
/// download filename, and the current directory as the download location.
///
/// # Examples
///
/// ```
/// let cfg = jelly_wobbles::ComposerConfig::default();
/// assert_eq!(cfg.download_filename, "jelly-with-wobbles.png");
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ComposerConfig {
    /// URL of the top panel image
    pub top_image_url: String,
    /// File name used for exports
    pub download_filename: String,
    /// Directory exports are saved into
    pub download_dir: PathBuf,
    /// User agent sent when fetching remote assets
    pub user_agent: String,
    /// Timeout for remote asset requests in milliseconds
    pub timeout_ms: u64,
    /// Whether remote images are fetched at all
    pub fetch_remote: bool,
    /// Mockup dimensions
    pub frame: FrameGeometry,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            top_image_url: DEFAULT_TOP_IMAGE_URL.to_string(),
            download_filename: DOWNLOAD_FILENAME.to_string(),
            download_dir: PathBuf::from("."),
            user_agent: concat!("jelly-wobbles/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_ms: 30000,
            fetch_remote: true,
            frame: FrameGeometry::default(),
        }
    }
}

impl ComposerConfig {
    /// Reject configurations that could never export.
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.top_image_url).map_err(|e| {
            Error::ConfigError(format!("top image URL {:?}: {}", self.top_image_url, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::ConfigError(format!(
                "top image URL must be http(s), got {}",
                parsed.scheme()
            )));
        }
        if self.download_filename.trim().is_empty() {
            return Err(Error::ConfigError("download filename is empty".into()));
        }
        if self.download_filename.contains(['/', '\\']) {
            return Err(Error::ConfigError(format!(
                "download filename {:?} must not contain path separators",
                self.download_filename
            )));
        }
        if self.frame.width == 0 || self.frame.height == 0 {
            return Err(Error::ConfigError("frame must have a non-zero size".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Options used for exports under this configuration
    pub fn export_options(&self) -> RasterOptions {
        RasterOptions {
            use_cors: self.fetch_remote,
            ..RasterOptions::export()
        }
    }
}

/// Renders a frame into a bitmap
///
/// Implementations must be shareable across tasks; exports run on the
/// blocking pool.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, frame: &Frame, options: &RasterOptions) -> Result<Bitmap>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ComposerConfig::default();
        assert_eq!(config.top_image_url, DEFAULT_TOP_IMAGE_URL);
        assert_eq!(config.frame.width, 360);
        assert_eq!(config.frame.height, 720);
        assert!(config.fetch_remote);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_url = ComposerConfig {
            top_image_url: "not a url".into(),
            ..Default::default()
        };
        assert!(matches!(bad_url.validate(), Err(Error::ConfigError(_))));

        let bad_scheme = ComposerConfig {
            top_image_url: "file:///tmp/top.jpg".into(),
            ..Default::default()
        };
        assert!(bad_scheme.validate().is_err());

        let bad_name = ComposerConfig {
            download_filename: "../x.png".into(),
            ..Default::default()
        };
        assert!(bad_name.validate().is_err());
    }

    #[test]
    fn test_export_options_follow_fetch_flag() {
        let offline = ComposerConfig {
            fetch_remote: false,
            ..Default::default()
        };
        let opts = offline.export_options();
        assert!(!opts.use_cors);
        assert_eq!(opts.scale, 2);
        assert!(opts.allow_taint);
        assert!(!opts.logging);
        assert!(ComposerConfig::default().export_options().use_cors);
    }
}
