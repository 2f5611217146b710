//! Collaborators of the composer: file reading, remote assets, downloads and
//! notifications
//!
//! Each surface is a trait so tests (and other front ends) can swap in
//! deterministic implementations; `Platform::defaults` wires up the ones the
//! CLI uses.

pub mod assets;
pub mod download;
pub mod file_reader;
pub mod notify;

use std::sync::Arc;

pub use assets::{AssetLoader, StaticAssets};
#[cfg(feature = "http")]
pub use assets::HttpAssetLoader;
pub use download::{DirectorySink, DownloadSink, RecordingSink};
pub use file_reader::{FileReader, FsFileReader};
pub use notify::{LogNotifier, Notification, Notifier, RecordingNotifier, Severity};

use crate::rendering::SoftwareRasterizer;
use crate::{ComposerConfig, Rasterizer};

/// The set of collaborators a `Composer` talks to
#[derive(Clone)]
pub struct Platform {
    pub file_reader: Arc<dyn FileReader>,
    pub rasterizer: Arc<dyn Rasterizer>,
    pub notifier: Arc<dyn Notifier>,
    pub downloads: Arc<dyn DownloadSink>,
}

impl Platform {
    /// Filesystem reads, software rasterization, log notifications and
    /// downloads into `config.download_dir`.
    pub fn defaults(config: &ComposerConfig) -> Self {
        Self {
            file_reader: Arc::new(FsFileReader),
            rasterizer: Arc::new(SoftwareRasterizer::new(default_assets(config))),
            notifier: Arc::new(LogNotifier),
            downloads: Arc::new(DirectorySink::new(config.download_dir.clone())),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_downloads(mut self, downloads: Arc<dyn DownloadSink>) -> Self {
        self.downloads = downloads;
        self
    }

    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.rasterizer = rasterizer;
        self
    }
}

#[cfg(feature = "http")]
fn default_assets(config: &ComposerConfig) -> Arc<dyn AssetLoader> {
    Arc::new(HttpAssetLoader::new(&config.user_agent, config.timeout()))
}

#[cfg(not(feature = "http"))]
fn default_assets(_config: &ComposerConfig) -> Arc<dyn AssetLoader> {
    Arc::new(StaticAssets::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_methods_replace_surfaces() {
        let notifier = Arc::new(RecordingNotifier::new());
        let platform =
            Platform::defaults(&ComposerConfig::default()).with_notifier(notifier.clone());
        platform.notifier.notify(Notification::info("hello"));
        assert_eq!(notifier.messages(), vec![(Severity::Info, "hello".to_string())]);
    }
}
