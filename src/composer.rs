//! The composition view: owns the session state, keeps the preview frame
//! rendered, and runs the upload and export operations.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::platform::{DownloadSink, Notification, Platform};
use crate::rendering::{self, encode_png, Frame};
use crate::state::CompositionState;
use crate::{ComposerConfig, Error, RasterOptions, Rasterizer, Result};

pub const UPLOADED_MESSAGE: &str = "Image uploaded successfully!";
pub const GENERATING_MESSAGE: &str = "Generating your Jelly...";
pub const DOWNLOADED_MESSAGE: &str = "Your Jelly has been downloaded!";
pub const FAILED_MESSAGE: &str = "Failed to generate image. Please try again.";

/// How an export attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// No preview was mounted; nothing happened
    Skipped,
    /// The PNG was handed to the download sink
    Downloaded(PathBuf),
    /// Rasterizing, encoding or saving failed; the user was notified
    Failed,
}

pub struct Composer {
    config: ComposerConfig,
    platform: Platform,
    state: CompositionState,
    /// The mounted preview; `None` while unmounted
    preview: Option<Arc<Frame>>,
}

impl Composer {
    /// Create a composer with a mounted preview.
    pub fn new(config: ComposerConfig, platform: Platform) -> Result<Self> {
        config.validate()?;
        let mut composer = Self {
            config,
            platform,
            state: CompositionState::new(),
            preview: None,
        };
        composer.mount();
        Ok(composer)
    }

    pub fn with_defaults(config: ComposerConfig) -> Result<Self> {
        let platform = Platform::defaults(&config);
        Self::new(config, platform)
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    pub fn state(&self) -> &CompositionState {
        &self.state
    }

    /// The currently rendered preview, if mounted
    pub fn preview(&self) -> Option<&Frame> {
        self.preview.as_deref()
    }

    pub fn is_mounted(&self) -> bool {
        self.preview.is_some()
    }

    /// Render the preview from the current state and make it the export target.
    pub fn mount(&mut self) {
        self.preview = Some(Arc::new(rendering::render(&self.state, &self.config)));
    }

    pub fn unmount(&mut self) {
        self.preview = None;
    }

    fn rerender(&mut self) {
        if self.is_mounted() {
            self.mount();
        }
    }

    /// Read the selected file and make it the bottom image.
    ///
    /// `None` means the picker was dismissed. Unreadable files leave the state
    /// untouched and are only logged. Returns whether the image was replaced.
    pub async fn upload_image(&mut self, selection: Option<&Path>) -> bool {
        let Some(path) = selection else {
            return false;
        };
        match self.platform.file_reader.read_as_data_url(path).await {
            Ok(data) => {
                log::debug!("Uploaded {} as {}", path.display(), data.mime());
                self.state.set_image(data);
                self.rerender();
                self.platform.notifier.notify(Notification::success(UPLOADED_MESSAGE));
                true
            }
            Err(e) => {
                log::warn!("Ignoring unreadable upload: {}", e);
                false
            }
        }
    }

    /// Store the handle text verbatim and refresh the preview.
    pub fn set_handle(&mut self, text: impl Into<String>) {
        self.state.set_handle(text);
        self.rerender();
    }

    /// Rasterize the mounted preview and save it as the download file.
    ///
    /// The returned future owns a snapshot of the preview, so it can be
    /// spawned and run alongside other exports; later edits do not affect it.
    pub fn export(&self) -> impl Future<Output = ExportOutcome> + Send + 'static {
        let target = self.preview.clone();
        let rasterizer = Arc::clone(&self.platform.rasterizer);
        let downloads = Arc::clone(&self.platform.downloads);
        let notifier = Arc::clone(&self.platform.notifier);
        let options = self.config.export_options();
        let filename = self.config.download_filename.clone();

        async move {
            let Some(frame) = target else {
                log::debug!("Export skipped: preview not mounted");
                return ExportOutcome::Skipped;
            };

            notifier.notify(Notification::info(GENERATING_MESSAGE));
            match export_frame(frame, rasterizer, downloads, options, filename).await {
                Ok(path) => {
                    notifier.notify(Notification::success(DOWNLOADED_MESSAGE));
                    ExportOutcome::Downloaded(path)
                }
                Err(e) => {
                    notifier.notify(Notification::error(FAILED_MESSAGE));
                    log::error!("Download error: {}", e);
                    ExportOutcome::Failed
                }
            }
        }
    }
}

async fn export_frame(
    frame: Arc<Frame>,
    rasterizer: Arc<dyn Rasterizer>,
    downloads: Arc<dyn DownloadSink>,
    options: RasterOptions,
    filename: String,
) -> Result<PathBuf> {
    tokio::task::spawn_blocking(move || {
        let bitmap = rasterizer.rasterize(&frame, &options)?;
        let screenshot = encode_png(&bitmap)?;
        downloads.save(&filename, &screenshot.to_data_url())
    })
    .await
    .map_err(|e| Error::RenderError(format!("export task failed: {}", e)))?
}
