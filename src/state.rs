//! Session state owned by the composer

use crate::data_url::DataUrl;

/// Everything the user has supplied so far.
///
/// Both fields are inputs to the rendered composition; nothing is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositionState {
    /// The uploaded bottom-panel image, if any
    pub image: Option<DataUrl>,
    /// Raw handle text as typed
    pub handle: String,
}

impl CompositionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the uploaded image, dropping any previous one.
    pub fn set_image(&mut self, image: DataUrl) {
        self.image = Some(image);
    }

    /// Store the handle verbatim.
    pub fn set_handle(&mut self, text: impl Into<String>) {
        self.handle = text.into();
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// The label shown over the bottom panel, if one should be shown
    pub fn display_handle(&self) -> Option<String> {
        display_handle(&self.handle)
    }
}

/// Normalize a handle for display: `None` when empty, otherwise prefixed with
/// `@` unless it already is.
pub fn display_handle(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else if raw.starts_with('@') {
        Some(raw.to_string())
    } else {
        Some(format!("@{}", raw))
    }
}
