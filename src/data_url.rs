//! Self-contained `data:` URLs used to carry uploaded images and exports.
//!
//! Only the base64 flavour is produced and accepted, which is what a file
//! read always yields.

use std::fmt;
use std::str::FromStr;

use base64::Engine as _;

use crate::{Error, Result};

const BASE64_MARKER: &str = ";base64,";

/// Fallback type for content that is not a recognised image format
pub const OCTET_STREAM: &str = "application/octet-stream";

/// A `data:<mime>;base64,<payload>` string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    raw: String,
    mime_end: usize,
}

impl DataUrl {
    /// Encode raw bytes under the given MIME type.
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
        let raw = format!("data:{}{}{}", mime, BASE64_MARKER, payload);
        Self {
            mime_end: "data:".len() + mime.len(),
            raw,
        }
    }

    /// Encode raw bytes, sniffing the MIME type from their contents.
    pub fn sniffed(bytes: &[u8]) -> Self {
        Self::from_bytes(sniff_mime(bytes), bytes)
    }

    /// Validate a textual data URL.
    pub fn parse(s: &str) -> Result<Self> {
        let rest = s
            .strip_prefix("data:")
            .ok_or_else(|| Error::DecodeError("missing `data:` scheme".into()))?;
        let marker = rest
            .find(BASE64_MARKER)
            .ok_or_else(|| Error::DecodeError("only base64 data URLs are supported".into()))?;
        Ok(Self {
            raw: s.to_string(),
            mime_end: "data:".len() + marker,
        })
    }

    /// The declared MIME type (may be empty)
    pub fn mime(&self) -> &str {
        &self.raw["data:".len()..self.mime_end]
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The still-encoded payload after the base64 marker
    pub fn payload(&self) -> &str {
        &self.raw[self.mime_end + BASE64_MARKER.len()..]
    }

    /// Decode the payload back into bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(self.payload())
            .map_err(|e| Error::DecodeError(format!("invalid base64 payload: {}", e)))
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for DataUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Guess a MIME type from magic bytes.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(format) => format.to_mime_type(),
        Err(_) => OCTET_STREAM,
    }
}
