/// Reading a selected file into a data URL

use std::path::Path;

use async_trait::async_trait;

use crate::data_url::DataUrl;
use crate::{Error, Result};

/// Produces a self-contained data URL for a selected file.
#[async_trait]
pub trait FileReader: Send + Sync {
    async fn read_as_data_url(&self, path: &Path) -> Result<DataUrl>;
}

/// Reads from the local filesystem without blocking the runtime
pub struct FsFileReader;

#[async_trait]
impl FileReader for FsFileReader {
    async fn read_as_data_url(&self, path: &Path) -> Result<DataUrl> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::ReadError(format!("{}: {}", path.display(), e)))?;
        Ok(DataUrl::sniffed(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_file_with_sniffed_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.bin");
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([9, 9, 9, 255]));
        img.save_with_format(&path, image::ImageFormat::Png).unwrap();

        let url = FsFileReader.read_as_data_url(&path).await.unwrap();
        assert_eq!(url.mime(), "image/png");
        assert_eq!(url.decode().unwrap(), std::fs::read(&path).unwrap());
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let err = FsFileReader
            .read_as_data_url(Path::new("/definitely/not/here.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ReadError(_)));
    }
}
