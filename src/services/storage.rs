use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::config::StorageConfig;

/// URL prefix under which rendered files are served
pub const RENDERS_ROUTE: &str = "renders";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid public base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub filename: String,
    pub path: PathBuf,
    pub url: String,
}

/// Local directory of rendered images, published under `/renders`
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    base_url: Url,
}

impl FileStorage {
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let mut base_url = Url::parse(&config.public_base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { dir: config.render_dir.clone(), base_url })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn public_url(&self, filename: &str) -> Result<String, StorageError> {
        Ok(self.base_url.join(&format!("{}/{}", RENDERS_ROUTE, filename))?.to_string())
    }

    /// Write a PNG under a fresh `render_<uuid>.png` name
    pub async fn save_png(&self, bytes: &[u8]) -> Result<StoredFile, StorageError> {
        self.save("render", "png", bytes).await
    }

    /// Write `bytes` as `<prefix>_<uuid>.<extension>`
    pub async fn save(&self, prefix: &str, extension: &str, bytes: &[u8]) -> Result<StoredFile, StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let filename = format!("{}_{}.{}", prefix, Uuid::new_v4().simple(), extension);
        let path = self.dir.join(&filename);
        tokio::fs::write(&path, bytes).await?;
        let url = self.public_url(&filename)?;
        tracing::info!("Stored {} ({} bytes)", filename, bytes.len());
        Ok(StoredFile { filename, path, url })
    }

    /// Delete the file a public URL points at. `Ok(false)` when the URL is not
    /// one of ours or the file is already gone.
    pub async fn remove_by_url(&self, url: &str) -> Result<bool, StorageError> {
        let Some(filename) = self.filename_for(url) else {
            return Ok(false);
        };
        match tokio::fs::remove_file(self.dir.join(filename)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Map a public URL back to a bare file name inside the render directory
    fn filename_for<'a>(&self, url: &'a str) -> Option<&'a str> {
        let prefix = self.public_url("").ok()?;
        let filename = url.strip_prefix(prefix.as_str())?;
        let safe = !filename.is_empty()
            && !filename.contains(['/', '\\'])
            && filename != "."
            && filename != "..";
        safe.then_some(filename)
    }
}
