//! Durable storage for product images, served back under `/uploads`.

use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Public URL prefix the upload directory is mounted under.
pub const UPLOAD_URL_PREFIX: &str = "/uploads";

const MAX_NAME_ATTEMPTS: i64 = 16;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to write upload {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("could not find a free file name in {0}")]
    NameExhausted(String),
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` as `<unix-millis><ext>` and return its public path.
    pub async fn save(&self, original_name: Option<&str>, bytes: &[u8]) -> Result<String, UploadError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| self.write_error(&self.dir, source))?;

        let ext = extension_of(original_name.unwrap_or_default());
        let millis = Utc::now().timestamp_millis();

        // Same-millisecond uploads bump the stamp instead of overwriting.
        for bump in 0..MAX_NAME_ATTEMPTS {
            let file_name = format!("{}{}", millis + bump, ext);
            let path = self.dir.join(&file_name);

            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(self.write_error(&path, source)),
            };
            file.write_all(bytes)
                .await
                .map_err(|source| self.write_error(&path, source))?;
            file.flush()
                .await
                .map_err(|source| self.write_error(&path, source))?;

            tracing::debug!("Stored upload {} ({} bytes)", path.display(), bytes.len());
            return Ok(format!("{}/{}", UPLOAD_URL_PREFIX, file_name));
        }

        Err(UploadError::NameExhausted(self.dir.display().to_string()))
    }

    fn write_error(&self, path: &Path, source: std::io::Error) -> UploadError {
        UploadError::Write {
            path: path.display().to_string(),
            source,
        }
    }
}

/// `.ext` of the client file name, restricted to ASCII alphanumerics.
fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 10 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_sanitised() {
        assert_eq!(extension_of("vase.JPG"), ".jpg");
        assert_eq!(extension_of("archive.tar.gz"), ".gz");
        assert_eq!(extension_of("noext"), "");
        assert_eq!(extension_of("../../etc/passwd"), "");
        assert_eq!(extension_of("evil.p/hp"), "");
    }

    #[tokio::test]
    async fn saves_distinct_files_in_same_millisecond() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let first = store.save(Some("a.png"), b"one").await.unwrap();
        let second = store.save(Some("b.png"), b"two").await.unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with("/uploads/") && first.ends_with(".png"));

        let name = first.trim_start_matches("/uploads/");
        let written = tokio::fs::read(dir.path().join(name)).await.unwrap();
        assert_eq!(written, b"one");
    }
}
