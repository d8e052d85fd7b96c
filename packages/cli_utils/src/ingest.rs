//! File ingestion.
//!
//! Reads a user-selected file (or stdin for `-`) fully into memory, as text
//! or bytes. Parsing is left to the caller.

use std::path::{Path, PathBuf};

use tokio::io::AsyncReadExt as _;

/// Path that selects standard input.
pub const STDIN_PATH: &str = "-";

/// Errors that can occur while reading input.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The path that was requested.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Reads the whole file at `path` as UTF-8 text. `-` reads standard input.
///
/// # Errors
///
/// Returns [`IngestError::Read`] if the file cannot be opened or is not
/// valid UTF-8.
pub async fn read_text(path: &Path) -> Result<String, IngestError> {
    let result = if path.as_os_str() == STDIN_PATH {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .map(|_| text)
    } else {
        tokio::fs::read_to_string(path).await
    };

    let text = result.map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    log::debug!("Read {} bytes from {}", text.len(), path.display());

    Ok(text)
}

/// Reads the whole file at `path` as raw bytes. `-` reads standard input.
///
/// # Errors
///
/// Returns [`IngestError::Read`] if the file cannot be opened.
pub async fn read_bytes(path: &Path) -> Result<Vec<u8>, IngestError> {
    let result = if path.as_os_str() == STDIN_PATH {
        let mut bytes = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut bytes)
            .await
            .map(|_| bytes)
    } else {
        tokio::fs::read(path).await
    };

    let bytes = result.map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    log::debug!("Read {} bytes from {}", bytes.len(), path.display());

    Ok(bytes)
}

/// Writes `text` to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`std::io::Error`] if the file cannot be written.
pub async fn write_text(path: &Path, text: &str) -> Result<(), std::io::Error> {
    tokio::fs::write(path, text).await?;
    log::info!("Wrote {} bytes to {}", text.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_and_writes_files() {
        let path = std::env::temp_dir().join(format!("data_tools_ingest_{}.json", std::process::id()));

        write_text(&path, "{\"features\":[]}").await.unwrap();
        let text = read_text(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.ok();

        assert_eq!(text, "{\"features\":[]}");
    }

    #[tokio::test]
    async fn reads_raw_bytes() {
        let path = std::env::temp_dir().join(format!("data_tools_bytes_{}.json", std::process::id()));

        tokio::fs::write(&path, b"{\"a\":\"\xc3\xa9\"}").await.unwrap();
        let bytes = read_bytes(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.ok();

        assert_eq!(bytes, "{\"a\":\"\u{e9}\"}".as_bytes());
        assert!(matches!(
            read_bytes(Path::new("/definitely/not/here.bin")).await,
            Err(IngestError::Read { .. })
        ));
    }

    #[tokio::test]
    async fn reports_missing_file() {
        let path = Path::new("/definitely/not/here.geojson");

        let err = read_text(path).await.unwrap_err();

        assert!(err.to_string().contains("/definitely/not/here.geojson"));
    }
}
