//! Corpus export download.

use std::path::Path;

use tracing::info;

use crate::error::Result;

/// Download `url` to `dest`, creating parent directories as needed.
/// An existing file is kept unless `force` is set.
pub async fn download(url: &str, dest: &Path, force: bool) -> Result<()> {
    if dest.exists() && !force {
        info!("{} already exists, skipping download", dest.display());
        return Ok(());
    }
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    info!("downloading {url}");
    let response = reqwest::get(url).await?.error_for_status()?;
    let bytes = response.bytes().await?;
    tokio::fs::write(dest, &bytes).await?;
    info!("saved {} bytes to {}", bytes.len(), dest.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn existing_file_is_kept_without_force() {
        let dir = std::env::temp_dir().join(format!("cabel-fetch-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let dest = dir.join("corpus.jsonl");
        tokio::fs::write(&dest, b"cached").await.unwrap();

        // URL is never touched when the file already exists
        download("http://invalid.invalid/corpus.jsonl", &dest, false)
            .await
            .unwrap();
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), b"cached");
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
