use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};

/// Writes generated README text to its destination.
pub struct ReadmeWriter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl ReadmeWriter {
    pub async fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create dir: {}", parent.display()))?;
        }
        let file = File::create(path)
            .await
            .with_context(|| format!("Failed to create file: {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    pub async fn write_readme(&mut self, content: &str) -> Result<()> {
        debug!("Writing {} bytes to {}", content.len(), self.path.display());

        self.writer
            .write_all(content.as_bytes())
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        if !content.ends_with('\n') {
            self.writer
                .write_all(b"\n")
                .await
                .with_context(|| format!("Failed to write {}", self.path.display()))?;
        }
        Ok(())
    }

    pub async fn flush(&mut self) -> Result<()> {
        self.writer.flush().await.context("Failed to flush output")?;
        info!("File {} created successfully", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn it_appends_trailing_newline() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("README.md");

        let mut writer = ReadmeWriter::create(&path).await?;
        writer.write_readme("# Title").await?;
        writer.flush().await?;

        assert_eq!(fs::read_to_string(&path).await?, "# Title\n");
        Ok(())
    }

    #[tokio::test]
    async fn it_creates_parent_directories() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("docs/out/README.md");

        let mut writer = ReadmeWriter::create(&path).await?;
        writer.write_readme("body\n").await?;
        writer.flush().await?;

        assert_eq!(fs::read_to_string(&path).await?, "body\n");
        Ok(())
    }
}
