//! Loading the selected source file.

use crate::utils::get_language_tag;
use anyhow::{Context, Result, bail};
use content_inspector::{ContentType, inspect};
use log::debug;
use memmap2::MmapOptions;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str;

/// A text file selected for documentation.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub language: &'static str,
    pub text: String,
}

impl SourceFile {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Reads `path` as text. Binary files are rejected.
pub fn read_source(path: &Path) -> Result<SourceFile> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;

    let len = file
        .metadata()
        .with_context(|| format!("Failed to stat file: {}", path.display()))?
        .len();

    // Mapping an empty file fails on some platforms.
    let text = if len == 0 {
        debug!("File '{}' is empty", path.display());
        String::new()
    } else {
        let mmap = unsafe {
            MmapOptions::new()
                .map(&file)
                .with_context(|| format!("Failed to mmap file: {}", path.display()))?
        };

        let sample_size = std::cmp::min(8192, mmap.len());
        if inspect(&mmap[..sample_size]) == ContentType::BINARY {
            bail!("Refusing to document binary file: {}", path.display());
        }

        match str::from_utf8(&mmap) {
            Ok(text) => text.to_owned(),
            Err(_) => {
                debug!("Invalid UTF-8 in {}, decoding lossily", path.display());
                String::from_utf8_lossy(&mmap).into_owned()
            }
        }
    };

    Ok(SourceFile {
        path: path.to_path_buf(),
        language: get_language_tag(path),
        text,
    })
}
