//! # mkreadme Library
//!
//! Generates a README for a source file by sending the file, its folder tree
//! and (optionally) the current README to a chat completion API.
//!
//! The pieces can also be used on their own:
//!
//! - [`build_tree`] walks a folder into a [`TreeNode`] hierarchy
//! - [`render_tree`] turns that hierarchy into an ASCII tree
//! - [`build_prompt`] assembles the generation prompt
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mkreadme::{Config, run_mkreadme};
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = Config::new(PathBuf::from("src/main.rs"), PathBuf::from("README.md"));
//!     config.model = Some("gpt-4".to_string());
//!     run_mkreadme(config).await
//! }
//! ```
//!
//! ### Rendering a folder tree
//!
//! ```rust,no_run
//! use mkreadme::{TreeOptions, build_tree, render_tree};
//! use std::path::Path;
//!
//! let report = build_tree(Path::new("."), &TreeOptions::default()).unwrap();
//! print!("{}", render_tree(&report.root));
//! ```

pub mod cli;
pub mod openai;
pub mod printer;
pub mod prompt;
pub mod settings;
pub mod source;
pub mod tree;
pub mod utils;
pub mod writer;

pub use cli::Config;
pub use openai::{GenerateError, OpenAiClient, ReadmeGenerator};
pub use printer::render_tree;
pub use prompt::{PromptInput, build_prompt};
pub use tree::{BuildReport, SkippedEntry, TreeError, TreeNode, TreeOptions, build_tree};
pub use writer::ReadmeWriter;

use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use settings::{NoPrompter, Overrides, Prompter, Settings, StdinPrompter, resolve_credentials};
use std::path::{Path, PathBuf};
use tokio::fs;

/// The prompt for one run and the rendered tree inside it.
#[derive(Debug)]
pub struct PreparedPrompt {
    pub prompt: String,
    pub tree: String,
}

/// Generate a README for the configured target
pub async fn run_mkreadme(config: Config) -> Result<()> {
    let prepared = prepare_prompt(&config).await?;

    if config.dry_run {
        print!("{}", prepared.prompt);
        return Ok(());
    }

    let overrides = Overrides {
        api_key: config.api_key.clone(),
        model: config.model.clone(),
        base_url: config.base_url.clone(),
    }
    .with_env();

    let settings_path = Settings::config_path();
    let mut prompter: Box<dyn Prompter> = if config.no_input {
        Box::new(NoPrompter)
    } else {
        Box::new(StdinPrompter)
    };
    let creds = resolve_credentials(overrides, settings_path.as_deref(), prompter.as_mut())?;

    let client = OpenAiClient::new(creds.api_key, creds.model, creds.base_url);
    write_generated(&config, &prepared.prompt, &client).await
}

/// Builds the prompt and writes whatever `generator` produces for it.
pub async fn generate_with<G: ReadmeGenerator>(config: &Config, generator: &G) -> Result<()> {
    let prepared = prepare_prompt(config).await?;
    write_generated(config, &prepared.prompt, generator).await
}

async fn write_generated<G: ReadmeGenerator>(
    config: &Config,
    prompt: &str,
    generator: &G,
) -> Result<()> {
    info!("Creating README...");
    let content = generator
        .generate(prompt)
        .await
        .context("README generation failed")?;

    let mut writer = ReadmeWriter::create(&config.output_path).await?;
    writer.write_readme(&content).await?;
    writer.flush().await
}

/// Reads the target, walks its folder and assembles the prompt.
pub async fn prepare_prompt(config: &Config) -> Result<PreparedPrompt> {
    let (folder, source) = resolve_target(&config.target)?;

    let report = build_tree(&folder, &config.tree)?;
    if !report.skipped.is_empty() {
        warn!(
            "Skipped {} unreadable entries under {}",
            report.skipped.len(),
            folder.display()
        );
    }
    let tree = render_tree(&report.root);
    debug!("Folder structure:\n{tree}");

    let previous_readme = if config.reset {
        None
    } else {
        read_previous_readme(&config.output_path).await?
    };

    let prompt = build_prompt(&PromptInput {
        source: source.as_ref(),
        tree: &tree,
        previous_readme: previous_readme.as_deref(),
        language: &config.language,
    });

    Ok(PreparedPrompt { prompt, tree })
}

/// Splits the target into the folder to walk and the file to document.
fn resolve_target(target: &Path) -> Result<(PathBuf, Option<source::SourceFile>)> {
    if !target.exists() {
        bail!("Target does not exist: {}", target.display());
    }
    if target.is_dir() {
        info!("Selected folder: {}", target.display());
        return Ok((target.to_path_buf(), None));
    }

    info!("Selected file: {}", target.display());
    let source = source::read_source(target)?;
    let folder = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((folder, Some(source)))
}

async fn read_previous_readme(path: &Path) -> Result<Option<String>> {
    let exists = fs::try_exists(path)
        .await
        .with_context(|| format!("Failed to check for existing README: {}", path.display()))?;
    if !exists {
        return Ok(None);
    }
    debug!("Using existing README as reference: {}", path.display());
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read existing README: {}", path.display()))?;
    Ok(Some(content))
}
