//! Stored settings and credential resolution.
//!
//! Settings live in `~/.config/mkreadme/config.toml`. The API key and model
//! are resolved in this order: explicit argument, environment, stored
//! setting, interactive prompt. Values entered at the prompt are saved back.

use anyhow::{Context, Result, bail};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::openai::SUGGESTED_MODELS;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const MODEL_ENV: &str = "MKREADME_MODEL";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_key: Option<String>,
    pub model: Option<String>,
    /// Base URL of an OpenAI-compatible API
    pub base_url: Option<String>,
}

impl Settings {
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("mkreadme"))
    }

    /// Get the settings file path (~/.config/mkreadme/config.toml)
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.toml"))
    }

    /// Loads settings from `path`, or defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings file at {}", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create dir: {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write settings: {}", path.display()))?;
        info!("Saved settings to {}", path.display());
        Ok(())
    }
}

/// Asks the user for missing values.
pub trait Prompter {
    fn ask(&mut self, question: &str) -> Result<Option<String>>;
}

/// Reads answers from stdin, writing questions to stderr.
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        let mut stderr = io::stderr().lock();
        write!(stderr, "{question} ")?;
        stderr.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let answer = line.trim();
        Ok((!answer.is_empty()).then(|| answer.to_string()))
    }
}

/// Never answers; used with `--no-input`.
pub struct NoPrompter;

impl Prompter for NoPrompter {
    fn ask(&mut self, _question: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
}

/// Values that outrank the settings file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

impl Overrides {
    /// Fills anything not given explicitly from the environment.
    pub fn with_env(self) -> Self {
        self.with_env_from(|name| std::env::var(name).ok())
    }

    /// Like [`Overrides::with_env`], reading variables through `lookup`.
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        self.api_key = self.api_key.or_else(|| var(API_KEY_ENV));
        self.model = self.model.or_else(|| var(MODEL_ENV));
        self
    }
}

/// Resolves credentials, prompting for and persisting whatever is missing.
pub fn resolve_credentials(
    overrides: Overrides,
    settings_path: Option<&Path>,
    prompter: &mut dyn Prompter,
) -> Result<Credentials> {
    let mut settings = match settings_path {
        Some(path) => Settings::load_from(path)?,
        None => Settings::default(),
    };
    let mut dirty = false;

    let api_key = match overrides.api_key.or_else(|| settings.api_key.clone()) {
        Some(key) => key,
        None => {
            let Some(key) = prompter.ask("Enter your OpenAI API key:")? else {
                bail!(
                    "No API key entered! Pass --api-key, set {API_KEY_ENV}, or enter it when prompted."
                );
            };
            settings.api_key = Some(key.clone());
            dirty = true;
            key
        }
    };

    let model = match overrides.model.or_else(|| settings.model.clone()) {
        Some(model) => model,
        None => {
            let Some(model) = ask_model(prompter)? else {
                bail!(
                    "No model selected! Pass --model, set {MODEL_ENV}, or select one when prompted."
                );
            };
            settings.model = Some(model.clone());
            dirty = true;
            model
        }
    };

    if dirty {
        if let Some(path) = settings_path {
            settings.save_to(path)?;
        }
    }

    Ok(Credentials {
        api_key,
        model,
        base_url: overrides.base_url.or(settings.base_url),
    })
}

fn ask_model(prompter: &mut dyn Prompter) -> Result<Option<String>> {
    let choices: Vec<String> = SUGGESTED_MODELS
        .iter()
        .enumerate()
        .map(|(i, m)| format!("{}) {m}", i + 1))
        .collect();
    let question = format!(
        "Select your OpenAI model [{}] or type a model name:",
        choices.join(", ")
    );

    Ok(prompter.ask(&question)?.map(|answer| {
        answer
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| SUGGESTED_MODELS.get(i))
            .map_or(answer, |m| m.to_string())
    }))
}
