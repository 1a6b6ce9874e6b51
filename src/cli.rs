use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use std::path::{Path, PathBuf};

use crate::tree::TreeOptions;

pub const DEFAULT_README: &str = "README.md";
pub const DEFAULT_LANGUAGE: &str = "English";

pub struct Config {
    /// Selected source file, or a folder.
    pub target: PathBuf,
    pub output_path: PathBuf,
    /// Ignore the existing README instead of using it as a reference.
    pub reset: bool,
    pub language: String,
    pub tree: TreeOptions,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub dry_run: bool,
    pub no_input: bool,
    pub verbosity: u8,
}

impl Config {
    pub fn new(target: PathBuf, output_path: PathBuf) -> Self {
        Self {
            target,
            output_path,
            reset: false,
            language: DEFAULT_LANGUAGE.to_string(),
            tree: TreeOptions::default(),
            api_key: None,
            model: None,
            base_url: None,
            dry_run: false,
            no_input: false,
            verbosity: 0,
        }
    }
}

pub fn command() -> Command {
    Command::new("mkreadme")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generates a README for a source file from its content and folder tree")
        .arg(
            Arg::new("target")
                .value_name("TARGET")
                .help("Source file (or folder) to document")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Sets the output README path [default: ./README.md]")
                .num_args(1),
        )
        .arg(
            Arg::new("reset")
                .long("reset")
                .help("Do not use the existing README as a reference")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("api-key")
                .long("api-key")
                .value_name("KEY")
                .help("OpenAI API key (overrides OPENAI_API_KEY and stored settings)")
                .num_args(1),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("MODEL")
                .help("Chat model to use, e.g. gpt-4")
                .num_args(1),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .value_name("URL")
                .help("Base URL of an OpenAI-compatible API")
                .num_args(1),
        )
        .arg(
            Arg::new("language")
                .short('l')
                .long("language")
                .value_name("LANG")
                .help("Language the README is written in")
                .default_value(DEFAULT_LANGUAGE),
        )
        .arg(
            Arg::new("max-depth")
                .long("max-depth")
                .value_name("N")
                .help("Stop descending into folders below this depth")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("all")
                .short('a')
                .long("all")
                .help("Include hidden and gitignored entries in the folder tree")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Print the prompt instead of calling the API")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-input")
                .long("no-input")
                .help("Never prompt for missing settings")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log verbosity (-v info, -vv debug)")
                .action(ArgAction::Count),
        )
}

pub fn parse_args() -> Result<Config> {
    let matches = command().get_matches();
    let cwd = std::env::current_dir()?;
    config_from_matches(&matches, &cwd)
}

pub fn config_from_matches(matches: &ArgMatches, cwd: &Path) -> Result<Config> {
    let target = matches
        .get_one::<String>("target")
        .map(PathBuf::from)
        .context("TARGET is required")?;

    let output_path = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| cwd.join(DEFAULT_README));

    let show_all = matches.get_flag("all");

    Ok(Config {
        target,
        output_path,
        reset: matches.get_flag("reset"),
        language: matches
            .get_one::<String>("language")
            .cloned()
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        tree: TreeOptions {
            max_depth: matches.get_one::<usize>("max-depth").copied(),
            show_hidden: show_all,
            respect_gitignore: !show_all,
        },
        api_key: matches.get_one::<String>("api-key").cloned(),
        model: matches.get_one::<String>("model").cloned(),
        base_url: matches.get_one::<String>("base-url").cloned(),
        dry_run: matches.get_flag("dry-run"),
        no_input: matches.get_flag("no-input"),
        verbosity: matches.get_count("verbose"),
    })
}
