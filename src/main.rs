use anyhow::Result;
use log::LevelFilter;
use mkreadme::{cli::parse_args, run_mkreadme};

#[tokio::main]
async fn main() -> Result<()> {
    let config = parse_args()?;
    init_logger(config.verbosity);
    run_mkreadme(config).await
}

/// RUST_LOG takes precedence over the `-v` count.
fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
