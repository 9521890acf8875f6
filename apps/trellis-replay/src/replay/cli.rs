use super::logging::LogFormat;
use clap::ArgAction;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "trellis-replay",
    version,
    about = "Activate a server-rendered page headlessly and replay user input against it",
    long_about = "Loads an HTML page, binds its interactive widgets, replays an optional \
                  JSON script of clicks, key presses, scrolls and clock advances, then \
                  writes the resulting markup.\n\n\
                  With --summary the activation summary and per-step outcomes are \
                  printed as JSON; the markup then only goes to --output."
)]
pub(crate) struct Cli {
    /// HTML page to load.
    #[arg(value_name = "PAGE")]
    pub page: PathBuf,

    /// JSON array of replay steps.
    #[arg(long, value_name = "FILE")]
    pub script: Option<PathBuf>,

    /// TOML page configuration.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address the page is treated as served from (overrides the config).
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Write the final markup here instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the activation summary and step outcomes as JSON.
    #[arg(long)]
    pub summary: bool,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "text")]
    pub log_format: LogFormat,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
