//! Subscriber setup for the replay binary.
//!
//! `TRELLIS_LOG` takes `EnvFilter` directives and wins over `-v`. Output goes
//! to stderr so stdout stays free for markup and the JSON summary.

use anyhow::Context as _;
use clap::ValueEnum;
use std::io;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub(crate) const FILTER_ENV: &str = "TRELLIS_LOG";

const WORKSPACE_TARGETS: [&str; 8] = [
    "trellis_replay",
    "tr_core",
    "tr_css",
    "tr_dom",
    "tr_events",
    "tr_html",
    "tr_runtime",
    "tr_widgets",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogFormat {
    #[default]
    Text,
    Json,
}

pub(crate) fn level_for_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Workspace crates at the requested level, everything else at `warn`.
pub(crate) fn default_directives(verbosity: u8) -> String {
    let level = level_for_verbosity(verbosity).as_str().to_ascii_lowercase();
    let mut directives = String::from("warn");
    for target in WORKSPACE_TARGETS {
        directives.push(',');
        directives.push_str(target);
        directives.push('=');
        directives.push_str(&level);
    }
    directives
}

pub(crate) fn init(verbosity: u8, format: LogFormat) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(io::stderr))
            .try_init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(false)
                    .without_time(),
            )
            .try_init(),
    }
    .context("failed to install the log subscriber")
}
