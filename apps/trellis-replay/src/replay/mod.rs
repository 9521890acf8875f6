//! Headless page replay: load, activate, drive, report.

mod charset;
mod cli;
mod logging;
mod script;

use anyhow::Context as _;
use clap::Parser;
use cli::Cli;
use serde::Serialize;
use std::fs;
use std::io;
use std::io::Write;
use std::path::Path;
use tr_runtime::ActivationSummary;
use tr_runtime::Page;
use tr_runtime::PageConfig;
use tracing::info;
use url::Url;

/// JSON printed by `--summary`.
#[derive(Debug, Serialize)]
struct ReplayReport {
    summary: ActivationSummary,
    steps: Vec<script::StepOutcome>,
    platform: Vec<String>,
}

pub(crate) fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_format)?;

    let bytes = fs::read(&cli.page)
        .with_context(|| format!("failed to read page {}", cli.page.display()))?;
    let source = charset::decode_page(&bytes);

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => PageConfig::default(),
    };
    if let Some(raw) = &cli.url {
        let url = Url::parse(raw).with_context(|| format!("invalid --url `{raw}`"))?;
        config.page_url = Some(url.into());
    }

    let steps = match &cli.script {
        Some(path) => script::load(path)?,
        None => Vec::new(),
    };

    let mut page = Page::from_html(&source, config);
    let report = page.activate();
    info!(
        page = %cli.page.display(),
        bound = report.total(),
        steps = steps.len(),
        "replaying"
    );
    let outcomes = script::replay(&mut page, &steps)?;

    let markup = page.html();
    match &cli.output {
        Some(path) => fs::write(path, &markup)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None if !cli.summary => write_stdout(&markup)?,
        None => {}
    }

    if cli.summary {
        let report = ReplayReport {
            summary: page.summary(),
            steps: outcomes,
            platform: page
                .platform()
                .actions()
                .iter()
                .map(ToString::to_string)
                .collect(),
        };
        let json = serde_json::to_string_pretty(&report).context("failed to encode summary")?;
        write_stdout(&json)?;
    }

    Ok(())
}

pub(crate) fn parse_config(source: &str) -> anyhow::Result<PageConfig> {
    toml::from_str(source).context("invalid page configuration")
}

fn load_config(path: &Path) -> anyhow::Result<PageConfig> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&source).with_context(|| format!("in {}", path.display()))
}

fn write_stdout(text: &str) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.write_all(b"\n"))
        .and_then(|()| stdout.flush())
        .context("failed to write to stdout")
}

#[cfg(test)]
mod tests;
