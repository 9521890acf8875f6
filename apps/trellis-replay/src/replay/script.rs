//! Replay scripts: a JSON array of user-input steps.
//!
//! ```json
//! [
//!   { "action": "click", "selector": ".tab-button", "index": 2 },
//!   { "action": "key", "key": "ArrowRight" },
//!   { "action": "advance", "ms": 5000 }
//! ]
//! ```

use anyhow::Context as _;
use serde::Deserialize;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tr_core::TrellisError;
use tr_core::TrellisResult;
use tr_dom::NodeId;
use tr_events::Platform;
use tr_runtime::Page;
use tr_widgets::DispatchOutcome;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", deny_unknown_fields)]
pub(crate) enum Step {
    Click {
        selector: String,
        #[serde(default)]
        index: usize,
    },
    /// Without a selector the key goes to the focused element.
    Key {
        key: String,
        selector: Option<String>,
        #[serde(default)]
        index: usize,
    },
    Submit {
        selector: String,
        #[serde(default)]
        index: usize,
    },
    Scroll {
        y: u32,
    },
    Intersect {
        selector: String,
        #[serde(default)]
        index: usize,
    },
    SetValue {
        selector: String,
        #[serde(default)]
        index: usize,
        value: String,
    },
    Advance {
        ms: u64,
    },
    /// Re-runs activation, binding anything new.
    Activate,
}

impl Step {
    pub(crate) fn action(&self) -> &'static str {
        match self {
            Self::Click { .. } => "click",
            Self::Key { .. } => "key",
            Self::Submit { .. } => "submit",
            Self::Scroll { .. } => "scroll",
            Self::Intersect { .. } => "intersect",
            Self::SetValue { .. } => "set_value",
            Self::Advance { .. } => "advance",
            Self::Activate => "activate",
        }
    }
}

/// What one step did to the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub(crate) struct StepOutcome {
    pub action: &'static str,
    pub listeners_invoked: usize,
    pub default_prevented: bool,
    pub timers_fired: usize,
    pub bound: usize,
}

impl StepOutcome {
    fn dispatched(action: &'static str, outcome: DispatchOutcome) -> Self {
        Self {
            action,
            listeners_invoked: outcome.listeners_invoked,
            default_prevented: outcome.default_prevented,
            ..Self::default()
        }
    }
}

pub(crate) fn parse(source: &str) -> anyhow::Result<Vec<Step>> {
    serde_json::from_str(source).context("replay script is not a valid step list")
}

pub(crate) fn load(path: &Path) -> anyhow::Result<Vec<Step>> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    parse(&source).with_context(|| format!("in {}", path.display()))
}

/// Runs `steps` in order, stopping at the first one that cannot be applied.
pub(crate) fn replay<P: Platform>(
    page: &mut Page<P>,
    steps: &[Step],
) -> TrellisResult<Vec<StepOutcome>> {
    let mut outcomes = Vec::with_capacity(steps.len());
    for (position, step) in steps.iter().enumerate() {
        let outcome = apply(page, step).map_err(|error| {
            TrellisError::new(
                "replay.step_failed",
                format!("step {} ({}): {error}", position + 1, step.action()),
            )
        })?;
        info!(
            step = position + 1,
            action = outcome.action,
            listeners = outcome.listeners_invoked,
            prevented = outcome.default_prevented,
            "step replayed"
        );
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

fn apply<P: Platform>(page: &mut Page<P>, step: &Step) -> TrellisResult<StepOutcome> {
    let action = step.action();
    let outcome = match step {
        Step::Click { selector, index } => {
            let node = resolve(page, selector, *index)?;
            StepOutcome::dispatched(action, page.click(node)?)
        }
        Step::Key {
            key,
            selector: Some(selector),
            index,
        } => {
            let node = resolve(page, selector, *index)?;
            StepOutcome::dispatched(action, page.key_down(node, key)?)
        }
        Step::Key {
            key,
            selector: None,
            ..
        } => StepOutcome::dispatched(action, page.key_down_focused(key)),
        Step::Submit { selector, index } => {
            let node = resolve(page, selector, *index)?;
            StepOutcome::dispatched(action, page.submit(node)?)
        }
        Step::Scroll { y } => StepOutcome::dispatched(action, page.scroll_to(*y)),
        Step::Intersect { selector, index } => {
            let node = resolve(page, selector, *index)?;
            StepOutcome::dispatched(action, page.intersect(node)?)
        }
        Step::SetValue {
            selector,
            index,
            value,
        } => {
            let node = resolve(page, selector, *index)?;
            page.set_value(node, value)?;
            StepOutcome {
                action,
                ..StepOutcome::default()
            }
        }
        Step::Advance { ms } => StepOutcome {
            action,
            timers_fired: page.advance(*ms),
            ..StepOutcome::default()
        },
        Step::Activate => StepOutcome {
            action,
            bound: page.activate().total(),
            ..StepOutcome::default()
        },
    };
    Ok(outcome)
}

fn resolve<P: Platform>(page: &Page<P>, selector: &str, index: usize) -> TrellisResult<NodeId> {
    let matches = page.query(selector)?;
    matches.get(index).copied().ok_or_else(|| {
        TrellisError::new(
            "replay.no_match",
            format!(
                "`{selector}` matched {} element(s), wanted index {index}",
                matches.len()
            ),
        )
    })
}
