//! Copy-to-clipboard buttons on rich-text code blocks.

use crate::Binding;
use crate::Context;
use crate::Controller;
use crate::TimerKind;
use crate::WidgetKind;
use core::any::Any;
use tr_dom::NodeId;
use tr_events::DomEvent;
use tr_events::EventType;
use tr_events::TimerId;
use tracing::debug;
use tracing::error;
use tracing::trace;

const IDLE_LABEL: &str = "Copy";
const COPIED_LABEL: &str = "Copied!";
const BUTTON_STYLE: &str = "position: absolute; top: 0.5rem; right: 0.5rem; \
     padding: 0.25rem 0.5rem; font-size: 0.75rem; background: rgba(255, 255, 255, 0.1); \
     color: #fff; border: none; border-radius: 4px; cursor: pointer";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeCopy {
    block: NodeId,
    button: NodeId,
    /// Pending "Copied!" reset.
    feedback: Option<TimerId>,
}

impl CodeCopy {
    pub fn bind(cx: &mut Context<'_>, block: NodeId) -> Option<Self> {
        let button = cx.append_element(block, "button", "code-copy-btn")?;
        cx.set_text(button, IDLE_LABEL);
        cx.apply_style_text(button, BUTTON_STYLE);
        cx.set_style(block, "position", "relative");
        cx.listen(button, EventType::Click, Binding::Item(0));

        debug!(%block, "code copy bound");
        Some(Self {
            block,
            button,
            feedback: None,
        })
    }

    pub fn button(&self) -> NodeId {
        self.button
    }

    /// Text of the block's `<code>`, or of the block itself minus the button.
    fn copy_text(&self, cx: &Context<'_>) -> String {
        if let Some(code) = cx.select_first(self.block, "code") {
            return cx.document.text_content(code);
        }
        cx.document
            .children(self.block)
            .iter()
            .filter(|child| **child != self.button)
            .map(|child| cx.document.text_content(*child))
            .collect()
    }

    fn copy(&mut self, cx: &mut Context<'_>) {
        let text = self.copy_text(cx);
        if let Err(err) = cx.platform.write_clipboard(&text) {
            error!(error = %err, block = %self.block, "copy failed");
            return;
        }

        cx.set_text(self.button, COPIED_LABEL);
        if let Some(pending) = self.feedback.take() {
            cx.timers.clear(pending);
        }
        self.feedback = Some(cx.set_timeout(cx.config.copy_feedback_ms, TimerKind::CopyFeedback));
        trace!(block = %self.block, chars = text.chars().count(), "code copied");
    }
}

impl Controller for CodeCopy {
    fn kind(&self) -> WidgetKind {
        WidgetKind::CodeCopy
    }

    fn root(&self) -> NodeId {
        self.block
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn handle_event(&mut self, cx: &mut Context<'_>, _binding: Binding, event: &mut DomEvent) {
        if event.event_type == EventType::Click {
            self.copy(cx);
        }
    }

    fn handle_timer(&mut self, cx: &mut Context<'_>, kind: TimerKind) {
        if kind == TimerKind::CopyFeedback {
            self.feedback = None;
            cx.set_text(self.button, IDLE_LABEL);
        }
    }
}
