//! Hardening for links that open a new browsing context.

use crate::Binding;
use crate::Context;
use crate::Controller;
use crate::WidgetKind;
use core::any::Any;
use tr_dom::NodeId;
use tr_events::DomEvent;
use tracing::trace;

const INDICATOR_CLASS: &str = "visually-hidden external-indicator";
const INDICATOR_TEXT: &str = " (opens in new window)";

/// One-shot rewrite of an `a[target="_blank"]`; it listens to nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalLink {
    link: NodeId,
}

impl ExternalLink {
    pub fn bind(cx: &mut Context<'_>, link: NodeId) -> Self {
        let has_rel = cx
            .document
            .attribute(link, "rel")
            .is_some_and(|rel| !rel.is_empty());
        if !has_rel {
            cx.set_attribute(link, "rel", "noopener noreferrer");
        }

        if cx.select_first(link, ".external-indicator").is_none() {
            if let Some(indicator) = cx.append_element(link, "span", INDICATOR_CLASS) {
                cx.set_text(indicator, INDICATOR_TEXT);
            }
        }

        trace!(%link, "external link hardened");
        Self { link }
    }
}

impl Controller for ExternalLink {
    fn kind(&self) -> WidgetKind {
        WidgetKind::ExternalLink
    }

    fn root(&self) -> NodeId {
        self.link
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn handle_event(&mut self, _cx: &mut Context<'_>, _binding: Binding, _event: &mut DomEvent) {}
}
