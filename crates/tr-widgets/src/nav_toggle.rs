//! Mobile navigation disclosure.

use crate::Binding;
use crate::Context;
use crate::Controller;
use crate::WidgetKind;
use core::any::Any;
use tr_dom::NodeId;
use tr_events::DomEvent;
use tr_events::EventType;
use tracing::debug;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavToggle {
    toggle: NodeId,
    nav: NodeId,
    expanded: bool,
}

impl NavToggle {
    /// Starts from the toggle's server-rendered `aria-expanded`.
    pub fn bind(cx: &mut Context<'_>, toggle: NodeId, nav: NodeId) -> Self {
        let expanded = cx.document.attribute(toggle, "aria-expanded") == Some("true");
        cx.listen(toggle, EventType::Click, Binding::Item(0));
        let document = cx.document.root();
        cx.listen(document, EventType::Click, Binding::Document);

        debug!(%toggle, %nav, expanded, "navigation toggle bound");
        Self {
            toggle,
            nav,
            expanded,
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    fn set_expanded(&mut self, cx: &mut Context<'_>, expanded: bool) {
        self.expanded = expanded;
        trace!(expanded, "navigation toggled");
        cx.set_attribute(
            self.toggle,
            "aria-expanded",
            if expanded { "true" } else { "false" },
        );
        cx.set_class(self.nav, "active", expanded);
    }
}

impl Controller for NavToggle {
    fn kind(&self) -> WidgetKind {
        WidgetKind::NavToggle
    }

    fn root(&self) -> NodeId {
        self.toggle
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn handle_event(&mut self, cx: &mut Context<'_>, binding: Binding, event: &mut DomEvent) {
        if event.event_type != EventType::Click {
            return;
        }
        match binding {
            Binding::Item(_) => {
                let expanded = !self.expanded;
                self.set_expanded(cx, expanded);
            }
            Binding::Document => {
                let inside = cx.document.contains(self.toggle, event.target)
                    || cx.document.contains(self.nav, event.target);
                if !inside {
                    self.set_expanded(cx, false);
                }
            }
            Binding::Previous | Binding::Next | Binding::Dismiss => {}
        }
    }
}
