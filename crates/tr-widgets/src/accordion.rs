//! Disclosure controller: independent show/hide items.

use crate::Binding;
use crate::Context;
use crate::Controller;
use crate::WidgetKind;
use core::any::Any;
use tr_dom::NodeId;
use tr_events::DomEvent;
use tr_events::EventType;
use tr_events::Key;
use tracing::debug;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
struct DisclosureItem {
    header: NodeId,
    panel: NodeId,
    expanded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accordion {
    root: NodeId,
    items: Vec<DisclosureItem>,
}

impl Accordion {
    /// Binds every well-formed `.accordion-item` below `root`, collapsed.
    /// Items without both a header and a content panel are skipped.
    pub fn bind(cx: &mut Context<'_>, root: NodeId) -> Self {
        let mut items = Vec::new();
        let mut skipped = 0_usize;

        for item in cx.select(root, ".accordion-item") {
            let header = cx.select_first(item, ".accordion-header");
            let panel = cx.select_first(item, ".accordion-content");
            let (Some(header), Some(panel)) = (header, panel) else {
                skipped += 1;
                continue;
            };

            let index = items.len();
            cx.set_attribute(header, "role", "button");
            cx.set_attribute(header, "tabindex", "0");
            cx.listen(header, EventType::Click, Binding::Item(index));
            cx.listen(header, EventType::KeyDown, Binding::Item(index));
            items.push(DisclosureItem {
                header,
                panel,
                expanded: false,
            });
        }

        let accordion = Self { root, items };
        for index in 0..accordion.items.len() {
            accordion.project(cx, index);
        }

        debug!(%root, items = accordion.items.len(), skipped, "accordion bound");
        accordion
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_expanded(&self, index: usize) -> Option<bool> {
        self.items.get(index).map(|item| item.expanded)
    }

    pub fn header(&self, index: usize) -> Option<NodeId> {
        self.items.get(index).map(|item| item.header)
    }

    pub fn toggle(&mut self, cx: &mut Context<'_>, index: usize) {
        let Some(item) = self.items.get_mut(index) else {
            return;
        };
        item.expanded = !item.expanded;
        trace!(root = %self.root, index, expanded = item.expanded, "accordion toggled");
        self.project(cx, index);
    }

    fn project(&self, cx: &mut Context<'_>, index: usize) {
        let Some(item) = self.items.get(index) else {
            return;
        };
        let expanded = if item.expanded { "true" } else { "false" };
        cx.set_attribute(item.header, "aria-expanded", expanded);
        cx.set_style(
            item.panel,
            "display",
            if item.expanded { "block" } else { "none" },
        );
    }
}

impl Controller for Accordion {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Accordion
    }

    fn root(&self) -> NodeId {
        self.root
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn handle_event(&mut self, cx: &mut Context<'_>, binding: Binding, event: &mut DomEvent) {
        let Binding::Item(index) = binding else {
            return;
        };

        match event.event_type {
            EventType::Click => self.toggle(cx, index),
            EventType::KeyDown if event.key_is(&Key::Enter) || event.key_is(&Key::Space) => {
                event.prevent_default();
                self.toggle(cx, index);
            }
            _ => {}
        }
    }
}
