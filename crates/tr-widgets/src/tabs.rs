//! Selection controller: single-selection tabs with a roving tab stop.

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
pub struct Tabs {
    root: NodeId,
    tabs: Vec<NodeId>,
    panels: Vec<NodeId>,
    selected: usize,
}

impl Tabs {
    /// Binds the `.tab-button`/`.tab-panel` pairs below `root` and selects the
    /// first tab. Returns `None` when there is no tab to select.
    ///
    /// Tabs and panels pair up by position; a tab without a panel still
    /// selects, it just has nothing to show.
    pub fn bind(cx: &mut Context<'_>, root: NodeId) -> Option<Self> {
        let tabs = cx.select(root, ".tab-button");
        if tabs.is_empty() {
            debug!(%root, "tabs without .tab-button left unbound");
            return None;
        }
        let panels = cx.select(root, ".tab-panel");

        for (index, tab) in tabs.iter().enumerate() {
            cx.set_attribute(*tab, "role", "tab");
            if let Some(panel) = panels.get(index) {
                cx.set_attribute(*panel, "role", "tabpanel");
            }
            cx.listen(*tab, EventType::Click, Binding::Item(index));
            cx.listen(*tab, EventType::KeyDown, Binding::Item(index));
        }
        if panels.len() != tabs.len() {
            debug!(%root, tabs = tabs.len(), panels = panels.len(), "tab and panel counts differ");
        }

        let group = Self {
            root,
            tabs,
            panels,
            selected: 0,
        };
        group.project(cx);
        debug!(%root, tabs = group.tabs.len(), "tabs bound");
        Some(group)
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn tab(&self, index: usize) -> Option<NodeId> {
        self.tabs.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Selects tab `index`; out-of-range indices are ignored.
    pub fn activate(&mut self, cx: &mut Context<'_>, index: usize) {
        if index >= self.tabs.len() {
            return;
        }
        self.selected = index;
        trace!(root = %self.root, index, "tab selected");
        self.project(cx);
    }

    /// Target of a navigation key pressed on tab `from`, or `None` when the
    /// key is not part of the tab keyboard contract.
    fn navigation_target(&self, from: usize, key: &Key) -> Option<usize> {
        let count = self.tabs.len();
        match key {
            Key::ArrowRight => Some((from + 1) % count),
            Key::ArrowLeft => Some((from + count - 1) % count),
            Key::Home => Some(0),
            Key::End => Some(count - 1),
            _ => None,
        }
    }

    fn project(&self, cx: &mut Context<'_>) {
        for (index, tab) in self.tabs.iter().enumerate() {
            let selected = index == self.selected;
            cx.set_attribute(*tab, "aria-selected", if selected { "true" } else { "false" });
            cx.set_attribute(*tab, "tabindex", if selected { "0" } else { "-1" });
            cx.set_class(*tab, "active", selected);
        }
        for (index, panel) in self.panels.iter().enumerate() {
            let shown = index == self.selected;
            cx.set_style(*panel, "display", if shown { "block" } else { "none" });
        }
    }
}

impl Controller for Tabs {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Tabs
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
            EventType::Click => self.activate(cx, index),
            EventType::KeyDown => {
                let Some(target) = event
                    .key
                    .as_ref()
                    .and_then(|key| self.navigation_target(index, key))
                else {
                    return;
                };
                event.prevent_default();
                self.activate(cx, target);
                if let Some(tab) = self.tab(target) {
                    if let Err(error) = cx.document.focus(tab) {
                        debug!(%error, "could not focus tab");
                    }
                }
            }
            _ => {}
        }
    }
}
