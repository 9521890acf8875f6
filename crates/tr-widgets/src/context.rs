use crate::Binding;
use crate::ControllerId;
use crate::Listener;
use crate::TimerKind;
use crate::TimerTag;
use crate::WidgetConfig;
use tr_core::TrellisResult;
use tr_css::SelectorList;
use tr_dom::Document;
use tr_dom::NodeId;
use tr_events::EventType;
use tr_events::ListenerId;
use tr_events::ListenerRegistry;
use tr_events::Platform;
use tr_events::Scheduler;
use tr_events::TimerId;
use tracing::debug;
use tracing::warn;

/// Everything a controller may touch while binding or handling input.
///
/// Mutation helpers never fail: projecting state onto a node that went away
/// is logged and skipped, matching how the page scripts degrade.
pub struct Context<'a> {
    pub document: &'a mut Document,
    pub listeners: &'a mut ListenerRegistry<Listener>,
    pub timers: &'a mut Scheduler<TimerTag>,
    pub platform: &'a mut dyn Platform,
    pub config: &'a WidgetConfig,
    /// Current vertical scroll offset of the page.
    pub scroll_y: u32,
    controller: ControllerId,
}

impl<'a> Context<'a> {
    pub fn new(
        document: &'a mut Document,
        listeners: &'a mut ListenerRegistry<Listener>,
        timers: &'a mut Scheduler<TimerTag>,
        platform: &'a mut dyn Platform,
        config: &'a WidgetConfig,
    ) -> Self {
        Self {
            document,
            listeners,
            timers,
            platform,
            config,
            scroll_y: 0,
            controller: ControllerId(0),
        }
    }

    pub fn with_scroll_y(mut self, scroll_y: u32) -> Self {
        self.scroll_y = scroll_y;
        self
    }

    /// Controller on whose behalf listeners and timers are registered.
    pub fn controller(&self) -> ControllerId {
        self.controller
    }

    pub(crate) fn enter(&mut self, controller: ControllerId) {
        self.controller = controller;
    }

    pub fn listen(&mut self, node: NodeId, event_type: EventType, binding: Binding) -> ListenerId {
        self.listeners.add(
            node,
            event_type,
            Listener {
                controller: self.controller,
                binding,
            },
        )
    }

    pub fn set_timeout(&mut self, delay_ms: u64, kind: TimerKind) -> TimerId {
        let tag = TimerTag {
            controller: self.controller,
            kind,
        };
        self.timers.set_timeout(delay_ms, tag)
    }

    pub fn set_interval(&mut self, period_ms: u64, kind: TimerKind) -> TimerId {
        let tag = TimerTag {
            controller: self.controller,
            kind,
        };
        self.timers.set_interval(period_ms, tag)
    }

    /// Descendants of `scope` matching `selectors`, in document order.
    pub fn select(&self, scope: NodeId, selectors: &str) -> Vec<NodeId> {
        match SelectorList::parse(selectors) {
            Ok(list) => list.query_all(self.document, scope),
            Err(error) => {
                warn!(%error, "skipping query with invalid selector");
                Vec::new()
            }
        }
    }

    pub fn select_first(&self, scope: NodeId, selectors: &str) -> Option<NodeId> {
        match SelectorList::parse(selectors) {
            Ok(list) => list.query_first(self.document, scope),
            Err(error) => {
                warn!(%error, "skipping query with invalid selector");
                None
            }
        }
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let result = self.document.set_attribute(node, name, value);
        skipped(result, node, "set attribute");
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        let result = self.document.remove_attribute(node, name).map(|_| ());
        skipped(result, node, "remove attribute");
    }

    /// Sets one inline style property; an empty value removes it.
    pub fn set_style(&mut self, node: NodeId, name: &str, value: &str) {
        let result = self.document.set_style_property(node, name, value);
        skipped(result, node, "set style");
    }

    pub fn apply_style_text(&mut self, node: NodeId, css_text: &str) {
        let result = self.document.apply_style_text(node, css_text);
        skipped(result, node, "apply style text");
    }

    pub fn set_class(&mut self, node: NodeId, class_name: &str, present: bool) {
        let result = self
            .document
            .toggle_class(node, class_name, Some(present))
            .map(|_| ());
        skipped(result, node, "toggle class");
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) {
        let result = self.document.set_text_content(node, text);
        skipped(result, node, "set text");
    }

    /// Creates `<tag class="...">` as the last child of `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str, class_name: &str) -> Option<NodeId> {
        let node = self.document.create_element(tag);
        if !class_name.is_empty() {
            self.set_attribute(node, "class", class_name);
        }
        match self.document.append_child(parent, node) {
            Ok(()) => Some(node),
            Err(error) => {
                debug!(%error, %parent, tag, "could not insert element");
                None
            }
        }
    }
}

fn skipped(result: TrellisResult<()>, node: NodeId, action: &str) {
    if let Err(error) = result {
        debug!(%error, %node, action, "projection skipped");
    }
}
