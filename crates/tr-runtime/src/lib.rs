//! Page host for the behavior layer.
//!
//! A [`Page`] owns a parsed document together with everything the widget
//! controllers need at run time: the listener table, the virtual-clock timer
//! queue, the platform services and the controller registry. Nothing happens
//! until [`Page::activate`] runs; after that the page only changes in response
//! to the explicit input calls (`click`, `key_down`, `advance`, ...).

use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use tr_core::TrellisError;
use tr_core::TrellisResult;
use tr_dom::Document;
use tr_dom::NodeId;
use tr_events::DomEvent;
use tr_events::EventType;
use tr_events::HeadlessPlatform;
use tr_events::Key;
use tr_events::ListenerRegistry;
use tr_events::Platform;
use tr_events::Scheduler;
use tr_html::HtmlParser;
use tr_widgets::Context;
use tr_widgets::DispatchOutcome;
use tr_widgets::Listener;
use tr_widgets::ScanReport;
use tr_widgets::TimerTag;
use tr_widgets::WidgetConfig;
use tr_widgets::WidgetKind;
use tr_widgets::WidgetRegistry;
use tracing::debug;
use tracing::info;
use tracing::trace;

/// Host-level settings for one page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Address the page was served from; anchor navigation rewrites its
    /// fragment when pushing history entries.
    pub page_url: Option<String>,
    pub widgets: WidgetConfig,
    /// Whether the headless platform reports intersection observation.
    pub intersection_observer: bool,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            page_url: None,
            widgets: WidgetConfig::default(),
            intersection_observer: true,
        }
    }
}

/// Snapshot of what the behavior layer has bound so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivationSummary {
    pub title: Option<String>,
    pub activations: usize,
    pub controllers: BTreeMap<WidgetKind, usize>,
    pub adopted: usize,
    pub skipped: usize,
    pub listeners: usize,
    pub pending_timers: usize,
    pub now_ms: u64,
}

#[derive(Debug)]
pub struct Page<P: Platform = HeadlessPlatform> {
    document: Document,
    listeners: ListenerRegistry<Listener>,
    timers: Scheduler<TimerTag>,
    platform: P,
    registry: WidgetRegistry,
    widgets: WidgetConfig,
    scroll_y: u32,
    activations: usize,
    totals: ScanReport,
}

impl Page<HeadlessPlatform> {
    /// Parses `source` into an inactive page backed by a recording platform.
    pub fn from_html(source: &str, config: PageConfig) -> Self {
        let platform =
            HeadlessPlatform::new().with_intersection_observer(config.intersection_observer);
        Self::with_platform(source, config, platform)
    }
}

impl<P: Platform> Page<P> {
    pub fn with_platform(source: &str, config: PageConfig, platform: P) -> Self {
        let mut document = HtmlParser.parse(source);
        if let Some(url) = config.page_url {
            document.set_url(url);
        }
        debug!(nodes = document.node_count(), "page parsed");

        Self {
            document,
            listeners: ListenerRegistry::new(),
            timers: Scheduler::new(),
            platform,
            registry: WidgetRegistry::new(),
            widgets: config.widgets,
            scroll_y: 0,
            activations: 0,
            totals: ScanReport::default(),
        }
    }

    /// Binds every enabled behavior in the document.
    ///
    /// Safe to call again after [`Page::append_html`]: roots bound by an
    /// earlier pass are skipped.
    pub fn activate(&mut self) -> ScanReport {
        let root = self.document.root();
        let report = self.with_context(|registry, cx| tr_widgets::scan(registry, cx, root));
        self.activations = self.activations.saturating_add(1);
        self.totals.merge(&report);
        info!(
            activation = self.activations,
            bound = report.total(),
            adopted = report.adopted,
            "page activated"
        );
        report
    }

    /// Parses `markup` and appends it to `parent`. New content stays inert
    /// until the next [`Page::activate`].
    pub fn append_html(&mut self, parent: NodeId, markup: &str) -> TrellisResult<Vec<NodeId>> {
        HtmlParser.parse_into(&mut self.document, parent, markup)
    }

    pub fn click(&mut self, node: NodeId) -> TrellisResult<DispatchOutcome> {
        self.ensure_node(node)?;
        Ok(self.dispatch(DomEvent::new(EventType::Click, node)))
    }

    /// `key` uses browser key names (`"Enter"`, `" "`, `"ArrowLeft"`, ...).
    pub fn key_down(&mut self, node: NodeId, key: &str) -> TrellisResult<DispatchOutcome> {
        self.ensure_node(node)?;
        Ok(self.dispatch(DomEvent::key_down(node, Key::from_name(key))))
    }

    /// Sends the key to the focused element, or to the body when nothing
    /// holds focus.
    pub fn key_down_focused(&mut self, key: &str) -> DispatchOutcome {
        let target = self
            .document
            .focused()
            .unwrap_or_else(|| self.document.body_or_root());
        self.dispatch(DomEvent::key_down(target, Key::from_name(key)))
    }

    pub fn submit(&mut self, form: NodeId) -> TrellisResult<DispatchOutcome> {
        self.ensure_node(form)?;
        Ok(self.dispatch(DomEvent::new(EventType::Submit, form)))
    }

    /// Reports that `node` entered the viewport.
    pub fn intersect(&mut self, node: NodeId) -> TrellisResult<DispatchOutcome> {
        self.ensure_node(node)?;
        Ok(self.dispatch(DomEvent::new(EventType::Intersect, node)))
    }

    /// Moves the viewport to `y` and fires the document scroll event.
    pub fn scroll_to(&mut self, y: u32) -> DispatchOutcome {
        self.scroll_y = y;
        let root = self.document.root();
        self.dispatch(DomEvent::new(EventType::Scroll, root))
    }

    /// Sets a form control's current value.
    pub fn set_value(&mut self, node: NodeId, value: &str) -> TrellisResult<()> {
        self.document.set_attribute(node, "value", value)
    }

    /// Runs the clock forward by `ms`, firing due timers in order. Returns how
    /// many fired.
    pub fn advance(&mut self, ms: u64) -> usize {
        let until = self.timers.now_ms().saturating_add(ms);
        let mut fired = 0_usize;
        while let Some(firing) = self.timers.pop_due(until) {
            trace!(timer = ?firing.id, at_ms = firing.at_ms, "timer fired");
            self.with_context(|registry, cx| {
                tr_widgets::dispatch_timer(registry, cx, firing.payload);
            });
            fired = fired.saturating_add(1);
        }
        self.timers.settle(until);
        fired
    }

    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    pub fn scroll_y(&self) -> u32 {
        self.scroll_y
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn query(&self, selectors: &str) -> TrellisResult<Vec<NodeId>> {
        tr_css::query_all(&self.document, self.document.root(), selectors)
    }

    pub fn query_first(&self, selectors: &str) -> TrellisResult<Option<NodeId>> {
        tr_css::query_first(&self.document, self.document.root(), selectors)
    }

    /// Current markup of the whole document.
    pub fn html(&self) -> String {
        tr_html::serialize_children(&self.document, self.document.root())
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn summary(&self) -> ActivationSummary {
        let controllers = WidgetKind::ALL
            .into_iter()
            .map(|kind| (kind, self.registry.count(kind)))
            .filter(|(_, count)| *count > 0)
            .collect();

        ActivationSummary {
            title: self.document.title(),
            activations: self.activations,
            controllers,
            adopted: self.totals.adopted,
            skipped: self.totals.skipped,
            listeners: self.listeners.len(),
            pending_timers: self.timers.pending(),
            now_ms: self.timers.now_ms(),
        }
    }

    fn dispatch(&mut self, mut event: DomEvent) -> DispatchOutcome {
        let outcome =
            self.with_context(|registry, cx| tr_widgets::dispatch_event(registry, cx, &mut event));
        debug!(
            event = event.event_type.as_str(),
            target = %event.target,
            listeners = outcome.listeners_invoked,
            default_prevented = outcome.default_prevented,
            "event dispatched"
        );
        outcome
    }

    fn with_context<R>(
        &mut self,
        run: impl FnOnce(&mut WidgetRegistry, &mut Context<'_>) -> R,
    ) -> R {
        let mut cx = Context::new(
            &mut self.document,
            &mut self.listeners,
            &mut self.timers,
            &mut self.platform,
            &self.widgets,
        )
        .with_scroll_y(self.scroll_y);
        run(&mut self.registry, &mut cx)
    }

    fn ensure_node(&self, node: NodeId) -> TrellisResult<()> {
        if self.document.contains_node(node) {
            return Ok(());
        }
        Err(TrellisError::new(
            "dom.unknown_node",
            format!("{node} is not part of this document"),
        ))
    }
}

#[cfg(test)]
mod tests;
