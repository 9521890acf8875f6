use crate::Accordion;
use crate::AnchorScroll;
use crate::BackToTop;
use crate::Carousel;
use crate::CodeCopy;
use crate::Context;
use crate::Controller;
use crate::ExternalLink;
use crate::FormValidator;
use crate::LazyImage;
use crate::Lightbox;
use crate::NavToggle;
use crate::Tabs;
use crate::WidgetKind;
use crate::WidgetRegistry;
use serde::Serialize;
use std::collections::BTreeMap;
use tr_css::SelectorList;
use tr_dom::NodeId;
use tracing::debug;
use tracing::info;
use tracing::warn;

const LIGHTBOX_TRIGGERS: &str = ".image-component img[data-lightbox]";

/// What one scan pass bound.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Newly bound controllers per kind.
    pub bound: BTreeMap<WidgetKind, usize>,
    /// Elements handed to an existing shared controller.
    pub adopted: usize,
    /// Roots that matched a marker but could not be bound.
    pub skipped: usize,
}

impl ScanReport {
    pub fn total(&self) -> usize {
        self.bound.values().sum()
    }

    pub fn count(&self, kind: WidgetKind) -> usize {
        self.bound.get(&kind).copied().unwrap_or(0)
    }

    /// Folds a later pass into a running total.
    pub fn merge(&mut self, other: &Self) {
        for (kind, count) in &other.bound {
            let entry = self.bound.entry(*kind).or_insert(0);
            *entry = entry.saturating_add(*count);
        }
        self.adopted = self.adopted.saturating_add(other.adopted);
        self.skipped = self.skipped.saturating_add(other.skipped);
    }

    fn record(&mut self, kind: WidgetKind) {
        let entry = self.bound.entry(kind).or_insert(0);
        *entry = entry.saturating_add(1);
    }
}

/// Binds every enabled behavior found in `scope` (inclusive).
///
/// Elements already bound by an earlier pass are skipped, so scanning the same
/// subtree twice registers nothing new.
pub fn scan(registry: &mut WidgetRegistry, cx: &mut Context<'_>, scope: NodeId) -> ScanReport {
    let mut report = ScanReport::default();

    for kind in WidgetKind::ALL {
        if !cx.config.is_enabled(kind) {
            continue;
        }

        match kind {
            WidgetKind::NavToggle => scan_nav_toggle(registry, cx, &mut report),
            WidgetKind::AnchorScroll => {
                let roots = matching(cx, scope, "a[href^=\"#\"]");
                bind_each(registry, cx, &mut report, kind, roots, |cx, root| {
                    Some(boxed(AnchorScroll::bind(cx, root)))
                });
            }
            WidgetKind::LazyImage => {
                let roots = matching(cx, scope, "img[data-src]");
                bind_each(registry, cx, &mut report, kind, roots, |cx, root| {
                    Some(boxed(LazyImage::bind(cx, root)))
                });
            }
            WidgetKind::FormValidation => {
                let roots = matching(cx, scope, "form[data-validate]");
                bind_each(registry, cx, &mut report, kind, roots, |cx, root| {
                    Some(boxed(FormValidator::bind(cx, root)))
                });
            }
            WidgetKind::ExternalLink => {
                let roots = matching(cx, scope, "a[target=\"_blank\"]");
                bind_each(registry, cx, &mut report, kind, roots, |cx, root| {
                    Some(boxed(ExternalLink::bind(cx, root)))
                });
            }
            WidgetKind::BackToTop => scan_back_to_top(registry, cx, &mut report),
            WidgetKind::Lightbox => scan_lightbox(registry, cx, scope, &mut report),
            WidgetKind::CodeCopy => {
                let roots = matching(cx, scope, ".text-richtext pre");
                bind_each(registry, cx, &mut report, kind, roots, |cx, root| {
                    CodeCopy::bind(cx, root).map(boxed)
                });
            }
            WidgetKind::Accordion => {
                let roots = matching(cx, scope, ".accordion");
                bind_each(registry, cx, &mut report, kind, roots, |cx, root| {
                    Some(boxed(Accordion::bind(cx, root)))
                });
            }
            WidgetKind::Tabs => {
                let roots = matching(cx, scope, ".tabs");
                bind_each(registry, cx, &mut report, kind, roots, |cx, root| {
                    Tabs::bind(cx, root).map(boxed)
                });
            }
            WidgetKind::Carousel => {
                let roots = matching(cx, scope, ".carousel");
                bind_each(registry, cx, &mut report, kind, roots, |cx, root| {
                    Carousel::bind(cx, root).map(boxed)
                });
            }
        }
    }

    info!(
        bound = report.total(),
        adopted = report.adopted,
        skipped = report.skipped,
        controllers = registry.len(),
        "components initialized"
    );
    report
}

fn boxed<C: Controller + 'static>(controller: C) -> Box<dyn Controller> {
    Box::new(controller)
}

/// Elements matching `selectors` in `scope`, the scope itself included.
fn matching(cx: &Context<'_>, scope: NodeId, selectors: &str) -> Vec<NodeId> {
    let list = match SelectorList::parse(selectors) {
        Ok(list) => list,
        Err(error) => {
            warn!(%error, "marker selector rejected");
            return Vec::new();
        }
    };

    let mut found = Vec::new();
    if list.matches(cx.document, scope) {
        found.push(scope);
    }
    found.extend(list.query_all(cx.document, scope));
    found
}

fn bind_each<F>(
    registry: &mut WidgetRegistry,
    cx: &mut Context<'_>,
    report: &mut ScanReport,
    kind: WidgetKind,
    roots: Vec<NodeId>,
    mut bind: F,
) where
    F: FnMut(&mut Context<'_>, NodeId) -> Option<Box<dyn Controller>>,
{
    for root in roots {
        if registry.is_bound(kind, root) {
            continue;
        }

        cx.enter(registry.next_id());
        match bind(cx, root) {
            Some(controller) => {
                registry.insert(controller);
                registry.mark_bound(kind, root);
                report.record(kind);
            }
            None => {
                debug!(%kind, %root, "root left unbound");
                report.skipped = report.skipped.saturating_add(1);
            }
        }
    }
}

fn scan_nav_toggle(registry: &mut WidgetRegistry, cx: &mut Context<'_>, report: &mut ScanReport) {
    let root = cx.document.root();
    let (Some(toggle), Some(nav)) = (
        cx.select_first(root, ".nav-toggle"),
        cx.select_first(root, ".main-nav"),
    ) else {
        return;
    };
    if registry.is_bound(WidgetKind::NavToggle, toggle) {
        return;
    }

    cx.enter(registry.next_id());
    let controller = NavToggle::bind(cx, toggle, nav);
    registry.insert(Box::new(controller));
    registry.mark_bound(WidgetKind::NavToggle, toggle);
    report.record(WidgetKind::NavToggle);
}

fn scan_back_to_top(registry: &mut WidgetRegistry, cx: &mut Context<'_>, report: &mut ScanReport) {
    if registry.singleton(WidgetKind::BackToTop).is_some() {
        return;
    }

    cx.enter(registry.next_id());
    let Some(controller) = BackToTop::bind(cx) else {
        report.skipped = report.skipped.saturating_add(1);
        return;
    };
    let button = controller.root();
    registry.insert_singleton(Box::new(controller));
    registry.mark_bound(WidgetKind::BackToTop, button);
    report.record(WidgetKind::BackToTop);
}

fn scan_lightbox(
    registry: &mut WidgetRegistry,
    cx: &mut Context<'_>,
    scope: NodeId,
    report: &mut ScanReport,
) {
    let triggers: Vec<NodeId> = matching(cx, scope, LIGHTBOX_TRIGGERS)
        .into_iter()
        .filter(|trigger| !registry.is_bound(WidgetKind::Lightbox, *trigger))
        .collect();
    if triggers.is_empty() {
        return;
    }

    if let Some(overlay) = registry.singleton(WidgetKind::Lightbox) {
        for trigger in triggers {
            if registry.adopt(overlay, cx, trigger) {
                registry.mark_bound(WidgetKind::Lightbox, trigger);
                report.adopted = report.adopted.saturating_add(1);
            }
        }
        return;
    }

    cx.enter(registry.next_id());
    let Some(controller) = Lightbox::bind(cx, &triggers) else {
        report.skipped = report.skipped.saturating_add(1);
        return;
    };
    registry.insert_singleton(Box::new(controller));
    for trigger in triggers {
        registry.mark_bound(WidgetKind::Lightbox, trigger);
    }
    report.record(WidgetKind::Lightbox);
}
