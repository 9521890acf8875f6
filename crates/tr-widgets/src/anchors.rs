//! Smooth scrolling for in-page anchor links.

use crate::Binding;
use crate::Context;
use crate::Controller;
use crate::WidgetKind;
use core::any::Any;
use tr_dom::NodeId;
use tr_events::DomEvent;
use tr_events::EventType;
use tr_events::ScrollBehavior;
use tracing::trace;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorScroll {
    anchor: NodeId,
}

impl AnchorScroll {
    pub fn bind(cx: &mut Context<'_>, anchor: NodeId) -> Self {
        cx.listen(anchor, EventType::Click, Binding::Item(0));
        Self { anchor }
    }

    fn follow(&self, cx: &mut Context<'_>, event: &mut DomEvent) {
        let Some(href) = cx.document.attribute(self.anchor, "href").map(str::to_owned) else {
            return;
        };
        let Some(fragment) = href.strip_prefix('#').filter(|fragment| !fragment.is_empty()) else {
            return;
        };
        let Some(target) = cx.document.element_by_id(fragment) else {
            trace!(fragment, "anchor target missing");
            return;
        };

        event.prevent_default();
        cx.platform.scroll_into_view(target, ScrollBehavior::Smooth);
        let entry = history_entry(cx.document.url(), fragment).unwrap_or_else(|| href.clone());
        cx.platform.push_history(&entry);
        trace!(fragment, %target, "scrolled to anchor");
    }
}

/// Page URL with its fragment replaced, or `None` when the page URL is
/// missing or unparsable.
fn history_entry(page_url: Option<&str>, fragment: &str) -> Option<String> {
    let mut url = Url::parse(page_url?).ok()?;
    url.set_fragment(Some(fragment));
    Some(url.into())
}

impl Controller for AnchorScroll {
    fn kind(&self) -> WidgetKind {
        WidgetKind::AnchorScroll
    }

    fn root(&self) -> NodeId {
        self.anchor
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn handle_event(&mut self, cx: &mut Context<'_>, _binding: Binding, event: &mut DomEvent) {
        if event.event_type == EventType::Click {
            self.follow(cx, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::history_entry;

    #[test]
    fn history_entry_replaces_the_fragment() {
        assert_eq!(
            history_entry(Some("https://example.org/guide?x=1#old"), "setup"),
            Some("https://example.org/guide?x=1#setup".to_owned())
        );
        assert_eq!(history_entry(None, "setup"), None);
        assert_eq!(history_entry(Some("not a url"), "setup"), None);
    }
}
