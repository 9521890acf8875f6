//! Floating "back to top" button shown once the page scrolls far enough.

use crate::Binding;
use crate::Context;
use crate::Controller;
use crate::WidgetKind;
use core::any::Any;
use tr_dom::NodeId;
use tr_events::DomEvent;
use tr_events::EventType;
use tr_events::ScrollBehavior;
use tracing::debug;
use tracing::trace;

const BUTTON_STYLE: &str = "position: fixed; bottom: 20px; right: 20px; width: 40px; \
     height: 40px; border-radius: 50%; background: #0066cc; color: #fff; border: none; \
     cursor: pointer; opacity: 0; visibility: hidden; \
     transition: opacity 0.3s, visibility 0.3s; z-index: 1000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackToTop {
    button: NodeId,
    visible: bool,
}

impl BackToTop {
    /// Appends the button to the body. One per page.
    pub fn bind(cx: &mut Context<'_>) -> Option<Self> {
        let body = cx.document.body_or_root();
        let button = cx.append_element(body, "button", "back-to-top")?;
        cx.set_text(button, "\u{2191}");
        cx.set_attribute(button, "aria-label", "Back to top");
        cx.apply_style_text(button, BUTTON_STYLE);

        cx.listen(button, EventType::Click, Binding::Item(0));
        let document = cx.document.root();
        cx.listen(document, EventType::Scroll, Binding::Document);

        debug!(%button, threshold = cx.config.back_to_top_threshold_px, "back-to-top bound");
        Some(Self {
            button,
            visible: false,
        })
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    fn on_scroll(&mut self, cx: &mut Context<'_>) {
        self.visible = cx.scroll_y > cx.config.back_to_top_threshold_px;
        trace!(scroll_y = cx.scroll_y, visible = self.visible, "back-to-top updated");
        let (opacity, visibility) = if self.visible {
            ("1", "visible")
        } else {
            ("0", "hidden")
        };
        cx.set_style(self.button, "opacity", opacity);
        cx.set_style(self.button, "visibility", visibility);
    }
}

impl Controller for BackToTop {
    fn kind(&self) -> WidgetKind {
        WidgetKind::BackToTop
    }

    fn root(&self) -> NodeId {
        self.button
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn handle_event(&mut self, cx: &mut Context<'_>, binding: Binding, event: &mut DomEvent) {
        match (binding, event.event_type) {
            (Binding::Document, EventType::Scroll) => self.on_scroll(cx),
            (Binding::Item(_), EventType::Click) => {
                cx.platform.scroll_to(0, ScrollBehavior::Smooth);
            }
            _ => {}
        }
    }
}
