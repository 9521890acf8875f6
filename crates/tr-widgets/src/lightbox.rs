//! Overlay controller: one modal image viewer shared by every trigger.

use crate::Binding;
use crate::Context;
use crate::Controller;
use crate::WidgetKind;
use core::any::Any;
use tr_dom::NodeId;
use tr_events::DomEvent;
use tr_events::EventType;
use tr_events::Key;
use tr_html::HtmlParser;
use tracing::debug;
use tracing::trace;

const OVERLAY_MARKUP: &str = concat!(
    "<div class=\"lightbox-overlay\"></div>",
    "<div class=\"lightbox-content\">",
    "<button class=\"lightbox-close\" aria-label=\"Close\">&times;</button>",
    "<img class=\"lightbox-image\" src=\"\" alt=\"\">",
    "<div class=\"lightbox-caption\"></div>",
    "</div>",
);

const CONTAINER_STYLE: &str =
    "position: fixed; top: 0; left: 0; width: 100%; height: 100%; display: none; z-index: 10000";
const BACKDROP_STYLE: &str = "position: absolute; top: 0; left: 0; width: 100%; height: 100%; \
     background: rgba(0, 0, 0, 0.9)";
const CONTENT_STYLE: &str = "position: absolute; top: 50%; left: 50%; \
     transform: translate(-50%, -50%); max-width: 90%; max-height: 90%; text-align: center";
const CLOSE_STYLE: &str = "position: absolute; top: -40px; right: 0; background: none; \
     border: none; color: #fff; font-size: 2rem; cursor: pointer";
const IMAGE_STYLE: &str = "max-width: 100%; max-height: 80vh; object-fit: contain";
const CAPTION_STYLE: &str = "color: #fff; margin-top: 1rem; font-size: 0.875rem";

/// What the overlay currently shows. Content survives a close and is
/// overwritten by the next open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayState {
    pub open: bool,
    pub source: String,
    pub alt: String,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct OverlayParts {
    container: NodeId,
    backdrop: NodeId,
    close: NodeId,
    image: NodeId,
    caption: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lightbox {
    parts: OverlayParts,
    body: NodeId,
    triggers: Vec<NodeId>,
    state: OverlayState,
}

impl Lightbox {
    /// Builds the overlay under the body and wires `triggers` to it.
    /// Returns `None` when there are no triggers or the overlay markup could
    /// not be inserted.
    pub fn bind(cx: &mut Context<'_>, triggers: &[NodeId]) -> Option<Self> {
        if triggers.is_empty() {
            return None;
        }

        let body = cx.document.body_or_root();
        let parts = build_overlay(cx, body)?;

        cx.listen(parts.close, EventType::Click, Binding::Dismiss);
        cx.listen(parts.backdrop, EventType::Click, Binding::Dismiss);
        let document = cx.document.root();
        cx.listen(document, EventType::KeyDown, Binding::Document);

        let mut lightbox = Self {
            parts,
            body,
            triggers: Vec::with_capacity(triggers.len()),
            state: OverlayState::default(),
        };
        for trigger in triggers {
            lightbox.attach(cx, *trigger);
        }

        debug!(
            overlay = %lightbox.parts.container,
            triggers = lightbox.triggers.len(),
            "lightbox bound"
        );
        Some(lightbox)
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.open
    }

    pub fn triggers(&self) -> &[NodeId] {
        &self.triggers
    }

    /// Copies trigger `index`'s image into the overlay and shows it.
    pub fn open(&mut self, cx: &mut Context<'_>, index: usize) {
        let Some(trigger) = self.triggers.get(index).copied() else {
            return;
        };

        let attribute = |name: &str| {
            cx.document
                .attribute(trigger, name)
                .unwrap_or_default()
                .to_owned()
        };
        let source = attribute("src");
        let alt = attribute("alt");
        let caption = [attribute("data-caption"), alt.clone()]
            .into_iter()
            .find(|candidate| !candidate.is_empty())
            .unwrap_or_default();

        self.state = OverlayState {
            open: true,
            source,
            alt,
            caption,
        };
        trace!(%trigger, source = %self.state.source, "lightbox opened");
        self.project(cx);
    }

    /// Hides the overlay. Closing a closed overlay does nothing.
    pub fn close(&mut self, cx: &mut Context<'_>) {
        if !self.state.open {
            return;
        }
        self.state.open = false;
        trace!("lightbox closed");
        self.project(cx);
    }

    fn attach(&mut self, cx: &mut Context<'_>, trigger: NodeId) {
        let index = self.triggers.len();
        cx.set_style(trigger, "cursor", "pointer");
        cx.listen(trigger, EventType::Click, Binding::Item(index));
        self.triggers.push(trigger);
    }

    fn project(&self, cx: &mut Context<'_>) {
        let parts = &self.parts;
        if self.state.open {
            cx.set_attribute(parts.image, "src", &self.state.source);
            cx.set_attribute(parts.image, "alt", &self.state.alt);
            cx.set_text(parts.caption, &self.state.caption);
            cx.set_style(parts.container, "display", "block");
            cx.set_style(self.body, "overflow", "hidden");
        } else {
            cx.set_style(parts.container, "display", "none");
            cx.set_style(self.body, "overflow", "");
        }
    }
}

fn build_overlay(cx: &mut Context<'_>, body: NodeId) -> Option<OverlayParts> {
    let container = cx.append_element(body, "div", "lightbox")?;
    if let Err(error) = HtmlParser.parse_into(cx.document, container, OVERLAY_MARKUP) {
        debug!(%error, "lightbox markup rejected");
        return None;
    }

    let parts = OverlayParts {
        container,
        backdrop: cx.select_first(container, ".lightbox-overlay")?,
        close: cx.select_first(container, ".lightbox-close")?,
        image: cx.select_first(container, ".lightbox-image")?,
        caption: cx.select_first(container, ".lightbox-caption")?,
    };
    let content = cx.select_first(container, ".lightbox-content")?;

    cx.apply_style_text(parts.container, CONTAINER_STYLE);
    cx.apply_style_text(parts.backdrop, BACKDROP_STYLE);
    cx.apply_style_text(content, CONTENT_STYLE);
    cx.apply_style_text(parts.close, CLOSE_STYLE);
    cx.apply_style_text(parts.image, IMAGE_STYLE);
    cx.apply_style_text(parts.caption, CAPTION_STYLE);
    Some(parts)
}

impl Controller for Lightbox {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Lightbox
    }

    fn root(&self) -> NodeId {
        self.parts.container
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn handle_event(&mut self, cx: &mut Context<'_>, binding: Binding, event: &mut DomEvent) {
        match (binding, event.event_type) {
            (Binding::Item(index), EventType::Click) => self.open(cx, index),
            (Binding::Dismiss, EventType::Click) => self.close(cx),
            (Binding::Document, EventType::KeyDown) if event.key_is(&Key::Escape) => {
                self.close(cx);
            }
            _ => {}
        }
    }

    fn adopt(&mut self, cx: &mut Context<'_>, node: NodeId) -> bool {
        if self.triggers.contains(&node) {
            return false;
        }
        self.attach(cx, node);
        true
    }
}
