//! Circular slide carousel with optional autoplay.

use crate::Binding;
use crate::Context;
use crate::Controller;
use crate::TimerKind;
use crate::WidgetKind;
use core::any::Any;
use tr_dom::NodeId;
use tr_events::DomEvent;
use tr_events::EventType;
use tr_events::TimerId;
use tracing::debug;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Carousel {
    root: NodeId,
    slides: Vec<NodeId>,
    /// Generated indicator buttons, one per slide, or empty.
    dots: Vec<NodeId>,
    current: usize,
    autoplay: Option<(u64, TimerId)>,
}

impl Carousel {
    /// Binds the `.carousel-slide` elements below `root` and shows the first.
    /// Returns `None` when the carousel has no slides.
    pub fn bind(cx: &mut Context<'_>, root: NodeId) -> Option<Self> {
        let slides = cx.select(root, ".carousel-slide");
        if slides.is_empty() {
            debug!(%root, "carousel without slides left unbound");
            return None;
        }

        if let Some(prev) = cx.select_first(root, ".carousel-prev") {
            cx.listen(prev, EventType::Click, Binding::Previous);
        }
        if let Some(next) = cx.select_first(root, ".carousel-next") {
            cx.listen(next, EventType::Click, Binding::Next);
        }

        let mut dots = Vec::new();
        if slides.len() > 1 {
            if let Some(container) = cx.select_first(root, ".carousel-dots") {
                for index in 0..slides.len() {
                    let Some(dot) = cx.append_element(container, "button", "carousel-dot") else {
                        break;
                    };
                    cx.set_attribute(dot, "aria-label", &format!("Go to slide {}", index + 1));
                    cx.listen(dot, EventType::Click, Binding::Item(index));
                    dots.push(dot);
                }
            }
        }

        let autoplay_ms = cx
            .document
            .attribute(root, "data-autoplay")
            .and_then(parse_autoplay);
        let autoplay =
            autoplay_ms.map(|period_ms| (period_ms, cx.set_interval(period_ms, TimerKind::Autoplay)));

        let carousel = Self {
            root,
            slides,
            dots,
            current: 0,
            autoplay,
        };
        carousel.project(cx);
        debug!(
            %root,
            slides = carousel.slides.len(),
            dots = carousel.dots.len(),
            autoplay_ms = ?carousel.autoplay_ms(),
            "carousel bound"
        );
        Some(carousel)
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn dots(&self) -> &[NodeId] {
        &self.dots
    }

    pub fn autoplay_ms(&self) -> Option<u64> {
        self.autoplay.map(|(period_ms, _)| period_ms)
    }

    pub fn next(&mut self, cx: &mut Context<'_>) {
        self.go_to(cx, (self.current + 1) % self.slides.len());
    }

    pub fn previous(&mut self, cx: &mut Context<'_>) {
        let count = self.slides.len();
        self.go_to(cx, (self.current + count - 1) % count);
    }

    /// Shows slide `index`; out-of-range indices are ignored.
    pub fn go_to(&mut self, cx: &mut Context<'_>, index: usize) {
        if index >= self.slides.len() {
            return;
        }
        self.current = index;
        trace!(root = %self.root, index, "carousel moved");
        self.project(cx);
    }

    fn project(&self, cx: &mut Context<'_>) {
        for (index, slide) in self.slides.iter().enumerate() {
            let shown = index == self.current;
            cx.set_style(*slide, "display", if shown { "block" } else { "none" });
        }
        for (index, dot) in self.dots.iter().enumerate() {
            cx.set_class(*dot, "active", index == self.current);
        }
    }
}

/// Autoplay period from `data-autoplay`: a positive whole number of
/// milliseconds, anything else disables autoplay.
pub(crate) fn parse_autoplay(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|period_ms| *period_ms > 0)
}

impl Controller for Carousel {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Carousel
    }

    fn root(&self) -> NodeId {
        self.root
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn handle_event(&mut self, cx: &mut Context<'_>, binding: Binding, event: &mut DomEvent) {
        if event.event_type != EventType::Click {
            return;
        }
        match binding {
            Binding::Previous => self.previous(cx),
            Binding::Next => self.next(cx),
            Binding::Item(index) => self.go_to(cx, index),
            Binding::Dismiss | Binding::Document => {}
        }
    }

    fn handle_timer(&mut self, cx: &mut Context<'_>, kind: TimerKind) {
        if kind == TimerKind::Autoplay {
            self.next(cx);
        }
    }
}
