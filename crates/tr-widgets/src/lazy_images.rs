//! Deferred image loading driven by intersection notifications.

use crate::Binding;
use crate::Context;
use crate::Controller;
use crate::WidgetKind;
use core::any::Any;
use tr_dom::NodeId;
use tr_events::DomEvent;
use tr_events::EventType;
use tr_events::ListenerId;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LazyImage {
    image: NodeId,
    /// Pending intersection listener; cleared once the image loads.
    observer: Option<ListenerId>,
    loaded: bool,
}

impl LazyImage {
    /// Observes the image when the platform can report intersections;
    /// otherwise assigns its sources right away.
    pub fn bind(cx: &mut Context<'_>, image: NodeId) -> Self {
        if cx.platform.supports_intersection_observer() {
            let observer = cx.listen(image, EventType::Intersect, Binding::Item(0));
            return Self {
                image,
                observer: Some(observer),
                loaded: false,
            };
        }

        // No observer: copy the sources and leave the data attributes in place.
        for (from, to) in [("data-src", "src"), ("data-srcset", "srcset")] {
            if let Some(value) = cx.document.attribute(image, from).map(str::to_owned) {
                cx.set_attribute(image, to, &value);
            }
        }
        Self {
            image,
            observer: None,
            loaded: true,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn load(&mut self, cx: &mut Context<'_>) {
        if self.loaded {
            return;
        }

        for (from, to) in [("data-src", "src"), ("data-srcset", "srcset")] {
            let value = cx
                .document
                .attribute(self.image, from)
                .filter(|value| !value.is_empty())
                .map(str::to_owned);
            if let Some(value) = value {
                cx.set_attribute(self.image, to, &value);
                cx.remove_attribute(self.image, from);
            }
        }
        cx.set_class(self.image, "loaded", true);

        if let Some(observer) = self.observer.take() {
            cx.listeners.remove(observer);
        }
        self.loaded = true;
        trace!(image = %self.image, "lazy image loaded");
    }
}

impl Controller for LazyImage {
    fn kind(&self) -> WidgetKind {
        WidgetKind::LazyImage
    }

    fn root(&self) -> NodeId {
        self.image
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn handle_event(&mut self, cx: &mut Context<'_>, _binding: Binding, event: &mut DomEvent) {
        if event.event_type == EventType::Intersect {
            self.load(cx);
        }
    }
}
