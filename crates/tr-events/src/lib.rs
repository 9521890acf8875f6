//! Event model shared by the behavior layer and its host.
//!
//! Events are plain values dispatched along the target's ancestor path;
//! listeners are registered per `(node, event type)` and carry an opaque
//! payload chosen by the caller. Timers run on a virtual clock so hosts can
//! drive them deterministically.

use core::fmt;
use tr_dom::Document;
use tr_dom::NodeId;

mod platform;
mod scheduler;

pub use platform::HeadlessPlatform;
pub use platform::Platform;
pub use platform::PlatformAction;
pub use platform::ScrollBehavior;
pub use scheduler::Firing;
pub use scheduler::Scheduler;
pub use scheduler::TimerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    KeyDown,
    Submit,
    Scroll,
    Intersect,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::KeyDown => "keydown",
            Self::Submit => "submit",
            Self::Scroll => "scroll",
            Self::Intersect => "intersect",
        }
    }
}

/// Keyboard key, named as the browser reports `KeyboardEvent.key`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Space,
    Escape,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    Other(String),
}

impl Key {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Enter" => Self::Enter,
            " " => Self::Space,
            "Escape" => Self::Escape,
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            "Home" => Self::Home,
            "End" => Self::End,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Enter => "Enter",
            Self::Space => " ",
            Self::Escape => "Escape",
            Self::ArrowLeft => "ArrowLeft",
            Self::ArrowRight => "ArrowRight",
            Self::Home => "Home",
            Self::End => "End",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single dispatched event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomEvent {
    pub event_type: EventType,
    pub target: NodeId,
    /// Node whose listeners are currently running.
    pub current_target: NodeId,
    pub key: Option<Key>,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl DomEvent {
    pub fn new(event_type: EventType, target: NodeId) -> Self {
        Self {
            event_type,
            target,
            current_target: target,
            key: None,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn key_down(target: NodeId, key: Key) -> Self {
        Self {
            key: Some(key),
            ..Self::new(EventType::KeyDown, target)
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub fn key_is(&self, key: &Key) -> bool {
        self.key.as_ref() == Some(key)
    }
}

/// Bubbling path for `target`: the target first, then each ancestor up to the
/// document node. Scroll and intersection events do not bubble.
pub fn propagation_path(document: &Document, event: &DomEvent) -> Vec<NodeId> {
    let mut path = vec![event.target];
    if matches!(event.event_type, EventType::Scroll | EventType::Intersect) {
        return path;
    }
    path.extend(document.ancestors(event.target));
    path
}

/// Handle returned by [`ListenerRegistry::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Debug, Clone)]
struct ListenerEntry<T> {
    id: ListenerId,
    node: NodeId,
    event_type: EventType,
    payload: T,
}

/// Listeners keyed by node and event type, invoked in registration order.
#[derive(Debug, Clone)]
pub struct ListenerRegistry<T> {
    entries: Vec<ListenerEntry<T>>,
    next_id: u64,
}

impl<T> Default for ListenerRegistry<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }
}

impl<T> ListenerRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: NodeId, event_type: EventType, payload: T) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.entries.push(ListenerEntry {
            id,
            node,
            event_type,
            payload,
        });
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of listeners registered on `node` for `event_type`.
    pub fn count_on(&self, node: NodeId, event_type: EventType) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.node == node && entry.event_type == event_type)
            .count()
    }
}

impl<T: Clone> ListenerRegistry<T> {
    /// Copies out the listeners for one dispatch step so handlers may add or
    /// remove listeners while the step runs.
    pub fn listeners_for(&self, node: NodeId, event_type: EventType) -> Vec<(ListenerId, T)> {
        self.entries
            .iter()
            .filter(|entry| entry.node == node && entry.event_type == event_type)
            .map(|entry| (entry.id, entry.payload.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::DomEvent;
    use super::EventType;
    use super::Key;
    use super::ListenerRegistry;
    use super::propagation_path;
    use tr_dom::Document;

    #[test]
    fn key_names_match_browser_values() {
        for name in ["Enter", " ", "Escape", "ArrowLeft", "ArrowRight", "Home", "End", "Tab"] {
            assert_eq!(Key::from_name(name).name(), name);
        }
        assert_eq!(Key::from_name("Spacebar"), Key::Other("Spacebar".to_owned()));
        assert_eq!(Key::from_name(" "), Key::Space);
    }

    #[test]
    fn clicks_bubble_but_scroll_does_not() {
        let mut doc = Document::new();
        let root = doc.root();
        let outer = doc.create_element("div");
        let inner = doc.create_element("button");
        assert!(doc.append_child(root, outer).is_ok());
        assert!(doc.append_child(outer, inner).is_ok());

        let click = DomEvent::new(EventType::Click, inner);
        assert_eq!(propagation_path(&doc, &click), vec![inner, outer, root]);

        let scroll = DomEvent::new(EventType::Scroll, inner);
        assert_eq!(propagation_path(&doc, &scroll), vec![inner]);
    }

    #[test]
    fn registry_preserves_order_and_supports_removal() {
        let mut doc = Document::new();
        let node = doc.create_element("a");
        let mut registry = ListenerRegistry::new();
        let first = registry.add(node, EventType::Click, "first");
        let _second = registry.add(node, EventType::Click, "second");
        let _key = registry.add(node, EventType::KeyDown, "key");

        let payloads: Vec<_> = registry
            .listeners_for(node, EventType::Click)
            .into_iter()
            .map(|(_, payload)| payload)
            .collect();
        assert_eq!(payloads, vec!["first", "second"]);

        assert!(registry.remove(first));
        assert!(!registry.remove(first));
        assert_eq!(registry.count_on(node, EventType::Click), 1);
        assert_eq!(registry.len(), 2);
    }
}
