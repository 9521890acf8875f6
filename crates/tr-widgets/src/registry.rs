use crate::Context;
use crate::Controller;
use crate::ControllerId;
use crate::DispatchOutcome;
use crate::TimerTag;
use crate::WidgetKind;
use std::collections::HashSet;
use tr_dom::NodeId;
use tr_events::DomEvent;
use tr_events::propagation_path;
use tracing::trace;

/// Controllers bound on one page, plus the bookkeeping that keeps scanning
/// idempotent.
#[derive(Debug, Default)]
pub struct WidgetRegistry {
    controllers: Vec<Box<dyn Controller>>,
    bound: HashSet<(WidgetKind, NodeId)>,
    singletons: Vec<(WidgetKind, ControllerId)>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    pub fn count(&self, kind: WidgetKind) -> usize {
        self.controllers
            .iter()
            .filter(|controller| controller.kind() == kind)
            .count()
    }

    /// True once `node` has been claimed by a `kind` controller.
    pub fn is_bound(&self, kind: WidgetKind, node: NodeId) -> bool {
        self.bound.contains(&(kind, node))
    }

    pub fn get(&self, id: ControllerId) -> Option<&dyn Controller> {
        self.controllers.get(id.0).map(|controller| &**controller)
    }

    /// First controller of type `C` bound to `root`.
    pub fn find<C: Controller + 'static>(&self, root: NodeId) -> Option<&C> {
        self.controllers
            .iter()
            .filter(|controller| controller.root() == root)
            .find_map(|controller| controller.as_any().downcast_ref::<C>())
    }

    /// Every controller of type `C`, in binding order.
    pub fn all<C: Controller + 'static>(&self) -> Vec<&C> {
        self.controllers
            .iter()
            .filter_map(|controller| controller.as_any().downcast_ref::<C>())
            .collect()
    }

    pub(crate) fn next_id(&self) -> ControllerId {
        ControllerId(self.controllers.len())
    }

    pub(crate) fn mark_bound(&mut self, kind: WidgetKind, node: NodeId) {
        self.bound.insert((kind, node));
    }

    pub(crate) fn insert(&mut self, controller: Box<dyn Controller>) -> ControllerId {
        let id = self.next_id();
        self.controllers.push(controller);
        id
    }

    pub(crate) fn singleton(&self, kind: WidgetKind) -> Option<ControllerId> {
        self.singletons
            .iter()
            .find(|(singleton_kind, _)| *singleton_kind == kind)
            .map(|(_, id)| *id)
    }

    pub(crate) fn insert_singleton(&mut self, controller: Box<dyn Controller>) -> ControllerId {
        let kind = controller.kind();
        let id = self.insert(controller);
        self.singletons.push((kind, id));
        id
    }

    pub(crate) fn adopt(&mut self, id: ControllerId, cx: &mut Context<'_>, node: NodeId) -> bool {
        let Some(controller) = self.controllers.get_mut(id.0) else {
            return false;
        };
        cx.enter(id);
        controller.adopt(cx, node)
    }
}

/// Delivers `event` to every listener on its propagation path, target first.
///
/// Listeners are snapshotted per node, so a handler that removes a listener
/// on a node that has not been reached yet prevents it from running.
pub fn dispatch_event(
    registry: &mut WidgetRegistry,
    cx: &mut Context<'_>,
    event: &mut DomEvent,
) -> DispatchOutcome {
    let mut outcome = DispatchOutcome::default();

    for node in propagation_path(cx.document, event) {
        event.current_target = node;
        for (listener_id, listener) in cx.listeners.listeners_for(node, event.event_type) {
            if !cx.listeners.contains(listener_id) {
                continue;
            }
            let Some(controller) = registry.controllers.get_mut(listener.controller.0) else {
                continue;
            };

            trace!(
                event = event.event_type.as_str(),
                %node,
                kind = %controller.kind(),
                "listener invoked"
            );
            cx.enter(listener.controller);
            controller.handle_event(cx, listener.binding, event);
            outcome.listeners_invoked = outcome.listeners_invoked.saturating_add(1);
        }

        if event.propagation_stopped() {
            break;
        }
    }

    outcome.default_prevented = event.default_prevented();
    outcome
}

/// Runs the controller that armed `tag`.
pub fn dispatch_timer(registry: &mut WidgetRegistry, cx: &mut Context<'_>, tag: TimerTag) -> bool {
    let Some(controller) = registry.controllers.get_mut(tag.controller.0) else {
        return false;
    };
    cx.enter(tag.controller);
    controller.handle_timer(cx, tag.kind);
    true
}
