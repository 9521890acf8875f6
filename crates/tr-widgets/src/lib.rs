//! Interactive behaviors attached to server-rendered markup.
//!
//! [`scan`] discovers widget roots by their marker classes and binds one
//! [`Controller`] per root into a [`WidgetRegistry`]. Controllers keep their
//! state in plain fields and write ARIA attributes, classes and inline styles
//! as a projection of that state after every transition; the DOM is never
//! read back to decide what to do next.
//!
//! Input reaches controllers through [`dispatch_event`] and
//! [`dispatch_timer`], which the host calls with a [`Context`] borrowing the
//! document, listener table, timer queue and platform.

use core::any::Any;
use core::fmt;
use serde::Deserialize;
use serde::Serialize;
use tr_dom::NodeId;
use tr_events::DomEvent;

mod accordion;
mod anchors;
mod back_to_top;
mod carousel;
mod code_copy;
mod context;
mod external_links;
mod forms;
mod lazy_images;
mod lightbox;
mod nav_toggle;
mod registry;
mod scan;
mod tabs;

pub use accordion::Accordion;
pub use anchors::AnchorScroll;
pub use back_to_top::BackToTop;
pub use carousel::Carousel;
pub use code_copy::CodeCopy;
pub use context::Context;
pub use external_links::ExternalLink;
pub use forms::FormValidator;
pub use forms::is_valid_email;
pub use lazy_images::LazyImage;
pub use lightbox::Lightbox;
pub use lightbox::OverlayState;
pub use nav_toggle::NavToggle;
pub use registry::WidgetRegistry;
pub use registry::dispatch_event;
pub use registry::dispatch_timer;
pub use scan::ScanReport;
pub use scan::scan;
pub use tabs::Tabs;

/// Every behavior the scanner knows how to bind, in activation order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetKind {
    NavToggle,
    AnchorScroll,
    LazyImage,
    FormValidation,
    ExternalLink,
    BackToTop,
    Lightbox,
    CodeCopy,
    Accordion,
    Tabs,
    Carousel,
}

impl WidgetKind {
    pub const ALL: [Self; 11] = [
        Self::NavToggle,
        Self::AnchorScroll,
        Self::LazyImage,
        Self::FormValidation,
        Self::ExternalLink,
        Self::BackToTop,
        Self::Lightbox,
        Self::CodeCopy,
        Self::Accordion,
        Self::Tabs,
        Self::Carousel,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NavToggle => "nav-toggle",
            Self::AnchorScroll => "anchor-scroll",
            Self::LazyImage => "lazy-image",
            Self::FormValidation => "form-validation",
            Self::ExternalLink => "external-link",
            Self::BackToTop => "back-to-top",
            Self::Lightbox => "lightbox",
            Self::CodeCopy => "code-copy",
            Self::Accordion => "accordion",
            Self::Tabs => "tabs",
            Self::Carousel => "carousel",
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Behavior-layer settings shared by every controller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Kinds the scanner binds; anything else is left untouched.
    pub enabled: Vec<WidgetKind>,
    /// How long a code-copy button reads "Copied!".
    pub copy_feedback_ms: u64,
    /// Scroll offset past which the back-to-top button shows.
    pub back_to_top_threshold_px: u32,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            enabled: WidgetKind::ALL.to_vec(),
            copy_feedback_ms: 2_000,
            back_to_top_threshold_px: 300,
        }
    }
}

impl WidgetConfig {
    pub fn is_enabled(&self, kind: WidgetKind) -> bool {
        self.enabled.contains(&kind)
    }
}

/// Index of a controller inside its [`WidgetRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControllerId(usize);

impl ControllerId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a listener means to the controller that registered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    /// The i-th item of the controller (header, tab, dot, trigger...).
    Item(usize),
    Previous,
    Next,
    /// Close button or backdrop of an overlay.
    Dismiss,
    /// Listener on the document node itself.
    Document,
}

/// Listener payload stored in the host's listener table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listener {
    pub controller: ControllerId,
    pub binding: Binding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    Autoplay,
    CopyFeedback,
}

/// Timer payload stored in the host's scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTag {
    pub controller: ControllerId,
    pub kind: TimerKind,
}

/// Result of dispatching one input event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    pub listeners_invoked: usize,
    pub default_prevented: bool,
}

/// A bound widget instance.
pub trait Controller: fmt::Debug {
    fn kind(&self) -> WidgetKind;

    /// Element the controller was bound to.
    fn root(&self) -> NodeId;

    /// Typed access for hosts and tests inspecting controller state.
    fn as_any(&self) -> &dyn Any;

    fn handle_event(&mut self, cx: &mut Context<'_>, binding: Binding, event: &mut DomEvent);

    fn handle_timer(&mut self, _cx: &mut Context<'_>, _kind: TimerKind) {}

    /// Takes over an extra element found by a later scan. Only shared
    /// singletons accept; everyone else returns `false`.
    fn adopt(&mut self, _cx: &mut Context<'_>, _node: NodeId) -> bool {
        false
    }
}
