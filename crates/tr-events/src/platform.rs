//! Host capabilities the behavior layer calls out to.

use core::fmt;
use tr_core::TrellisError;
use tr_core::TrellisResult;
use tr_dom::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Auto,
    Smooth,
}

impl ScrollBehavior {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Smooth => "smooth",
        }
    }
}

/// Browser services outside the document tree.
pub trait Platform {
    fn write_clipboard(&mut self, text: &str) -> TrellisResult<()>;

    /// Scrolls `node` to the start of the viewport.
    fn scroll_into_view(&mut self, node: NodeId, behavior: ScrollBehavior);

    fn scroll_to(&mut self, top: u32, behavior: ScrollBehavior);

    fn push_history(&mut self, url: &str);

    fn supports_intersection_observer(&self) -> bool;
}

/// Side effect requested through a [`HeadlessPlatform`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformAction {
    ClipboardWrite(String),
    ScrollIntoView {
        node: NodeId,
        behavior: ScrollBehavior,
    },
    ScrollTo {
        top: u32,
        behavior: ScrollBehavior,
    },
    PushHistory(String),
}

impl fmt::Display for PlatformAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClipboardWrite(text) => write!(f, "clipboard {text:?}"),
            Self::ScrollIntoView { node, behavior } => {
                write!(f, "scroll-into-view {node} ({})", behavior.as_str())
            }
            Self::ScrollTo { top, behavior } => {
                write!(f, "scroll-to {top} ({})", behavior.as_str())
            }
            Self::PushHistory(url) => write!(f, "push-history {url}"),
        }
    }
}

/// Platform that records every request instead of performing it.
#[derive(Debug, Clone)]
pub struct HeadlessPlatform {
    actions: Vec<PlatformAction>,
    clipboard: Option<String>,
    clipboard_denied: bool,
    intersection_observer: bool,
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self {
            actions: Vec::new(),
            clipboard: None,
            clipboard_denied: false,
            intersection_observer: true,
        }
    }
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_intersection_observer(mut self, supported: bool) -> Self {
        self.intersection_observer = supported;
        self
    }

    /// Makes every clipboard write fail, as when permission is refused.
    pub fn deny_clipboard(&mut self, denied: bool) {
        self.clipboard_denied = denied;
    }

    pub fn actions(&self) -> &[PlatformAction] {
        &self.actions
    }

    pub fn clipboard(&self) -> Option<&str> {
        self.clipboard.as_deref()
    }
}

impl Platform for HeadlessPlatform {
    fn write_clipboard(&mut self, text: &str) -> TrellisResult<()> {
        if self.clipboard_denied {
            return Err(TrellisError::new(
                "platform.clipboard_denied",
                "clipboard write was not allowed",
            ));
        }
        self.clipboard = Some(text.to_owned());
        self.actions
            .push(PlatformAction::ClipboardWrite(text.to_owned()));
        Ok(())
    }

    fn scroll_into_view(&mut self, node: NodeId, behavior: ScrollBehavior) {
        self.actions
            .push(PlatformAction::ScrollIntoView { node, behavior });
    }

    fn scroll_to(&mut self, top: u32, behavior: ScrollBehavior) {
        self.actions.push(PlatformAction::ScrollTo { top, behavior });
    }

    fn push_history(&mut self, url: &str) {
        self.actions.push(PlatformAction::PushHistory(url.to_owned()));
    }

    fn supports_intersection_observer(&self) -> bool {
        self.intersection_observer
    }
}

#[cfg(test)]
mod tests {
    use super::HeadlessPlatform;
    use super::Platform;
    use super::PlatformAction;

    #[test]
    fn denied_clipboard_leaves_no_trace() {
        let mut platform = HeadlessPlatform::new();
        platform.deny_clipboard(true);
        assert!(
            platform
                .write_clipboard("fn main() {}")
                .is_err_and(|error| error.is("platform.clipboard_denied"))
        );
        assert_eq!(platform.clipboard(), None);
        assert!(platform.actions().is_empty());

        platform.deny_clipboard(false);
        assert!(platform.write_clipboard("ok").is_ok());
        assert_eq!(
            platform.actions(),
            &[PlatformAction::ClipboardWrite("ok".to_owned())]
        );
    }
}
