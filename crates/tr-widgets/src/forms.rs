//! Client-side validation for `form[data-validate]`.

use crate::Binding;
use crate::Context;
use crate::Controller;
use crate::WidgetKind;
use core::any::Any;
use regex::Regex;
use std::sync::LazyLock;
use tr_dom::NodeId;
use tr_events::DomEvent;
use tr_events::EventType;
use tracing::debug;
use tracing::trace;

const REQUIRED_MESSAGE: &str = "This field is required";
const EMAIL_MESSAGE: &str = "Please enter a valid email address";
const ERROR_STYLE: &str = "color: #dc3545; font-size: 0.875rem; margin-top: 0.25rem";

static EMAIL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

/// Loose address check: something, `@`, something, `.`, something, with no
/// whitespace and exactly one `@`.
pub fn is_valid_email(candidate: &str) -> bool {
    EMAIL
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(candidate))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValidator {
    form: NodeId,
    /// Fields flagged by the latest submit.
    invalid: Vec<NodeId>,
}

impl FormValidator {
    pub fn bind(cx: &mut Context<'_>, form: NodeId) -> Self {
        cx.listen(form, EventType::Submit, Binding::Item(0));
        Self {
            form,
            invalid: Vec::new(),
        }
    }

    /// Fields that failed the most recent validation, in report order.
    pub fn invalid_fields(&self) -> &[NodeId] {
        &self.invalid
    }

    /// Re-runs validation; returns whether the form may submit.
    pub fn validate(&mut self, cx: &mut Context<'_>) -> bool {
        for stale in cx.select(self.form, ".form-error") {
            if let Err(error) = cx.document.remove(stale) {
                debug!(%error, "could not remove stale form error");
            }
        }
        for field in self.invalid.drain(..) {
            cx.set_class(field, "is-invalid", false);
        }

        let mut errors: Vec<(NodeId, &'static str)> = Vec::new();
        for field in cx.select(self.form, "[required]") {
            if field_value(cx, field).trim().is_empty() {
                errors.push((field, REQUIRED_MESSAGE));
            }
        }
        for field in cx.select(self.form, "input[type=\"email\"]") {
            let value = field_value(cx, field);
            if !value.is_empty() && !is_valid_email(&value) {
                errors.push((field, EMAIL_MESSAGE));
            }
        }

        for (field, message) in &errors {
            show_field_error(cx, *field, message);
            if !self.invalid.contains(field) {
                self.invalid.push(*field);
            }
        }

        trace!(form = %self.form, errors = errors.len(), "form validated");
        errors.is_empty()
    }
}

/// `value` of a form control: the attribute for inputs, the text for a
/// `<textarea>` that carries no value attribute.
fn field_value(cx: &Context<'_>, field: NodeId) -> String {
    if let Some(value) = cx.document.attribute(field, "value") {
        return value.to_owned();
    }
    if cx.document.tag_name(field) == Some("textarea") {
        return cx.document.text_content(field);
    }
    String::new()
}

fn show_field_error(cx: &mut Context<'_>, field: NodeId, message: &str) {
    let parent = cx.document.parent(field);
    let Some(parent) = parent else {
        debug!(%field, "detached field cannot show an error");
        return;
    };
    if let Some(error) = cx.append_element(parent, "div", "form-error") {
        cx.set_text(error, message);
        cx.apply_style_text(error, ERROR_STYLE);
    }
    cx.set_class(field, "is-invalid", true);
}

impl Controller for FormValidator {
    fn kind(&self) -> WidgetKind {
        WidgetKind::FormValidation
    }

    fn root(&self) -> NodeId {
        self.form
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn handle_event(&mut self, cx: &mut Context<'_>, _binding: Binding, event: &mut DomEvent) {
        if event.event_type == EventType::Submit && !self.validate(cx) {
            event.prevent_default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::is_valid_email;

    #[test]
    fn email_check_matches_the_page_script_pattern() {
        for valid in ["a@b.co", "first.last+tag@sub.example.org", "x@y.z"] {
            assert!(is_valid_email(valid), "{valid} should pass");
        }
        for invalid in ["", "plain", "a@b", "a b@c.d", "a@@b.c", "@b.c", "a@b."] {
            assert!(!is_valid_email(invalid), "{invalid} should fail");
        }
    }
}
