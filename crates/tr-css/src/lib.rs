//! CSS selector parsing and matching over `tr-dom` documents.
//!
//! Supported subset: type, universal, `#id`, `.class`, attribute selectors
//! (`[a]`, `[a=v]`, `[a^=v]`, `[a$=v]`, `[a*=v]`, `[a~=v]`, `[a|=v]`),
//! descendant and child combinators, and comma-separated lists. Anything
//! else is rejected with `css.selector_invalid` rather than silently
//! over-matching.

use tr_core::TrellisError;
use tr_core::TrellisResult;
use tr_dom::Document;
use tr_dom::NodeId;

mod parse;

use parse::parse_selector_list;

/// A parsed, comma-separated selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<Selector>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Selector {
    /// Right-to-left: `segments[0]` is the subject.
    segments: Vec<SelectorSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectorSegment {
    compound: CompoundSelector,
    combinator_to_next: Option<Combinator>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CompoundSelector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeSelector>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeSelector {
    name: String,
    matcher: Option<(AttributeOperator, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttributeOperator {
    Equals,
    Prefix,
    Suffix,
    Substring,
    Includes,
    DashMatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

impl SelectorList {
    pub fn parse(input: &str) -> TrellisResult<Self> {
        let selectors = parse_selector_list(input)?;
        if selectors.is_empty() {
            return Err(TrellisError::new(
                "css.selector_invalid",
                format!("selector `{input}` is empty"),
            ));
        }
        Ok(Self { selectors })
    }

    /// True when `node` is an element matched by any selector in the list.
    pub fn matches(&self, document: &Document, node: NodeId) -> bool {
        document.is_element(node)
            && self
                .selectors
                .iter()
                .any(|selector| selector.matches(document, node))
    }

    /// Matching descendants of `scope` in document order (`querySelectorAll`).
    pub fn query_all(&self, document: &Document, scope: NodeId) -> Vec<NodeId> {
        document
            .descendants(scope)
            .filter(|node| self.matches(document, *node))
            .collect()
    }

    pub fn query_first(&self, document: &Document, scope: NodeId) -> Option<NodeId> {
        document
            .descendants(scope)
            .find(|node| self.matches(document, *node))
    }

    /// Nearest inclusive ancestor matching the list (`Element.closest`).
    pub fn closest(&self, document: &Document, node: NodeId) -> Option<NodeId> {
        std::iter::once(node)
            .chain(document.ancestors(node))
            .find(|candidate| self.matches(document, *candidate))
    }
}

/// Parses `selectors` and returns every match below `scope`.
pub fn query_all(
    document: &Document,
    scope: NodeId,
    selectors: &str,
) -> TrellisResult<Vec<NodeId>> {
    Ok(SelectorList::parse(selectors)?.query_all(document, scope))
}

pub fn query_first(
    document: &Document,
    scope: NodeId,
    selectors: &str,
) -> TrellisResult<Option<NodeId>> {
    Ok(SelectorList::parse(selectors)?.query_first(document, scope))
}

pub fn closest(
    document: &Document,
    node: NodeId,
    selectors: &str,
) -> TrellisResult<Option<NodeId>> {
    Ok(SelectorList::parse(selectors)?.closest(document, node))
}

impl Selector {
    fn matches(&self, document: &Document, node: NodeId) -> bool {
        let Some(subject) = self.segments.first() else {
            return false;
        };
        subject.compound.matches(document, node) && self.matches_from(0, document, node)
    }

    /// `node` already matched `segments[index]`; check the rest of the chain,
    /// backtracking over descendant combinators.
    fn matches_from(&self, index: usize, document: &Document, node: NodeId) -> bool {
        let Some(next) = self.segments.get(index + 1) else {
            return true;
        };
        let combinator = self.segments[index]
            .combinator_to_next
            .unwrap_or(Combinator::Descendant);

        match combinator {
            Combinator::Child => document.parent(node).is_some_and(|parent| {
                next.compound.matches(document, parent)
                    && self.matches_from(index + 1, document, parent)
            }),
            Combinator::Descendant => document.ancestors(node).any(|ancestor| {
                next.compound.matches(document, ancestor)
                    && self.matches_from(index + 1, document, ancestor)
            }),
        }
    }
}

impl CompoundSelector {
    fn matches(&self, document: &Document, node: NodeId) -> bool {
        let Some(element) = document.element(node) else {
            return false;
        };

        if let Some(tag) = &self.tag {
            if !element.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if let Some(id) = &self.id {
            if element.attr("id") != Some(id.as_str()) {
                return false;
            }
        }

        if !self
            .classes
            .iter()
            .all(|class_name| document.has_class(node, class_name))
        {
            return false;
        }

        self.attributes
            .iter()
            .all(|attribute| attribute.matches(element.attr(&attribute.name)))
    }
}

impl AttributeSelector {
    fn matches(&self, actual: Option<&str>) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        let Some((operator, expected)) = &self.matcher else {
            return true;
        };
        let expected = expected.as_str();

        match operator {
            AttributeOperator::Equals => actual == expected,
            AttributeOperator::Prefix => !expected.is_empty() && actual.starts_with(expected),
            AttributeOperator::Suffix => !expected.is_empty() && actual.ends_with(expected),
            AttributeOperator::Substring => !expected.is_empty() && actual.contains(expected),
            AttributeOperator::Includes => actual
                .split_ascii_whitespace()
                .any(|word| word == expected),
            AttributeOperator::DashMatch => {
                actual == expected
                    || actual
                        .strip_prefix(expected)
                        .is_some_and(|rest| rest.starts_with('-'))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SelectorList;
    use super::query_all;
    use tr_dom::Document;
    use tr_dom::ElementData;
    use tr_dom::NodeId;

    fn el(doc: &mut Document, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let mut data = ElementData::new(tag);
        data.attrs = attrs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        let id = doc.create_element_with(data);
        assert!(doc.append_child(parent, id).is_ok());
        id
    }

    #[test]
    fn matches_descendant_attribute_selector() {
        let mut doc = Document::new();
        let root = doc.root();
        let figure = el(&mut doc, root, "div", &[("class", "image-component wide")]);
        let inner = el(&mut doc, figure, "span", &[]);
        let with_flag = el(&mut doc, inner, "img", &[("data-lightbox", "")]);
        let _plain = el(&mut doc, figure, "img", &[("src", "a.png")]);
        let outside = el(&mut doc, root, "img", &[("data-lightbox", "")]);

        let found = query_all(&doc, root, ".image-component img[data-lightbox]");
        assert_eq!(found, Ok(vec![with_flag]));
        assert!(!matches!(found, Ok(ref nodes) if nodes.contains(&outside)));
    }

    #[test]
    fn child_combinator_backtracks_through_ancestors() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = el(&mut doc, root, "div", &[("class", "a")]);
        let b_outer = el(&mut doc, a, "div", &[("class", "b")]);
        let b_inner = el(&mut doc, b_outer, "div", &[("class", "b")]);
        let c = el(&mut doc, b_inner, "p", &[("class", "c")]);

        let selector = SelectorList::parse(".a > .b .c");
        assert!(selector.is_ok_and(|list| list.matches(&doc, c)));
    }

    #[test]
    fn attribute_operators_follow_css_rules() {
        let mut doc = Document::new();
        let root = doc.root();
        let anchor = el(&mut doc, root, "a", &[("href", "#intro"), ("rel", "noopener external")]);
        let blank = el(&mut doc, root, "a", &[("href", "/about"), ("target", "_blank")]);

        assert_eq!(query_all(&doc, root, "a[href^=\"#\"]"), Ok(vec![anchor]));
        assert_eq!(query_all(&doc, root, "a[target='_blank']"), Ok(vec![blank]));
        assert_eq!(query_all(&doc, root, "[rel~=external]"), Ok(vec![anchor]));
        assert_eq!(query_all(&doc, root, "a[href^='']"), Ok(vec![]));
        assert_eq!(
            query_all(&doc, root, "a[href$=intro], a[target]"),
            Ok(vec![anchor, blank])
        );
    }

    #[test]
    fn closest_is_inclusive() {
        let mut doc = Document::new();
        let root = doc.root();
        let tabs = el(&mut doc, root, "div", &[("class", "tabs")]);
        let button = el(&mut doc, tabs, "button", &[("class", "tab-button")]);

        let list = SelectorList::parse(".tabs, .tab-button");
        assert!(list.is_ok_and(|list| list.closest(&doc, button) == Some(button)));
        assert_eq!(super::closest(&doc, button, ".tabs"), Ok(Some(tabs)));
    }

    #[test]
    fn rejects_unsupported_syntax() {
        for input in ["", "a + b", "li:first-child", "div >", "[data-x", ".", "a,,b"] {
            let parsed = SelectorList::parse(input);
            assert!(
                parsed.is_err_and(|error| error.is("css.selector_invalid")),
                "expected `{input}` to be rejected"
            );
        }
    }
}
