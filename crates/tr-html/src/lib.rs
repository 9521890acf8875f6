//! HTML tokenization, tree building and serialization.
//!
//! This is a forgiving fragment parser for server-rendered markup rather than
//! a full HTML5 tree builder. Unknown end tags are dropped, unclosed elements
//! are closed at end of input, and `<script>`/`<style>` bodies are kept as raw
//! text.

use tr_core::TrellisError;
use tr_core::TrellisResult;
use tr_dom::Document;
use tr_dom::ElementData;
use tr_dom::NodeData;
use tr_dom::NodeId;

mod serialize;
mod tokenize;

pub use serialize::serialize_children;
pub use serialize::serialize_node;
use tokenize::Token;
use tokenize::tokenize;

/// Parses raw HTML into a DOM document.
#[derive(Debug, Default)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn parse(&self, input: &str) -> Document {
        let mut document = Document::new();
        let root = document.root();
        build_tree(&mut document, root, tokenize(input));
        document
    }

    /// Parses `input` and appends the resulting nodes to `parent`.
    ///
    /// Returns the top-level nodes that were appended.
    pub fn parse_into(
        &self,
        document: &mut Document,
        parent: NodeId,
        input: &str,
    ) -> TrellisResult<Vec<NodeId>> {
        match document.data(parent) {
            None => {
                return Err(TrellisError::new(
                    "dom.unknown_node",
                    format!("{parent} is not part of this document"),
                ));
            }
            Some(NodeData::Text(_)) => {
                return Err(TrellisError::new(
                    "dom.hierarchy_request",
                    format!("cannot parse markup into text {parent}"),
                ));
            }
            Some(_) => {}
        }

        let before = document.children(parent).len();
        build_tree(document, parent, tokenize(input));
        Ok(document.children(parent)[before..].to_vec())
    }
}

fn build_tree(document: &mut Document, parent: NodeId, tokens: Vec<Token>) {
    let mut stack: Vec<(NodeId, String)> = vec![(parent, String::new())];

    for token in tokens {
        let current = stack.last().map(|(id, _)| *id).unwrap_or(parent);
        match token {
            Token::Text(text) => {
                let node = document.create_text(decode_entities(&text));
                let _ = document.append_child(current, node);
            }
            Token::RawText(text) => {
                let node = document.create_text(text);
                let _ = document.append_child(current, node);
            }
            Token::Start {
                name,
                attrs,
                self_closing,
            } => {
                let node = document.create_element_with(ElementData {
                    tag: name.clone(),
                    attrs,
                });
                let _ = document.append_child(current, node);
                if !(self_closing || is_void(&name)) {
                    stack.push((node, name));
                }
            }
            Token::End { name } => {
                let Some(open_at) = stack
                    .iter()
                    .skip(1)
                    .rposition(|(_, open_name)| *open_name == name)
                else {
                    continue;
                };
                stack.truncate(open_at + 1);
            }
        }
    }
}

pub(crate) fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut cursor = 0_usize;

    while let Some(rel_amp) = input[cursor..].find('&') {
        let amp = cursor + rel_amp;
        out.push_str(&input[cursor..amp]);

        let rest = &input[(amp + 1)..];
        let Some(rel_semi) = rest.find(';') else {
            out.push('&');
            cursor = amp + 1;
            continue;
        };

        let semi = amp + 1 + rel_semi;
        let entity = &input[(amp + 1)..semi];
        if let Some(decoded) = decode_entity(entity) {
            out.push(decoded);
            cursor = semi + 1;
        } else {
            out.push('&');
            cursor = amp + 1;
        }
    }

    out.push_str(&input[cursor..]);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "nbsp" => Some('\u{a0}'),
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "times" => Some('\u{d7}'),
        "uarr" => Some('\u{2191}'),
        "larr" => Some('\u{2190}'),
        "rarr" => Some('\u{2192}'),
        "hellip" => Some('\u{2026}'),
        "copy" => Some('\u{a9}'),
        _ => {
            if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                let value = u32::from_str_radix(hex, 16).ok()?;
                char::from_u32(value)
            } else if let Some(dec) = entity.strip_prefix('#') {
                let value = dec.parse::<u32>().ok()?;
                char::from_u32(value)
            } else {
                None
            }
        }
    }
}

pub(crate) fn is_void(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

pub(crate) fn is_raw_text_tag(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

#[cfg(test)]
mod tests {
    use super::HtmlParser;
    use super::serialize_children;

    #[test]
    fn parses_title_and_nested_structure() {
        let doc = HtmlParser.parse(
            "<html><head><title> Trellis   Demo </title></head><body><div class='tabs'><button class=tab-button>One</button></div></body></html>",
        );
        assert_eq!(doc.title().as_deref(), Some("Trellis Demo"));
        let Some(body) = doc.body() else {
            panic!("body should be parsed");
        };
        let tabs = doc.element_children(body);
        assert_eq!(tabs.len(), 1);
        assert_eq!(doc.attribute(tabs[0], "class"), Some("tabs"));
        assert_eq!(doc.text_content(tabs[0]), "One");
    }

    #[test]
    fn void_and_self_closing_elements_do_not_swallow_siblings() {
        let doc = HtmlParser.parse("<p><img src=a.png alt=\"A &amp; B\"><br/>after</p>");
        let paragraphs = doc.element_children(doc.root());
        assert_eq!(paragraphs.len(), 1);
        let children = doc.children(paragraphs[0]);
        assert_eq!(children.len(), 3);
        assert_eq!(doc.attribute(children[0], "alt"), Some("A & B"));
        assert_eq!(doc.text_content(children[2]), "after");
    }

    #[test]
    fn stray_end_tags_are_ignored() {
        let doc = HtmlParser.parse("<div class=a></span><p>x</p></div><p>y</p>");
        let top = doc.element_children(doc.root());
        assert_eq!(top.len(), 2);
        assert_eq!(doc.element_children(top[0]).len(), 1);
    }

    #[test]
    fn script_bodies_are_kept_verbatim() {
        let doc = HtmlParser.parse("<script>if (a < b && c) {}</script><p>&lt;ok&gt;</p>");
        assert_eq!(
            serialize_children(&doc, doc.root()),
            "<script>if (a < b && c) {}</script><p>&lt;ok&gt;</p>"
        );
    }

    #[test]
    fn parse_into_appends_to_existing_parent() {
        let mut doc = HtmlParser.parse("<body><main></main></body>");
        let Some(body) = doc.body() else {
            panic!("body should be parsed");
        };
        let added = HtmlParser.parse_into(&mut doc, body, "<section class=carousel></section>text");
        assert!(added.is_ok_and(|nodes| nodes.len() == 2));
        assert_eq!(doc.children(body).len(), 3);
    }
}
