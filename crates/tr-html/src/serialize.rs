use crate::is_raw_text_tag;
use crate::is_void;
use tr_dom::Document;
use tr_dom::NodeData;
use tr_dom::NodeId;

/// Serializes `node` and its subtree (`outerHTML`).
pub fn serialize_node(document: &Document, node: NodeId) -> String {
    let mut out = String::new();
    write_node(document, node, false, &mut out);
    out
}

/// Serializes the children of `node` (`innerHTML`).
pub fn serialize_children(document: &Document, node: NodeId) -> String {
    let raw = document
        .tag_name(node)
        .is_some_and(|tag| is_raw_text_tag(tag));
    let mut out = String::new();
    for child in document.children(node) {
        write_node(document, *child, raw, &mut out);
    }
    out
}

fn write_node(document: &Document, node: NodeId, raw_parent: bool, out: &mut String) {
    match document.data(node) {
        None => {}
        Some(NodeData::Document) => {
            for child in document.children(node) {
                write_node(document, *child, false, out);
            }
        }
        Some(NodeData::Text(text)) => {
            if raw_parent {
                out.push_str(text);
            } else {
                escape_text(text, out);
            }
        }
        Some(NodeData::Element(element)) => {
            out.push('<');
            out.push_str(&element.tag);
            for (name, value) in &element.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_attribute(value, out);
                out.push('"');
            }
            out.push('>');

            if is_void(&element.tag) {
                return;
            }

            let raw = is_raw_text_tag(&element.tag);
            for child in document.children(node) {
                write_node(document, *child, raw, out);
            }
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
    }
}

fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::serialize_node;
    use crate::HtmlParser;

    #[test]
    fn attributes_are_quoted_and_void_elements_stay_open() {
        let doc = HtmlParser.parse("<div data-caption='Say \"hi\" & wave'><img src=a.png><br></div>");
        let div = doc.element_children(doc.root())[0];
        assert_eq!(
            serialize_node(&doc, div),
            "<div data-caption=\"Say &quot;hi&quot; &amp; wave\"><img src=\"a.png\"><br></div>"
        );
    }
}
