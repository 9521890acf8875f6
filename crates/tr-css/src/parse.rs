use super::AttributeOperator;
use super::AttributeSelector;
use super::Combinator;
use super::CompoundSelector;
use super::Selector;
use super::SelectorSegment;
use tr_core::TrellisError;
use tr_core::TrellisResult;

pub(crate) fn parse_selector_list(input: &str) -> TrellisResult<Vec<Selector>> {
    split_top_level_commas(input)
        .into_iter()
        .map(|part| parse_selector(input, part))
        .collect()
}

fn invalid(input: &str, reason: &str) -> TrellisError {
    TrellisError::new(
        "css.selector_invalid",
        format!("selector `{input}`: {reason}"),
    )
}

fn split_top_level_commas(input: &str) -> Vec<&str> {
    let bytes = input.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0_usize;
    let mut quote: Option<u8> = None;
    let mut bracket_depth = 0_u32;
    let mut idx = 0_usize;

    while idx < bytes.len() {
        let byte = bytes[idx];
        if let Some(open) = quote {
            if byte == b'\\' {
                idx = idx.saturating_add(2);
                continue;
            }
            if byte == open {
                quote = None;
            }
            idx = idx.saturating_add(1);
            continue;
        }

        match byte {
            b'\'' | b'"' => quote = Some(byte),
            b'[' => bracket_depth = bracket_depth.saturating_add(1),
            b']' => bracket_depth = bracket_depth.saturating_sub(1),
            b',' if bracket_depth == 0 => {
                parts.push(&input[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
        idx = idx.saturating_add(1);
    }

    parts.push(&input[start.min(input.len())..]);
    parts
}

fn parse_selector(full: &str, input: &str) -> TrellisResult<Selector> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid(full, "empty selector"));
    }

    let bytes = trimmed.as_bytes();
    let mut compounds: Vec<&str> = Vec::new();
    let mut combinators: Vec<Combinator> = Vec::new();
    let mut compound_start: Option<usize> = None;
    let mut pending_descendant = false;
    let mut quote: Option<u8> = None;
    let mut in_brackets = false;
    let mut idx = 0_usize;

    while idx < bytes.len() {
        let byte = bytes[idx];

        if let Some(open) = quote {
            if byte == b'\\' {
                idx = idx.saturating_add(2);
                continue;
            }
            if byte == open {
                quote = None;
            }
            idx = idx.saturating_add(1);
            continue;
        }

        if in_brackets {
            match byte {
                b'\'' | b'"' => quote = Some(byte),
                b']' => in_brackets = false,
                b'[' => return Err(invalid(full, "nested `[`")),
                _ => {}
            }
            idx = idx.saturating_add(1);
            continue;
        }

        match byte {
            b'>' => {
                if let Some(start) = compound_start.take() {
                    compounds.push(&trimmed[start..idx]);
                }
                if compounds.len() != combinators.len() + 1 {
                    return Err(invalid(full, "combinator without a left-hand side"));
                }
                pending_descendant = false;
                combinators.push(Combinator::Child);
            }
            b'+' | b'~' => {
                return Err(invalid(full, "sibling combinators are not supported"));
            }
            _ if byte.is_ascii_whitespace() => {
                if let Some(start) = compound_start.take() {
                    compounds.push(&trimmed[start..idx]);
                }
                if compounds.len() > combinators.len() {
                    pending_descendant = true;
                }
            }
            _ => {
                if compound_start.is_none() {
                    if pending_descendant {
                        combinators.push(Combinator::Descendant);
                        pending_descendant = false;
                    }
                    compound_start = Some(idx);
                }
                match byte {
                    b'[' => in_brackets = true,
                    b'\'' | b'"' => quote = Some(byte),
                    _ => {}
                }
            }
        }

        idx = idx.saturating_add(1);
    }

    if quote.is_some() || in_brackets {
        return Err(invalid(full, "unterminated attribute selector"));
    }
    if let Some(start) = compound_start {
        compounds.push(&trimmed[start..]);
    }
    if compounds.is_empty() || compounds.len() != combinators.len() + 1 {
        return Err(invalid(full, "dangling combinator"));
    }

    let mut parsed = Vec::with_capacity(compounds.len());
    for raw in compounds {
        parsed.push(parse_compound(full, raw)?);
    }

    let mut segments = Vec::with_capacity(parsed.len());
    for (index, compound) in parsed.into_iter().enumerate().rev() {
        let combinator_to_next = if index == 0 {
            None
        } else {
            combinators.get(index - 1).copied()
        };
        segments.push(SelectorSegment {
            compound,
            combinator_to_next,
        });
    }

    Ok(Selector { segments })
}

fn parse_compound(full: &str, raw: &str) -> TrellisResult<CompoundSelector> {
    let bytes = raw.as_bytes();
    let mut compound = CompoundSelector::default();
    let mut idx = 0_usize;

    if bytes.first() == Some(&b'*') {
        idx = 1;
    } else if bytes.first().is_some_and(u8::is_ascii_alphabetic) {
        let end = ident_end(bytes, idx);
        compound.tag = Some(raw[idx..end].to_ascii_lowercase());
        idx = end;
    }

    while idx < bytes.len() {
        match bytes[idx] {
            b'#' => {
                let start = idx + 1;
                let end = ident_end(bytes, start);
                if start == end {
                    return Err(invalid(full, "empty id selector"));
                }
                if compound.id.is_some() {
                    return Err(invalid(full, "more than one id in a compound selector"));
                }
                compound.id = Some(raw[start..end].to_owned());
                idx = end;
            }
            b'.' => {
                let start = idx + 1;
                let end = ident_end(bytes, start);
                if start == end {
                    return Err(invalid(full, "empty class selector"));
                }
                compound.classes.push(raw[start..end].to_owned());
                idx = end;
            }
            b'[' => {
                let (attribute, next) = parse_attribute(full, raw, idx)?;
                compound.attributes.push(attribute);
                idx = next;
            }
            b':' => return Err(invalid(full, "pseudo-classes are not supported")),
            other => {
                return Err(invalid(
                    full,
                    &format!("unexpected character `{}`", other as char),
                ));
            }
        }
    }

    Ok(compound)
}

/// Parses `[name op value]` starting at the `[`; returns the index after `]`.
fn parse_attribute(
    full: &str,
    raw: &str,
    open: usize,
) -> TrellisResult<(AttributeSelector, usize)> {
    let bytes = raw.as_bytes();
    let mut idx = skip_spaces(bytes, open + 1);
    let name_start = idx;
    idx = ident_end(bytes, idx);
    if name_start == idx {
        return Err(invalid(full, "attribute selector without a name"));
    }
    let name = raw[name_start..idx].to_ascii_lowercase();
    idx = skip_spaces(bytes, idx);

    if bytes.get(idx) == Some(&b']') {
        return Ok((
            AttributeSelector {
                name,
                matcher: None,
            },
            idx + 1,
        ));
    }

    let operator = match (bytes.get(idx), bytes.get(idx + 1)) {
        (Some(&b'='), _) => {
            idx += 1;
            AttributeOperator::Equals
        }
        (Some(&prefix), Some(&b'=')) => {
            let operator = match prefix {
                b'^' => AttributeOperator::Prefix,
                b'$' => AttributeOperator::Suffix,
                b'*' => AttributeOperator::Substring,
                b'~' => AttributeOperator::Includes,
                b'|' => AttributeOperator::DashMatch,
                _ => return Err(invalid(full, "unknown attribute operator")),
            };
            idx += 2;
            operator
        }
        _ => return Err(invalid(full, "malformed attribute selector")),
    };

    idx = skip_spaces(bytes, idx);
    let value = match bytes.get(idx) {
        Some(&quote) if quote == b'"' || quote == b'\'' => {
            let mut value = String::new();
            let mut cursor = idx + 1;
            let mut chars = raw[cursor..].char_indices();
            let mut closed = false;
            while let Some((offset, ch)) = chars.next() {
                if ch == '\\' {
                    if let Some((_, escaped)) = chars.next() {
                        value.push(escaped);
                    }
                    continue;
                }
                if ch == quote as char {
                    cursor += offset + 1;
                    closed = true;
                    break;
                }
                value.push(ch);
            }
            if !closed {
                return Err(invalid(full, "unterminated attribute value"));
            }
            idx = cursor;
            value
        }
        _ => {
            let start = idx;
            idx = ident_end(bytes, idx);
            if start == idx {
                return Err(invalid(full, "attribute selector without a value"));
            }
            raw[start..idx].to_owned()
        }
    };

    idx = skip_spaces(bytes, idx);
    if bytes.get(idx) != Some(&b']') {
        return Err(invalid(full, "expected `]`"));
    }

    Ok((
        AttributeSelector {
            name,
            matcher: Some((operator, value)),
        },
        idx + 1,
    ))
}

fn ident_end(bytes: &[u8], mut idx: usize) -> usize {
    while idx < bytes.len() && is_ident_byte(bytes[idx]) {
        idx += 1;
    }
    idx
}

fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_') || byte >= 0x80
}

fn skip_spaces(bytes: &[u8], mut idx: usize) -> usize {
    while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
        idx += 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::parse_selector_list;
    use crate::AttributeOperator;
    use crate::Combinator;

    #[test]
    fn segments_are_stored_right_to_left() {
        let parsed = parse_selector_list("div.tabs > .tab-button[role=\"tab\"]");
        let Ok(selectors) = parsed else {
            panic!("selector should parse");
        };
        let segments = &selectors[0].segments;
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].compound.classes, vec!["tab-button".to_owned()]);
        assert_eq!(
            segments[0].compound.attributes[0].matcher,
            Some((AttributeOperator::Equals, "tab".to_owned()))
        );
        assert_eq!(segments[0].combinator_to_next, Some(Combinator::Child));
        assert_eq!(segments[1].compound.tag.as_deref(), Some("div"));
        assert_eq!(segments[1].combinator_to_next, None);
    }

    #[test]
    fn commas_inside_attribute_values_do_not_split() {
        let parsed = parse_selector_list("[data-caption='a, b'] , .carousel");
        assert!(parsed.is_ok_and(|selectors| selectors.len() == 2));
    }
}
