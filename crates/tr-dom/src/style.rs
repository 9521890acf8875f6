//! Inline `style` attribute parsing.

/// Splits a declaration block into `(name, value)` pairs.
///
/// Names are lowercased, values trimmed. Semicolons inside quotes or
/// parentheses do not end a declaration. `!important` stays part of the value.
pub fn parse_declarations(input: &str) -> Vec<(String, String)> {
    split_top_level(input, ';')
        .into_iter()
        .filter_map(|entry| {
            let (name, value) = entry.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                return None;
            }
            Some((name, value.to_owned()))
        })
        .collect()
}

pub fn serialize_declarations(declarations: &[(String, String)]) -> String {
    declarations
        .iter()
        .map(|(name, value)| format!("{name}: {value};"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn split_top_level(input: &str, delimiter: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0_usize;
    let mut quote: Option<char> = None;
    let mut paren_depth = 0_u32;

    for (idx, ch) in input.char_indices() {
        if let Some(open) = quote {
            if ch == open {
                quote = None;
            }
            continue;
        }

        match ch {
            '\'' | '"' => quote = Some(ch),
            '(' => paren_depth = paren_depth.saturating_add(1),
            ')' => paren_depth = paren_depth.saturating_sub(1),
            _ if ch == delimiter && paren_depth == 0 => {
                parts.push(&input[start..idx]);
                start = idx + ch.len_utf8();
            }
            _ => {}
        }
    }

    parts.push(&input[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::parse_declarations;

    #[test]
    fn keeps_semicolons_inside_functions_and_quotes() {
        let parsed = parse_declarations(
            "background: url('a;b.png'); color: rgba(0, 0, 0, 0.9) ; ;Display:NONE",
        );
        assert_eq!(
            parsed,
            vec![
                ("background".to_owned(), "url('a;b.png')".to_owned()),
                ("color".to_owned(), "rgba(0, 0, 0, 0.9)".to_owned()),
                ("display".to_owned(), "NONE".to_owned()),
            ]
        );
    }
}
