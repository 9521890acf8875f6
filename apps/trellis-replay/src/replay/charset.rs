use encoding_rs::Encoding;
use tracing::debug;

const SNIFF_LIMIT: usize = 8 * 1024;

/// Decodes page bytes: a byte-order mark wins, then a `charset=` label near
/// the top of the document, then lossy UTF-8.
pub(crate) fn decode_page(bytes: &[u8]) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (decoded, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return decoded.into_owned();
    }

    let declared = sniff_meta_charset(bytes);
    if let Some(encoding) = declared.and_then(|label| Encoding::for_label(label.as_bytes())) {
        let (decoded, _, had_errors) = encoding.decode(bytes);
        if had_errors {
            debug!(encoding = encoding.name(), "page contains malformed sequences");
        }
        return decoded.into_owned();
    }

    String::from_utf8_lossy(bytes).into_owned()
}

/// First usable `charset=` label in the leading bytes; covers both
/// `<meta charset>` and the `http-equiv` content form.
pub(crate) fn sniff_meta_charset(bytes: &[u8]) -> Option<String> {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(SNIFF_LIMIT)]);
    let lower = head.to_ascii_lowercase();
    let mut from = 0_usize;

    while let Some(found) = lower[from..].find("charset") {
        let mut cursor = from + found + "charset".len();
        from = cursor;
        let rest = lower[cursor..].trim_start();
        if !rest.starts_with('=') {
            continue;
        }
        cursor = lower.len() - rest.len() + 1;
        if let Some(label) = charset_label(&head[cursor..]) {
            return Some(label);
        }
    }

    None
}

fn charset_label(input: &str) -> Option<String> {
    let input = input.trim_start();
    let label = match input.chars().next()? {
        quote @ ('"' | '\'') => {
            let rest = &input[1..];
            &rest[..rest.find(quote)?]
        }
        _ => {
            let end = input
                .find(|ch: char| ch.is_whitespace() || matches!(ch, '"' | '\'' | ';' | '>' | '/'))
                .unwrap_or(input.len());
            &input[..end]
        }
    };

    let label = label.trim();
    (!label.is_empty()).then(|| label.to_owned())
}
