//! Character decoding of a markup document ahead of parsing.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};

/// Decode `bytes` to text.
///
/// A byte order mark decides first, then the UTF-16 shape of an unmarked
/// `<?`, then the `encoding` of the XML declaration, then UTF-8. Malformed
/// input fails with the name of the encoding it was decoded as.
pub(crate) fn decode_document(bytes: &[u8]) -> Result<Cow<'_, str>, &'static str> {
    let (encoding, body) = detect(bytes);
    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or(encoding.name())
}

fn detect(bytes: &[u8]) -> (&'static Encoding, &[u8]) {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return (encoding, &bytes[bom_len..]);
    }
    match bytes {
        [0x3C, 0x00, 0x3F, 0x00, ..] => return (UTF_16LE, bytes),
        [0x00, 0x3C, 0x00, 0x3F, ..] => return (UTF_16BE, bytes),
        _ => {}
    }

    // A UTF-16 label on ASCII-shaped bytes cannot be right; read as UTF-8.
    let encoding = declared_encoding(bytes)
        .and_then(Encoding::for_label)
        .map_or(UTF_8, Encoding::output_encoding);
    (encoding, bytes)
}

fn declared_encoding(bytes: &[u8]) -> Option<&[u8]> {
    let decl = bytes.strip_prefix(b"<?xml")?;
    let end = decl.windows(2).position(|w| w == b"?>")?;
    let decl = &decl[..end];

    let at = decl.windows(8).position(|w| w == b"encoding")?;
    let rest = decl[at + 8..]
        .trim_ascii_start()
        .strip_prefix(b"=")?
        .trim_ascii_start();
    let (&quote, rest) = rest.split_first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let len = rest.iter().position(|&b| b == quote)?;
    Some(&rest[..len])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16le(text: &str, bom: bool) -> Vec<u8> {
        let mut bytes = if bom { vec![0xFF, 0xFE] } else { Vec::new() };
        for unit in text.encode_utf16() {
            bytes.extend(unit.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn declared_encoding_is_read() {
        assert_eq!(
            declared_encoding(b"<?xml version=\"1.0\" encoding = 'ISO-8859-1'?><r/>"),
            Some(&b"ISO-8859-1"[..])
        );
        assert_eq!(declared_encoding(b"<?xml version=\"1.0\"?><r/>"), None);
        assert_eq!(declared_encoding(b"<r encoding=\"x\"/>"), None);
    }

    #[test]
    fn plain_utf8() {
        assert_eq!(decode_document("<r>é</r>".as_bytes()).unwrap(), "<r>é</r>");
    }

    #[test]
    fn byte_order_mark_is_dropped() {
        assert_eq!(decode_document(b"\xEF\xBB\xBF<r/>").unwrap(), "<r/>");
        assert_eq!(decode_document(&utf16le("<r/>", true)).unwrap(), "<r/>");
    }

    #[test]
    fn unmarked_utf16() {
        let text = "<?xml version=\"1.0\" encoding=\"UTF-16\"?><r/>";
        assert_eq!(decode_document(&utf16le(text, false)).unwrap(), text);
    }

    #[test]
    fn latin1_declaration() {
        let decoded =
            decode_document(b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><r>caf\xE9</r>")
                .unwrap();
        assert!(decoded.ends_with("<r>café</r>"));
    }

    #[test]
    fn utf16_label_on_ascii_bytes_reads_as_utf8() {
        let text = "<?xml version=\"1.0\" encoding=\"UTF-16\"?><r/>";
        assert_eq!(decode_document(text.as_bytes()).unwrap(), text);
    }

    #[test]
    fn malformed_utf8_fails() {
        assert_eq!(decode_document(b"<r>\xFF</r>"), Err("UTF-8"));
    }
}
