//! Text encoding helpers backed by `encoding_rs`.

use std::borrow::Cow;

use encoding_rs::Encoding;

use crate::error::{Error, Result};

/// Resolve an encoding label (`"utf-8"`, `"latin1"`, `"UTF-8"`, ...) to an
/// encoding that output can actually be written in.
///
/// `encoding_rs` cannot encode into UTF-16 or the replacement encoding; those
/// labels are rejected rather than silently written as UTF-8 under a
/// mismatched declaration.
pub fn resolve_output_encoding(label: &str) -> Result<&'static Encoding> {
    let encoding = Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| Error::UnsupportedEncoding(label.to_string()))?;

    if encoding.output_encoding() != encoding {
        return Err(Error::UnsupportedEncoding(format!(
            "{label} (cannot be used for output)"
        )));
    }
    Ok(encoding)
}

/// Canonical lower-case name of an encoding, as written in XML declarations.
pub fn declared_name(encoding: &'static Encoding) -> String {
    encoding.name().to_ascii_lowercase()
}

/// Encode text for writing.
///
/// Characters the encoding cannot represent become numeric character
/// references, which keeps XML output well-formed.
pub fn encode_text<'a>(text: &'a str, encoding: &'static Encoding) -> Cow<'a, [u8]> {
    let (bytes, _, _) = encoding.encode(text);
    bytes
}

/// Decode bytes to a string, handling various encodings.
///
/// This function:
/// 1. First tries UTF-8 (handles BOM automatically via encoding_rs)
/// 2. If malformed, tries the encoding named in the XML declaration
/// 3. Falls back to Windows-1252
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(label) = declared_encoding(bytes)
        && let Some(encoding) = Encoding::for_label(label.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Pull the `encoding="..."` value out of a leading XML declaration.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(200)];
    let head = String::from_utf8_lossy(head);
    let decl = head.strip_prefix("<?xml")?;
    let decl = &decl[..decl.find("?>")?];
    let after = &decl[decl.find("encoding")? + "encoding".len()..];
    let after = after.trim_start().strip_prefix('=')?.trim_start();
    let quote = after.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &after[1..];
    Some(value[..value.find(quote)?].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_output_encoding() {
        assert_eq!(resolve_output_encoding("utf-8").unwrap(), encoding_rs::UTF_8);
        assert_eq!(resolve_output_encoding("UTF-8").unwrap(), encoding_rs::UTF_8);
        assert_eq!(
            resolve_output_encoding("latin1").unwrap(),
            encoding_rs::WINDOWS_1252
        );
        assert!(matches!(
            resolve_output_encoding("klingon"),
            Err(Error::UnsupportedEncoding(_))
        ));
        assert!(resolve_output_encoding("utf-16le").is_err());
    }

    #[test]
    fn test_declared_name_is_lowercase() {
        assert_eq!(declared_name(encoding_rs::UTF_8), "utf-8");
        assert_eq!(declared_name(encoding_rs::WINDOWS_1252), "windows-1252");
    }

    #[test]
    fn test_encode_unmappable_as_char_ref() {
        let bytes = encode_text("a\u{2603}", encoding_rs::WINDOWS_1252);
        assert_eq!(bytes.as_ref(), b"a&#9731;");
    }

    #[test]
    fn test_decode_text_utf8_with_bom() {
        assert_eq!(decode_text(b"\xEF\xBB\xBFhello"), "hello");
    }

    #[test]
    fn test_decode_text_declared_encoding() {
        let bytes = b"<?xml version=\"1.0\" encoding=\"iso-8859-1\"?><p>caf\xe9</p>";
        assert_eq!(
            decode_text(bytes),
            "<?xml version=\"1.0\" encoding=\"iso-8859-1\"?><p>caf\u{e9}</p>"
        );
    }

    #[test]
    fn test_declared_encoding() {
        assert_eq!(
            declared_encoding(b"<?xml version='1.0' encoding='utf-8'?>").as_deref(),
            Some("utf-8")
        );
        assert_eq!(declared_encoding(b"<html/>"), None);
    }
}
