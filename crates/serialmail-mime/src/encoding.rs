//! MIME transfer encoding utilities.
//!
//! Base64, Quoted-Printable and RFC 2047 header encoding for rendering.

use crate::charset::Encoding;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt::Write as _;

/// Maximum line length for encoded bodies.
const MAX_LINE_LENGTH: usize = 76;

/// Encodes data as Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Encodes data as Base64 wrapped at 76 columns with CRLF line breaks.
#[must_use]
pub fn encode_base64_wrapped(data: &[u8]) -> String {
    let encoded = encode_base64(data);
    let mut result = String::with_capacity(encoded.len() + encoded.len() / MAX_LINE_LENGTH * 2);
    for (i, chunk) in encoded.as_bytes().chunks(MAX_LINE_LENGTH).enumerate() {
        if i > 0 {
            result.push_str("\r\n");
        }
        // Base64 output is always ASCII.
        result.push_str(&String::from_utf8_lossy(chunk));
    }
    result
}

/// Encodes bytes using Quoted-Printable encoding (RFC 2045).
///
/// Encodes bytes that are not printable ASCII or would interfere
/// with email transmission. CRLF pairs are kept as hard line breaks.
#[must_use]
pub fn encode_quoted_printable(data: &[u8]) -> String {
    let mut result = String::new();
    let mut line_length = 0;
    let mut bytes = data.iter().peekable();

    while let Some(&byte) = bytes.next() {
        if byte == b'\r' && bytes.peek() == Some(&&b'\n') {
            bytes.next();
            result.push_str("\r\n");
            line_length = 0;
            continue;
        }

        // Check if we need soft line break
        if line_length >= MAX_LINE_LENGTH - 3 {
            result.push_str("=\r\n");
            line_length = 0;
        }

        match byte {
            // Printable ASCII except '='
            b'!'..=b'<' | b'>'..=b'~' => {
                result.push(byte as char);
                line_length += 1;
            }
            // Space is encoded only before a line break
            b' ' if !matches!(bytes.peek(), None | Some(&&b'\r')) => {
                result.push(' ');
                line_length += 1;
            }
            // Everything else gets encoded
            _ => {
                let _ = write!(result, "={byte:02X}");
                line_length += 3;
            }
        }
    }

    result
}

/// Encodes a header value using RFC 2047 `B` encoding in the given charset.
///
/// Format: `=?charset?B?encoded-text?=`. Plain ASCII text without
/// RFC 2047 delimiters is returned unchanged.
#[must_use]
pub fn encode_rfc2047(text: &str, charset: &Encoding) -> String {
    if text.chars().all(|c| c.is_ascii() && !c.is_ascii_control()) && !text.contains("=?") {
        return text.to_string();
    }

    let encoded = encode_base64(&charset.encode(text));
    format!("=?{}?B?{encoded}?=", charset.name())
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_encode() {
        assert_eq!(encode_base64(b"Hello, World!"), "SGVsbG8sIFdvcmxkIQ==");
    }

    #[test]
    fn test_base64_wrapped() {
        let data = vec![0u8; 120];
        let encoded = encode_base64_wrapped(&data);
        let lines: Vec<&str> = encoded.split("\r\n").collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|line| line.len() <= 76));
        assert_eq!(lines.concat(), encode_base64(&data));
    }

    #[test]
    fn test_quoted_printable_encode() {
        assert_eq!(encode_quoted_printable(b"Hello, World!"), "Hello, World!");

        let encoded = encode_quoted_printable("Héllo, Wørld!".as_bytes());
        assert!(encoded.contains("=C3"));

        assert_eq!(encode_quoted_printable(b"a=b"), "a=3Db");
        assert_eq!(encode_quoted_printable(b"end "), "end=20");
    }

    #[test]
    fn test_quoted_printable_keeps_hard_breaks() {
        let encoded = encode_quoted_printable(b"line one\r\nline two");
        assert_eq!(encoded, "line one\r\nline two");
    }

    #[test]
    fn test_rfc2047_encode() {
        assert_eq!(encode_rfc2047("Hello", &Encoding::UTF8), "Hello");

        let encoded = encode_rfc2047("Héllo", &Encoding::UTF8);
        assert!(encoded.starts_with("=?utf-8?B?"));
        assert!(encoded.ends_with("?="));

        let latin = encode_rfc2047("Héllo", &Encoding::LATIN1);
        assert_eq!(latin, "=?iso-8859-1?B?SOlsbG8=?=");
    }

    proptest::proptest! {
        #[test]
        fn prop_quoted_printable_lines_stay_short(data in proptest::collection::vec(proptest::num::u8::ANY, 0..400)) {
            let encoded = encode_quoted_printable(&data);
            for line in encoded.split("\r\n") {
                proptest::prop_assert!(line.len() <= MAX_LINE_LENGTH);
            }
        }

        #[test]
        fn prop_rfc2047_utf8_carries_base64_payload(text in "\\PC{0,40}") {
            let encoded = encode_rfc2047(&text, &Encoding::UTF8);
            if encoded != text {
                let payload = encoded
                    .strip_prefix("=?utf-8?B?")
                    .and_then(|rest| rest.strip_suffix("?="))
                    .unwrap();
                proptest::prop_assert_eq!(payload, encode_base64(text.as_bytes()));
            }
        }
    }
}
