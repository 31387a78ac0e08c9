//! Recovery of display name encodings from live addresses.

use serialmail_mime::MailAddress;

/// Looks up the code page a live address uses for its display name.
///
/// Returning `None` makes the converter fall back to
/// [`ConvertConfig::default_display_name_code_page`](crate::ConvertConfig).
pub trait DisplayNameCodePage {
    /// Returns the display name code page of `address`, if known.
    fn display_name_code_page(&self, address: &MailAddress) -> Option<i32>;
}

/// Reads the encoding explicitly assigned to the live address.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodingIntrospection;

impl DisplayNameCodePage for EncodingIntrospection {
    fn display_name_code_page(&self, address: &MailAddress) -> Option<i32> {
        address.display_name_encoding().map(|encoding| encoding.code_page())
    }
}

/// Never recovers an encoding; the configured default always applies.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIntrospection;

impl DisplayNameCodePage for NoIntrospection {
    fn display_name_code_page(&self, _address: &MailAddress) -> Option<i32> {
        None
    }
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
    use serialmail_mime::Encoding;

    #[test]
    fn test_encoding_introspection() {
        let plain = MailAddress::new("a@a.com").unwrap();
        assert_eq!(EncodingIntrospection.display_name_code_page(&plain), None);

        let ascii = MailAddress::with_encoding("a@a.com", "A", Encoding::ASCII).unwrap();
        assert_eq!(EncodingIntrospection.display_name_code_page(&ascii), Some(20127));
    }

    #[test]
    fn test_no_introspection() {
        let ascii = MailAddress::with_encoding("a@a.com", "A", Encoding::ASCII).unwrap();
        assert_eq!(NoIntrospection.display_name_code_page(&ascii), None);
    }
}
