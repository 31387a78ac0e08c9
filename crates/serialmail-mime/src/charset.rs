//! Text encodings identified by Windows code page numbers.
//!
//! The registry below is the set of encodings "installed" on this platform.
//! Code pages outside of it cannot be resolved.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{Error, Result};

/// How bytes are produced for an encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Codec {
    Utf8,
    Ascii,
    Utf16Le,
    Utf16Be,
    /// Delegated to `encoding_rs` by charset label.
    Label,
}

/// A text encoding with its code page and MIME charset name.
#[derive(Debug, Clone, Copy)]
pub struct Encoding {
    code_page: i32,
    name: &'static str,
    codec: Codec,
}

const fn label(code_page: i32, name: &'static str) -> Encoding {
    Encoding {
        code_page,
        name,
        codec: Codec::Label,
    }
}

const REGISTRY: &[Encoding] = &[
    Encoding::UTF8,
    Encoding::ASCII,
    Encoding::UTF16_LE,
    Encoding::UTF16_BE,
    Encoding::LATIN1,
    label(28592, "iso-8859-2"),
    label(28593, "iso-8859-3"),
    label(28594, "iso-8859-4"),
    label(28595, "iso-8859-5"),
    label(28596, "iso-8859-6"),
    label(28597, "iso-8859-7"),
    label(28598, "iso-8859-8"),
    label(28605, "iso-8859-15"),
    label(1250, "windows-1250"),
    label(1251, "windows-1251"),
    label(1252, "windows-1252"),
    label(1253, "windows-1253"),
    label(1254, "windows-1254"),
    label(1255, "windows-1255"),
    label(1256, "windows-1256"),
    label(1257, "windows-1257"),
    label(1258, "windows-1258"),
    label(874, "windows-874"),
    label(866, "ibm866"),
    label(20866, "koi8-r"),
    label(21866, "koi8-u"),
    label(10000, "macintosh"),
    label(932, "shift_jis"),
    label(51932, "euc-jp"),
    label(50220, "iso-2022-jp"),
    label(936, "gb2312"),
    label(54936, "gb18030"),
    label(949, "ks_c_5601-1987"),
    label(950, "big5"),
];

impl Encoding {
    /// UTF-8 (code page 65001).
    pub const UTF8: Self = Self {
        code_page: 65001,
        name: "utf-8",
        codec: Codec::Utf8,
    };

    /// US-ASCII (code page 20127).
    pub const ASCII: Self = Self {
        code_page: 20127,
        name: "us-ascii",
        codec: Codec::Ascii,
    };

    /// UTF-16 little endian (code page 1200).
    pub const UTF16_LE: Self = Self {
        code_page: 1200,
        name: "utf-16",
        codec: Codec::Utf16Le,
    };

    /// UTF-16 big endian (code page 1201).
    pub const UTF16_BE: Self = Self {
        code_page: 1201,
        name: "utf-16BE",
        codec: Codec::Utf16Be,
    };

    /// ISO-8859-1 (code page 28591).
    pub const LATIN1: Self = label(28591, "iso-8859-1");

    /// Resolves a code page to a registered encoding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCodePage`] if the code page is not registered.
    pub fn from_code_page(code_page: i32) -> Result<Self> {
        REGISTRY
            .iter()
            .find(|encoding| encoding.code_page == code_page)
            .copied()
            .ok_or(Error::UnknownCodePage(code_page))
    }

    /// Resolves a MIME charset label (e.g. `"UTF-8"`, `"latin1"`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCharset`] if no registered encoding matches.
    pub fn for_label(charset: &str) -> Result<Self> {
        let charset = charset.trim();
        if let Some(encoding) = REGISTRY
            .iter()
            .find(|encoding| encoding.name.eq_ignore_ascii_case(charset))
        {
            return Ok(*encoding);
        }

        let unknown = || Error::UnknownCharset(charset.to_string());
        let web = encoding_rs::Encoding::for_label(charset.as_bytes()).ok_or_else(unknown)?;
        REGISTRY
            .iter()
            .find(|encoding| encoding.web() == Some(web))
            .copied()
            .ok_or_else(unknown)
    }

    /// Returns the code page number.
    #[must_use]
    pub const fn code_page(&self) -> i32 {
        self.code_page
    }

    /// Returns the MIME charset name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    fn web(&self) -> Option<&'static encoding_rs::Encoding> {
        match self.codec {
            Codec::Utf8 => Some(encoding_rs::UTF_8),
            Codec::Ascii => None,
            Codec::Utf16Le => Some(encoding_rs::UTF_16LE),
            Codec::Utf16Be => Some(encoding_rs::UTF_16BE),
            Codec::Label => encoding_rs::Encoding::for_label(self.name.as_bytes()),
        }
    }

    /// Encodes text into this charset. Unmappable characters are replaced.
    #[must_use]
    pub fn encode<'a>(&self, text: &'a str) -> Cow<'a, [u8]> {
        match self.codec {
            Codec::Utf8 => Cow::Borrowed(text.as_bytes()),
            Codec::Ascii if text.is_ascii() => Cow::Borrowed(text.as_bytes()),
            Codec::Ascii => Cow::Owned(
                text.chars()
                    .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                    .collect(),
            ),
            Codec::Utf16Le => Cow::Owned(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
            Codec::Utf16Be => Cow::Owned(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
            Codec::Label => match self.web() {
                Some(web) => web.encode(text).0,
                None => Cow::Borrowed(text.as_bytes()),
            },
        }
    }
}

impl PartialEq for Encoding {
    fn eq(&self, other: &Self) -> bool {
        self.code_page == other.code_page
    }
}

impl Eq for Encoding {}

impl Hash for Encoding {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code_page.hash(state);
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
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

    #[test]
    fn test_from_code_page() {
        assert_eq!(Encoding::from_code_page(65001).unwrap(), Encoding::UTF8);
        assert_eq!(Encoding::from_code_page(20127).unwrap().name(), "us-ascii");
        assert_eq!(Encoding::from_code_page(1252).unwrap().name(), "windows-1252");
    }

    #[test]
    fn test_unknown_code_page() {
        assert!(matches!(
            Encoding::from_code_page(424242),
            Err(Error::UnknownCodePage(424242))
        ));
    }

    #[test]
    fn test_for_label() {
        assert_eq!(Encoding::for_label("UTF-8").unwrap(), Encoding::UTF8);
        assert_eq!(Encoding::for_label("US-ASCII").unwrap(), Encoding::ASCII);
        assert_eq!(Encoding::for_label("utf8").unwrap(), Encoding::UTF8);
        assert_eq!(Encoding::for_label("cp1251").unwrap().code_page(), 1251);
        assert!(Encoding::for_label("klingon").is_err());
    }

    #[test]
    fn test_encode_ascii_replaces() {
        assert_eq!(Encoding::ASCII.encode("Héllo").as_ref(), b"H?llo");
        assert_eq!(Encoding::ASCII.encode("Hello").as_ref(), b"Hello");
    }

    #[test]
    fn test_encode_utf16() {
        assert_eq!(Encoding::UTF16_LE.encode("Hi").as_ref(), &[b'H', 0, b'i', 0]);
        assert_eq!(Encoding::UTF16_BE.encode("Hi").as_ref(), &[0, b'H', 0, b'i']);
    }

    #[test]
    fn test_encode_latin1() {
        let bytes = Encoding::LATIN1.encode("café");
        assert_eq!(bytes.as_ref(), &[b'c', b'a', b'f', 0xE9]);
    }

    #[test]
    fn test_equality_by_code_page() {
        let a = Encoding::from_code_page(1200).unwrap();
        assert_eq!(a, Encoding::UTF16_LE);
        assert_ne!(a, Encoding::UTF16_BE);
    }
}
