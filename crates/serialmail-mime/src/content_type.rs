//! MIME content type handling.

use crate::error::{Error, Result};
use crate::params::{Parameters, quote_value, split_parameters};
use std::fmt;

/// Media type used when none is given.
pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// MIME content type with parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    /// Lowercase `type/subtype`.
    media_type: String,
    /// Parameters (e.g., charset=utf-8, boundary=xxx, name=file.txt).
    parameters: Parameters,
}

impl Default for ContentType {
    fn default() -> Self {
        Self {
            media_type: DEFAULT_MEDIA_TYPE.to_string(),
            parameters: Parameters::new(),
        }
    }
}

impl ContentType {
    /// Creates an `application/octet-stream` content type.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a content type for the given media type, without parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the media type is not `type/subtype`.
    pub fn with_media_type(media_type: &str) -> Result<Self> {
        let mut ct = Self::new();
        ct.set_media_type(media_type)?;
        Ok(ct)
    }

    /// Parses a content type string.
    ///
    /// Format: `type/subtype; param1=value1; param2="value 2"`
    ///
    /// # Errors
    ///
    /// Returns an error if the format is invalid.
    pub fn parse(s: &str) -> Result<Self> {
        let (media_type, params) = split_parameters(s);
        let params = params
            .ok_or_else(|| Error::format(format!("Invalid content type parameters: '{s}'")))?;

        let mut content_type = Self::with_media_type(&media_type)?;
        for (key, value) in params {
            if !is_token(&key) {
                return Err(Error::format(format!("Invalid parameter name: '{key}'")));
            }
            content_type.parameters.set(key, value);
        }

        Ok(content_type)
    }

    /// Returns the media type (e.g. `text/plain`).
    #[must_use]
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Replaces the media type, keeping parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the media type is not `type/subtype`.
    pub fn set_media_type(&mut self, media_type: &str) -> Result<()> {
        let media_type = media_type.trim();
        let (main_type, sub_type) = media_type
            .split_once('/')
            .ok_or_else(|| Error::format(format!("Missing subtype in '{media_type}'")))?;
        if !is_token(main_type) || !is_token(sub_type) {
            return Err(Error::format(format!("Invalid media type: '{media_type}'")));
        }
        self.media_type = media_type.to_lowercase();
        Ok(())
    }

    /// Returns the `name` parameter if present.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.parameters.get("name")
    }

    /// Sets or clears the `name` parameter.
    pub fn set_name(&mut self, name: Option<&str>) {
        self.set_parameter("name", name);
    }

    /// Returns the charset parameter if present.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.parameters.get("charset")
    }

    /// Sets or clears the charset parameter.
    pub fn set_charset(&mut self, charset: Option<&str>) {
        self.set_parameter("charset", charset);
    }

    /// Returns the boundary parameter if present.
    #[must_use]
    pub fn boundary(&self) -> Option<&str> {
        self.parameters.get("boundary")
    }

    /// Sets or clears the boundary parameter.
    pub fn set_boundary(&mut self, boundary: Option<&str>) {
        self.set_parameter("boundary", boundary);
    }

    /// Returns all parameters.
    #[must_use]
    pub const fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn set_parameter(&mut self, key: &str, value: Option<&str>) {
        match value {
            Some(value) => self.parameters.set(key, value),
            None => {
                self.parameters.remove(key);
            }
        }
    }
}

/// Returns true if `s` is a non-empty RFC 2045 token.
pub(crate) fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_graphic() && !"()<>@,;:\\\"/[]?=".contains(c))
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.media_type)?;
        for (key, value) in self.parameters.iter() {
            write!(f, "; {key}={}", quote_value(value))?;
        }
        Ok(())
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
    fn test_content_type_default() {
        let ct = ContentType::new();
        assert_eq!(ct.media_type(), "application/octet-stream");
        assert!(ct.parameters().is_empty());
    }

    #[test]
    fn test_content_type_parse() {
        let ct = ContentType::parse("Text/Plain; charset=utf-8").unwrap();
        assert_eq!(ct.media_type(), "text/plain");
        assert_eq!(ct.charset(), Some("utf-8"));
    }

    #[test]
    fn test_content_type_parse_quoted() {
        let ct = ContentType::parse("multipart/mixed; boundary=\"----=_Part_123\"").unwrap();
        assert_eq!(ct.media_type(), "multipart/mixed");
        assert_eq!(ct.boundary(), Some("----=_Part_123"));
    }

    #[test]
    fn test_content_type_parse_invalid() {
        assert!(ContentType::parse("").is_err());
        assert!(ContentType::parse("text").is_err());
        assert!(ContentType::parse("text/").is_err());
        assert!(ContentType::parse("te xt/plain").is_err());
        assert!(ContentType::parse("text/plain; charset").is_err());
    }

    #[test]
    fn test_content_type_display() {
        let mut ct = ContentType::with_media_type("text/plain").unwrap();
        ct.set_charset(Some("utf-8"));
        ct.set_name(Some("my file.txt"));
        assert_eq!(ct.to_string(), "text/plain; charset=utf-8; name=\"my file.txt\"");

        ct.set_name(None);
        assert_eq!(ct.to_string(), "text/plain; charset=utf-8");
    }

    #[test]
    fn test_set_media_type_keeps_parameters() {
        let mut ct = ContentType::parse("text/plain; name=a.txt").unwrap();
        ct.set_media_type("application/pdf").unwrap();
        assert_eq!(ct.name(), Some("a.txt"));
        assert!(ct.set_media_type("nonsense").is_err());
    }
}
