//! MIME content disposition (RFC 2183).

use chrono::{DateTime, Datelike, Utc};
use std::fmt;
use std::ops::RangeInclusive;

use crate::content_type::is_token;
use crate::error::{Error, Result};
use crate::params::{Parameters, quote_value, split_parameters};

/// Disposition type of a regular attachment.
pub const ATTACHMENT: &str = "attachment";

/// Disposition type of an inline part.
pub const INLINE: &str = "inline";

/// Parameters held in typed fields rather than in
/// [`ContentDisposition::parameters`].
pub const TYPED_PARAMETERS: [&str; 5] = [
    "filename",
    "size",
    "creation-date",
    "modification-date",
    "read-date",
];

/// Years an RFC 2822 date parameter can carry.
pub const RFC2822_YEARS: RangeInclusive<i32> = 0..=9999;

/// Content-Disposition header of an attachment.
///
/// Well-known parameters (`filename`, `size` and the three dates) are kept
/// in typed fields; any other parameter lives in [`parameters`](Self::parameters).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDisposition {
    disposition_type: String,
    file_name: Option<String>,
    creation_date: Option<DateTime<Utc>>,
    modification_date: Option<DateTime<Utc>>,
    read_date: Option<DateTime<Utc>>,
    size: i64,
    parameters: Parameters,
}

impl Default for ContentDisposition {
    fn default() -> Self {
        Self {
            disposition_type: ATTACHMENT.to_string(),
            file_name: None,
            creation_date: None,
            modification_date: None,
            read_date: None,
            size: -1,
            parameters: Parameters::new(),
        }
    }
}

impl ContentDisposition {
    /// Creates an `attachment` disposition with unknown size.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a Content-Disposition header value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if the type, a parameter, a date
    /// or the size is malformed.
    pub fn parse(s: &str) -> Result<Self> {
        let (disposition_type, params) = split_parameters(s);
        let params = params
            .ok_or_else(|| Error::format(format!("Invalid disposition parameters: '{s}'")))?;

        let mut disposition = Self::new();
        disposition.set_disposition_type(&disposition_type)?;

        for (key, value) in params {
            match key.as_str() {
                "filename" => disposition.file_name = Some(value),
                "size" => {
                    disposition.size = value
                        .parse()
                        .map_err(|_| Error::format(format!("Invalid size: '{value}'")))?;
                }
                "creation-date" => disposition.creation_date = Some(parse_date(&value)?),
                "modification-date" => disposition.modification_date = Some(parse_date(&value)?),
                "read-date" => disposition.read_date = Some(parse_date(&value)?),
                _ if is_token(&key) => disposition.parameters.set(key, value),
                _ => return Err(Error::format(format!("Invalid parameter name: '{key}'"))),
            }
        }

        Ok(disposition)
    }

    /// Returns the disposition type (`attachment`, `inline`, ...).
    #[must_use]
    pub fn disposition_type(&self) -> &str {
        &self.disposition_type
    }

    /// Sets the disposition type.
    ///
    /// # Errors
    ///
    /// Returns an error if the type is not a MIME token.
    pub fn set_disposition_type(&mut self, disposition_type: &str) -> Result<()> {
        let disposition_type = disposition_type.trim();
        if !is_token(disposition_type) {
            return Err(Error::format(format!(
                "Invalid disposition type: '{disposition_type}'"
            )));
        }
        self.disposition_type = disposition_type.to_lowercase();
        Ok(())
    }

    /// Returns true for an inline disposition.
    #[must_use]
    pub fn inline(&self) -> bool {
        self.disposition_type == INLINE
    }

    /// Switches between `inline` and `attachment`.
    pub fn set_inline(&mut self, inline: bool) {
        self.disposition_type = if inline { INLINE } else { ATTACHMENT }.to_string();
    }

    /// Returns the suggested file name.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Sets or clears the suggested file name.
    pub fn set_file_name(&mut self, file_name: Option<String>) {
        self.file_name = file_name;
    }

    /// Returns the creation date.
    #[must_use]
    pub const fn creation_date(&self) -> Option<DateTime<Utc>> {
        self.creation_date
    }

    /// Sets the creation date.
    pub const fn set_creation_date(&mut self, date: Option<DateTime<Utc>>) {
        self.creation_date = date;
    }

    /// Returns the modification date.
    #[must_use]
    pub const fn modification_date(&self) -> Option<DateTime<Utc>> {
        self.modification_date
    }

    /// Sets the modification date.
    pub const fn set_modification_date(&mut self, date: Option<DateTime<Utc>>) {
        self.modification_date = date;
    }

    /// Returns the read date.
    #[must_use]
    pub const fn read_date(&self) -> Option<DateTime<Utc>> {
        self.read_date
    }

    /// Sets the read date.
    pub const fn set_read_date(&mut self, date: Option<DateTime<Utc>>) {
        self.read_date = date;
    }

    /// Returns the size in bytes, -1 if unknown.
    #[must_use]
    pub const fn size(&self) -> i64 {
        self.size
    }

    /// Sets the size in bytes (-1 for unknown).
    pub const fn set_size(&mut self, size: i64) {
        self.size = size;
    }

    /// Returns the extension parameters.
    #[must_use]
    pub const fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Returns the extension parameters for in-place updates.
    pub const fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.parameters
    }
}

fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|e| Error::format(format!("Invalid date '{value}': {e}")))
}

impl fmt::Display for ContentDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.disposition_type)?;
        if let Some(file_name) = &self.file_name {
            write!(f, "; filename={}", quote_value(file_name))?;
        }
        let dates = [
            ("creation-date", self.creation_date),
            ("modification-date", self.modification_date),
            ("read-date", self.read_date),
        ];
        // Dates outside the RFC 2822 year range are not written.
        for (key, date) in dates {
            if let Some(date) = date.filter(|date| RFC2822_YEARS.contains(&date.year())) {
                write!(f, "; {key}=\"{}\"", date.to_rfc2822())?;
            }
        }
        if self.size >= 0 {
            write!(f, "; size={}", self.size)?;
        }
        for (key, value) in self.parameters.iter() {
            if TYPED_PARAMETERS.iter().any(|typed| typed.eq_ignore_ascii_case(key)) {
                continue;
            }
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
    use chrono::TimeZone;

    #[test]
    fn test_default() {
        let cd = ContentDisposition::new();
        assert_eq!(cd.disposition_type(), "attachment");
        assert!(!cd.inline());
        assert_eq!(cd.size(), -1);
        assert_eq!(cd.to_string(), "attachment");
    }

    #[test]
    fn test_inline_toggle() {
        let mut cd = ContentDisposition::new();
        cd.set_inline(true);
        assert_eq!(cd.disposition_type(), "inline");
        cd.set_inline(false);
        assert_eq!(cd.disposition_type(), "attachment");
    }

    #[test]
    fn test_parse() {
        let cd = ContentDisposition::parse(
            "attachment; filename=\"report 1.pdf\"; size=1024; \
             creation-date=\"Wed, 12 Feb 1997 16:29:51 -0500\"; abc=def",
        )
        .unwrap();
        assert_eq!(cd.file_name(), Some("report 1.pdf"));
        assert_eq!(cd.size(), 1024);
        assert_eq!(
            cd.creation_date(),
            Some(Utc.with_ymd_and_hms(1997, 2, 12, 21, 29, 51).unwrap())
        );
        assert_eq!(cd.parameters().get("abc"), Some("def"));
        assert_eq!(cd.parameters().len(), 1);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(ContentDisposition::parse("").is_err());
        assert!(ContentDisposition::parse("attachment; size=big").is_err());
        assert!(ContentDisposition::parse("attachment; read-date=\"yesterday\"").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let mut cd = ContentDisposition::new();
        cd.set_file_name(Some("a.txt".into()));
        cd.set_size(33);
        cd.set_read_date(Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()));
        cd.parameters_mut().set("abc", "def");

        let parsed = ContentDisposition::parse(&cd.to_string()).unwrap();
        assert_eq!(parsed, cd);
    }

    #[test]
    fn test_display_skips_unrepresentable_dates() {
        let mut cd = ContentDisposition::new();
        cd.set_creation_date(Some(Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap()));
        cd.set_read_date(Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()));

        let text = cd.to_string();
        assert!(!text.contains("creation-date"));
        assert!(text.contains("read-date=\""));
        assert!(text.contains("2024 03:04:05 +0000"));
    }

    #[test]
    fn test_display_writes_typed_parameters_once() {
        let mut cd = ContentDisposition::new();
        cd.set_file_name(Some("real.txt".into()));
        cd.parameters_mut().set("FileName", "stray.txt");
        cd.parameters_mut().set("x-id", "7");

        assert_eq!(cd.to_string(), "attachment; filename=real.txt; x-id=7");
    }
}
