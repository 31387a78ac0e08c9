//! Serializable content type and content disposition.

use std::fmt;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use serialmail_mime::{
    ContentDisposition, ContentType, DEFAULT_MEDIA_TYPE, RFC2822_YEARS, TYPED_PARAMETERS,
};
use tracing::trace;

use super::string_map::StringMap;
use crate::error::{Error, Result};

/// Serializable counterpart of a MIME content type.
///
/// Values are not validated here; the live constructor checks them during
/// conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ContentTypeRecord {
    /// `name` parameter.
    pub name: Option<String>,
    /// `charset` parameter.
    pub char_set: Option<String>,
    /// `boundary` parameter.
    pub boundary: Option<String>,
    /// Media type (`type/subtype`).
    pub media_type: Option<String>,
}

impl Default for ContentTypeRecord {
    fn default() -> Self {
        Self::from_live(&ContentType::new())
    }
}

impl ContentTypeRecord {
    /// Creates an `application/octet-stream` record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a Content-Type header value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidFormat`] if the value is malformed.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(Self::from_live(&ContentType::parse(text)?))
    }

    pub(crate) fn from_live(content_type: &ContentType) -> Self {
        Self {
            name: content_type.name().map(str::to_string),
            char_set: content_type.charset().map(str::to_string),
            boundary: content_type.boundary().map(str::to_string),
            media_type: Some(content_type.media_type().to_string()),
        }
    }

    pub(crate) fn to_live(&self) -> Result<ContentType> {
        let media_type = self.media_type.as_deref().unwrap_or(DEFAULT_MEDIA_TYPE);
        let mut content_type = ContentType::with_media_type(media_type)?;
        content_type.set_boundary(self.boundary.as_deref());
        content_type.set_name(self.name.as_deref());
        content_type.set_charset(self.char_set.as_deref());
        Ok(content_type)
    }
}

impl fmt::Display for ContentTypeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_live() {
            Ok(content_type) => write!(f, "{content_type}"),
            Err(_) => f.write_str(self.media_type.as_deref().unwrap_or_default()),
        }
    }
}

/// Serializable counterpart of a MIME content disposition.
///
/// `boundary` and `media_disposition` have no live counterpart and are
/// only carried through serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ContentDispositionRecord {
    /// Disposition type (`attachment`, `inline`, ...).
    pub disposition_type: Option<String>,
    /// Suggested file name.
    pub file_name: Option<String>,
    /// Boundary, carried as-is.
    pub boundary: Option<String>,
    /// Media disposition, carried as-is.
    pub media_disposition: Option<String>,
    /// Whether the part is displayed inline.
    pub inline: bool,
    /// Creation date.
    pub creation_date: Option<DateTime<Utc>>,
    /// Modification date.
    pub modification_date: Option<DateTime<Utc>>,
    /// Read date.
    pub read_date: Option<DateTime<Utc>>,
    /// Size in bytes, -1 if unknown.
    pub size: i64,
    /// Extension parameters.
    pub parameters: StringMap,
}

impl Default for ContentDispositionRecord {
    fn default() -> Self {
        Self::from_live(&ContentDisposition::new())
    }
}

impl ContentDispositionRecord {
    /// Creates an `attachment` record with unknown size.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a Content-Disposition header value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidFormat`] if the value is malformed.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(Self::from_live(&ContentDisposition::parse(text)?))
    }

    pub(crate) fn from_live(disposition: &ContentDisposition) -> Self {
        Self {
            disposition_type: Some(disposition.disposition_type().to_string()),
            file_name: disposition.file_name().map(str::to_string),
            boundary: None,
            media_disposition: None,
            inline: disposition.inline(),
            creation_date: disposition.creation_date(),
            modification_date: disposition.modification_date(),
            read_date: disposition.read_date(),
            size: disposition.size(),
            parameters: StringMap::from_parameters(disposition.parameters()),
        }
    }

    /// Writes every field into an existing live disposition. Parameters are
    /// added key by key; parameters already present and not in the record
    /// are kept. Parameters named like a typed field are dropped so the
    /// typed field is the only source for them.
    ///
    /// Fails with [`Error::InvalidFormat`] before touching `disposition` if a
    /// date cannot be written as an RFC 2822 date.
    pub(crate) fn copy_into(&self, disposition: &mut ContentDisposition) -> Result<()> {
        let dates = [
            ("creation-date", self.creation_date),
            ("modification-date", self.modification_date),
            ("read-date", self.read_date),
        ];
        for (key, date) in dates {
            if let Some(date) = date.filter(|date| !RFC2822_YEARS.contains(&date.year())) {
                return Err(Error::InvalidFormat(format!("{key} out of range: {date}")));
            }
        }

        disposition.set_creation_date(self.creation_date);
        if let Some(disposition_type) = &self.disposition_type {
            disposition.set_disposition_type(disposition_type)?;
        }
        disposition.set_file_name(self.file_name.clone());
        // Toggling rewrites the type, so only touch it when it disagrees.
        if disposition.inline() != self.inline {
            disposition.set_inline(self.inline);
        }
        disposition.set_modification_date(self.modification_date);
        self.parameters
            .copy_into_parameters(disposition.parameters_mut());
        for key in TYPED_PARAMETERS {
            if disposition.parameters_mut().remove(key).is_some() {
                trace!(key, "Dropped parameter held in a typed field");
            }
        }
        disposition.set_read_date(self.read_date);
        disposition.set_size(self.size);
        trace!(
            disposition_type = disposition.disposition_type(),
            parameters = self.parameters.len(),
            "Copied content disposition"
        );
        Ok(())
    }

    pub(crate) fn to_live(&self) -> Result<ContentDisposition> {
        let mut disposition = ContentDisposition::new();
        self.copy_into(&mut disposition)?;
        Ok(disposition)
    }
}

impl fmt::Display for ContentDispositionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_live() {
            Ok(disposition) => write!(f, "{disposition}"),
            Err(_) => f.write_str(self.disposition_type.as_deref().unwrap_or_default()),
        }
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
    fn test_content_type_default() {
        let record = ContentTypeRecord::new();
        assert_eq!(record.media_type.as_deref(), Some("application/octet-stream"));
        assert!(record.name.is_none());
    }

    #[test]
    fn test_content_type_parse_and_display() {
        let record = ContentTypeRecord::parse("text/plain; charset=utf-8; name=\"a b.txt\"").unwrap();
        assert_eq!(record.media_type.as_deref(), Some("text/plain"));
        assert_eq!(record.char_set.as_deref(), Some("utf-8"));
        assert_eq!(record.name.as_deref(), Some("a b.txt"));
        assert!(record.to_string().starts_with("text/plain; "));
    }

    #[test]
    fn test_content_type_to_live_defaults_media_type() {
        let record = ContentTypeRecord {
            media_type: None,
            name: Some("x.bin".into()),
            ..ContentTypeRecord::default()
        };
        let live = record.to_live().unwrap();
        assert_eq!(live.media_type(), "application/octet-stream");
        assert_eq!(live.name(), Some("x.bin"));
    }

    #[test]
    fn test_content_type_to_live_invalid() {
        let record = ContentTypeRecord {
            media_type: Some("garbage".into()),
            ..ContentTypeRecord::default()
        };
        assert!(matches!(record.to_live(), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_disposition_default() {
        let record = ContentDispositionRecord::new();
        assert_eq!(record.disposition_type.as_deref(), Some("attachment"));
        assert!(!record.inline);
        assert_eq!(record.size, -1);
        assert!(record.creation_date.is_none());
        assert!(record.parameters.is_empty());
    }

    #[test]
    fn test_disposition_parse() {
        let record = ContentDispositionRecord::parse(
            "inline; filename=logo.png; size=42; abc=def",
        )
        .unwrap();
        assert!(record.inline);
        assert_eq!(record.file_name.as_deref(), Some("logo.png"));
        assert_eq!(record.size, 42);
        assert_eq!(record.parameters.get("abc"), Some("def"));
    }

    #[test]
    fn test_disposition_copy_into_merges_parameters() {
        let mut record = ContentDispositionRecord::new();
        record.parameters.insert("abc", "def");
        record.read_date = Some(Utc.with_ymd_and_hms(2020, 5, 6, 7, 8, 9).unwrap());
        record.size = 33;

        let mut live = ContentDisposition::new();
        live.parameters_mut().set("existing", "1");
        record.copy_into(&mut live).unwrap();

        assert_eq!(live.parameters().get("existing"), Some("1"));
        assert_eq!(live.parameters().get("abc"), Some("def"));
        assert_eq!(live.size(), 33);
        assert_eq!(live.read_date(), record.read_date);
    }

    #[test]
    fn test_disposition_keeps_custom_type() {
        let record = ContentDispositionRecord {
            disposition_type: Some("form-data".into()),
            ..ContentDispositionRecord::default()
        };
        let live = record.to_live().unwrap();
        assert_eq!(live.disposition_type(), "form-data");
        assert_eq!(ContentDispositionRecord::from_live(&live), record);
    }

    #[test]
    fn test_disposition_inline_flag_wins() {
        let record = ContentDispositionRecord {
            disposition_type: Some("attachment".into()),
            inline: true,
            ..ContentDispositionRecord::default()
        };
        assert_eq!(record.to_live().unwrap().disposition_type(), "inline");
    }

    #[test]
    fn test_disposition_rejects_out_of_range_date() {
        let json = r#"{"CreationDate":"+10000-01-01T00:00:00Z","DispositionType":"attachment"}"#;
        let record: ContentDispositionRecord = serde_json::from_str(json).unwrap();
        assert!(record.creation_date.is_some());

        assert!(matches!(record.to_live(), Err(Error::InvalidFormat(_))));

        let mut live = ContentDisposition::new();
        live.set_size(5);
        assert!(record.copy_into(&mut live).is_err());
        assert_eq!(live.size(), 5);
        assert!(live.creation_date().is_none());

        assert_eq!(record.to_string(), "attachment");
    }

    #[test]
    fn test_disposition_typed_parameters_stay_typed() {
        let mut record = ContentDispositionRecord::new();
        record.file_name = Some("real.txt".into());
        record.size = 4;
        record.parameters.insert("filename", "stray.txt");
        record.parameters.insert("Size", "99");
        record.parameters.insert("x-id", "7");

        let live = record.to_live().unwrap();
        assert_eq!(live.file_name(), Some("real.txt"));
        assert_eq!(live.size(), 4);
        assert!(!live.parameters().contains("filename"));
        assert!(!live.parameters().contains("size"));
        assert_eq!(live.parameters().get("x-id"), Some("7"));

        let text = live.to_string();
        assert_eq!(text.matches("filename=").count(), 1);
        assert!(text.contains("filename=real.txt"));
    }
}
