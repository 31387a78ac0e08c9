//! Serializable mail addresses.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serialmail_mime::{Encoding, MailAddress, MailAddressCollection};

use crate::codepage::{DisplayNameCodePage, EncodingIntrospection};
use crate::config::UTF8_CODE_PAGE;
use crate::error::Result;

/// Serializable counterpart of a single mail participant.
///
/// Equality and hashing use the case-insensitive [`Display`](fmt::Display)
/// form, so the code page does not take part.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct AddressRecord {
    /// Bare address (`user@host`).
    pub address: String,
    /// Display name, empty if none.
    pub display_name: String,
    /// Code page of the display name encoding.
    pub display_name_code_page: i32,
}

impl Default for AddressRecord {
    fn default() -> Self {
        Self {
            address: String::new(),
            display_name: String::new(),
            display_name_code_page: UTF8_CODE_PAGE,
        }
    }
}

impl AddressRecord {
    /// Creates a record from address text, an optional display name and an
    /// optional display name encoding.
    ///
    /// Without an encoding the code page is UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] if `address` is empty and
    /// [`crate::Error::InvalidFormat`] if it is malformed.
    pub fn new(
        address: &str,
        display_name: Option<&str>,
        encoding: Option<Encoding>,
    ) -> Result<Self> {
        let live = match (display_name, encoding) {
            (_, Some(encoding)) => {
                MailAddress::with_encoding(address, display_name.unwrap_or_default(), encoding)?
            }
            (Some(display_name), None) => MailAddress::with_display_name(address, display_name)?,
            (None, None) => MailAddress::new(address)?,
        };
        Ok(Self::from_live(&live, &EncodingIntrospection, UTF8_CODE_PAGE))
    }

    /// Parses `user@host` or `"Name" <user@host>`.
    ///
    /// # Errors
    ///
    /// Same as [`AddressRecord::new`].
    pub fn parse(text: &str) -> Result<Self> {
        Self::new(text, None, None)
    }

    pub(crate) fn from_live(
        address: &MailAddress,
        code_pages: &dyn DisplayNameCodePage,
        default_code_page: i32,
    ) -> Self {
        Self {
            address: address.address().to_string(),
            display_name: address.display_name().to_string(),
            display_name_code_page: code_pages
                .display_name_code_page(address)
                .unwrap_or(default_code_page),
        }
    }

    /// Returns the user (local) part of the address.
    #[must_use]
    pub fn user(&self) -> &str {
        self.address
            .rsplit_once('@')
            .map_or(self.address.as_str(), |(user, _)| user)
    }

    /// Returns the host (domain) part of the address.
    #[must_use]
    pub fn host(&self) -> &str {
        self.address.rsplit_once('@').map_or("", |(_, host)| host)
    }
}

impl fmt::Display for AddressRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.display_name.is_empty() {
            f.write_str(&self.address)
        } else {
            write!(f, "\"{}\" {}", self.display_name, self.address)
        }
    }
}

impl PartialEq for AddressRecord {
    fn eq(&self, other: &Self) -> bool {
        self.to_string().to_lowercase() == other.to_string().to_lowercase()
    }
}

impl Eq for AddressRecord {}

impl Hash for AddressRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().to_lowercase().hash(state);
    }
}

/// Ordered list of address records. Order is the on-wire order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressCollection {
    records: Vec<AddressRecord>,
}

impl AddressCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-separated address list and appends every entry.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] for empty input and
    /// [`crate::Error::InvalidFormat`] for malformed syntax. Nothing is
    /// appended on error.
    pub fn append(&mut self, addresses: &str) -> Result<()> {
        let mut parsed = MailAddressCollection::new();
        parsed.add_list(addresses)?;
        self.records.extend(
            parsed
                .iter()
                .map(|address| AddressRecord::from_live(address, &EncodingIntrospection, UTF8_CODE_PAGE)),
        );
        Ok(())
    }

    /// Appends a record.
    pub fn push(&mut self, record: AddressRecord) {
        self.records.push(record);
    }

    /// Returns the record at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&AddressRecord> {
        self.records.get(index)
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns an iterator over the records in order.
    pub fn iter(&self) -> std::slice::Iter<'_, AddressRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a AddressCollection {
    type Item = &'a AddressRecord;
    type IntoIter = std::slice::Iter<'a, AddressRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<AddressRecord> for AddressCollection {
    fn from_iter<I: IntoIterator<Item = AddressRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for AddressCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, record) in self.records.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{record}")?;
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
    use crate::error::Error;
    use std::collections::HashSet;

    #[test]
    fn test_default_code_page() {
        let record = AddressRecord::new("ok@ok.com", None, None).unwrap();
        assert_eq!(record.address, "ok@ok.com");
        assert_eq!(record.display_name, "");
        assert_eq!(record.display_name_code_page, 65001);
        assert_eq!(record.user(), "ok");
        assert_eq!(record.host(), "ok.com");
    }

    #[test]
    fn test_explicit_encoding() {
        let record = AddressRecord::new("ok@ok.com", Some("Yes"), Some(Encoding::ASCII)).unwrap();
        assert_eq!(record.display_name, "Yes");
        assert_eq!(record.display_name_code_page, 20127);
    }

    #[test]
    fn test_new_errors() {
        assert!(matches!(
            AddressRecord::new("", None, None),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            AddressRecord::new("not an address", None, None),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_parse_with_name() {
        let record = AddressRecord::parse("\"John Doe\" <john@example.com>").unwrap();
        assert_eq!(record.address, "john@example.com");
        assert_eq!(record.display_name, "John Doe");
        assert_eq!(record.to_string(), "\"John Doe\" john@example.com");
    }

    #[test]
    fn test_equality_is_case_insensitive() {
        let a = AddressRecord::new("Ok@Ok.com", Some("Yes"), None).unwrap();
        let b = AddressRecord::new("ok@ok.com", Some("YES"), Some(Encoding::ASCII)).unwrap();
        assert_eq!(a, b);

        let set: HashSet<AddressRecord> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_append_keeps_order() {
        let mut list = AddressCollection::new();
        list.append("a@a.com, b@b.com").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(0).unwrap().address, "a@a.com");
        assert_eq!(list.get(1).unwrap().address, "b@b.com");
        assert_eq!(list.to_string(), "a@a.com, b@b.com");
    }

    #[test]
    fn test_append_errors_leave_list_untouched() {
        let mut list = AddressCollection::new();
        assert!(matches!(list.append(""), Err(Error::InvalidArgument(_))));
        assert!(matches!(
            list.append("a@a.com, broken"),
            Err(Error::InvalidFormat(_))
        ));
        assert!(list.is_empty());
    }

    #[test]
    fn test_serde_field_names() {
        let record = AddressRecord::new("ok@ok.com", Some("Yes"), Some(Encoding::ASCII)).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["Address"], "ok@ok.com");
        assert_eq!(json["DisplayName"], "Yes");
        assert_eq!(json["DisplayNameCodePage"], 20127);

        let partial: AddressRecord = serde_json::from_str(r#"{"Address":"a@a.com"}"#).unwrap();
        assert_eq!(partial.display_name_code_page, 65001);
    }
}
