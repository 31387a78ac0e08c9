//! Mail participant addresses.

use std::fmt;

use crate::charset::Encoding;
use crate::error::{Error, Result};
use crate::params::quote;

/// Characters never allowed in an unquoted address.
const SPECIALS: &str = "()<>,;:\\\"[]";

/// Address of a mail sender or recipient, with an optional display name.
///
/// The display name encoding is only set when one was given explicitly;
/// renderers fall back to UTF-8 otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailAddress {
    address: String,
    display_name: String,
    display_name_encoding: Option<Encoding>,
}

impl MailAddress {
    /// Creates an address from text such as `user@example.com` or
    /// `"John Doe" <john@example.com>`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the text is empty and
    /// [`Error::InvalidFormat`] if it is not a valid mailbox.
    pub fn new(text: &str) -> Result<Self> {
        let (address, display_name) = split_mailbox(text)?;
        Ok(Self {
            address,
            display_name: display_name.unwrap_or_default(),
            display_name_encoding: None,
        })
    }

    /// Creates an address with the given display name, which replaces any
    /// display name parsed from `text`.
    ///
    /// # Errors
    ///
    /// Same as [`MailAddress::new`].
    pub fn with_display_name(text: &str, display_name: &str) -> Result<Self> {
        let mut address = Self::new(text)?;
        address.display_name = strip_quotes(display_name);
        Ok(address)
    }

    /// Creates an address whose display name is encoded with `encoding`.
    ///
    /// # Errors
    ///
    /// Same as [`MailAddress::new`].
    pub fn with_encoding(text: &str, display_name: &str, encoding: Encoding) -> Result<Self> {
        let mut address = Self::with_display_name(text, display_name)?;
        address.display_name_encoding = Some(encoding);
        Ok(address)
    }

    /// Returns the bare address (`user@host`).
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns the display name, empty if none was given.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the explicitly assigned display name encoding.
    #[must_use]
    pub const fn display_name_encoding(&self) -> Option<&Encoding> {
        self.display_name_encoding.as_ref()
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

impl fmt::Display for MailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.display_name.is_empty() {
            f.write_str(&self.address)
        } else {
            write!(f, "{} <{}>", quote(&self.display_name), self.address)
        }
    }
}

/// Splits mailbox text into the address and the optional display name.
fn split_mailbox(text: &str) -> Result<(String, Option<String>)> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::argument("Address cannot be empty"));
    }

    if let Some(rest) = trimmed.strip_suffix('>') {
        let angle_start = rest
            .rfind('<')
            .ok_or_else(|| Error::format(format!("Unbalanced angle brackets in '{trimmed}'")))?;
        let address = rest[angle_start + 1..].trim();
        validate(address)?;
        let name = strip_quotes(&rest[..angle_start]);
        return Ok((address.to_string(), (!name.is_empty()).then_some(name)));
    }

    validate(trimmed)?;
    Ok((trimmed.to_string(), None))
}

/// Validates a bare `user@host` address.
fn validate(addr: &str) -> Result<()> {
    if addr.is_empty() {
        return Err(Error::format("Address cannot be empty"));
    }

    let Some((user, host)) = addr.split_once('@') else {
        return Err(Error::format(format!("Address must contain @: '{addr}'")));
    };

    if user.is_empty() || host.is_empty() {
        return Err(Error::format(format!(
            "Local and domain parts cannot be empty: '{addr}'"
        )));
    }

    if host.contains('@') {
        return Err(Error::format(format!(
            "Address must have exactly one @: '{addr}'"
        )));
    }

    if addr
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || SPECIALS.contains(c))
    {
        return Err(Error::format(format!("Address contains invalid characters: '{addr}'")));
    }

    if host.starts_with('.') || host.ends_with('.') || host.contains("..") {
        return Err(Error::format(format!("Invalid domain: '{host}'")));
    }

    Ok(())
}

/// Strip surrounding double-quotes, undo backslash escapes inside them and
/// trim whitespace.
fn strip_quotes(s: &str) -> String {
    let trimmed = s.trim();
    let Some(inner) = trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return trimmed.to_string();
    };

    let mut name = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            name.extend(chars.next());
        } else {
            name.push(ch);
        }
    }
    name.trim().to_string()
}

/// Ordered list of mail addresses (To, Cc, Bcc, Reply-To).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailAddressCollection {
    addresses: Vec<MailAddress>,
}

impl MailAddressCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an address.
    pub fn push(&mut self, address: MailAddress) {
        self.addresses.push(address);
    }

    /// Parses a comma-separated address list and appends every entry.
    ///
    /// Quoted display names may contain commas:
    /// `"Last, First" <a@b.com>, other@c.com`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for empty input and
    /// [`Error::InvalidFormat`] if any entry is malformed. Nothing is
    /// appended on error.
    pub fn add_list(&mut self, addresses: &str) -> Result<()> {
        let parsed = parse_list(addresses)?;
        self.addresses.extend(parsed);
        Ok(())
    }

    /// Returns the number of addresses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Returns true if the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Returns the address at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&MailAddress> {
        self.addresses.get(index)
    }

    /// Returns an iterator over the addresses in order.
    pub fn iter(&self) -> std::slice::Iter<'_, MailAddress> {
        self.addresses.iter()
    }
}

impl<'a> IntoIterator for &'a MailAddressCollection {
    type Item = &'a MailAddress;
    type IntoIter = std::slice::Iter<'a, MailAddress>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<MailAddress> for MailAddressCollection {
    fn from_iter<I: IntoIterator<Item = MailAddress>>(iter: I) -> Self {
        Self {
            addresses: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for MailAddressCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, address) in self.addresses.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{address}")?;
        }
        Ok(())
    }
}

/// Parses a comma-separated list of addresses.
fn parse_list(raw: &str) -> Result<Vec<MailAddress>> {
    if raw.trim().is_empty() {
        return Err(Error::argument("Address list cannot be empty"));
    }

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut in_angle = false;
    let mut escaped = false;

    for ch in raw.chars() {
        if escaped {
            escaped = false;
            current.push(ch);
            continue;
        }
        match ch {
            '\\' if in_quotes => {
                escaped = true;
                current.push(ch);
            }
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            '<' if !in_quotes => {
                in_angle = true;
                current.push(ch);
            }
            '>' if !in_quotes => {
                in_angle = false;
                current.push(ch);
            }
            ',' if !in_quotes && !in_angle => {
                segments.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    segments.push(current);

    if in_quotes {
        return Err(Error::format(format!("Unterminated quoted string in '{raw}'")));
    }

    let addresses = segments
        .iter()
        .filter(|segment| !segment.trim().is_empty())
        .map(|segment| MailAddress::new(segment).map_err(into_format))
        .collect::<Result<Vec<_>>>()?;

    if addresses.is_empty() {
        return Err(Error::format(format!("No address found in '{raw}'")));
    }
    Ok(addresses)
}

/// Inside a list an empty entry is a syntax problem, not a missing argument.
fn into_format(err: Error) -> Error {
    match err {
        Error::InvalidArgument(message) => Error::InvalidFormat(message),
        other => other,
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
    fn test_valid_address() {
        let addr = MailAddress::new("user@example.com").unwrap();
        assert_eq!(addr.address(), "user@example.com");
        assert_eq!(addr.display_name(), "");
        assert_eq!(addr.user(), "user");
        assert_eq!(addr.host(), "example.com");
        assert!(addr.display_name_encoding().is_none());
    }

    #[test]
    fn test_name_and_address() {
        let addr = MailAddress::new("\"John Doe\" <john@example.com>").unwrap();
        assert_eq!(addr.address(), "john@example.com");
        assert_eq!(addr.display_name(), "John Doe");
        assert_eq!(addr.to_string(), "\"John Doe\" <john@example.com>");
    }

    #[test]
    fn test_display_name_overrides_parsed() {
        let addr = MailAddress::with_display_name("Old <a@b.com>", "New").unwrap();
        assert_eq!(addr.display_name(), "New");
    }

    #[test]
    fn test_with_encoding() {
        let addr = MailAddress::with_encoding("ok@ok.com", "Yes", Encoding::ASCII).unwrap();
        assert_eq!(addr.display_name_encoding(), Some(&Encoding::ASCII));
    }

    #[test]
    fn test_invalid_address_empty() {
        assert!(matches!(MailAddress::new(""), Err(Error::InvalidArgument(_))));
        assert!(matches!(MailAddress::new("   "), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_invalid_address_format() {
        for bad in [
            "userexample.com",
            "@example.com",
            "user@",
            "a@b@c",
            "two words@example.com",
            "Name <a@b.com",
            "user@.example.com",
        ] {
            assert!(
                matches!(MailAddress::new(bad), Err(Error::InvalidFormat(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_display_escapes_quotes_in_name() {
        let addr = MailAddress::with_encoding("a@b.com", "Say \"hi\" \\ bye", Encoding::UTF8)
            .unwrap();
        let text = addr.to_string();
        assert_eq!(text, r#""Say \"hi\" \\ bye" <a@b.com>"#);

        let back = MailAddress::new(&text).unwrap();
        assert_eq!(back.display_name(), "Say \"hi\" \\ bye");
        assert_eq!(back.address(), "a@b.com");

        let mut list = MailAddressCollection::new();
        list.add_list(&format!("{text}, c@d.com")).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(0).unwrap().display_name(), "Say \"hi\" \\ bye");
    }

    #[test]
    fn test_parse_list() {
        let mut list = MailAddressCollection::new();
        list.add_list("a@a.com, b@b.com").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(0).unwrap().address(), "a@a.com");
        assert_eq!(list.get(1).unwrap().address(), "b@b.com");
    }

    #[test]
    fn test_parse_list_with_quoted_comma() {
        let mut list = MailAddressCollection::new();
        list.add_list("\"Last, First\" <a@b.com>, other@c.com").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(0).unwrap().display_name(), "Last, First");
        assert_eq!(list.to_string(), "\"Last, First\" <a@b.com>, other@c.com");
    }

    #[test]
    fn test_parse_list_errors() {
        let mut list = MailAddressCollection::new();
        assert!(matches!(list.add_list(""), Err(Error::InvalidArgument(_))));
        assert!(matches!(list.add_list(" , "), Err(Error::InvalidFormat(_))));
        assert!(matches!(
            list.add_list("a@a.com, nope"),
            Err(Error::InvalidFormat(_))
        ));
        assert!(list.is_empty());
    }
}
