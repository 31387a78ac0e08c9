//! Custom message headers.

use std::fmt;

/// Ordered collection of message headers.
///
/// Names are matched case-insensitively and a name may carry several
/// values. Insertion order of names is kept for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderCollection {
    headers: Vec<(String, Vec<String>)>,
}

impl HeaderCollection {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header value after any existing values.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(i) => self.headers[i].1.push(value),
            None => self.headers.push((name, vec![value])),
        }
    }

    /// Sets a header value, replacing any existing values.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(i) => self.headers[i].1 = vec![value],
            None => self.headers.push((name, vec![value])),
        }
    }

    /// Gets the value of a header, with multiple values joined by `,`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        self.position(name).map(|i| self.headers[i].1.join(","))
    }

    /// Removes all values for a header.
    pub fn remove(&mut self, name: &str) {
        if let Some(i) = self.position(name) {
            self.headers.remove(i);
        }
    }

    /// Returns the number of distinct header names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Returns true if no header is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Returns the header names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.headers.iter().map(|(name, _)| name.as_str())
    }

    /// Returns an iterator over every `(name, value)` pair.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |v| (name.as_str(), v.as_str())))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for HeaderCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            write!(f, "{name}: {value}\r\n")?;
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
    fn test_headers_new() {
        let headers = HeaderCollection::new();
        assert!(headers.is_empty());
    }

    #[test]
    fn test_headers_add_get() {
        let mut headers = HeaderCollection::new();
        headers.add("X-Mailer", "serialmail");
        assert_eq!(headers.get("X-Mailer").as_deref(), Some("serialmail"));
        assert_eq!(headers.get("x-mailer").as_deref(), Some("serialmail")); // Case insensitive
    }

    #[test]
    fn test_headers_multi_value_joined() {
        let mut headers = HeaderCollection::new();
        headers.add("Comments", "one");
        headers.add("comments", "two");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("Comments").as_deref(), Some("one,two"));
    }

    #[test]
    fn test_headers_set() {
        let mut headers = HeaderCollection::new();
        headers.add("X-Tag", "a");
        headers.add("X-Tag", "b");
        headers.set("X-Tag", "c");
        assert_eq!(headers.get("X-Tag").as_deref(), Some("c"));
        assert_eq!(headers.iter().count(), 1);
    }

    #[test]
    fn test_headers_remove() {
        let mut headers = HeaderCollection::new();
        headers.add("X-Test", "Test");
        headers.remove("x-test");
        assert!(headers.get("X-Test").is_none());
    }

    #[test]
    fn test_headers_order_and_display() {
        let mut headers = HeaderCollection::new();
        headers.add("X-B", "2");
        headers.add("X-A", "1");
        let names: Vec<&str> = headers.names().collect();
        assert_eq!(names, ["X-B", "X-A"]);
        assert_eq!(headers.to_string(), "X-B: 2\r\nX-A: 1\r\n");
    }
}
