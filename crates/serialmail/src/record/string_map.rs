//! Ordered string map used for custom headers and disposition parameters.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serialmail_mime::{HeaderCollection, Parameters};

/// Ordered map of unique string keys to string values.
///
/// Serialized as a sequence of `Item { Name, Value }` elements, so formats
/// without arbitrary-key maps can carry it. On deserialization a later
/// item with an existing name overwrites the earlier value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringMap {
    entries: Vec<(String, String)>,
}

impl StringMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies every header of a live collection. Multi-valued headers are
    /// joined with `,`.
    #[must_use]
    pub fn from_headers(headers: &HeaderCollection) -> Self {
        headers
            .names()
            .filter_map(|name| headers.get(name).map(|value| (name.to_string(), value)))
            .collect()
    }

    /// Copies every parameter of a live parameter map.
    #[must_use]
    pub fn from_parameters(parameters: &Parameters) -> Self {
        parameters
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    /// Inserts a value, returning the previous one. An existing key keeps
    /// its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Gets the value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Removes a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Returns true if the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Writes every entry into a live header collection, replacing existing
    /// values of the same name.
    pub fn copy_into_headers(&self, headers: &mut HeaderCollection) {
        for (key, value) in self.iter() {
            headers.set(key, value);
        }
    }

    /// Writes every entry into a live parameter map, key by key.
    pub fn copy_into_parameters(&self, parameters: &mut Parameters) {
        for (key, value) in self.iter() {
            parameters.set(key, value);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StringMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// Wire form of one entry.
#[derive(Serialize)]
#[serde(rename = "Item")]
struct ItemRef<'a> {
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Value")]
    value: &'a str,
}

#[derive(Deserialize)]
#[serde(rename = "Item")]
struct Item {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Value", default)]
    value: String,
}

impl Serialize for StringMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.iter().map(|(name, value)| ItemRef { name, value }))
    }
}

impl<'de> Deserialize<'de> for StringMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items = Vec::<Item>::deserialize(deserializer)?;
        Ok(items
            .into_iter()
            .map(|item| (item.name, item.value))
            .collect())
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
    fn test_insert_overwrites_in_place() {
        let mut map = StringMap::new();
        assert_eq!(map.insert("b", "1"), None);
        map.insert("a", "2");
        assert_eq!(map.insert("b", "3"), Some("1".to_string()));

        let entries: Vec<_> = map.iter().collect();
        assert_eq!(entries, [("b", "3"), ("a", "2")]);
    }

    #[test]
    fn test_remove() {
        let mut map: StringMap = [("x", "1"), ("y", "2")].into_iter().collect();
        assert_eq!(map.remove("x"), Some("1".to_string()));
        assert!(!map.contains_key("x"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_serialize_as_items() {
        let map: StringMap = [("X-Mailer", "serialmail")].into_iter().collect();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"[{"Name":"X-Mailer","Value":"serialmail"}]"#);
    }

    #[test]
    fn test_deserialize_later_duplicates_win() {
        let json = r#"[
            {"Name": "a", "Value": "1"},
            {"Name": "b", "Value": "2"},
            {"Name": "a", "Value": "3"}
        ]"#;
        let map: StringMap = serde_json::from_str(json).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some("3"));
        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["a", "b"]);
    }

    #[test]
    fn test_headers_round_trip() {
        let mut headers = HeaderCollection::new();
        headers.add("X-One", "1");
        headers.add("X-Multi", "a");
        headers.add("X-Multi", "b");

        let map = StringMap::from_headers(&headers);
        assert_eq!(map.get("X-Multi"), Some("a,b"));

        let mut restored = HeaderCollection::new();
        map.copy_into_headers(&mut restored);
        assert_eq!(restored.get("X-One").as_deref(), Some("1"));
        assert_eq!(restored.get("X-Multi").as_deref(), Some("a,b"));
    }

    #[test]
    fn test_copy_into_parameters_keeps_existing() {
        let mut parameters = Parameters::new();
        parameters.set("keep", "me");
        let map: StringMap = [("abc", "def")].into_iter().collect();
        map.copy_into_parameters(&mut parameters);
        assert_eq!(parameters.get("keep"), Some("me"));
        assert_eq!(parameters.get("abc"), Some("def"));
    }
}
