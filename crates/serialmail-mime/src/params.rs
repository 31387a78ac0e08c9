//! MIME header parameters (`; name=value` pairs).

/// Ordered parameter map with case-insensitive names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    entries: Vec<(String, String)>,
}

impl Parameters {
    /// Creates an empty parameter map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a parameter value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.entries[i].1.as_str())
    }

    /// Sets a parameter, replacing an existing value in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(i) => self.entries[i].1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Removes a parameter, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|i| self.entries.remove(i).1)
    }

    /// Returns true if the parameter is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))
    }
}

/// Formats a parameter value, quoting it if it contains special characters.
pub(crate) fn quote_value(value: &str) -> String {
    if value.is_empty()
        || value.contains(|c: char| c.is_whitespace() || "()<>@,;:\\\"/[]?=".contains(c))
    {
        quote(value)
    } else {
        value.to_string()
    }
}

/// Wraps a value in double quotes, escaping backslashes and quotes.
pub(crate) fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Splits `value; a=1; b="x;y"` into the leading value and its parameters.
///
/// Returns `None` for the parameter list if a parameter has no `=`.
pub(crate) fn split_parameters(text: &str) -> (String, Option<Vec<(String, String)>>) {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for ch in text.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_quotes => {
                current.push(ch);
                escaped = true;
            }
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ';' if !in_quotes => segments.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    segments.push(current);

    let mut segments = segments.into_iter();
    let head = segments.next().unwrap_or_default().trim().to_string();

    let mut params = Vec::new();
    for segment in segments {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let Some((name, value)) = segment.split_once('=') else {
            return (head, None);
        };
        params.push((name.trim().to_lowercase(), unquote(value.trim())));
    }

    (head, Some(params))
}

fn unquote(value: &str) -> String {
    match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Some(inner) => inner.replace("\\\"", "\"").replace("\\\\", "\\"),
        None => value.to_string(),
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
    fn test_set_get_case_insensitive() {
        let mut params = Parameters::new();
        params.set("Charset", "utf-8");
        assert_eq!(params.get("charset"), Some("utf-8"));

        params.set("CHARSET", "us-ascii");
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("Charset"), Some("us-ascii"));
    }

    #[test]
    fn test_insertion_order() {
        let mut params = Parameters::new();
        params.set("b", "2");
        params.set("a", "1");
        let names: Vec<&str> = params.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["b", "a"]);

        assert_eq!(params.remove("B"), Some("2".to_string()));
        assert!(!params.contains("b"));
    }

    #[test]
    fn test_split_parameters() {
        let (head, params) = split_parameters("text/plain; charset=utf-8; name=\"a;b.txt\"");
        assert_eq!(head, "text/plain");
        let params = params.unwrap();
        assert_eq!(params[0], ("charset".to_string(), "utf-8".to_string()));
        assert_eq!(params[1], ("name".to_string(), "a;b.txt".to_string()));
    }

    #[test]
    fn test_split_parameters_malformed() {
        let (_, params) = split_parameters("text/plain; charset");
        assert!(params.is_none());
    }

    #[test]
    fn test_quote_value() {
        assert_eq!(quote_value("utf-8"), "utf-8");
        assert_eq!(quote_value("my file.txt"), "\"my file.txt\"");
    }
}
