//! Conversion configuration types.

use serde::{Deserialize, Serialize};

/// Code page of UTF-8.
pub const UTF8_CODE_PAGE: i32 = 65001;

/// Settings shared by every conversion a [`crate::Converter`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConvertConfig {
    /// Code page recorded for display names whose encoding cannot be
    /// recovered from the live address.
    pub default_display_name_code_page: i32,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            default_display_name_code_page: UTF8_CODE_PAGE,
        }
    }
}

impl ConvertConfig {
    /// Creates the default configuration (UTF-8 display names).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration builder.
    #[must_use]
    pub fn builder() -> ConvertConfigBuilder {
        ConvertConfigBuilder::new()
    }
}

/// Builder for conversion configuration.
#[derive(Debug, Clone, Default)]
pub struct ConvertConfigBuilder {
    default_display_name_code_page: Option<i32>,
}

impl ConvertConfigBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fallback display name code page.
    #[must_use]
    pub const fn default_display_name_code_page(mut self, code_page: i32) -> Self {
        self.default_display_name_code_page = Some(code_page);
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> ConvertConfig {
        ConvertConfig {
            default_display_name_code_page: self
                .default_display_name_code_page
                .unwrap_or(UTF8_CODE_PAGE),
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

    #[test]
    fn test_config_default() {
        let config = ConvertConfig::new();
        assert_eq!(config.default_display_name_code_page, 65001);
    }

    #[test]
    fn test_config_builder() {
        let config = ConvertConfig::builder()
            .default_display_name_code_page(20127)
            .build();
        assert_eq!(config.default_display_name_code_page, 20127);

        let config = ConvertConfig::builder().build();
        assert_eq!(config, ConvertConfig::default());
    }

    #[test]
    fn test_config_from_json() {
        let config: ConvertConfig =
            serde_json::from_str(r#"{"defaultDisplayNameCodePage": 1252}"#).unwrap();
        assert_eq!(config.default_display_name_code_page, 1252);

        let config: ConvertConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.default_display_name_code_page, 65001);
    }
}
