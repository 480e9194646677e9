//! Shared settings, shaped like ESLint's `settings.react` block.
//!
//! Decoded once per session. Unknown keys are tolerated because the same
//! object is usually shared with other tools; a known key with the wrong type
//! is rejected.

use serde::Deserialize;

use crate::error::ConfigurationError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub react: Option<ReactSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReactSettings {
    #[serde(default)]
    pub pragma: Option<String>,
    #[serde(default)]
    pub fragment: Option<String>,
}

impl Settings {
    pub fn from_json(value: serde_json::Value) -> Result<Self, ConfigurationError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigurationError> {
        Self::from_json(serde_json::from_str(text)?)
    }

    /// `react.pragma`, with an empty string treated as unset.
    pub fn pragma(&self) -> Option<&str> {
        self.react
            .as_ref()
            .and_then(|r| r.pragma.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// `react.fragment`, with an empty string treated as unset.
    pub fn fragment(&self) -> Option<&str> {
        self.react
            .as_ref()
            .and_then(|r| r.fragment.as_deref())
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_full_settings() {
        let settings = Settings::from_json(json!({
            "react": { "pragma": "SomeReact", "fragment": "SomeFragment", "version": "detect" },
            "import/resolver": { "node": {} }
        }))
        .unwrap();

        assert_eq!(settings.pragma(), Some("SomeReact"));
        assert_eq!(settings.fragment(), Some("SomeFragment"));
    }

    #[test]
    fn test_missing_and_empty_fields() {
        assert_eq!(Settings::from_json(json!(null)).unwrap(), Settings::default());
        assert_eq!(Settings::from_json_str("null").unwrap(), Settings::default());
        assert_eq!(Settings::from_json(json!({})).unwrap().pragma(), None);

        let settings = Settings::from_json(json!({ "react": { "pragma": "" } })).unwrap();
        assert_eq!(settings.pragma(), None);
        assert_eq!(settings.fragment(), None);
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let err = Settings::from_json(json!({ "react": { "pragma": 5 } })).unwrap_err();
        assert!(matches!(err, ConfigurationError::MalformedSettings(_)));

        assert!(Settings::from_json_str(r#"{"react": "h"}"#).is_err());
    }
}
