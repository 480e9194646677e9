//! Resolution of the identifiers that name the fragment wrapper.
//!
//! The wrapper pragma (`React` in `<React.Fragment>`) can be overridden per
//! file with an `@jsx h` comment, or globally through settings. The fragment
//! pragma only comes from settings.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ConfigurationError, PragmaKind};
use crate::settings::Settings;
use crate::syntax::Comment;

pub const DEFAULT_REACT_PRAGMA: &str = "React";
pub const DEFAULT_FRAGMENT_PRAGMA: &str = "Fragment";

static JSX_ANNOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@jsx\s+(\S+)").expect("valid annotation regex"));

// Keywords and non-ASCII identifiers are deliberately not considered.
static JS_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[_$a-zA-Z][_$a-zA-Z0-9]*$").expect("valid identifier regex"));

/// The resolved pair, fixed for one analysis pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pragmas {
    pub react: String,
    pub fragment: String,
}

impl Pragmas {
    pub fn resolve(comments: &[Comment], settings: &Settings) -> Result<Self, ConfigurationError> {
        let pragmas = Self {
            react: resolve_react_pragma(comments, settings)?,
            fragment: resolve_fragment_pragma(settings)?,
        };
        tracing::debug!(
            "resolved pragmas react={} fragment={}",
            pragmas.react,
            pragmas.fragment
        );
        Ok(pragmas)
    }
}

impl Default for Pragmas {
    fn default() -> Self {
        Self {
            react: DEFAULT_REACT_PRAGMA.to_string(),
            fragment: DEFAULT_FRAGMENT_PRAGMA.to_string(),
        }
    }
}

pub fn resolve_react_pragma(
    comments: &[Comment],
    settings: &Settings,
) -> Result<String, ConfigurationError> {
    let annotated = comments
        .iter()
        .find_map(|comment| JSX_ANNOTATION.captures(&comment.body))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().split('.').next().unwrap_or_default().to_string());

    let pragma = match annotated {
        Some(pragma) => pragma,
        None => settings
            .pragma()
            .unwrap_or(DEFAULT_REACT_PRAGMA)
            .to_string(),
    };

    validate(PragmaKind::React, pragma)
}

pub fn resolve_fragment_pragma(settings: &Settings) -> Result<String, ConfigurationError> {
    let pragma = settings
        .fragment()
        .unwrap_or(DEFAULT_FRAGMENT_PRAGMA)
        .to_string();
    validate(PragmaKind::Fragment, pragma)
}

fn validate(kind: PragmaKind, value: String) -> Result<String, ConfigurationError> {
    if JS_IDENTIFIER.is_match(&value) {
        Ok(value)
    } else {
        Err(ConfigurationError::InvalidPragma {
            pragma: kind,
            value,
        })
    }
}
