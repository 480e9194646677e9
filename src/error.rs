use thiserror::Error;

/// Which pragma failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PragmaKind {
    React,
    Fragment,
}

impl std::fmt::Display for PragmaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PragmaKind::React => write!(f, "React"),
            PragmaKind::Fragment => write!(f, "Fragment"),
        }
    }
}

/// Fatal for the analysis of one file. Never retried.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("{pragma} pragma {value} is not a valid identifier")]
    InvalidPragma { pragma: PragmaKind, value: String },

    #[error("malformed react settings: {0}")]
    MalformedSettings(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum LintError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("syntax error at byte offset {offset}")]
    Syntax { offset: usize },

    #[error("failed to load grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    #[error("parser produced no tree")]
    NoTree,
}
