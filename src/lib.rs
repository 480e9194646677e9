//! Detection and safe removal of redundant JSX fragments.
//!
//! [`parser`] lowers JavaScript/TSX source into a [`syntax::JsxTree`],
//! [`linter::Linter`] runs the [`fragment`] rule over it, and [`server`]
//! exposes the results over LSP.

pub mod diagnostics;
pub mod document;
pub mod error;
pub mod fragment;
pub mod linter;
pub mod parser;
pub mod pragma;
pub mod server;
pub mod settings;
pub mod syntax;
pub mod workspace;

pub use error::{ConfigurationError, LintError};
pub use fragment::{Reason, Report, TextEdit};
pub use linter::{FixOutcome, Linter};
pub use parser::{Dialect, JsxParser};
pub use settings::Settings;
