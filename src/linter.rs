//! One lint session: settings in, reports and fixes out.

use crate::error::LintError;
use crate::fragment::{FragmentRule, Report, TextEdit};
use crate::parser::{Dialect, JsxParser};
use crate::pragma::Pragmas;
use crate::settings::Settings;
use crate::syntax::{JsxTree, NodeKind};

/// Fix passes before giving up, matching ESLint.
pub const MAX_FIX_PASSES: usize = 10;

#[derive(Debug, Clone)]
pub struct Linter {
    settings: Settings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixOutcome {
    pub output: String,
    /// Passes that applied at least one edit.
    pub passes: usize,
    /// Reports still present in `output`.
    pub remaining: Vec<Report>,
}

impl FixOutcome {
    pub fn changed(&self) -> bool {
        self.passes > 0
    }
}

impl Linter {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Reports for every element and fragment of `tree`, in document order.
    pub fn lint(&self, tree: &JsxTree) -> Result<Vec<Report>, LintError> {
        let pragmas = Pragmas::resolve(tree.comments(), &self.settings)?;
        let rule = FragmentRule::new(&pragmas);

        let mut reports = Vec::new();
        for node in tree.elements() {
            let found = match node.kind() {
                NodeKind::Element(_) => rule.on_element(node),
                NodeKind::Fragment(_) => rule.on_fragment(node),
                NodeKind::Text(_)
                | NodeKind::ExpressionContainer
                | NodeKind::EmptyExpression
                | NodeKind::Other(_) => continue,
            };
            reports.extend(found);
        }

        tracing::debug!("{} reports", reports.len());
        Ok(reports)
    }

    pub fn lint_source(&self, source: &str, dialect: Dialect) -> Result<Vec<Report>, LintError> {
        let tree = JsxParser::new(dialect).parse(source)?;
        self.lint(&tree)
    }

    /// Apply fixes until none are left, re-parsing between passes.
    pub fn fix_source(&self, source: &str, dialect: Dialect) -> Result<FixOutcome, LintError> {
        let mut output = source.to_string();
        let mut passes = 0;

        loop {
            let reports = self.lint_source(&output, dialect)?;
            let edits: Vec<&TextEdit> = reports.iter().filter_map(|r| r.fix.as_ref()).collect();

            if edits.is_empty() || passes == MAX_FIX_PASSES {
                return Ok(FixOutcome {
                    output,
                    passes,
                    remaining: reports,
                });
            }

            output = apply_edits(&output, edits);
            passes += 1;
            tracing::debug!("fix pass {} done", passes);
        }
    }
}

impl Default for Linter {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

/// Apply non-overlapping edits in source order. An edit starting at or before
/// the end of the previously applied one is left for the next pass.
pub fn apply_edits<'e>(source: &str, edits: impl IntoIterator<Item = &'e TextEdit>) -> String {
    let mut edits: Vec<&TextEdit> = edits.into_iter().collect();
    edits.sort_by_key(|e| (e.range.start, e.range.end));

    let mut output = String::with_capacity(source.len());
    let mut last_end: Option<usize> = None;
    let mut copied = 0;

    for edit in edits {
        if last_end.is_some_and(|end| edit.range.start <= end) {
            continue;
        }
        output.push_str(&source[copied..edit.range.start]);
        output.push_str(&edit.replacement);
        copied = edit.range.end;
        last_end = Some(edit.range.end);
    }

    output.push_str(&source[copied..]);
    output
}
