use std::collections::HashMap;

use tower_lsp::lsp_types::{
    CodeAction, CodeActionKind, CodeActionOrCommand, Diagnostic, DiagnosticSeverity,
    NumberOrString, Position, Range, TextEdit, Url, WorkspaceEdit,
};

use crate::document::Document;
use crate::error::LintError;
use crate::fragment::{Report, RULE_ID};

pub const SOURCE: &str = "jsx_lint";

pub fn report_to_diagnostic(doc: &Document, report: &Report) -> Diagnostic {
    Diagnostic {
        range: doc.span_to_range(report.range),
        severity: Some(DiagnosticSeverity::WARNING),
        code: Some(NumberOrString::String(report.reason.id().to_string())),
        code_description: None,
        source: Some(SOURCE.to_string()),
        message: format!("{} ({})", report.message(), RULE_ID),
        related_information: None,
        tags: None,
        data: None,
    }
}

/// A file that could not be analysed gets a single error at its start.
pub fn error_to_diagnostic(doc: &Document, error: &LintError) -> Diagnostic {
    let position = match error {
        LintError::Syntax { offset } => doc.offset_to_position(*offset),
        _ => Position::new(0, 0),
    };
    Diagnostic {
        range: Range::new(position, position),
        severity: Some(DiagnosticSeverity::ERROR),
        source: Some(SOURCE.to_string()),
        message: error.to_string(),
        ..Default::default()
    }
}

pub fn document_diagnostics(doc: &Document) -> Vec<Diagnostic> {
    doc.reports
        .iter()
        .map(|report| report_to_diagnostic(doc, report))
        .collect()
}

fn workspace_edit(uri: &Url, edits: Vec<TextEdit>) -> WorkspaceEdit {
    let mut changes = HashMap::new();
    changes.insert(uri.clone(), edits);
    WorkspaceEdit {
        changes: Some(changes),
        ..Default::default()
    }
}

/// Quick fixes for reports intersecting `range`, one per distinct edit.
pub fn quick_fixes(doc: &Document, range: Range) -> Vec<CodeActionOrCommand> {
    let wanted = doc.range_to_span(range);
    let mut seen = Vec::new();
    let mut actions = Vec::new();

    for report in &doc.reports {
        let Some(fix) = &report.fix else {
            continue;
        };
        if !report.range.intersects(wanted) || seen.contains(&fix.range) {
            continue;
        }
        seen.push(fix.range);

        let edit = TextEdit {
            range: doc.span_to_range(fix.range),
            new_text: fix.replacement.clone(),
        };
        let diagnostics = doc
            .reports
            .iter()
            .filter(|r| r.range == report.range)
            .map(|r| report_to_diagnostic(doc, r))
            .collect();

        actions.push(CodeActionOrCommand::CodeAction(CodeAction {
            title: "Remove redundant fragment".to_string(),
            kind: Some(CodeActionKind::QUICKFIX),
            diagnostics: Some(diagnostics),
            edit: Some(workspace_edit(&doc.uri, vec![edit])),
            is_preferred: Some(true),
            ..Default::default()
        }));
    }

    actions
}

/// Replace the whole buffer with `fixed`.
pub fn fix_all_action(doc: &Document, fixed: String) -> CodeActionOrCommand {
    let edit = TextEdit {
        range: Range::new(Position::new(0, 0), doc.offset_to_position(doc.text.len())),
        new_text: fixed,
    };
    CodeActionOrCommand::CodeAction(CodeAction {
        title: "Remove all redundant fragments".to_string(),
        kind: Some(CodeActionKind::SOURCE_FIX_ALL),
        edit: Some(workspace_edit(&doc.uri, vec![edit])),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linter::Linter;
    use crate::parser::Dialect;

    fn linted(text: &str) -> Document {
        let mut doc = Document::new(
            Url::parse("file:///tmp/App.jsx").unwrap(),
            text.to_string(),
            1,
            Dialect::Javascript,
        );
        doc.reports = Linter::default()
            .lint_source(text, Dialect::Javascript)
            .unwrap();
        doc
    }

    #[test]
    fn test_report_to_diagnostic() {
        let doc = linted("<p>\n  <>{foo}</>\n</p>");
        let diagnostics = document_diagnostics(&doc);

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].range.start, Position::new(1, 2));
        assert_eq!(diagnostics[0].range.end, Position::new(1, 12));
        assert_eq!(
            diagnostics[0].code,
            Some(NumberOrString::String("NeedsMoreChildren".into()))
        );
        assert_eq!(diagnostics[1].severity, Some(DiagnosticSeverity::WARNING));
        assert!(diagnostics[1].message.contains("HTML element"));
    }

    #[test]
    fn test_quick_fix_is_deduplicated() {
        let doc = linted("<p>\n  <>{foo}</>\n</p>");
        let actions = quick_fixes(&doc, Range::new(Position::new(1, 4), Position::new(1, 4)));
        assert_eq!(actions.len(), 1);

        let CodeActionOrCommand::CodeAction(action) = &actions[0] else {
            panic!("expected a code action");
        };
        assert_eq!(action.diagnostics.as_ref().map(Vec::len), Some(2));
        let changes = action.edit.as_ref().unwrap().changes.as_ref().unwrap();
        let edits = &changes[&doc.uri];
        assert_eq!(edits[0].new_text, "{foo}");
    }

    #[test]
    fn test_quick_fix_outside_range() {
        let doc = linted("<p>\n  <>{foo}</>\n</p>\n");
        let actions = quick_fixes(&doc, Range::new(Position::new(3, 0), Position::new(3, 0)));
        assert!(actions.is_empty());
    }

    #[test]
    fn test_syntax_error_diagnostic() {
        let doc = linted("<></>");
        let diagnostic = error_to_diagnostic(&doc, &LintError::Syntax { offset: 2 });
        assert_eq!(diagnostic.range.start, Position::new(0, 2));
        assert_eq!(diagnostic.severity, Some(DiagnosticSeverity::ERROR));
    }
}
