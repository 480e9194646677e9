use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::diagnostics;
use crate::document::Document;
use crate::linter::Linter;
use crate::parser::Dialect;
use crate::settings::Settings;
use crate::workspace::Workspace;

pub struct JsxLanguageServer {
    client: Client,
    documents: DashMap<Url, Document>,
    /// Decoded settings, or the message of the error that rejected them.
    settings: RwLock<std::result::Result<Settings, String>>,
    workspace_root: RwLock<Option<PathBuf>>,
}

fn dialect_for(uri: &Url, language_id: Option<&str>) -> Dialect {
    if let Ok(path) = uri.to_file_path() {
        if let Some(dialect) = Dialect::from_path(&path) {
            return dialect;
        }
    }
    match language_id {
        Some("typescriptreact") | Some("typescript") => Dialect::Tsx,
        _ => Dialect::Javascript,
    }
}

impl JsxLanguageServer {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            documents: DashMap::new(),
            settings: RwLock::new(Ok(Settings::default())),
            workspace_root: RwLock::new(None),
        }
    }

    fn linter(&self) -> std::result::Result<Linter, String> {
        match self.settings.read() {
            Ok(settings) => (*settings).clone().map(Linter::new),
            Err(_) => Err("Could not acquire settings lock".to_string()),
        }
    }

    fn update_settings(&self, value: serde_json::Value) {
        let decoded = Settings::from_json(value).map_err(|e| {
            tracing::error!("Rejected settings: {}", e);
            e.to_string()
        });
        if let Ok(mut settings) = self.settings.write() {
            *settings = decoded;
        }
    }

    /// Lint `doc` in place and return what should be published for it.
    fn lint_document(&self, doc: &mut Document) -> Vec<Diagnostic> {
        let linter = match self.linter() {
            Ok(linter) => linter,
            Err(message) => {
                doc.reports.clear();
                return vec![Diagnostic {
                    range: Range::new(Position::new(0, 0), Position::new(0, 0)),
                    severity: Some(DiagnosticSeverity::ERROR),
                    source: Some(diagnostics::SOURCE.to_string()),
                    message,
                    ..Default::default()
                }];
            }
        };

        match linter.lint_source(&doc.text, doc.dialect) {
            Ok(reports) => {
                doc.reports = reports;
                diagnostics::document_diagnostics(doc)
            }
            Err(e) => {
                tracing::warn!("Could not lint {}: {}", doc.uri, e);
                doc.reports.clear();
                vec![diagnostics::error_to_diagnostic(doc, &e)]
            }
        }
    }

    async fn on_change(&self, uri: Url, text: String, version: i32, dialect: Dialect) {
        tracing::info!("on_change: uri={}, text_len={}", uri, text.len());
        let mut doc = Document::new(uri.clone(), text, version, dialect);
        let diagnostics = self.lint_document(&mut doc);
        tracing::debug!("{} diagnostics for {}", diagnostics.len(), uri);
        self.documents.insert(uri.clone(), doc);

        self.client
            .publish_diagnostics(uri, diagnostics, Some(version))
            .await;
    }

    async fn relint_open_documents(&self) {
        let open: Vec<(Url, String, i32, Dialect)> = self
            .documents
            .iter()
            .map(|d| (d.uri.clone(), d.text.clone(), d.version, d.dialect))
            .collect();

        for (uri, text, version, dialect) in open {
            self.on_change(uri, text, version, dialect).await;
        }
    }

    /// Publish diagnostics for every JSX file under the workspace root that
    /// is not already open.
    async fn lint_workspace(&self) -> usize {
        let root = match self.workspace_root.read() {
            Ok(root) => root.clone(),
            Err(_) => None,
        };
        let (Some(root), Ok(linter)) = (root, self.linter()) else {
            return 0;
        };

        let scanned = tokio::task::spawn_blocking(move || {
            let mut workspace = Workspace::new(root, linter);
            workspace.initialize().map(|_| workspace)
        })
        .await;

        let workspace = match scanned {
            Ok(Ok(workspace)) => workspace,
            Ok(Err(e)) => {
                tracing::error!("Failed to lint workspace: {}", e);
                return 0;
            }
            Err(e) => {
                tracing::error!("Workspace task failed: {}", e);
                return 0;
            }
        };

        let count = workspace.files.len();
        for file in workspace.files {
            if self.documents.contains_key(&file.uri) {
                continue;
            }
            let mut doc = Document::new(file.uri.clone(), file.text, 0, file.dialect);
            let diagnostics = match file.result {
                Ok(reports) => {
                    doc.reports = reports;
                    diagnostics::document_diagnostics(&doc)
                }
                Err(e) => vec![diagnostics::error_to_diagnostic(&doc, &e)],
            };
            self.client
                .publish_diagnostics(file.uri, diagnostics, None)
                .await;
        }
        count
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for JsxLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        tracing::info!("initialize: received request");

        if let Some(options) = params.initialization_options {
            self.update_settings(options);
        }

        if let Some(root_uri) = params.root_uri {
            if let Ok(path) = root_uri.to_file_path() {
                tracing::info!("Workspace root at {:?}", path);
                if let Ok(mut root) = self.workspace_root.write() {
                    *root = Some(path);
                }
            }
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                code_action_provider: Some(CodeActionProviderCapability::Options(
                    CodeActionOptions {
                        code_action_kinds: Some(vec![
                            CodeActionKind::QUICKFIX,
                            CodeActionKind::SOURCE_FIX_ALL,
                        ]),
                        ..Default::default()
                    },
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "jsx-lint".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        tracing::info!("initialized: received notification");

        let count = self.lint_workspace().await;
        let message = format!("JSX lint initialized: {} files checked", count);
        self.client.log_message(MessageType::INFO, message).await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        tracing::info!("did_open: uri={}", params.text_document.uri);
        let doc = params.text_document;
        let dialect = dialect_for(&doc.uri, Some(&doc.language_id));
        self.on_change(doc.uri, doc.text, doc.version, dialect).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        let dialect = self
            .documents
            .get(&uri)
            .map(|d| d.dialect)
            .unwrap_or_else(|| dialect_for(&uri, None));
        if let Some(change) = params.content_changes.into_iter().next() {
            self.on_change(uri, change.text, version, dialect).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.remove(&uri);
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        tracing::info!("did_change_configuration");
        self.update_settings(params.settings);
        self.relint_open_documents().await;
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        let uri = &params.text_document.uri;
        let Some(doc) = self.documents.get(uri) else {
            return Ok(None);
        };

        let mut actions = diagnostics::quick_fixes(&doc, params.range);

        if doc.reports.iter().any(|r| r.fix.is_some()) {
            if let Ok(linter) = self.linter() {
                match linter.fix_source(&doc.text, doc.dialect) {
                    Ok(outcome) if outcome.changed() => {
                        actions.push(diagnostics::fix_all_action(&doc, outcome.output));
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Fix all failed for {}: {}", uri, e),
                }
            }
        }

        if let Some(only) = &params.context.only {
            actions.retain(|action| match action {
                CodeActionOrCommand::CodeAction(a) => a
                    .kind
                    .as_ref()
                    .is_some_and(|kind| only.iter().any(|o| kind.as_str().starts_with(o.as_str()))),
                CodeActionOrCommand::Command(_) => false,
            });
        }

        if actions.is_empty() {
            Ok(None)
        } else {
            Ok(Some(actions))
        }
    }
}
