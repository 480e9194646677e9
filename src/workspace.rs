use std::path::{Path, PathBuf};

use tower_lsp::lsp_types::Url;
use walkdir::{DirEntry, WalkDir};

use crate::error::LintError;
use crate::fragment::Report;
use crate::linter::Linter;
use crate::parser::Dialect;

const SKIPPED_DIRS: &[&str] = &["node_modules", ".git", "dist", "build", "target"];

/// Lint result for one file on disk.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub uri: Url,
    pub text: String,
    pub dialect: Dialect,
    pub result: Result<Vec<Report>, LintError>,
}

impl FileReport {
    pub fn report_count(&self) -> usize {
        self.result.as_ref().map_or(0, Vec::len)
    }
}

/// Every JSX file under a root, linted with one set of settings.
pub struct Workspace {
    pub root_path: PathBuf,
    pub files: Vec<FileReport>,
    linter: Linter,
}

impl Workspace {
    pub fn new(root_path: PathBuf, linter: Linter) -> Self {
        Self {
            root_path,
            files: Vec::new(),
            linter,
        }
    }

    /// Find and lint all JSX files under the root.
    pub fn initialize(&mut self) -> anyhow::Result<()> {
        let paths = self.discover_files();
        tracing::info!("Linting {} JSX files", paths.len());

        self.files.clear();
        for path in paths {
            match self.lint_file(&path) {
                Ok(report) => self.files.push(report),
                Err(e) => tracing::warn!("Failed to lint {:?}: {}", path, e),
            }
        }

        Ok(())
    }

    pub fn discover_files(&self) -> Vec<PathBuf> {
        WalkDir::new(&self.root_path)
            .into_iter()
            .filter_entry(|e| !is_skipped_dir(e))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && Dialect::from_path(e.path()).is_some())
            .map(|e| e.into_path())
            .collect()
    }

    /// Lint a single file. IO failures are errors; lint failures are kept in
    /// the returned report.
    pub fn lint_file(&self, path: &Path) -> anyhow::Result<FileReport> {
        let dialect = Dialect::from_path(path)
            .ok_or_else(|| anyhow::anyhow!("Not a JSX file: {:?}", path))?;
        let text = std::fs::read_to_string(path)?;
        let uri = Url::from_file_path(path).map_err(|_| anyhow::anyhow!("Invalid path"))?;
        let result = self.linter.lint_source(&text, dialect);

        if let Err(e) = &result {
            tracing::debug!("{:?}: {}", path, e);
        }

        Ok(FileReport {
            path: path.to_path_buf(),
            uri,
            text,
            dialect,
            result,
        })
    }

    pub fn report_count(&self) -> usize {
        self.files.iter().map(FileReport::report_count).sum()
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_workspace() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let src_dir = temp_dir.path().join("src");
        fs::create_dir_all(src_dir.join("components")).unwrap();
        fs::create_dir_all(temp_dir.path().join("node_modules").join("lib")).unwrap();

        fs::write(
            src_dir.join("App.jsx"),
            "export const App = () => <><Header /></>;\n",
        )
        .unwrap();
        fs::write(
            src_dir.join("components").join("List.tsx"),
            "export const List = ({ items }: Props) => (\n  <ul>\n    <>{items}</>\n  </ul>\n);\n",
        )
        .unwrap();
        fs::write(src_dir.join("types.ts"), "export type Props = { items: string[] };\n").unwrap();
        fs::write(src_dir.join("Broken.jsx"), "const a = <div>{ </div>;\n").unwrap();
        fs::write(
            temp_dir.path().join("node_modules").join("lib").join("index.js"),
            "module.exports = <><b/></>;\n",
        )
        .unwrap();

        temp_dir
    }

    #[test]
    fn test_discover_skips_vendor_and_ts() {
        let temp_dir = create_test_workspace();
        let workspace = Workspace::new(temp_dir.path().to_path_buf(), Linter::default());

        let mut names: Vec<_> = workspace
            .discover_files()
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .collect();
        names.sort();
        assert_eq!(names, vec!["App.jsx", "Broken.jsx", "List.tsx"]);
    }

    #[test]
    fn test_initialize_lints_every_file() {
        let temp_dir = create_test_workspace();
        let mut workspace = Workspace::new(temp_dir.path().to_path_buf(), Linter::default());
        workspace.initialize().unwrap();

        assert_eq!(workspace.files.len(), 3);
        // App: one report; List: two reports on the same fragment.
        assert_eq!(workspace.report_count(), 3);

        let broken = workspace
            .files
            .iter()
            .find(|f| f.path.ends_with("Broken.jsx"))
            .unwrap();
        assert!(matches!(broken.result, Err(LintError::Syntax { .. })));
    }

    #[test]
    fn test_lint_file_rejects_non_jsx() {
        let temp_dir = create_test_workspace();
        let workspace = Workspace::new(temp_dir.path().to_path_buf(), Linter::default());
        assert!(workspace
            .lint_file(&temp_dir.path().join("src").join("types.ts"))
            .is_err());
    }
}
