//! Source document discovery by filesystem walking.

use std::fs;
use std::path::{Path, PathBuf};

/// Reference to a source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SourceRef {
    /// Document name (e.g. "index", "guide/intro").
    pub docname: String,
    /// Path to the `.md` file.
    pub path: PathBuf,
}

/// Finds Markdown documents below a source directory.
///
/// Hidden files and directories are skipped, as are the excluded directories
/// (the build output when it lives inside the sources).
pub(crate) struct Scanner {
    source_dir: PathBuf,
    exclude: Vec<PathBuf>,
}

impl Scanner {
    pub fn new(source_dir: PathBuf) -> Self {
        Self {
            source_dir,
            exclude: Vec::new(),
        }
    }

    #[must_use]
    pub fn exclude(mut self, dir: PathBuf) -> Self {
        self.exclude.push(dir);
        self
    }

    /// Scan the source directory.
    ///
    /// Results are sorted by docname. Unreadable directories are skipped.
    pub fn scan(&self) -> Vec<SourceRef> {
        let mut refs = Vec::new();
        self.scan_directory(&self.source_dir, "", &mut refs);
        refs.sort_by(|a, b| a.docname.cmp(&b.docname));
        refs
    }

    fn scan_directory(&self, dir_path: &Path, prefix: &str, refs: &mut Vec<SourceRef>) {
        let Ok(entries) = fs::read_dir(dir_path) else {
            tracing::debug!(dir = %dir_path.display(), "skipping unreadable directory");
            return;
        };

        for entry in entries.filter_map(Result::ok) {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }

            let path = entry.path();
            if entry.file_type().is_ok_and(|t| t.is_dir()) {
                if self.exclude.contains(&path) {
                    continue;
                }
                let child_prefix = join_docname(prefix, &name);
                self.scan_directory(&path, &child_prefix, refs);
            } else if path.extension().is_some_and(|e| e == "md") {
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                refs.push(SourceRef {
                    docname: join_docname(prefix, &stem),
                    path,
                });
            }
        }
    }
}

fn join_docname(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "# Doc\n").unwrap();
    }

    #[test]
    fn test_scan_sorted_docnames() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("index.md"));
        touch(&root.join("guide/intro.md"));
        touch(&root.join("guide/setup.md"));
        touch(&root.join("about.md"));
        touch(&root.join("notes.txt"));

        let docnames: Vec<_> = Scanner::new(root.to_path_buf())
            .scan()
            .into_iter()
            .map(|r| r.docname)
            .collect();
        assert_eq!(docnames, vec!["about", "guide/intro", "guide/setup", "index"]);
    }

    #[test]
    fn test_scan_skips_hidden_and_excluded() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("index.md"));
        touch(&root.join(".drafts/wip.md"));
        touch(&root.join(".hidden.md"));
        touch(&root.join("_build/index.md"));

        let refs = Scanner::new(root.to_path_buf())
            .exclude(root.join("_build"))
            .scan();
        assert_eq!(
            refs,
            vec![SourceRef {
                docname: "index".to_owned(),
                path: root.join("index.md"),
            }]
        );
    }

    #[test]
    fn test_scan_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Scanner::new(dir.path().join("missing")).scan().is_empty());
    }
}
