//! Building a [`FileMapping`] from disk.
//!
//! Two sources: a project directory (walked, build artifacts skipped) or a
//! JSON manifest already shaped like the `files` payload.

use crate::sandbox::{FileMapping, SandboxFile};
use anyhow::{Context, Result};
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Directories skipped when collecting project files.
pub const SKIP_DIRS: &[&str] = &["node_modules", ".next", ".git", "dist", "build", ".cache"];

fn is_skipped(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIP_DIRS.contains(&name))
}

/// Collect every UTF-8 file under `root` as a text entry keyed by its
/// `/`-separated path relative to `root`.
#[tracing::instrument(skip_all, fields(root = %root.display()))]
pub fn collect_dir(root: &Path) -> Result<FileMapping> {
    anyhow::ensure!(root.is_dir(), "Not a directory: {}", root.display());

    let mut files = FileMapping::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !is_skipped(e));

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(root)?;
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        match std::fs::read_to_string(entry.path()) {
            Ok(content) => {
                files.insert(key, SandboxFile::text(content));
            }
            Err(e) => {
                tracing::debug!("Skipping unreadable file {key}: {e}");
            }
        }
    }

    tracing::debug!("Collected {} files", files.len());
    Ok(files)
}

/// Read a JSON manifest of the form `{"<path>": {"content": "…"}, …}`.
pub fn load_manifest(path: &Path) -> Result<FileMapping> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    serde_json::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("Failed to parse manifest {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn collects_relative_paths() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "package.json", b"{}");
        write(tmp.path(), "src/App.js", b"export default 1;");
        write(tmp.path(), "public/index.html", b"<div id=root></div>");

        let files = collect_dir(tmp.path()).unwrap();
        let keys: Vec<_> = files.keys().cloned().collect();
        assert_eq!(keys, ["package.json", "public/index.html", "src/App.js"]);
        assert_eq!(files["src/App.js"], SandboxFile::text("export default 1;"));
    }

    #[test]
    fn skips_build_artifacts() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "index.js", b"1");
        write(tmp.path(), "node_modules/react/index.js", b"2");
        write(tmp.path(), ".git/HEAD", b"ref");
        write(tmp.path(), "dist/bundle.js", b"3");

        let files = collect_dir(tmp.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files.contains_key("index.js"));
    }

    #[test]
    fn skips_non_utf8_files() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "logo.png", &[0x89, 0x50, 0xff, 0xfe]);
        write(tmp.path(), "README.md", b"# hi");

        let files = collect_dir(tmp.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files.contains_key("README.md"));
    }

    #[test]
    fn rejects_missing_directory() {
        let tmp = TempDir::new().unwrap();
        assert!(collect_dir(&tmp.path().join("nope")).is_err());
    }

    #[test]
    fn loads_manifest() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("files.json");
        std::fs::write(
            &path,
            r#"{
                "index.js": { "content": "console.log(1)" },
                "logo.png": { "content": "https://example.com/logo.png", "isBinary": true }
            }"#,
        )
        .unwrap();

        let files = load_manifest(&path).unwrap();
        assert_eq!(files["index.js"], SandboxFile::text("console.log(1)"));
        assert!(files["logo.png"].is_binary);
    }

    #[test]
    fn malformed_manifest_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("files.json");
        std::fs::write(&path, r#"{"index.js": "bare string"}"#).unwrap();
        assert!(load_manifest(&path).is_err());
    }
}
