use std::collections::BTreeSet;
use std::path::Path;

use walkdir::WalkDir;

use crate::utils::glob::{glob_match, IgnoreRules};
use crate::utils::path::to_upload_path;

/// File-name patterns selecting what gets uploaded. The trailing `*` also picks
/// up variants such as `.jsx`, `.json5` or `.js.map`.
pub const DEFAULT_PATTERNS: &[&str] = &[
    "*.js*", "*.ts*", "*.css*", "*.html*", "*.json*", "*.md*", "*.txt*", "*.yaml*", "*.yml*",
    "*.xml*", "*.svg*",
];

#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    pub patterns: Vec<String>,
    pub respect_gitignore: bool,
    pub exclude: Vec<String>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_PATTERNS.iter().map(|p| (*p).to_string()).collect(),
            respect_gitignore: false,
            exclude: Vec::new(),
        }
    }
}

/// Deduplicated set of upload paths, relative to the project root.
///
/// Matching files whose path is not valid UTF-8 cannot be named in a JSON
/// payload; they are kept apart (lossily rendered) so the deployer can report
/// them as failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    paths: BTreeSet<String>,
    non_utf8: Vec<String>,
}

impl FileSet {
    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        self.paths.insert(path.into())
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    /// Matching files skipped because their path is not valid UTF-8.
    #[must_use]
    pub fn non_utf8(&self) -> &[String] {
        &self.non_utf8
    }
}

impl<S: Into<String>> FromIterator<S> for FileSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().map(Into::into).collect(),
            non_utf8: Vec::new(),
        }
    }
}

/// Whether a file name matches any of `patterns`.
#[must_use]
pub fn matches_any(patterns: &[String], file_name: &str) -> bool {
    patterns.iter().any(|p| glob_match(p, file_name))
}

/// Walk `root` recursively and collect every file whose name matches one of the
/// configured patterns.
///
/// A symlink counts when its target is a regular file; symlinked directories
/// are not descended into. Unreadable directory entries are logged and
/// skipped.
#[must_use]
pub fn discover(root: &Path, options: &DiscoveryOptions) -> FileSet {
    let mut ignore = if options.respect_gitignore {
        IgnoreRules::from_file(&root.join(".gitignore"))
    } else {
        IgnoreRules::default()
    };
    ignore.extend(options.exclude.iter().map(String::as_str));

    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        if entry.depth() == 0 {
            return true;
        }
        let Some(rel) = to_upload_path(root, entry.path()) else {
            return true;
        };
        let skip = ignore.is_ignored(&rel, entry.file_type().is_dir());
        if skip {
            tracing::debug!("excluded {rel}");
        }
        !skip
    });

    let mut files = FileSet::default();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("skipping unreadable entry: {e}");
                continue;
            }
        };
        if !is_file_or_link_to_file(&entry) {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !matches_any(&options.patterns, &name) {
            continue;
        }
        if let Some(rel) = to_upload_path(root, entry.path()) {
            tracing::debug!("matched {rel}");
            files.insert(rel);
        } else if entry.depth() > 0 {
            let shown = entry.path().display().to_string();
            tracing::warn!("skipping {shown}: path is not valid UTF-8");
            files.non_utf8.push(shown);
        }
    }

    files
}

fn is_file_or_link_to_file(entry: &walkdir::DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_symlink() {
        // metadata() follows the link
        std::fs::metadata(entry.path()).is_ok_and(|m| m.is_file())
    } else {
        file_type.is_file()
    }
}
