use std::path::{Component, Path};

/// Express `path` relative to `root` using `/` separators, the form the update
/// endpoint expects in `file_path`.
///
/// Returns `None` when `path` is not under `root`, the remainder is empty, or a
/// component is not valid UTF-8.
#[must_use]
pub fn to_upload_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            parts.push(part.to_str()?);
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Turn an upload path back into a filesystem path under `root`.
#[must_use]
pub fn resolve_upload_path(root: &Path, upload_path: &str) -> std::path::PathBuf {
    upload_path
        .split('/')
        .filter(|part| !part.is_empty())
        .fold(root.to_path_buf(), |acc, part| acc.join(part))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_with_forward_slashes() {
        let root = Path::new("project");
        let file = root.join("src").join("app").join("page.tsx");
        assert_eq!(
            to_upload_path(root, &file).as_deref(),
            Some("src/app/page.tsx")
        );
    }

    #[test]
    fn dot_root_drops_leading_dot() {
        let root = Path::new(".");
        let file = Path::new("./README.md");
        assert_eq!(to_upload_path(root, file).as_deref(), Some("README.md"));
    }

    #[test]
    fn outside_root_or_root_itself() {
        assert_eq!(to_upload_path(Path::new("a"), Path::new("b/c.txt")), None);
        assert_eq!(to_upload_path(Path::new("a"), Path::new("a")), None);
    }

    #[test]
    #[cfg(unix)]
    fn non_utf8_component_is_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let root = Path::new("project");
        let file = root.join(OsStr::from_bytes(b"bad\xff.json"));
        assert_eq!(to_upload_path(root, &file), None);
    }

    #[test]
    fn resolve_joins_segments() {
        let root = Path::new("project");
        assert_eq!(
            resolve_upload_path(root, "src/app/page.tsx"),
            root.join("src").join("app").join("page.tsx")
        );
    }
}
