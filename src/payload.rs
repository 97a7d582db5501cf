use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::path::resolve_upload_path;

/// One file as sent to the update endpoint. Also the whole request body in
/// per-file mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUpload {
    pub file_path: String,
    pub content: String,
}

/// Request body for batch mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPayload {
    pub files: Vec<FileUpload>,
}

#[derive(Debug, Error)]
#[error("failed to read '{path}': {source}")]
pub struct ReadError {
    pub path: String,
    #[source]
    pub source: std::io::Error,
}

/// Read `upload_path` (relative to `root`) as UTF-8 text.
///
/// Invalid UTF-8 surfaces as an `InvalidData` I/O error.
///
/// # Errors
///
/// Returns a [`ReadError`] naming the path when the file cannot be opened or
/// decoded.
pub fn read_upload(root: &Path, upload_path: &str) -> Result<FileUpload, ReadError> {
    let full = resolve_upload_path(root, upload_path);
    std::fs::read_to_string(&full)
        .map(|content| FileUpload {
            file_path: upload_path.to_string(),
            content,
        })
        .map_err(|source| ReadError {
            path: upload_path.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_file_body_shape() {
        let upload = FileUpload {
            file_path: "src/app/page.tsx".into(),
            content: "export default 1;\n".into(),
        };
        let value = serde_json::to_value(&upload).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "file_path": "src/app/page.tsx",
                "content": "export default 1;\n"
            })
        );
    }

    #[test]
    fn batch_body_shape() {
        let batch = BatchPayload {
            files: vec![FileUpload {
                file_path: "README.md".into(),
                content: "# hi".into(),
            }],
        };
        let value = serde_json::to_value(&batch).unwrap();
        assert_eq!(value["files"][0]["file_path"], "README.md");
        assert_eq!(value["files"][0]["content"], "# hi");
        assert_eq!(value.as_object().unwrap().len(), 1);
    }

    #[test]
    fn read_upload_reads_text() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/guide.md"), "hello").unwrap();

        let upload = read_upload(dir.path(), "docs/guide.md").unwrap();
        assert_eq!(upload.file_path, "docs/guide.md");
        assert_eq!(upload.content, "hello");
    }

    #[test]
    fn read_upload_rejects_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blob.txt"), [0xff, 0xfe, 0x00]).unwrap();

        let err = read_upload(dir.path(), "blob.txt").unwrap_err();
        assert_eq!(err.path, "blob.txt");
        assert_eq!(err.source.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn read_upload_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_upload(dir.path(), "gone.json").unwrap_err();
        assert_eq!(err.source.kind(), std::io::ErrorKind::NotFound);
    }
}
