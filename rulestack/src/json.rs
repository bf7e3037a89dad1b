//! Whole-document JSON persistence
//!
//! Every persisted document is read in full and rewritten in full, pretty
//! printed with two-space indentation and a trailing newline.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

/// Read a JSON document, returning `None` when the file does not exist
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path) {
        Ok(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| Error::parse(path, err)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(Error::io("read", path, err)),
    }
}

/// Serialize `value` and write it to `path`, creating parent directories
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T, what: &'static str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| Error::io("create directory", parent, err))?;
    }

    let mut body =
        serde_json::to_string_pretty(value).map_err(|source| Error::Serialize { what, source })?;
    body.push('\n');

    fs::write(path, body).map_err(|err| Error::io("write", path, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    #[test]
    fn test_missing_document_reads_as_none() {
        let temp = TempDir::new().unwrap();
        let value: Option<Value> = read_json(&temp.path().join("absent.json")).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_write_is_pretty_with_trailing_newline() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/dir/doc.json");
        write_json(&path, &json!({ "a": [1] }), "test document").unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(raw, "{\n  \"a\": [\n    1\n  ]\n}\n");
        let back: Option<Value> = read_json(&path).unwrap();
        assert_eq!(back, Some(json!({ "a": [1] })));
    }

    #[test]
    fn test_corrupt_document_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        fs::write(&path, "[").unwrap();
        let result: Result<Option<Value>> = read_json(&path);
        assert!(matches!(result, Err(Error::Parse { .. })));
    }
}
