use crate::errors::{ReleaseError, Result, io_error_with_path};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use serde_json::value::RawValue;
use std::fs;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "package.json";

/// Fields of a `package.json` the release flow cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub name: Option<String>,
    pub version: Option<String>,
    pub private: bool,
}

impl Manifest {
    /// The declared version, or an error naming the manifest when absent.
    pub fn require_version(&self, path: &Path) -> Result<&str> {
        self.version
            .as_deref()
            .ok_or_else(|| ReleaseError::invalid_manifest(path, "missing a non-empty 'version' field"))
    }
}

pub fn manifest_path(package_dir: &Path) -> PathBuf {
    package_dir.join(MANIFEST_FILE)
}

/// Load and parse the manifest at `path`.
pub fn read_manifest(path: &Path) -> Result<Manifest> {
    let text = fs::read_to_string(path).map_err(|e| io_error_with_path(e, path))?;
    parse_manifest(path, &text)
}

pub fn parse_manifest(path: &Path, text: &str) -> Result<Manifest> {
    let value: JsonValue = serde_json::from_str(text)
        .map_err(|e| ReleaseError::invalid_manifest(path, e.to_string()))?;
    if !value.is_object() {
        return Err(ReleaseError::invalid_manifest(path, "top-level value must be an object"));
    }

    let string_field = |key: &str| {
        value
            .get(key)
            .and_then(JsonValue::as_str)
            .filter(|s| !s.trim().is_empty())
    };

    Ok(Manifest {
        name: string_field("name").map(|s| s.trim().to_string()),
        // Kept verbatim: publish compares it byte for byte with the tag.
        version: string_field("version").map(str::to_string),
        private: value
            .get("private")
            .and_then(JsonValue::as_bool)
            .unwrap_or(false),
    })
}

/// Rewrite the `version` field of a manifest, leaving every other byte intact.
///
/// When the version changes the result ends with exactly one newline. An
/// unchanged version returns `input` as is.
pub fn replace_version(path: &Path, input: &str, new_version: &str) -> Result<String> {
    #[derive(Deserialize)]
    struct VersionOnly<'a> {
        #[serde(borrow)]
        version: Option<&'a RawValue>,
    }

    let borrowed: VersionOnly = serde_json::from_str(input)
        .map_err(|e| ReleaseError::invalid_manifest(path, e.to_string()))?;
    let raw = borrowed
        .version
        .ok_or_else(|| ReleaseError::invalid_manifest(path, "missing a version field"))?;
    let current: String = serde_json::from_str(raw.get()).map_err(|e| {
        ReleaseError::invalid_manifest(path, format!("version field is not a string: {e}"))
    })?;

    if current == new_version {
        return Ok(input.to_string());
    }

    let (start, end) = raw_span(raw, input)
        .ok_or_else(|| ReleaseError::invalid_manifest(path, "could not locate the version field"))?;
    let replacement = serde_json::to_string(new_version)
        .map_err(|e| ReleaseError::invalid_manifest(path, e.to_string()))?;
    let mut output = input.to_string();
    output.replace_range(start..end, &replacement);

    let body_len = output.trim_end_matches(['\n', '\r']).len();
    output.truncate(body_len);
    output.push('\n');
    Ok(output)
}

/// Overwrite the version in the manifest file at `path`.
///
/// Returns whether the file content changed.
pub fn write_version(path: &Path, new_version: &str) -> Result<bool> {
    let original = fs::read_to_string(path).map_err(|e| io_error_with_path(e, path))?;
    let updated = replace_version(path, &original, new_version)?;
    if updated == original {
        return Ok(false);
    }
    fs::write(path, updated).map_err(|e| io_error_with_path(e, path))?;
    Ok(true)
}

/// Byte span of a `RawValue` borrowed from `source`.
fn raw_span(raw: &RawValue, source: &str) -> Option<(usize, usize)> {
    let slice = raw.get();
    let start = (slice.as_ptr() as usize).checked_sub(source.as_ptr() as usize)?;
    let end = start.checked_add(slice.len())?;
    if end > source.len() || &source[start..end] != slice {
        return None;
    }
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"{
  "name": "@acme/widgets",
  "version": "1.2.3",
  "scripts": {
    "build": "tsc",
    "version": "echo not-this-one"
  },
  "private": false,
  "zeta": 1,
  "alpha": [1, 2]
}
"#;

    #[test]
    fn parses_name_version_and_private() {
        let manifest = parse_manifest(Path::new("package.json"), SAMPLE).unwrap();
        assert_eq!(manifest.name.as_deref(), Some("@acme/widgets"));
        assert_eq!(manifest.version.as_deref(), Some("1.2.3"));
        assert!(!manifest.private);

        let private =
            parse_manifest(Path::new("package.json"), r#"{"name":"x","private":true}"#).unwrap();
        assert!(private.private);
        assert!(private.version.is_none());
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_manifest(Path::new("/repo/package.json"), "{ nope").unwrap_err();
        match err {
            ReleaseError::InvalidManifest { path, .. } => {
                assert_eq!(path, Path::new("/repo/package.json"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn require_version_reports_missing_field() {
        let manifest = parse_manifest(Path::new("package.json"), r#"{"name":"x"}"#).unwrap();
        assert!(manifest.require_version(Path::new("package.json")).is_err());
    }

    #[test]
    fn replaces_only_top_level_version_preserving_layout() {
        let out = replace_version(Path::new("package.json"), SAMPLE, "1.3.0-beta.0").unwrap();
        let expected = SAMPLE.replacen("\"1.2.3\"", "\"1.3.0-beta.0\"", 1);
        assert_eq!(out, expected);
        assert!(out.contains("\"version\": \"echo not-this-one\""));
    }

    #[test]
    fn normalizes_trailing_newline() {
        let compact = r#"{"name":"x","version":"0.1.0"}"#;
        let out = replace_version(Path::new("package.json"), compact, "0.2.0").unwrap();
        assert_eq!(out, "{\"name\":\"x\",\"version\":\"0.2.0\"}\n");

        let padded = "{\"name\":\"x\",\"version\":\"0.1.0\"}\n\n\n";
        let out = replace_version(Path::new("package.json"), padded, "0.2.0").unwrap();
        assert_eq!(out, "{\"name\":\"x\",\"version\":\"0.2.0\"}\n");
    }

    #[test]
    fn same_version_leaves_file_byte_identical() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(MANIFEST_FILE);
        let text = "{\n  \"name\": \"foo\",\n  \"version\": \"1.2.3\"\n}";
        fs::write(&path, text).unwrap();

        assert!(!write_version(&path, "1.2.3").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), text);

        let padded = format!("{text}\n\n");
        assert_eq!(
            replace_version(Path::new("package.json"), &padded, "1.2.3").unwrap(),
            padded
        );
    }

    #[test]
    fn version_is_read_verbatim() {
        let manifest = parse_manifest(
            Path::new("package.json"),
            r#"{"name":" foo ","version":"1.2.3 "}"#,
        )
        .unwrap();
        assert_eq!(manifest.name.as_deref(), Some("foo"));
        assert_eq!(manifest.version.as_deref(), Some("1.2.3 "));

        let blank = parse_manifest(Path::new("package.json"), r#"{"version":"  "}"#).unwrap();
        assert!(blank.version.is_none());
    }

    #[test]
    fn write_version_reports_whether_file_changed() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(MANIFEST_FILE);
        fs::write(&path, "{\n  \"name\": \"x\",\n  \"version\": \"0.1.0\"\n}\n").unwrap();

        assert!(!write_version(&path, "0.1.0").unwrap());
        assert!(write_version(&path, "0.1.1").unwrap());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "{\n  \"name\": \"x\",\n  \"version\": \"0.1.1\"\n}\n"
        );
    }

    #[test]
    fn missing_version_field_is_an_error() {
        let err = replace_version(Path::new("package.json"), r#"{"name":"x"}"#, "1.0.0");
        assert!(matches!(err, Err(ReleaseError::InvalidManifest { .. })));
    }
}
