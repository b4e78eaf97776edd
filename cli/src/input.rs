//! Fingerprint input loading.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use voxtrace_matcher::Metadata;

/// Error type for fingerprint input loading.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read file: {0}")]
    ReadFile(#[from] io::Error),
    #[error("failed to parse YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),
    #[error("failed to parse JSON: {0}")]
    ParseJson(#[from] serde_json::Error),
    #[error("failed to parse file (tried YAML and JSON)")]
    ParseFailed,
    #[error("fingerprint is empty")]
    EmptyFingerprint,
    #[error("invalid metadata pair {0:?}, expected key=value")]
    InvalidMeta(String),
}

/// A fingerprint file: either a bare array of numbers or an object with
/// `fingerprint` and optional `metadata`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FingerprintInput {
    Bare(Vec<f32>),
    Full {
        fingerprint: Vec<f32>,
        #[serde(default)]
        metadata: Option<Metadata>,
    },
}

impl FingerprintInput {
    pub fn fingerprint(&self) -> &[f32] {
        match self {
            Self::Bare(fp) => fp,
            Self::Full { fingerprint, .. } => fingerprint,
        }
    }

    /// Splits the input, merging `extra` over the file's metadata.
    pub fn into_parts(self, extra: Metadata) -> (Vec<f32>, Option<Metadata>) {
        let (fingerprint, metadata) = match self {
            Self::Bare(fp) => (fp, None),
            Self::Full {
                fingerprint,
                metadata,
            } => (fingerprint, metadata),
        };
        if extra.is_empty() {
            return (fingerprint, metadata);
        }
        let mut merged = metadata.unwrap_or_default();
        merged.extend(extra);
        (fingerprint, Some(merged))
    }
}

/// Loads a fingerprint from a YAML or JSON file, or from stdin when the
/// path is `-`.
pub fn load_fingerprint(path: impl AsRef<Path>) -> Result<FingerprintInput, InputError> {
    let path = path.as_ref();
    if path.as_os_str() == "-" {
        return load_fingerprint_from_stdin();
    }
    let data = fs::read(path)?;
    parse_fingerprint(&data, path)
}

/// Parses fingerprint data based on file extension or content.
pub fn parse_fingerprint(
    data: &[u8],
    path: impl AsRef<Path>,
) -> Result<FingerprintInput, InputError> {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    let input: FingerprintInput = match ext.as_deref() {
        Some("yaml") | Some("yml") => serde_yaml::from_slice(data)?,
        Some("json") => serde_json::from_slice(data)?,
        _ => parse_any(data)?,
    };
    check_non_empty(input)
}

fn load_fingerprint_from_stdin() -> Result<FingerprintInput, InputError> {
    let mut data = Vec::new();
    io::stdin().read_to_end(&mut data)?;
    check_non_empty(parse_any(&data)?)
}

// JSON is a subset of YAML, so try the stricter parser first.
fn parse_any(data: &[u8]) -> Result<FingerprintInput, InputError> {
    if let Ok(v) = serde_json::from_slice(data) {
        return Ok(v);
    }
    if let Ok(v) = serde_yaml::from_slice(data) {
        return Ok(v);
    }
    Err(InputError::ParseFailed)
}

fn check_non_empty(input: FingerprintInput) -> Result<FingerprintInput, InputError> {
    if input.fingerprint().is_empty() {
        return Err(InputError::EmptyFingerprint);
    }
    Ok(input)
}

/// Parses `key=value` pairs into metadata. Values that parse as JSON keep
/// their type (`count=3`, `flag=true`); anything else is a string.
pub fn parse_meta_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<Metadata, InputError> {
    let mut meta = Metadata::new();
    for pair in pairs {
        let pair = pair.as_ref();
        let (key, raw) = pair
            .split_once('=')
            .filter(|(k, _)| !k.is_empty())
            .ok_or_else(|| InputError::InvalidMeta(pair.to_string()))?;
        let value =
            serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        meta.insert(key.to_string(), value);
    }
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_bare_json() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        writeln!(file, "[0.1, 0.2, 0.3]").unwrap();

        let input = load_fingerprint(file.path()).unwrap();
        assert_eq!(input, FingerprintInput::Bare(vec![0.1, 0.2, 0.3]));
    }

    #[test]
    fn test_load_full_yaml() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(
            file,
            "fingerprint: [1.0, 2.0]\nmetadata:\n  caller: \"+15550100\"\n  duration: 12.5"
        )
        .unwrap();

        let (fp, meta) = load_fingerprint(file.path())
            .unwrap()
            .into_parts(Metadata::new());
        assert_eq!(fp, vec![1.0, 2.0]);
        let meta = meta.unwrap();
        assert_eq!(meta["caller"], "+15550100");
        assert_eq!(meta["duration"], 12.5);
    }

    #[test]
    fn test_parse_unknown_extension() {
        let input = parse_fingerprint(b"- 1.0\n- 2.0", "fp.txt").unwrap();
        assert_eq!(input.fingerprint(), &[1.0, 2.0]);
    }

    #[test]
    fn test_parse_invalid() {
        let result = parse_fingerprint(b"invalid data {{{{", "fp.txt");
        assert!(matches!(result, Err(InputError::ParseFailed)));
    }

    #[test]
    fn test_empty_fingerprint() {
        let result = parse_fingerprint(b"[]", "fp.json");
        assert!(matches!(result, Err(InputError::EmptyFingerprint)));
    }

    #[test]
    fn test_meta_pairs() {
        let meta = parse_meta_pairs(&["caller=+1555", "count=3", "flag=true", "note=a=b"]).unwrap();
        assert_eq!(meta["caller"], "+1555");
        assert_eq!(meta["count"], 3);
        assert_eq!(meta["flag"], true);
        assert_eq!(meta["note"], "a=b");

        assert!(matches!(
            parse_meta_pairs(&["novalue"]),
            Err(InputError::InvalidMeta(_))
        ));
        assert!(matches!(
            parse_meta_pairs(&["=x"]),
            Err(InputError::InvalidMeta(_))
        ));
    }

    #[test]
    fn test_extra_meta_overrides_file() {
        let input = FingerprintInput::Full {
            fingerprint: vec![1.0],
            metadata: json!({"caller": "a", "region": "north"}).as_object().cloned(),
        };
        let extra = parse_meta_pairs(&["caller=b"]).unwrap();
        let (_, meta) = input.into_parts(extra);
        let meta = meta.unwrap();
        assert_eq!(meta["caller"], "b");
        assert_eq!(meta["region"], "north");
    }
}
