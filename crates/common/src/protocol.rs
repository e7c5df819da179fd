//! Stored record types.
//!
//! A sealed record is persisted as a small JSON wrapper:
//!
//! ```text
//! {"v": 3, "n": "<nonce>", "d": "<base64(J0 || ciphertext || tag)>"}
//! ```
//!
//! Anything that does not look like this wrapper is treated as a plaintext record.

use serde::{Deserialize, Serialize};

/// Wrapper version written when the caller does not configure one.
pub const DEFAULT_BLOB_VERSION: u32 = 3;

/// A sealed record as it is written to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiphertextBlob {
    /// Wrapper format version. Informational; never used for key derivation.
    #[serde(rename = "v", default = "default_version")]
    pub version: u32,
    /// Per-record nonce the key and IV were derived from.
    #[serde(rename = "n")]
    pub nonce: String,
    /// Standard base64 of `J0 || ciphertext || tag`.
    #[serde(rename = "d")]
    pub data: String,
}

fn default_version() -> u32 {
    DEFAULT_BLOB_VERSION
}

impl CiphertextBlob {
    /// Construct a blob from its parts.
    pub fn new(version: u32, nonce: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            version,
            nonce: nonce.into(),
            data: data.into(),
        }
    }

    /// Recognise a sealed record.
    ///
    /// Returns `Some` only when `text` is a JSON object carrying non-empty string
    /// `n` and `d` members. Arrays, scalars, other objects and non-JSON input
    /// return `None`.
    pub fn detect(text: &str) -> Option<Self> {
        match StoredForm::classify(text) {
            StoredForm::Sealed(blob) => Some(blob),
            StoredForm::PlainJson | StoredForm::NotJson => None,
        }
    }

    /// Render the blob the way the record store writes it: tab-indented JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        // serde_json only ever emits UTF-8.
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// What a stored document turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredForm {
    /// A sealed `{"v","n","d"}` wrapper.
    Sealed(CiphertextBlob),
    /// Valid JSON that is not a wrapper: a plaintext record.
    PlainJson,
    /// Not parseable as JSON. A torn wrapper looks like this too.
    NotJson,
}

fn non_empty_str<'a>(
    obj: &'a serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Option<&'a str> {
    obj.get(key)
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
}

impl StoredForm {
    pub fn classify(text: &str) -> Self {
        let Ok(value) = serde_json::from_str::<serde_json::Value>(text) else {
            return StoredForm::NotJson;
        };
        let Some(obj) = value.as_object() else {
            return StoredForm::PlainJson;
        };
        let (Some(nonce), Some(data)) = (non_empty_str(obj, "n"), non_empty_str(obj, "d")) else {
            return StoredForm::PlainJson;
        };
        let version = obj
            .get("v")
            .and_then(serde_json::Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(DEFAULT_BLOB_VERSION);
        StoredForm::Sealed(CiphertextBlob::new(version, nonce, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serialises_with_short_keys() {
        let blob = CiphertextBlob::new(3, "abc", "AAAA");
        let value = serde_json::to_value(&blob).unwrap();
        assert_eq!(value, json!({"v": 3, "n": "abc", "d": "AAAA"}));
    }

    #[test]
    fn pretty_form_uses_tabs_and_parses_back() {
        let blob = CiphertextBlob::new(3, "nonce", "ZGF0YQ==");
        let text = blob.to_json_pretty().unwrap();
        assert!(text.contains("\n\t\"n\""), "expected tab indent, got: {text}");
        let parsed: CiphertextBlob = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, blob);
    }

    #[test]
    fn detect_accepts_wrapper() {
        let blob = CiphertextBlob::detect(r#"{"v":3,"n":"xyz","d":"QUJD"}"#).unwrap();
        assert_eq!(blob.nonce, "xyz");
        assert_eq!(blob.data, "QUJD");
        assert_eq!(blob.version, 3);
    }

    #[test]
    fn detect_defaults_missing_version() {
        let blob = CiphertextBlob::detect(r#"{"n":"xyz","d":"QUJD"}"#).unwrap();
        assert_eq!(blob.version, DEFAULT_BLOB_VERSION);
    }

    #[test]
    fn detect_rejects_plaintext_shapes() {
        assert!(CiphertextBlob::detect(r#"[{"name":"Alice"}]"#).is_none());
        assert!(CiphertextBlob::detect(r#"{"name":"Alice"}"#).is_none());
        assert!(CiphertextBlob::detect(r#"{"n":"","d":"QUJD"}"#).is_none());
        assert!(CiphertextBlob::detect(r#"{"n":"x","d":7}"#).is_none());
        assert!(CiphertextBlob::detect("not json").is_none());
    }

    #[test]
    fn classify_separates_plain_json_from_unparseable_text() {
        assert_eq!(StoredForm::classify(r#"{"name":"Alice"}"#), StoredForm::PlainJson);
        assert_eq!(StoredForm::classify("[1,2]"), StoredForm::PlainJson);
        assert_eq!(StoredForm::classify("not json"), StoredForm::NotJson);

        let full = CiphertextBlob::new(3, "nonce", "ZGF0YQ==").to_json_pretty().unwrap();
        let torn = &full[..full.len() / 2];
        assert_eq!(StoredForm::classify(torn), StoredForm::NotJson);
        assert!(matches!(StoredForm::classify(&full), StoredForm::Sealed(_)));
    }
}
