use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Parsed shape of an artifact manifest file.
///
/// Only the members this tool acts on are modeled; everything else in the
/// file is left to the format-preserving editor, which never re-serializes
/// the document as a whole.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub platforms: IndexMap<String, PlatformSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformSpec {
    pub providers: Vec<Provider>,
    pub hash: HashAlgorithm,
    pub digest: String,
    pub size: u64,
    #[serde(default)]
    pub format: Option<String>,
}

impl PlatformSpec {
    pub fn artifact_info(&self) -> ArtifactInfo {
        ArtifactInfo {
            hash: self.hash,
            digest: self.digest.clone(),
            size: self.size,
        }
    }
}

/// Hash algorithms a manifest may declare for its artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Blake3,
    Sha256,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Blake3 => "blake3",
            HashAlgorithm::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The identity triple of one platform's artifact. `digest` and `size`
/// together fully determine whether downloaded bytes are the artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactInfo {
    pub hash: HashAlgorithm,
    pub digest: String,
    pub size: u64,
}

/// One way of obtaining an artifact.
///
/// HTTP providers (an explicit `"type": "http"` or no `type` member at all)
/// are the only kind this tool understands. Every other provider is opaque:
/// carried through rewrites byte-faithfully, never validated, never treated
/// as an upstream source.
#[derive(Debug, Clone, PartialEq)]
pub enum Provider {
    Http {
        url: String,
        raw: Map<String, Value>,
    },
    Opaque(Map<String, Value>),
}

impl Provider {
    /// A plain HTTP provider pointing at `url`.
    pub fn http(url: impl Into<String>) -> Self {
        let url = url.into();
        let mut raw = Map::new();
        raw.insert("url".to_string(), Value::String(url.clone()));
        Provider::Http { url, raw }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Provider::Http { .. } => "http",
            Provider::Opaque(raw) => raw
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown"),
        }
    }
}

impl Serialize for Provider {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Provider::Http { raw, .. } | Provider::Opaque(raw) => raw.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Provider {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        match raw.get("type") {
            None => {}
            Some(Value::String(kind)) if kind == "http" => {}
            Some(_) => return Ok(Provider::Opaque(raw)),
        }
        let url = raw
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| serde::de::Error::custom("http provider is missing a string `url`"))?
            .to_string();
        Ok(Provider::Http { url, raw })
    }
}

/// A release asset referenced by a provider URL. Derived while scanning a
/// provider list; never persisted.
#[derive(Debug, Clone)]
pub struct ReleaseAssetInfo {
    pub name: String,
    pub url: String,
}

/// Replaces every character outside `[A-Za-z0-9.]` with `.`, matching what
/// release hosting does to asset names on upload.
pub fn sanitize_file_name_component(component: &str) -> String {
    component
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' { c } else { '.' })
        .collect()
}
