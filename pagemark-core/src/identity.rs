use std::fmt;
use std::path::Path;
use std::str::FromStr;

use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

static DOCUMENT_NAMESPACE: Lazy<Uuid> = Lazy::new(|| {
    Uuid::parse_str("3f0c9a52-6d1e-5b8a-9c47-2e8d51b0a6f3").expect("valid namespace UUID")
});

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceLocator(String);

impl SourceLocator {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn from_path(path: &Path) -> Self {
        Self(path.to_string_lossy().into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn document_name(&self) -> String {
        let file_name = self
            .url_file_name()
            .unwrap_or_else(|| last_component(&self.0).to_owned());
        Path::new(&file_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or(file_name)
    }

    fn url_file_name(&self) -> Option<String> {
        let url = Url::parse(&self.0).ok()?;
        // single-letter schemes are windows drive letters, not URLs
        if url.scheme().len() < 2 {
            return None;
        }
        let segment = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
        Some(percent_decode_str(segment).decode_utf8_lossy().into_owned())
    }
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn last_component(raw: &str) -> &str {
    raw.trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(raw)
}

/// Derived from the document name only. Same-name documents collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentIdentity(Uuid);

impl DocumentIdentity {
    pub fn for_name(name: &str) -> Self {
        Self(Uuid::new_v5(&DOCUMENT_NAMESPACE, name.as_bytes()))
    }

    pub fn for_locator(locator: &SourceLocator) -> Self {
        Self::for_name(&locator.document_name())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for DocumentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for DocumentIdentity {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}
