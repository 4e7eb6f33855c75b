//! Animation source descriptors.
//!
//! The descriptor is opaque to the adapter: the application picks one, the
//! handler forwards it to the engine verbatim. Resolution (file lookup,
//! download, parse) is engine/host territory.

use serde::{Deserialize, Serialize};

/// Where a Lottie animation comes from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnimationSource {
    /// A bundled asset, by name (e.g. `"loader.json"`).
    Asset(String),
    /// Raw Lottie JSON handed through as-is.
    Json(String),
    /// A remote URL the engine fetches itself.
    Url(String),
}

impl AnimationSource {
    pub fn asset(name: impl Into<String>) -> Self {
        Self::Asset(name.into())
    }

    pub fn json(body: impl Into<String>) -> Self {
        Self::Json(body.into())
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    /// Short human-readable label, used in log lines and failure reasons.
    pub fn describe(&self) -> String {
        match self {
            Self::Asset(name) => format!("asset:{name}"),
            Self::Json(_) => "inline-json".to_string(),
            Self::Url(url) => format!("url:{url}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_hides_json_body() {
        let src = AnimationSource::json("{\"v\":\"5.5.7\"}");
        assert_eq!(src.describe(), "inline-json");
        assert_eq!(AnimationSource::asset("a.json").describe(), "asset:a.json");
    }

    #[test]
    fn serde_round_trip() {
        let src = AnimationSource::url("https://example.com/anim.json");
        let text = serde_json::to_string(&src).unwrap();
        let back: AnimationSource = serde_json::from_str(&text).unwrap();
        assert_eq!(src, back);
    }
}
