//! Descriptors parsed from directory events.

use crate::event::Event;
use crate::version::Version;
use serde::{Deserialize, Serialize};

/// Prefix marking a version inside a release's `d` tag (`@1.2.0`).
pub const RELEASE_VERSION_MARKER: char = '@';

/// An installable application, parsed from an app metadata event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppDescriptor {
    /// Stable identifier (`d` tag), used as the registry key.
    pub id: String,
    /// Display name (`name` tag, falling back to the identifier).
    pub name: String,
    /// Free-text summary (`summary` tag).
    pub summary: String,
    /// Owning public key. Every release of the app must be authored by it.
    pub pubkey: String,
    /// Id of the event this descriptor came from.
    pub event_id: String,
}

impl AppDescriptor {
    /// Parse an app event. Missing tags become empty strings.
    pub fn from_event(event: &Event) -> Self {
        let id = event.tag_value("d").unwrap_or_default().to_string();
        let name = event
            .tag_value("name")
            .filter(|n| !n.is_empty())
            .map_or_else(|| id.clone(), str::to_string);

        Self {
            id,
            name,
            summary: event.tag_value("summary").unwrap_or_default().to_string(),
            pubkey: event.pubkey.clone(),
            event_id: event.id.clone(),
        }
    }
}

/// A published version of an app, parsed from a release event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDescriptor {
    /// Parsed version; [`Version::as_str`] returns the published string.
    pub version: Version,
    /// Referenced asset event ids (`e` tags), in order.
    pub asset_refs: Vec<String>,
    /// Id of the event this descriptor came from.
    pub event_id: String,
}

impl ReleaseDescriptor {
    /// Parse a release event, or `None` if no version can be extracted.
    pub fn from_event(event: &Event) -> Option<Self> {
        let version = extract_version(event)?;
        Some(Self {
            version: Version::parse(version),
            asset_refs: event.tag_values("e").map(str::to_string).collect(),
            event_id: event.id.clone(),
        })
    }
}

/// The version a release event announces.
///
/// An explicit `version` tag wins; otherwise the `d` tag is used with the
/// `@` marker stripped.
pub fn extract_version(event: &Event) -> Option<&str> {
    if let Some(v) = event.tag_value("version").filter(|v| !v.is_empty()) {
        return Some(v);
    }
    let d = event.tag_value("d")?;
    let v = d.strip_prefix(RELEASE_VERSION_MARKER).unwrap_or(d);
    (!v.is_empty()).then_some(v)
}

/// A downloadable binary, parsed from an asset event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    /// Download URL. Empty only when the event offers no way to fetch it.
    pub url: String,
    /// Expected SHA-256 (`x` tag), as published.
    pub hash: Option<String>,
    /// Declared platform tag (`f`).
    pub platform: Option<String>,
    /// Declared MIME type (`m`).
    pub mime: Option<String>,
    /// Suggested file name (`filename`).
    pub filename: Option<String>,
    /// Id of the event this descriptor came from.
    pub event_id: String,
}

impl AssetDescriptor {
    /// Parse an asset event.
    ///
    /// Without a `url` tag the URL is derived from `blob_server` and the
    /// content hash; failing that, the first tag value that looks like an
    /// HTTP(S) URL is used.
    pub fn from_event(event: &Event, blob_server: &str) -> Self {
        let non_empty = |name: &str| {
            event
                .tag_value(name)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let hash = non_empty("x");

        let url = non_empty("url")
            .or_else(|| {
                hash.as_ref()
                    .map(|h| format!("{}/{h}", blob_server.trim_end_matches('/')))
            })
            .or_else(|| {
                event
                    .tags
                    .iter()
                    .filter_map(|tag| tag.get(1))
                    .find(|value| looks_like_url(value))
                    .cloned()
            })
            .unwrap_or_default();

        Self {
            url,
            hash,
            platform: non_empty("f"),
            mime: non_empty("m"),
            filename: non_empty("filename"),
            event_id: event.id.clone(),
        }
    }
}

fn looks_like_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}
