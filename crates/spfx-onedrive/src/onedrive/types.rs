//! Shared types for the SharePoint / OneDrive picker data layer.
//!
//! Models cover site configuration, the resolved personal-storage root,
//! list-as-stream pages and rows, the remote list / profile payloads, and
//! thumbnail sizes.

use crate::onedrive::error::OneDriveResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ═══════════════════════════════════════════════════════════════════════
//  Configuration
// ═══════════════════════════════════════════════════════════════════════

/// Configuration for talking to the SharePoint web hosting the picker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteConfig {
    /// Absolute URL of the current web (`pageContext.web.absoluteUrl`).
    pub web_absolute_url: String,
    /// Tenant host used for thumbnail URLs.  Defaults to the web's host.
    pub tenant_host: Option<String>,
    /// Bearer token supplied by the host application, if any.
    pub access_token: Option<String>,
    /// Timeout in seconds for HTTP calls.  Default: 60.
    pub timeout_sec: u64,
    /// Maximum automatic retries for transient failures.  Default: 3.
    pub max_retries: u32,
    /// Row limit per list-as-stream page.  Default: 100.
    pub items_per_page: u32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            web_absolute_url: String::new(),
            tenant_host: None,
            access_token: None,
            timeout_sec: 60,
            max_retries: 3,
            items_per_page: 100,
        }
    }
}

impl SiteConfig {
    pub fn new(web_absolute_url: impl Into<String>) -> Self {
        Self {
            web_absolute_url: web_absolute_url.into(),
            ..Self::default()
        }
    }

    /// Parse a JSON configuration document; missing keys take defaults.
    pub fn from_json(raw: &str) -> OneDriveResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Web URL without a trailing slash, ready for `/_api/...` suffixes.
    pub fn web_url(&self) -> &str {
        self.web_absolute_url.trim_end_matches('/')
    }

    /// Host name for thumbnail URLs: explicit setting, else the web's host.
    pub fn tenant_host(&self) -> Option<String> {
        if let Some(host) = self.tenant_host.as_deref().filter(|h| !h.is_empty()) {
            return Some(host.to_string());
        }
        url::Url::parse(&self.web_absolute_url)
            .ok()
            .and_then(|u| u.host_str().map(String::from))
    }
}

/// `scheme://host[:port]` of an absolute URL, used to absolutize `FileRef`s.
pub fn url_origin(absolute_url: &str) -> Option<String> {
    let parsed = url::Url::parse(absolute_url).ok()?;
    if !parsed.has_host() {
        return None;
    }
    Some(parsed.origin().ascii_serialization())
}

// ═══════════════════════════════════════════════════════════════════════
//  Personal storage root
// ═══════════════════════════════════════════════════════════════════════

/// The user's OneDrive documents library, as resolved from the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalStorageRoot {
    /// e.g. `https://contoso-my.sharepoint.com/personal/jdoe/Documents`
    pub absolute_url: String,
    /// e.g. `/personal/jdoe/Documents`
    pub relative_url: String,
    pub library_title: String,
}

/// Subset of the user profile returned by `GetUserProfile`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserProfile {
    #[serde(default)]
    pub follow_personal_site_url: Option<String>,
}

/// A list entry returned by `SP.RemoteWeb(@a1)/Web/Lists`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpList {
    pub title: String,
    #[serde(default)]
    pub parent_web_url: String,
}

/// OData `nometadata` collection envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ODataCollection<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

// ═══════════════════════════════════════════════════════════════════════
//  Listing
// ═══════════════════════════════════════════════════════════════════════

/// One page of a folder listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesPage {
    pub items: Vec<FileEntry>,
    /// Opaque continuation query string (`?Paged=TRUE&p_FileLeafRef=...`).
    pub next_href: Option<String>,
}

impl FilesPage {
    pub fn has_more(&self) -> bool {
        self.next_href.is_some()
    }
}

/// A file or folder row from `GetListDataAsStream`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub id: Option<String>,
    pub unique_id: Option<String>,
    pub name: String,
    pub server_relative_url: Option<String>,
    pub absolute_url: Option<String>,
    pub is_folder: bool,
    pub file_type: Option<String>,
    pub modified: Option<String>,
    pub size: Option<u64>,
    pub sp_item_url: Option<String>,
    /// Every other column of the row, untouched.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl FileEntry {
    /// Normalize a raw list row.  `origin` absolutizes `FileRef`.
    pub fn from_row(mut row: Map<String, Value>, origin: Option<&str>) -> Self {
        let name = take_string(&mut row, "FileLeafRef").unwrap_or_default();
        let server_relative_url = take_string(&mut row, "FileRef");
        let absolute_url = match (origin, server_relative_url.as_deref()) {
            (Some(origin), Some(path)) => Some(format!("{}{}", origin, path)),
            _ => None,
        };
        let is_folder = take_string(&mut row, "FSObjType").as_deref() == Some("1");
        let size = take_string(&mut row, "File_x0020_Size").and_then(|s| s.parse().ok());

        Self {
            id: take_string(&mut row, "ID"),
            unique_id: take_string(&mut row, "UniqueId"),
            name,
            server_relative_url,
            absolute_url,
            is_folder,
            file_type: take_string(&mut row, "File_x0020_Type").filter(|t| !t.is_empty()),
            modified: take_string(&mut row, "Modified"),
            size,
            sp_item_url: take_string(&mut row, ".spItemUrl"),
            extra: row,
        }
    }

    /// Case-insensitive suffix match against any of `extensions`.
    pub fn has_extension(&self, extensions: &[&str]) -> bool {
        let name = self.name.to_lowercase();
        extensions
            .iter()
            .any(|ext| name.ends_with(&ext.to_lowercase()))
    }
}

/// Stream rows carry every value as a string, but a few hosts emit numbers.
fn take_string(row: &mut Map<String, Value>, key: &str) -> Option<String> {
    match row.remove(key)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if b { "1".into() } else { "0".into() }),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Thumbnails
// ═══════════════════════════════════════════════════════════════════════

/// Size segment of a thumbnail URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ThumbnailSize {
    Small,
    Medium,
    Large,
    /// Raw size token such as `c200x200` (crop) or `300x0` (scale).
    Custom(String),
}

impl ThumbnailSize {
    pub fn crop(width: u32, height: u32) -> Self {
        Self::Custom(format!("c{}x{}", width, height))
    }

    pub fn scale(width: u32, height: u32) -> Self {
        Self::Custom(format!("{}x{}", width, height))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::Custom(token) => token,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
