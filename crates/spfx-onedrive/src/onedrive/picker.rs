//! Image picker helpers: supported extensions, search scopes, KQL query
//! building, search paging offsets, and file-name extraction.

use serde::{Deserialize, Serialize};

/// Extensions the image picker accepts.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    ".gif", ".jpg", ".jpeg", ".bmp", ".dib", ".tif", ".tiff", ".ico", ".png", ".jxr", ".svg",
];

/// Results per search request.
pub const SEARCH_PAGE_SIZE: u32 = 50;

/// Where the picker looks for images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageSource {
    SharePoint,
    OneDrive,
    StockImages,
    Upload,
}

impl ImageSource {
    /// KQL path restriction for searchable sources.
    pub fn scope_filter(&self) -> Option<&'static str> {
        match self {
            Self::SharePoint => Some("AND -path:https://*my.sharepoint.com"),
            Self::OneDrive => Some("AND path:https://*my.sharepoint.com"),
            Self::StockImages | Self::Upload => None,
        }
    }

    pub fn is_searchable(&self) -> bool {
        self.scope_filter().is_some()
    }
}

/// `(*.gif OR *.jpg ...) <scope>` for a searchable source.
pub fn image_search_query(source: ImageSource) -> Option<String> {
    let scope = source.scope_filter()?;
    let extensions = IMAGE_EXTENSIONS
        .iter()
        .map(|ext| format!("*{}", ext))
        .collect::<Vec<_>>()
        .join(" OR ");
    Some(format!("({}) {}", extensions, scope))
}

/// Start-row bookkeeping for offset-paged search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCursor {
    start: u32,
    has_more: bool,
}

impl SearchCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset for the current request.
    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Record whether the last response reported more results.
    pub fn record(&mut self, has_more_results: bool) {
        self.has_more = has_more_results;
    }

    /// Advance to the next page; `None` when no more results exist.
    pub fn advance(&mut self) -> Option<u32> {
        if !self.has_more {
            return None;
        }
        self.start += SEARCH_PAGE_SIZE;
        Some(self.start)
    }

    /// Back to the first page (source switched).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Last path segment of a URL, query and fragment stripped.
pub fn file_name_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    path.rsplit('/').next().unwrap_or_default().to_string()
}

pub fn file_name_without_extension(url: &str) -> String {
    let name = file_name_from_url(url);
    match name.rfind('.') {
        Some(idx) if idx > 0 => name[..idx].to_string(),
        _ => name,
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
