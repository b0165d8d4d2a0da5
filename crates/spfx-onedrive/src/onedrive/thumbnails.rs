//! Thumbnail and preview URLs for SharePoint / OneDrive items.
//!
//! Pure string templates over the v2.0 drive endpoint; nothing here issues a
//! request.  `preferNoRedirect=true` makes the endpoint stream the image
//! instead of answering with a redirect.

use crate::onedrive::types::ThumbnailSize;

/// Thumbnail URL builder bound to one tenant host.
#[derive(Debug, Clone)]
pub struct Thumbnails {
    tenant_host: String,
}

impl Thumbnails {
    /// `tenant_host` may be a bare host or a URL of any scheme; only the
    /// authority is kept.
    pub fn new(tenant_host: &str) -> Self {
        Self {
            tenant_host: normalize_host(tenant_host),
        }
    }

    /// URL of thumbnail set 0 at `size` for a drive item.
    pub fn url(&self, drive_id: &str, item_id: &str, size: &ThumbnailSize) -> String {
        format!(
            "https://{}/_api/v2.0/drives/{}/items/{}/thumbnails/0/{}/content?preferNoRedirect=true",
            self.tenant_host,
            drive_id,
            item_id,
            size.as_str()
        )
    }

    /// Grid tile image.
    pub fn tile_url(&self, drive_id: &str, item_id: &str) -> String {
        self.url(drive_id, item_id, &ThumbnailSize::Medium)
    }

    /// Preview of the selected image.
    pub fn preview_url(&self, drive_id: &str, item_id: &str) -> String {
        self.url(drive_id, item_id, &ThumbnailSize::Large)
    }

    /// Custom-sized thumbnail; `crop` selects center-crop over scaling.
    pub fn custom_url(
        &self,
        drive_id: &str,
        item_id: &str,
        width: u32,
        height: u32,
        crop: bool,
    ) -> String {
        let size = if crop {
            ThumbnailSize::crop(width, height)
        } else {
            ThumbnailSize::scale(width, height)
        };
        self.url(drive_id, item_id, &size)
    }
}

/// One-shot form of [`Thumbnails::url`].
pub fn thumbnail_url(
    tenant_host: &str,
    drive_id: &str,
    item_id: &str,
    size: &ThumbnailSize,
) -> String {
    Thumbnails::new(tenant_host).url(drive_id, item_id, size)
}

fn normalize_host(tenant_host: &str) -> String {
    let trimmed = tenant_host.trim();
    if trimmed.contains("://") {
        if let Ok(parsed) = url::Url::parse(trimmed) {
            if let Some(host) = parsed.host_str() {
                return match parsed.port() {
                    Some(port) => format!("{}:{}", host, port),
                    None => host.to_string(),
                };
            }
        }
    }
    trimmed.trim_end_matches('/').to_string()
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
