//! High-level OneDrive service – the single facade consumed by picker
//! controls.
//!
//! Owns the site configuration, the transport and the root resolver, and
//! hands out short-lived listers / pagers that borrow them.

use crate::onedrive::api_client::{SpHttpClient, SpTransport};
use crate::onedrive::error::{ListFailure, OneDriveResult, ResolutionFailure};
use crate::onedrive::lister::PagedLister;
use crate::onedrive::paging::ScrollPager;
use crate::onedrive::picker::IMAGE_EXTENSIONS;
use crate::onedrive::resolver::RootFolderResolver;
use crate::onedrive::thumbnails::Thumbnails;
use crate::onedrive::types::{FilesPage, PersonalStorageRoot, SiteConfig, ThumbnailSize};
use log::info;
use std::sync::Arc;

/// Library name used in logs for the personal documents library.
pub const ONEDRIVE_LIBRARY: &str = "OneDrive";

/// Thread-safe handle for hosts that share one service.
pub type OneDriveServiceState = Arc<OneDriveService>;

/// Top-level service for one SharePoint web and one signed-in user.
pub struct OneDriveService {
    config: SiteConfig,
    resolver: RootFolderResolver,
}

impl OneDriveService {
    /// Build a service talking HTTP through `reqwest`.
    pub fn new(config: SiteConfig) -> OneDriveResult<Self> {
        let client = SpHttpClient::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(client)))
    }

    /// Build a service over any transport.
    pub fn with_transport(config: SiteConfig, transport: Arc<dyn SpTransport>) -> Self {
        info!("OneDrive service for web {}", config.web_url());
        let resolver = RootFolderResolver::new(transport, config.web_url());
        Self { config, resolver }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn resolver(&self) -> &RootFolderResolver {
        &self.resolver
    }

    // ─── Root resolution ─────────────────────────────────────────────

    pub async fn resolve_root(&self) -> Result<PersonalStorageRoot, ResolutionFailure> {
        self.resolver.resolve_root().await
    }

    pub async fn root_relative_url(&self) -> Option<String> {
        self.resolver.root_relative_url().await
    }

    pub async fn library_title(&self) -> Option<String> {
        self.resolver.library_title().await
    }

    // ─── Listing ─────────────────────────────────────────────────────

    /// Get a `PagedLister` helper.
    pub fn lister(&self) -> PagedLister<'_> {
        PagedLister::new(&self.resolver, &self.config)
    }

    /// One page of the personal library.  See [`PagedLister::list_page`].
    pub async fn list_page(
        &self,
        library_name: &str,
        folder_path: Option<&str>,
        accepted_extensions: Option<&[&str]>,
        continuation: Option<&str>,
    ) -> Result<FilesPage, ListFailure> {
        self.lister()
            .list_page(library_name, folder_path, accepted_extensions, continuation)
            .await
    }

    /// Get a `ScrollPager` over a folder.
    pub fn scroll_pager(
        &self,
        library_name: &str,
        folder_path: Option<&str>,
        accepted_extensions: Option<Vec<String>>,
    ) -> ScrollPager<'_> {
        ScrollPager::new(self.lister(), library_name, folder_path, accepted_extensions)
    }

    /// Scroll pager restricted to image files, as the image picker uses it.
    pub fn image_pager(&self, folder_path: Option<&str>) -> ScrollPager<'_> {
        let extensions = IMAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect();
        self.scroll_pager(ONEDRIVE_LIBRARY, folder_path, Some(extensions))
    }

    // ─── Thumbnails ──────────────────────────────────────────────────

    /// Get a `Thumbnails` helper for the tenant host, if one is known.
    pub fn thumbnails(&self) -> Option<Thumbnails> {
        self.config.tenant_host().map(|host| Thumbnails::new(&host))
    }

    pub fn thumbnail_url(
        &self,
        drive_id: &str,
        item_id: &str,
        size: &ThumbnailSize,
    ) -> Option<String> {
        self.thumbnails().map(|t| t.url(drive_id, item_id, size))
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
