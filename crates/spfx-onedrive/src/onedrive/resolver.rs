//! OneDrive personal-storage root resolution.
//!
//! Two chained lookups against the hosting web:
//!
//! 1. `SP.UserProfiles.ProfileLoader.GetProfileLoader/GetUserProfile`
//!    yields `FollowPersonalSiteUrl`, the user's personal site.
//! 2. `SP.RemoteWeb(@a1)/Web/Lists` filtered on the personal documents
//!    library template (`BaseTemplate eq 700 and BaseType eq 1`).
//!
//! Both results are memoized for the lifetime of the resolver.  A failed
//! resolution caches nothing, so the next call tries again.

use crate::onedrive::api_client::{encode_component, SpRequest, SpTransport};
use crate::onedrive::error::ResolutionFailure;
use crate::onedrive::types::{ODataCollection, PersonalStorageRoot, SpList, UserProfile};
use log::{debug, error, info};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// OData filter selecting the "My Documents" library of a personal site.
pub const PERSONAL_LIBRARY_FILTER: &str = "BaseTemplate eq 700 and BaseType eq 1";

/// Resolves and caches the user's OneDrive documents library.
pub struct RootFolderResolver {
    transport: Arc<dyn SpTransport>,
    web_url: String,
    personal_url: OnceCell<String>,
    root: OnceCell<PersonalStorageRoot>,
}

impl RootFolderResolver {
    pub fn new(transport: Arc<dyn SpTransport>, web_url: &str) -> Self {
        Self {
            transport,
            web_url: web_url.trim_end_matches('/').to_string(),
            personal_url: OnceCell::new(),
            root: OnceCell::new(),
        }
    }

    /// The transport shared with listers built on this resolver.
    pub fn transport(&self) -> &dyn SpTransport {
        self.transport.as_ref()
    }

    /// Cached root, without any I/O.
    pub fn cached(&self) -> Option<&PersonalStorageRoot> {
        self.root.get()
    }

    /// Resolve the personal-storage root, or return the cached one.
    ///
    /// Concurrent first callers share one resolution.
    pub async fn resolve_root(&self) -> Result<PersonalStorageRoot, ResolutionFailure> {
        if let Some(root) = self.root.get() {
            return Ok(root.clone());
        }

        match self.root.get_or_try_init(|| self.resolve_uncached()).await {
            Ok(root) => Ok(root.clone()),
            Err(failure) => {
                error!(
                    "[RootFolderResolver::resolve_root] web='{}' Err='{}'",
                    self.web_url, failure
                );
                Err(failure)
            }
        }
    }

    /// Server-relative URL of the root folder, resolving on first use.
    pub async fn root_relative_url(&self) -> Option<String> {
        self.resolve_root().await.ok().map(|root| root.relative_url)
    }

    /// Title of the personal documents library, resolving on first use.
    pub async fn library_title(&self) -> Option<String> {
        self.resolve_root().await.ok().map(|root| root.library_title)
    }

    async fn resolve_uncached(&self) -> Result<PersonalStorageRoot, ResolutionFailure> {
        let personal_url = self
            .personal_url
            .get_or_try_init(|| self.fetch_personal_url())
            .await?
            .clone();

        let api_url = format!(
            "{}/_api/SP.RemoteWeb(@a1)/Web/Lists?$filter={}&@a1='{}'",
            self.web_url,
            PERSONAL_LIBRARY_FILTER,
            encode_component(&personal_url)
        );
        let request = SpRequest::get(api_url)
            .header("accept", "application/json;odata=nometadata")
            .header("content-type", "application/json;odata=nometadata")
            .header("odata-version", "");

        let resp = self.transport.execute(request).await?;
        if !resp.is_success() {
            return Err(ResolutionFailure::RequestFailed {
                status: Some(resp.status),
                message: format!("personal library lookup failed: {}", resp.error()),
            });
        }

        let libraries: ODataCollection<SpList> =
            resp.json().map_err(|e| ResolutionFailure::RequestFailed {
                status: Some(resp.status),
                message: format!("unreadable library data: {}", e),
            })?;
        let Some(library) = libraries.value.into_iter().next() else {
            return Err(ResolutionFailure::EmptyResult);
        };

        let root = PersonalStorageRoot {
            relative_url: format!("{}/{}", library.parent_web_url, library.title),
            absolute_url: join_site_url(&personal_url, &library.title),
            library_title: library.title,
        };
        info!(
            "Resolved OneDrive root '{}' ({})",
            root.library_title, root.absolute_url
        );
        Ok(root)
    }

    async fn fetch_personal_url(&self) -> Result<String, ResolutionFailure> {
        let api_url = format!(
            "{}/_api/SP.UserProfiles.ProfileLoader.GetProfileLoader/GetUserProfile",
            self.web_url
        );
        let resp = self
            .transport
            .execute(SpRequest::post(api_url, serde_json::json!({})))
            .await?;
        if !resp.is_success() {
            return Err(ResolutionFailure::RequestFailed {
                status: Some(resp.status),
                message: format!("user profile request failed: {}", resp.error()),
            });
        }

        let profile: UserProfile = resp.json().map_err(|e| ResolutionFailure::RequestFailed {
            status: Some(resp.status),
            message: format!("unreadable user profile data: {}", e),
        })?;

        let url = profile
            .follow_personal_site_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .ok_or(ResolutionFailure::NoPersonalUrl)?;
        debug!("Personal site url: {}", url);
        Ok(url)
    }
}

/// `FollowPersonalSiteUrl` normally ends with `/`; tolerate one that doesn't.
fn join_site_url(site_url: &str, title: &str) -> String {
    if site_url.ends_with('/') {
        format!("{}{}", site_url, title)
    } else {
        format!("{}/{}", site_url, title)
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
