//! # spfx-onedrive – SharePoint / OneDrive data access for picker controls
//!
//! Data-access layer behind the image and file picker controls. Talks to the
//! SharePoint REST API of the hosting web.
//!
//! ## Capabilities
//!
//! - **Root resolution** – locate the signed-in user's OneDrive personal
//!   documents library (absolute URL, server-relative URL, title) through
//!   the user-profile and remote-web list endpoints, memoized per resolver.
//! - **Paged listing** – one `GetListDataAsStream` call per page, driven
//!   either by a folder path or by the opaque `NextHref` cursor, with
//!   optional extension filtering.
//! - **Thumbnails** – build v2.0 drive thumbnail / preview URLs.
//! - **Scroll paging** – re-entrancy guarded "load more" state for
//!   infinite-scroll grids.
//! - **Picker helpers** – image extension list, search scopes, KQL query
//!   building and file-name helpers.

pub mod types;
pub mod error;
pub mod api_client;
pub mod resolver;
pub mod lister;
pub mod thumbnails;
pub mod paging;
pub mod picker;
pub mod service;

// Re-exports
pub use api_client::{HttpMethod, SpHttpClient, SpRequest, SpResponse, SpTransport};
pub use error::{ListFailure, OneDriveError, OneDriveErrorCode, OneDriveResult, ResolutionFailure};
pub use lister::PagedLister;
pub use paging::{PageOutcome, ScrollPager};
pub use resolver::RootFolderResolver;
pub use service::OneDriveService;
pub use types::*;
