//! Paged folder listing through `SP.List.GetListDataAsStream`.
//!
//! Each call issues exactly one request.  The first page of a folder is
//! addressed with `RootFolder=<path>`; later pages reuse the `NextHref`
//! query string handed back by the previous page.

use crate::onedrive::api_client::{encode_component, SpRequest, SpTransport};
use crate::onedrive::error::ListFailure;
use crate::onedrive::resolver::RootFolderResolver;
use crate::onedrive::types::{url_origin, FileEntry, FilesPage, SiteConfig};
use log::{debug, error};
use serde_json::{json, Value};

/// `ContextInfo | ListData | ListSchema | EnableMediaTAUrls`.
const RENDER_OPTIONS: u32 = 4103;

/// Listing operations against the resolved OneDrive library.
pub struct PagedLister<'a> {
    resolver: &'a RootFolderResolver,
    web_url: String,
    row_limit: u32,
}

impl<'a> PagedLister<'a> {
    pub fn new(resolver: &'a RootFolderResolver, config: &SiteConfig) -> Self {
        Self {
            resolver,
            web_url: config.web_url().to_string(),
            row_limit: config.items_per_page,
        }
    }

    /// Fetch one page of `folder_path` (default: the library root), or the
    /// page addressed by `continuation`.
    ///
    /// With `accepted_extensions`, files whose name does not end with one of
    /// them (case-insensitive) are dropped; folders are always kept.
    pub async fn list_page(
        &self,
        library_name: &str,
        folder_path: Option<&str>,
        accepted_extensions: Option<&[&str]>,
        continuation: Option<&str>,
    ) -> Result<FilesPage, ListFailure> {
        let result = self
            .fetch_page(folder_path, accepted_extensions, continuation)
            .await;
        match &result {
            Ok(page) => debug!(
                "Listed {} items from '{}' (more: {})",
                page.items.len(),
                library_name,
                page.has_more()
            ),
            Err(failure) => error!(
                "[PagedLister::list_page] library='{}' web='{}' Err='{}'",
                library_name, self.web_url, failure
            ),
        }
        result
    }

    async fn fetch_page(
        &self,
        folder_path: Option<&str>,
        accepted_extensions: Option<&[&str]>,
        continuation: Option<&str>,
    ) -> Result<FilesPage, ListFailure> {
        let root = self.resolver.resolve_root().await?;

        let query = match continuation {
            Some(params) => params.strip_prefix('?').unwrap_or(params).to_string(),
            None => {
                let folder = folder_path.unwrap_or(root.relative_url.as_str());
                format!("RootFolder={}", encode_component(folder))
            }
        };
        let api_url = format!(
            "{}/_api/SP.List.GetListDataAsStream?listFullUrl='{}'&{}",
            self.web_url,
            encode_component(&root.absolute_url),
            query
        );

        let resp = self
            .resolver
            .transport()
            .execute(SpRequest::post(api_url, self.render_parameters()))
            .await?;
        if !resp.is_success() {
            return Err(ListFailure::RequestFailed {
                status: Some(resp.status),
                message: resp.error().to_string(),
            });
        }

        let body: Value = resp.json().map_err(|e| ListFailure::MalformedResponse {
            message: e.to_string(),
        })?;
        let origin = url_origin(&root.absolute_url);
        parse_list_data(body, origin.as_deref(), accepted_extensions)
    }

    fn render_parameters(&self) -> Value {
        let view_xml = format!(
            "<View><Query><OrderBy><FieldRef Name=\"FileLeafRef\" /></OrderBy></Query>\
             <RowLimit Paged=\"TRUE\">{}</RowLimit></View>",
            self.row_limit
        );
        json!({
            "parameters": {
                "RenderOptions": RENDER_OPTIONS,
                "ViewXml": view_xml,
                "AllowMultipleValueFilterForTaxonomyFields": true,
                "AddRequiredFields": true
            }
        })
    }
}

/// Normalize a `{ ListData: { Row, NextHref } }` payload into a page.
fn parse_list_data(
    body: Value,
    origin: Option<&str>,
    accepted_extensions: Option<&[&str]>,
) -> Result<FilesPage, ListFailure> {
    let Value::Object(mut envelope) = body else {
        return Err(ListFailure::MalformedResponse {
            message: "response is not a JSON object".into(),
        });
    };
    let Some(Value::Object(mut list_data)) = envelope.remove("ListData") else {
        return Err(ListFailure::MalformedResponse {
            message: "missing ListData".into(),
        });
    };
    let Some(Value::Array(rows)) = list_data.remove("Row") else {
        return Err(ListFailure::MalformedResponse {
            message: "missing ListData.Row".into(),
        });
    };

    let items = rows
        .into_iter()
        .filter_map(|row| match row {
            Value::Object(map) => Some(FileEntry::from_row(map, origin)),
            _ => None,
        })
        .filter(|entry| match accepted_extensions {
            Some(exts) => entry.is_folder || entry.has_extension(exts),
            None => true,
        })
        .collect();

    let next_href = match list_data.remove("NextHref") {
        Some(Value::String(href)) if !href.is_empty() => Some(href),
        _ => None,
    };

    Ok(FilesPage { items, next_href })
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
