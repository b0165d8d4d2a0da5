#![allow(dead_code)]

use async_trait::async_trait;
use log::{Level, LevelFilter, Log, Metadata, Record};
use serde_json::{json, Value};
use spfx_onedrive::{
    OneDriveError, OneDriveResult, OneDriveService, SiteConfig, SpRequest, SpResponse, SpTransport,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub const PERSONAL_URL: &str = "https://contoso-my.sharepoint.com/personal/jdoe_contoso_com/";
pub const PARENT_WEB_URL: &str = "/personal/jdoe_contoso_com";

pub const PROFILE: &str = "GetUserProfile";
pub const LIBRARIES: &str = "SP.RemoteWeb";
pub const LIST_DATA: &str = "GetListDataAsStream";

// ─── Transport ───────────────────────────────────────────────────────

/// In-memory transport: canned responses per endpoint, every request
/// recorded in arrival order.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<(String, VecDeque<OneDriveResult<SpResponse>>)>>,
    requests: Mutex<Vec<SpRequest>>,
    list_gate: Option<Arc<Notify>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// List-as-stream calls wait for `gate` before answering.
    pub fn with_list_gate(gate: Arc<Notify>) -> Self {
        Self {
            list_gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn respond(&self, url_fragment: &str, response: SpResponse) -> &Self {
        self.push(url_fragment, Ok(response))
    }

    pub fn fail(&self, url_fragment: &str, error: OneDriveError) -> &Self {
        self.push(url_fragment, Err(error))
    }

    fn push(&self, url_fragment: &str, outcome: OneDriveResult<SpResponse>) -> &Self {
        let mut routes = self.routes.lock().unwrap();
        match routes.iter_mut().find(|(f, _)| f == url_fragment) {
            Some((_, queue)) => queue.push_back(outcome),
            None => routes.push((url_fragment.to_string(), VecDeque::from([outcome]))),
        }
        self
    }

    pub fn requests(&self) -> Vec<SpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, url_fragment: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.contains(url_fragment))
            .count()
    }

    pub fn last(&self, url_fragment: &str) -> SpRequest {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|r| r.url.contains(url_fragment))
            .cloned()
            .expect("no matching request")
    }
}

#[async_trait]
impl SpTransport for ScriptedTransport {
    async fn execute(&self, request: SpRequest) -> OneDriveResult<SpResponse> {
        let is_list = request.url.contains(LIST_DATA);
        let outcome = {
            self.requests.lock().unwrap().push(request.clone());
            let mut routes = self.routes.lock().unwrap();
            routes
                .iter_mut()
                .find(|(fragment, _)| request.url.contains(fragment.as_str()))
                .and_then(|(_, queue)| queue.pop_front())
                .unwrap_or_else(|| Ok(SpResponse::new(500, "unscripted request")))
        };
        if is_list {
            if let Some(gate) = &self.list_gate {
                gate.notified().await;
            }
        }
        outcome
    }
}

// ─── Fixtures ────────────────────────────────────────────────────────

pub fn json_response(status: u16, body: Value) -> SpResponse {
    SpResponse::new(status, body.to_string())
}

pub fn profile_ok() -> SpResponse {
    json_response(
        200,
        json!({
            "AccountName": "i:0#.f|membership|jdoe@contoso.com",
            "FollowPersonalSiteUrl": PERSONAL_URL,
        }),
    )
}

pub fn libraries_ok() -> SpResponse {
    json_response(
        200,
        json!({
            "value": [{
                "Title": "Documents",
                "ParentWebUrl": PARENT_WEB_URL,
                "BaseTemplate": 700,
            }]
        }),
    )
}

pub fn file_row(id: u32, name: &str, folder: bool) -> Value {
    json!({
        "ID": id.to_string(),
        "FileLeafRef": name,
        "FileRef": format!("{}/Documents/{}", PARENT_WEB_URL, name),
        "FSObjType": if folder { "1" } else { "0" },
    })
}

pub fn list_page(rows: Vec<Value>, next_href: Option<&str>) -> SpResponse {
    let mut list_data = json!({ "Row": rows, "FirstRow": 1 });
    if let Some(href) = next_href {
        list_data["NextHref"] = json!(href);
    }
    json_response(200, json!({ "wpq": "", "ListData": list_data }))
}

/// Transport already answering both resolution lookups.
pub fn resolving_transport() -> Arc<ScriptedTransport> {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond(PROFILE, profile_ok()).respond(LIBRARIES, libraries_ok());
    transport
}

pub fn service(web: &str, transport: Arc<ScriptedTransport>) -> OneDriveService {
    OneDriveService::with_transport(SiteConfig::new(web), transport)
}

// ─── Log capture ─────────────────────────────────────────────────────

struct CaptureLogger;

static RECORDS: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());
static LOGGER: CaptureLogger = CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        RECORDS
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

pub fn init_logging() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Trace);
    }
}

/// Whether a record at `level` containing every `needle` was logged.
pub fn logged(level: Level, needles: &[&str]) -> bool {
    RECORDS
        .lock()
        .unwrap()
        .iter()
        .any(|(l, msg)| *l == level && needles.iter().all(|n| msg.contains(n)))
}
