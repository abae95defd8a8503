//! Client for the remote revision-control service.
//!
//! Workers talk to the service through the [`Backend`] trait so tests can
//! script responses. [`HttpBackend`] is the production implementation over
//! `ureq`, speaking JSON with camelCase field names.
//!
//! # Public API
//! - [`Backend`]: the RPC surface consumed by workers and the provider
//! - [`HttpBackend`]: blocking HTTP implementation
//! - [`RepoStatus`], [`LockBatch`], [`HistoryRevision`], [`UserInfo`]: payloads
//!
//! # Behavior
//! - **Status caching**: the last snapshot is kept; non-forced queries reuse it
//! - **Auth**: a nonce header is re-read from disk and retried once on HTTP 401
//! - **Timeouts**: short for status queries, long for submit and lock batches

use crate::core::error::{Result, VcsBridgeError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::RwLock;
use std::time::Duration;

pub const NONCE_HEADER: &str = "X-Ethos-Nonce";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusFile {
    pub path: String,
    pub locked_by: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LockOwner {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LfsLock {
    pub id: String,
    pub path: String,
    pub owner: Option<LockOwner>,
}

impl LfsLock {
    pub fn owner_name(&self) -> Option<&str> {
        self.owner.as_ref().map(|o| o.name.as_str())
    }
}

/// Repository status snapshot returned by the service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepoStatus {
    pub detached_head: bool,
    pub last_updated: String,
    pub branch: String,
    pub remote_branch: String,
    pub commits_ahead: u32,
    pub commits_behind: u32,
    pub untracked_files: Vec<StatusFile>,
    pub modified_files: Vec<StatusFile>,
    pub has_staged_changes: bool,
    pub has_local_changes: bool,
    pub conflict_upstream: bool,
    pub conflicts: Vec<String>,
    pub modified_upstream: Vec<String>,
    pub locks_ours: Vec<LfsLock>,
    pub locks_theirs: Vec<LfsLock>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LockFailure {
    pub path: String,
    pub reason: String,
}

/// Outcome of a lock or unlock batch. Paths not listed in `failures` succeeded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LockBatch {
    pub paths: Vec<String>,
    pub failures: Vec<LockFailure>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LockResponse {
    batch: LockBatch,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct LockRequest<'a> {
    paths: &'a [String],
    force: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest<'a> {
    commit_message: &'a str,
    files: &'a [String],
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct RevertRequest<'a> {
    files: &'a [String],
    skip_engine_check: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct NotifyStateRequest {
    in_slow_task: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInfo {
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRevision {
    #[serde(default)]
    pub filename: String,
    pub commit_id: String,
    #[serde(default)]
    pub short_commit_id: String,
    #[serde(default)]
    pub revision_number: i32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub action: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub file_size: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct HistoryResponse {
    revisions: Vec<HistoryRevision>,
}

/// RPC surface of the remote revision-control service.
///
/// Every call is safe to retry except [`Backend::submit`].
pub trait Backend: Send + Sync {
    /// Repository status. Without `force` a previously fetched snapshot may be returned.
    fn get_status(&self, force: bool) -> Result<RepoStatus>;

    fn submit(&self, message: &str, files: &[String]) -> Result<()>;

    fn revert(&self, files: &[String]) -> Result<()>;

    fn lock(&self, files: &[String]) -> Result<LockBatch>;

    fn unlock(&self, files: &[String]) -> Result<LockBatch>;

    fn file_history(&self, file: &str) -> Result<Vec<HistoryRevision>>;

    fn user_info(&self) -> Result<UserInfo>;

    fn check_availability(&self) -> bool;

    /// Tell the service whether the host is busy with a long task
    fn notify_host_state(&self, busy: bool) -> Result<()>;

    /// Store a status pushed by the service instead of polled from it
    fn record_pushed_status(&self, status: RepoStatus);
}

pub struct HttpBackend {
    base_url: String,
    nonce_path: Option<PathBuf>,
    nonce: RwLock<String>,
    short_agent: ureq::Agent,
    long_agent: ureq::Agent,
    last_status: RwLock<Option<RepoStatus>>,
}

impl HttpBackend {
    pub fn new(
        base_url: impl Into<String>,
        nonce_path: Option<PathBuf>,
        short_timeout: Duration,
        long_timeout: Duration,
    ) -> Self {
        let backend = Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            nonce_path,
            nonce: RwLock::new(String::new()),
            short_agent: ureq::AgentBuilder::new().timeout(short_timeout).build(),
            long_agent: ureq::AgentBuilder::new().timeout(long_timeout).build(),
            last_status: RwLock::new(None),
        };
        backend.refresh_nonce();
        backend
    }

    fn refresh_nonce(&self) {
        let Some(path) = &self.nonce_path else {
            return;
        };
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                if let Ok(mut nonce) = self.nonce.write() {
                    *nonce = contents.trim().to_string();
                }
            }
            Err(e) => log::warn!(
                "Failed to read service nonce from '{}': {}. Requests may be rejected.",
                path.display(),
                e
            ),
        }
    }

    fn current_nonce(&self) -> String {
        self.nonce.read().map(|n| n.clone()).unwrap_or_default()
    }

    fn request(
        &self,
        agent: &ureq::Agent,
        method: &str,
        endpoint: &str,
        body: Option<&str>,
    ) -> Result<String> {
        self.request_with_query(agent, method, endpoint, &[], body)
    }

    /// Query parameters are encoded by ureq, never spliced into `endpoint`
    fn request_with_query(
        &self,
        agent: &ureq::Agent,
        method: &str,
        endpoint: &str,
        query: &[(&str, &str)],
        body: Option<&str>,
    ) -> Result<String> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let mut retried_auth = false;

        loop {
            let request = query.iter().fold(
                agent
                    .request(method, &url)
                    .set("Content-Type", "application/json")
                    .set(NONCE_HEADER, &self.current_nonce()),
                |request, (name, value)| request.query(name, value),
            );

            let response = match body {
                Some(body) => request.send_string(body),
                None => request.call(),
            };

            match response {
                Ok(response) => return Ok(response.into_string()?),
                Err(ureq::Error::Status(401, _)) if !retried_auth => {
                    log::debug!("{} {} rejected with 401, refreshing nonce", method, endpoint);
                    self.refresh_nonce();
                    retried_auth = true;
                }
                Err(ureq::Error::Status(code, response)) => {
                    let body = response.into_string().unwrap_or_default();
                    return Err(VcsBridgeError::http_status(endpoint, code, body));
                }
                Err(ureq::Error::Transport(transport)) => {
                    return Err(VcsBridgeError::service_unavailable(transport.to_string()));
                }
            }
        }
    }

    fn lock_operation(&self, endpoint: &str, files: &[String]) -> Result<LockBatch> {
        let body = serde_json::to_string(&LockRequest {
            paths: files,
            force: false,
        })?;
        let response = self.request(&self.long_agent, "POST", endpoint, Some(&body))?;
        match serde_json::from_str::<LockResponse>(&response) {
            Ok(parsed) => Ok(parsed.batch),
            Err(e) => {
                // A 200 with an unreadable body is still a success
                log::info!("Error decoding {} response: {} - body: {}", endpoint, e, response);
                Ok(LockBatch {
                    paths: files.to_vec(),
                    failures: Vec::new(),
                })
            }
        }
    }

    fn clear_status(&self) {
        if let Ok(mut last) = self.last_status.write() {
            *last = None;
        }
    }
}

impl Backend for HttpBackend {
    fn get_status(&self, force: bool) -> Result<RepoStatus> {
        if !force {
            if let Ok(last) = self.last_status.read() {
                if let Some(status) = last.as_ref() {
                    return Ok(status.clone());
                }
            }
        }

        let response = match self.request(
            &self.short_agent,
            "GET",
            "repo/status?skipDllCheck=true&skipEngineUpdate=true",
            None,
        ) {
            Ok(response) => response,
            Err(e) => {
                if e.is_transport() {
                    self.clear_status();
                }
                return Err(e);
            }
        };

        let status: RepoStatus = serde_json::from_str(&response)?;
        if let Ok(mut last) = self.last_status.write() {
            *last = Some(status.clone());
        }
        Ok(status)
    }

    fn submit(&self, message: &str, files: &[String]) -> Result<()> {
        let body = serde_json::to_string(&SubmitRequest {
            commit_message: message,
            files,
        })?;
        self.request(&self.long_agent, "POST", "repo/gh/submit", Some(&body))?;
        log::info!("Successfully submitted {} file(s)", files.len());
        Ok(())
    }

    fn revert(&self, files: &[String]) -> Result<()> {
        let body = serde_json::to_string(&RevertRequest {
            files,
            skip_engine_check: true,
        })?;
        self.request(&self.long_agent, "POST", "repo/revert", Some(&body))?;
        Ok(())
    }

    fn lock(&self, files: &[String]) -> Result<LockBatch> {
        self.lock_operation("repo/locks/lock", files)
    }

    fn unlock(&self, files: &[String]) -> Result<LockBatch> {
        self.lock_operation("repo/locks/unlock", files)
    }

    fn file_history(&self, file: &str) -> Result<Vec<HistoryRevision>> {
        let response = self.request_with_query(
            &self.short_agent,
            "GET",
            "repo/history",
            &[("file", file)],
            None,
        )?;
        let parsed: HistoryResponse = serde_json::from_str(&response)?;
        Ok(parsed.revisions)
    }

    fn user_info(&self) -> Result<UserInfo> {
        let response = self.request(&self.short_agent, "GET", "repo/gh/user", None)?;
        Ok(serde_json::from_str(&response)?)
    }

    fn check_availability(&self) -> bool {
        match self.request(&self.short_agent, "GET", "system/status", None) {
            Ok(_) => true,
            Err(e) => {
                log::debug!("Service availability check failed: {}", e);
                false
            }
        }
    }

    fn notify_host_state(&self, busy: bool) -> Result<()> {
        let body = serde_json::to_string(&NotifyStateRequest { in_slow_task: busy })?;
        self.request(&self.short_agent, "POST", "engine/notify-state", Some(&body))?;
        Ok(())
    }

    fn record_pushed_status(&self, status: RepoStatus) {
        if let Ok(mut last) = self.last_status.write() {
            *last = Some(status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Serve canned `(status, body)` responses, one per connection
    fn serve(responses: Vec<(u16, String)>) -> (String, Arc<AtomicUsize>) {
        let (url, hits, _) = serve_recording(responses);
        (url, hits)
    }

    /// Like [`serve`], also keeping each request line
    fn serve_recording(
        responses: Vec<(u16, String)>,
    ) -> (String, Arc<AtomicUsize>, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let lines = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&lines);

        std::thread::spawn(move || {
            for (code, body) in responses {
                let Ok((mut stream, _)) = listener.accept() else {
                    return;
                };
                let mut buf = [0u8; 8192];
                let mut request = Vec::new();
                let header_end = loop {
                    if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                        break pos + 4;
                    }
                    let n = stream.read(&mut buf).unwrap_or(0);
                    if n == 0 {
                        break request.len();
                    }
                    request.extend_from_slice(&buf[..n]);
                };
                let raw_headers = String::from_utf8_lossy(&request[..header_end]).to_string();
                if let Some(line) = raw_headers.lines().next() {
                    recorded.lock().unwrap().push(line.to_string());
                }
                let headers = raw_headers.to_lowercase();
                let content_length = headers
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                while request.len() < header_end + content_length {
                    let n = stream.read(&mut buf).unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }
                counter.fetch_add(1, Ordering::SeqCst);
                let reason = if code == 200 { "OK" } else { "Error" };
                let reply = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    code,
                    reason,
                    body.len(),
                    body
                );
                let _ = stream.write_all(reply.as_bytes());
            }
        });

        (url, hits, lines)
    }

    fn backend(url: &str) -> HttpBackend {
        HttpBackend::new(url, None, Duration::from_secs(5), Duration::from_secs(5))
    }

    #[test]
    fn test_unreachable_service_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let backend = backend(&url);
        let err = backend.get_status(true).unwrap_err();
        assert!(err.is_transport());
        assert!(!backend.check_availability());
    }

    #[test]
    fn test_status_is_cached_until_forced() {
        let body = r#"{"branch":"main","remoteBranch":"origin/main","modifiedFiles":[{"path":"Content/A.uasset","lockedBy":""}],"modifiedUpstream":["Content/B.uasset"]}"#;
        let (url, hits) = serve(vec![(200, body.to_string()), (200, body.to_string())]);
        let backend = backend(&url);

        let status = backend.get_status(false).unwrap();
        assert_eq!(status.branch, "main");
        assert_eq!(status.modified_files[0].path, "Content/A.uasset");
        assert_eq!(status.modified_upstream, vec!["Content/B.uasset"]);

        backend.get_status(false).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        backend.get_status(true).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unauthorized_is_retried_once() {
        let (url, hits) = serve(vec![
            (401, String::new()),
            (200, r#"{"username":"alice"}"#.to_string()),
        ]);
        let backend = backend(&url);

        let user = backend.user_info().unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_lock_failures_are_returned() {
        let body = r#"{"batch":{"paths":["A.uasset","B.uasset"],"failures":[{"path":"B.uasset","reason":"already locked"}]}}"#;
        let (url, _) = serve(vec![(200, body.to_string())]);
        let backend = backend(&url);

        let batch = backend
            .lock(&["A.uasset".to_string(), "B.uasset".to_string()])
            .unwrap();
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].path, "B.uasset");
        assert_eq!(batch.failures[0].reason, "already locked");
    }

    #[test]
    fn test_http_error_status() {
        let (url, _) = serve(vec![(500, "submit exploded".to_string())]);
        let backend = backend(&url);

        let err = backend.submit("msg", &["A.uasset".to_string()]).unwrap_err();
        assert!(!err.is_transport());
        assert!(err.to_string().contains("submit exploded"));
    }

    #[test]
    fn test_history_path_is_query_encoded() {
        let body = r#"{"revisions":[]}"#;
        let (url, _, lines) = serve_recording(vec![(200, body.to_string())]);
        let backend = backend(&url);

        let revisions = backend.file_history("Content/A & B#v1+%.uasset").unwrap();
        assert!(revisions.is_empty());

        let lines = lines.lock().unwrap();
        let line = &lines[0];
        assert!(line.starts_with("GET /repo/history?file="), "{}", line);
        assert!(line.contains("%26"), "{}", line);
        assert!(line.contains("%23"), "{}", line);
        assert!(line.contains("%2B"), "{}", line);
        assert!(line.contains("%25"), "{}", line);
        assert!(!line.contains('#'), "{}", line);
        assert!(!line.contains(" B"), "{}", line);
    }

    #[test]
    fn test_pushed_status_serves_unforced_queries() {
        let backend = backend("http://127.0.0.1:9");
        backend.record_pushed_status(RepoStatus {
            branch: "pushed".to_string(),
            ..RepoStatus::default()
        });
        assert_eq!(backend.get_status(false).unwrap().branch, "pushed");
    }
}
