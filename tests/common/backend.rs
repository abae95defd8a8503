//! Scripted in-memory revision-control service

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};
use vcs_bridge::core::backend::{
    Backend, HistoryRevision, LfsLock, LockBatch, LockFailure, LockOwner, RepoStatus, StatusFile,
    UserInfo,
};
use vcs_bridge::core::error::{Result, VcsBridgeError};

pub struct FakeBackend {
    status: Mutex<RepoStatus>,
    lock_failures: Mutex<Vec<LockFailure>>,
    unlock_failures: Mutex<Vec<LockFailure>>,
    history: Mutex<HashMap<String, Vec<HistoryRevision>>>,
    user: Mutex<String>,
    available: AtomicBool,
    transport_down: AtomicBool,
    calls: Mutex<Vec<String>>,
    submitted: Mutex<Vec<(String, Vec<String>)>>,
    status_blocked: Mutex<bool>,
    status_released: Condvar,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            status: Mutex::new(RepoStatus {
                branch: "main".to_string(),
                remote_branch: "origin/main".to_string(),
                ..RepoStatus::default()
            }),
            lock_failures: Mutex::new(Vec::new()),
            unlock_failures: Mutex::new(Vec::new()),
            history: Mutex::new(HashMap::new()),
            user: Mutex::new("me".to_string()),
            available: AtomicBool::new(true),
            transport_down: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
            status_blocked: Mutex::new(false),
            status_released: Condvar::new(),
        }
    }
}

impl FakeBackend {
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Every call fails as if the service could not be reached
    pub fn set_transport_down(&self, down: bool) {
        self.transport_down.store(down, Ordering::SeqCst);
    }

    pub fn update_status(&self, update: impl FnOnce(&mut RepoStatus)) {
        update(&mut self.status.lock().unwrap());
    }

    pub fn add_modified(&self, relative: &str) {
        self.update_status(|status| {
            status.modified_files.push(StatusFile {
                path: relative.to_string(),
                locked_by: String::new(),
            })
        });
    }

    pub fn add_untracked(&self, relative: &str) {
        self.update_status(|status| {
            status.untracked_files.push(StatusFile {
                path: relative.to_string(),
                locked_by: String::new(),
            })
        });
    }

    pub fn add_lock_theirs(&self, relative: &str, owner: &str) {
        self.update_status(|status| {
            status.locks_theirs.push(LfsLock {
                id: format!("{}", status.locks_theirs.len() + 1),
                path: relative.to_string(),
                owner: Some(LockOwner {
                    name: owner.to_string(),
                }),
            })
        });
    }

    pub fn fail_lock(&self, relative: &str, reason: &str) {
        self.lock_failures.lock().unwrap().push(LockFailure {
            path: relative.to_string(),
            reason: reason.to_string(),
        });
    }

    pub fn fail_unlock(&self, relative: &str, reason: &str) {
        self.unlock_failures.lock().unwrap().push(LockFailure {
            path: relative.to_string(),
            reason: reason.to_string(),
        });
    }

    pub fn set_history(&self, relative: &str, revisions: Vec<HistoryRevision>) {
        self.history
            .lock()
            .unwrap()
            .insert(relative.to_string(), revisions);
    }

    /// Hold every status request until [`FakeBackend::release_status`]
    pub fn block_status(&self) {
        *self.status_blocked.lock().unwrap() = true;
    }

    pub fn release_status(&self) {
        *self.status_blocked.lock().unwrap() = false;
        self.status_released.notify_all();
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    pub fn submitted(&self) -> Vec<(String, Vec<String>)> {
        self.submitted.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.transport_down.load(Ordering::SeqCst) {
            return Err(VcsBridgeError::service_unavailable("connection refused"));
        }
        Ok(())
    }

    fn batch(files: &[String], failures: &Mutex<Vec<LockFailure>>) -> LockBatch {
        let failures: Vec<LockFailure> = failures
            .lock()
            .unwrap()
            .iter()
            .filter(|f| files.contains(&f.path))
            .cloned()
            .collect();
        LockBatch {
            paths: files.to_vec(),
            failures,
        }
    }
}

impl Backend for FakeBackend {
    fn get_status(&self, force: bool) -> Result<RepoStatus> {
        {
            let mut blocked = self.status_blocked.lock().unwrap();
            while *blocked {
                blocked = self.status_released.wait(blocked).unwrap();
            }
        }
        self.record(format!("status:{}", force))?;
        Ok(self.status.lock().unwrap().clone())
    }

    fn submit(&self, message: &str, files: &[String]) -> Result<()> {
        self.record(format!("submit:{}", files.join(",")))?;
        self.submitted
            .lock()
            .unwrap()
            .push((message.to_string(), files.to_vec()));
        Ok(())
    }

    fn revert(&self, files: &[String]) -> Result<()> {
        self.record(format!("revert:{}", files.join(",")))
    }

    fn lock(&self, files: &[String]) -> Result<LockBatch> {
        self.record(format!("lock:{}", files.join(",")))?;
        Ok(Self::batch(files, &self.lock_failures))
    }

    fn unlock(&self, files: &[String]) -> Result<LockBatch> {
        self.record(format!("unlock:{}", files.join(",")))?;
        Ok(Self::batch(files, &self.unlock_failures))
    }

    fn file_history(&self, file: &str) -> Result<Vec<HistoryRevision>> {
        self.record(format!("history:{}", file))?;
        Ok(self
            .history
            .lock()
            .unwrap()
            .get(file)
            .cloned()
            .unwrap_or_default())
    }

    fn user_info(&self) -> Result<UserInfo> {
        self.record("user".to_string())?;
        Ok(UserInfo {
            username: self.user.lock().unwrap().clone(),
        })
    }

    fn check_availability(&self) -> bool {
        self.calls.lock().unwrap().push("available".to_string());
        self.available.load(Ordering::SeqCst) && !self.transport_down.load(Ordering::SeqCst)
    }

    fn notify_host_state(&self, busy: bool) -> Result<()> {
        self.record(format!("notify:{}", busy))
    }

    fn record_pushed_status(&self, status: RepoStatus) {
        *self.status.lock().unwrap() = status;
    }
}
