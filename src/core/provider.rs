//! The host-facing facade.
//!
//! A [`Provider`] wires configuration, the service client, the local
//! repository and the dispatcher together. Hosts call into it from one thread
//! and tick it periodically.
//!
//! # Public API
//! - [`Provider::init`], [`Provider::close`]
//! - [`Provider::execute`], [`Provider::run`]: submit operations
//! - [`Provider::get_state`], [`Provider::category`]: read cached state
//! - [`Provider::tick`], [`Provider::set_host_busy`]: host scheduling
//! - [`Provider::fetch_revision`]: revision content for diffing

use crate::core::backend::{Backend, HttpBackend, RepoStatus};
use crate::core::classify::{classify, DisplayCategory};
use crate::core::command::{CommandCallback, CommandId, CommandReport, Concurrency};
use crate::core::config::ProviderConfig;
use crate::core::context::WorkerContext;
use crate::core::dirs::get_diff_directory;
use crate::core::dispatcher::{Dispatcher, StateListener, TransportPump};
use crate::core::error::{Result, VcsBridgeError};
use crate::core::local::{find_repository_root, GitCli, LocalRepo};
use crate::core::operation::{Operation, OperationKind};
use crate::core::paths::{normalize, relative_to_root};
use crate::core::poller::Poller;
use crate::core::state::{CachedState, Revision};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// How [`Provider::get_state`] treats the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheUsage {
    Use,
    /// Synchronously refresh every file not skipped by the ignore set
    ForceUpdate,
    /// Queue a refresh for entries older than the stale threshold
    RefreshStale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Accepted(CommandId),
    Rejected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusSummary {
    pub repository_root: PathBuf,
    pub user: String,
    pub branch: Option<String>,
    pub commit: Option<String>,
    pub available: bool,
    pub last_error: Option<String>,
}

pub struct Provider {
    config: ProviderConfig,
    root: PathBuf,
    dispatcher: Dispatcher,
    poller: Option<Poller>,
    host_busy: bool,
}

impl Provider {
    /// Provider backed by the HTTP service and the `git` executable
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let start = match &config.repository_root {
            Some(root) => root.clone(),
            None => std::env::current_dir()?,
        };
        let root = find_repository_root(&start)?;

        let backend = Arc::new(HttpBackend::new(
            config.service_url.clone(),
            config.nonce_path.clone(),
            config.status_timeout(),
            config.long_timeout(),
        ));
        let local = Arc::new(GitCli::new(root.clone()));

        Ok(Self::with_collaborators(config, root, backend, local))
    }

    pub fn with_collaborators(
        config: ProviderConfig,
        root: PathBuf,
        backend: Arc<dyn Backend>,
        local: Arc<dyn LocalRepo>,
    ) -> Self {
        let ctx = WorkerContext::new(backend, local, root.clone())
            .with_content_roots(&config.content_roots)
            .with_lockable_patterns(config.lockable_patterns.clone())
            .with_lock_user(config.lock_user.clone());
        let dispatcher = Dispatcher::new(
            Arc::new(ctx),
            config.worker_threads,
            config.max_consecutive_failures,
        );

        Self {
            config,
            root,
            dispatcher,
            poller: None,
            host_busy: false,
        }
    }

    /// Connect synchronously, then start polling and queue a full fetch.
    /// Returns whether the connection succeeded.
    pub fn init(&mut self) -> bool {
        log::info!("Initializing revision control in {}", self.root.display());

        let report = self.dispatcher.submit_sync(Operation::connect(), None);
        if !report.succeeded() {
            return false;
        }

        if self.poller.is_none() {
            if let Some(interval) = self.config.poll_interval() {
                match Poller::start(interval) {
                    Ok(poller) => self.poller = Some(poller),
                    Err(e) => log::warn!("Failed to start background polling: {}", e),
                }
            }
        }

        self.dispatcher
            .submit(Operation::fetch(true), Concurrency::Asynchronous, None);
        true
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn context(&self) -> &Arc<WorkerContext> {
        self.dispatcher.context()
    }

    pub fn is_enabled(&self) -> bool {
        self.dispatcher.is_enabled()
    }

    pub fn last_errors(&self) -> Vec<String> {
        self.dispatcher.health().last_errors()
    }

    /// Submit an operation. While disabled only Connect is accepted.
    /// Synchronous submissions return once the command has been drained.
    pub fn execute(
        &mut self,
        operation: Operation,
        concurrency: Concurrency,
        callback: Option<CommandCallback>,
    ) -> Submission {
        if !self.accepts(&operation) {
            return Submission::Rejected;
        }

        let operation = self.absolute(operation);
        match concurrency {
            Concurrency::Asynchronous => {
                Submission::Accepted(self.dispatcher.submit(operation, concurrency, callback))
            }
            Concurrency::Synchronous => {
                let report = self.dispatcher.submit_sync(operation, callback);
                Submission::Accepted(report.id)
            }
        }
    }

    /// Run an operation synchronously and return its report
    pub fn run(&mut self, operation: Operation) -> Result<CommandReport> {
        if !self.accepts(&operation) {
            return Err(VcsBridgeError::ProviderDisabled);
        }
        let operation = self.absolute(operation);
        Ok(self.dispatcher.submit_sync(operation, None))
    }

    fn accepts(&self, operation: &Operation) -> bool {
        if self.is_enabled() || operation.kind == OperationKind::Connect {
            return true;
        }
        log::warn!("Rejected {}: revision control is disabled", operation);
        false
    }

    fn absolute(&self, mut operation: Operation) -> Operation {
        operation.files = operation
            .files
            .iter()
            .map(|f| normalize(f, &self.root))
            .collect();
        if let OperationKind::Copy { destination } = &mut operation.kind {
            *destination = normalize(destination, &self.root);
        }
        operation
    }

    /// Cached state of `files`. Relative paths are taken from the repository
    /// root.
    pub fn get_state(&mut self, files: &[PathBuf], usage: CacheUsage) -> Vec<CachedState> {
        let files: Vec<PathBuf> = files.iter().map(|f| normalize(f, &self.root)).collect();

        match usage {
            CacheUsage::Use => {}
            CacheUsage::ForceUpdate => {
                let cache = self.dispatcher.cache_mut();
                let refresh: Vec<PathBuf> = files
                    .iter()
                    .filter(|f| !cache.remove_ignore_force(f))
                    .cloned()
                    .collect();
                if !refresh.is_empty() && self.is_enabled() {
                    self.dispatcher
                        .submit_sync(Operation::update_status(refresh, false), None);
                }
            }
            CacheUsage::RefreshStale => {
                let stale = self
                    .dispatcher
                    .cache()
                    .stale_files(&files, self.config.stale_after());
                if !stale.is_empty() && self.is_enabled() {
                    log::debug!("Refreshing {} stale file(s)", stale.len());
                    self.dispatcher.submit(
                        Operation::update_status(stale, false),
                        Concurrency::Asynchronous,
                        None,
                    );
                }
            }
        }

        let cache = self.dispatcher.cache_mut();
        files
            .iter()
            .map(|f| cache.get_or_create(f).clone())
            .collect()
    }

    /// Every file the cache holds an entry for
    pub fn known_files(&self) -> Vec<PathBuf> {
        self.dispatcher.cache().files()
    }

    pub fn category(&mut self, file: &Path) -> DisplayCategory {
        let file = normalize(file, &self.root);
        classify(&self.dispatcher.cache_mut().status_of(&file))
    }

    /// Drive polling and drain one completed command. Call regularly from
    /// the owning thread. Returns whether a command was drained.
    pub fn tick(&mut self) -> bool {
        let due = self.poller.as_ref().is_some_and(|poller| poller.take_due());
        if due && self.is_enabled() && !self.host_busy {
            let fetch_queued = self
                .dispatcher
                .has_queued(|kind| matches!(kind, OperationKind::Fetch { .. }));
            if !fetch_queued {
                self.dispatcher
                    .submit(Operation::fetch(true), Concurrency::Asynchronous, None);
            }
        }

        self.dispatcher.tick().is_some()
    }

    /// Tick until the queue is empty
    pub fn wait_idle(&mut self) {
        while self.dispatcher.queue_len() > 0 {
            if !self.tick() {
                std::thread::sleep(crate::core::dispatcher::SYNC_POLL_INTERVAL);
            }
        }
    }

    pub fn set_host_busy(&mut self, busy: bool) {
        if self.host_busy == busy {
            return;
        }
        self.host_busy = busy;
        if let Err(e) = self.context().backend.notify_host_state(busy) {
            log::debug!("Failed to notify service of host state: {}", e);
        }
    }

    pub fn cancel(&mut self, id: CommandId) -> bool {
        self.dispatcher.cancel(id)
    }

    pub fn on_state_changed(&mut self, listener: StateListener) {
        self.dispatcher.on_state_changed(listener);
    }

    pub fn set_transport_pump(&mut self, pump: TransportPump) {
        self.dispatcher.set_transport_pump(pump);
    }

    /// A status snapshot pushed by the service. Queues a refresh of all
    /// content that will be answered from it.
    pub fn push_status(&mut self, status: RepoStatus) {
        self.context().backend.record_pushed_status(status);
        if self.is_enabled() {
            self.dispatcher.submit(
                Operation::update_status(Vec::new(), false),
                Concurrency::Asynchronous,
                None,
            );
        }
    }

    /// Write the file content at `revision` to the diff directory
    pub fn fetch_revision(&self, revision: &Revision) -> Result<PathBuf> {
        let directory = get_diff_directory()?;
        self.fetch_revision_into(revision, &directory)
    }

    pub fn fetch_revision_into(&self, revision: &Revision, directory: &Path) -> Result<PathBuf> {
        let name = revision
            .filename
            .file_name()
            .ok_or_else(|| VcsBridgeError::file_not_found(&revision.filename))?
            .to_string_lossy();
        let destination = directory.join(format!("temp-{}-{}", revision.commit_id, name));

        if destination.exists() {
            log::debug!("Reusing {}", destination.display());
            return Ok(destination);
        }

        let relative = relative_to_root(&revision.filename, &self.root)
            .ok_or_else(|| VcsBridgeError::file_not_found(&revision.filename))?;
        std::fs::create_dir_all(directory)?;
        self.context()
            .local
            .dump_at_revision(&revision.commit_id, &relative, &destination)?;

        Ok(destination)
    }

    pub fn history(&self, file: &Path) -> Vec<Revision> {
        let file = normalize(file, &self.root);
        self.dispatcher
            .cache()
            .get(&file)
            .map(|entry| entry.history.clone())
            .unwrap_or_default()
    }

    pub fn status_summary(&self) -> StatusSummary {
        let ctx = self.context();
        let branch = if self.is_enabled() {
            ctx.backend.get_status(false).ok().map(|status| status.branch)
        } else {
            None
        };

        StatusSummary {
            repository_root: self.root.clone(),
            user: ctx.lock_user(),
            branch,
            commit: self
                .dispatcher
                .commit()
                .map(|c| format!("{} {}", c.short_id, c.summary)),
            available: self.is_enabled(),
            last_error: self.last_errors().into_iter().next(),
        }
    }

    /// Stop polling, forget cached state and disable the provider
    pub fn close(&mut self) {
        if let Some(mut poller) = self.poller.take() {
            poller.stop();
        }
        self.dispatcher.cache_mut().clear();
        self.context().locked_files.clear();
        self.dispatcher.disable();
        log::info!("Revision control closed");
    }
}
