//! Command queue, worker pool and the single-owner drain step.
//!
//! Commands run on a rayon pool (or inline when the pool has no threads) and
//! come back through a channel. The owning thread calls [`Dispatcher::tick`]
//! which drains at most one completed command: it merges the deltas into the
//! [`StateCache`], runs the completion callback and notifies listeners.
//!
//! # Public API
//! - [`Dispatcher`]: submit, tick, cancel and the owned state cache
//! - [`Health`]: availability and recent errors
//!
//! # Ordering
//! Each tick drains the oldest *completed* command. A command still running
//! does not block newer completions, so merges apply in completion order.
//! Among commands that have all completed, submission order wins.

use crate::core::command::{
    Command, CommandCallback, CommandFlags, CommandId, CommandReport, CommandResult,
    CommandState, Concurrency,
};
use crate::core::context::WorkerContext;
use crate::core::local::CommitInfo;
use crate::core::operation::{Operation, OperationKind};
use crate::core::state::FileStatus;
use crate::core::state_cache::StateCache;
use crate::workers::Worker;
use crossbeam_channel as chan;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Sleep between polls of a synchronous submission
pub const SYNC_POLL_INTERVAL: Duration = Duration::from_millis(10);

pub type StateListener = Box<dyn FnMut(&[PathBuf])>;
pub type TransportPump = Box<dyn FnMut(Duration)>;

struct QueuedCommand {
    id: CommandId,
    operation: Operation,
    concurrency: Concurrency,
    flags: Arc<CommandFlags>,
    callback: Option<CommandCallback>,
    completed: Option<Command>,
}

/// Provider availability as observed from command results
#[derive(Debug)]
pub struct Health {
    enabled: bool,
    consecutive_failures: u32,
    max_consecutive_failures: u32,
    last_errors: Arc<Mutex<Vec<String>>>,
}

impl Health {
    fn new(max_consecutive_failures: u32) -> Self {
        Self {
            enabled: true,
            consecutive_failures: 0,
            max_consecutive_failures: max_consecutive_failures.max(1),
            last_errors: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn last_errors(&self) -> Vec<String> {
        self.last_errors
            .lock()
            .map(|errors| errors.clone())
            .unwrap_or_default()
    }

    fn set_last_errors(&self, errors: &[String]) {
        if let Ok(mut last) = self.last_errors.lock() {
            *last = errors.to_vec();
        }
    }

    fn record(&mut self, operation: &Operation, succeeded: bool, errors: &[String]) {
        if !succeeded && !errors.is_empty() {
            self.set_last_errors(errors);
        }

        match operation.kind {
            OperationKind::Connect => {
                self.enabled = succeeded;
                self.consecutive_failures = 0;
                if succeeded {
                    self.set_last_errors(&[]);
                } else {
                    log::error!("Connection failed, revision control disabled");
                }
            }
            _ if operation.is_status_refresh() => {
                if succeeded {
                    self.consecutive_failures = 0;
                    return;
                }
                self.consecutive_failures += 1;
                if self.enabled && self.consecutive_failures >= self.max_consecutive_failures {
                    log::error!(
                        "{} consecutive status failures, revision control disabled",
                        self.consecutive_failures
                    );
                    self.enabled = false;
                }
            }
            _ => {}
        }
    }

    fn disable(&mut self) {
        self.enabled = false;
    }
}

pub struct Dispatcher {
    ctx: Arc<WorkerContext>,
    pool: Option<rayon::ThreadPool>,
    tx: chan::Sender<Command>,
    rx: chan::Receiver<Command>,
    queue: VecDeque<QueuedCommand>,
    next_id: u64,
    cache: StateCache,
    health: Health,
    commit: Option<CommitInfo>,
    listeners: Vec<StateListener>,
    sync_reports: HashMap<CommandId, CommandReport>,
    transport_pump: Option<TransportPump>,
}

impl Dispatcher {
    /// `worker_threads == 0` runs every command inline on submission
    pub fn new(ctx: Arc<WorkerContext>, worker_threads: usize, max_consecutive_failures: u32) -> Self {
        let pool = if worker_threads == 0 {
            None
        } else {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(worker_threads)
                .thread_name(|i| format!("vcs-worker-{}", i))
                .build()
            {
                Ok(pool) => Some(pool),
                Err(e) => {
                    log::warn!("Failed to start worker pool, running commands inline: {}", e);
                    None
                }
            }
        };
        let (tx, rx) = chan::unbounded();

        Self {
            ctx,
            pool,
            tx,
            rx,
            queue: VecDeque::new(),
            next_id: 1,
            cache: StateCache::new(),
            health: Health::new(max_consecutive_failures),
            commit: None,
            listeners: Vec::new(),
            sync_reports: HashMap::new(),
            transport_pump: None,
        }
    }

    pub fn context(&self) -> &Arc<WorkerContext> {
        &self.ctx
    }

    pub fn cache(&self) -> &StateCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut StateCache {
        &mut self.cache
    }

    pub fn health(&self) -> &Health {
        &self.health
    }

    pub fn is_enabled(&self) -> bool {
        self.health.is_enabled()
    }

    pub fn disable(&mut self) {
        self.health.disable();
    }

    pub fn commit(&self) -> Option<&CommitInfo> {
        self.commit.as_ref()
    }

    pub fn on_state_changed(&mut self, listener: StateListener) {
        self.listeners.push(listener);
    }

    /// Pumped on every poll of a synchronous submission so that transport
    /// callbacks owned by the host keep firing
    pub fn set_transport_pump(&mut self, pump: TransportPump) {
        self.transport_pump = Some(pump);
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_queued(&self, id: CommandId) -> bool {
        self.queue.iter().any(|queued| queued.id == id)
    }

    /// Whether a command matching `predicate` is waiting or running
    pub fn has_queued(&self, predicate: impl Fn(&OperationKind) -> bool) -> bool {
        self.queue.iter().any(|queued| predicate(&queued.operation.kind))
    }

    /// Enqueue an operation. Asynchronous submissions return immediately.
    pub fn submit(
        &mut self,
        operation: Operation,
        concurrency: Concurrency,
        callback: Option<CommandCallback>,
    ) -> CommandId {
        let id = CommandId(self.next_id);
        self.next_id += 1;

        let prior_states = self.snapshot_prior_states(&operation);
        let command = Command::new(id, operation.clone(), concurrency, prior_states);
        let flags = Arc::clone(&command.flags);

        log::debug!("Queued {} {}", id, operation);
        self.queue.push_back(QueuedCommand {
            id,
            operation,
            concurrency,
            flags,
            callback,
            completed: None,
        });

        let ctx = Arc::clone(&self.ctx);
        let tx = self.tx.clone();
        let job = move || {
            let command = run_command(&ctx, command);
            // The receiver lives as long as the dispatcher
            let _ = tx.send(command);
        };

        match &self.pool {
            Some(pool) => pool.spawn(job),
            None => job(),
        }

        id
    }

    /// Submit and block, ticking until the command has been drained
    pub fn submit_sync(
        &mut self,
        operation: Operation,
        callback: Option<CommandCallback>,
    ) -> CommandReport {
        let fallback = operation.clone();
        let id = self.submit(operation, Concurrency::Synchronous, callback);

        loop {
            self.tick();
            if !self.is_queued(id) {
                break;
            }
            if let Some(pump) = self.transport_pump.as_mut() {
                pump(SYNC_POLL_INTERVAL);
            }
            thread::sleep(SYNC_POLL_INTERVAL);
        }

        self.sync_reports.remove(&id).unwrap_or(CommandReport {
            id,
            operation: fallback,
            result: CommandResult::Failed,
            info_messages: Vec::new(),
            error_messages: Vec::new(),
        })
    }

    /// Request cooperative cancellation. False once the command completed.
    pub fn cancel(&mut self, id: CommandId) -> bool {
        match self.queue.iter().find(|queued| queued.id == id) {
            Some(queued) => {
                let accepted = queued.flags.cancel();
                if accepted {
                    log::info!("Cancelling {} {}", id, queued.operation);
                }
                accepted
            }
            None => false,
        }
    }

    /// Drain at most one completed command. Returns the drained id.
    pub fn tick(&mut self) -> Option<CommandId> {
        self.poll_completions();

        let position = self
            .queue
            .iter()
            .position(|queued| queued.completed.is_some())?;
        let mut queued = self.queue.remove(position)?;
        let command = queued.completed.take()?;

        Some(self.finish(queued, command))
    }

    fn poll_completions(&mut self) {
        for command in self.rx.try_iter() {
            match self.queue.iter_mut().find(|queued| queued.id == command.id) {
                Some(queued) => queued.completed = Some(command),
                None => log::warn!("Completed command {} is not queued", command.id),
            }
        }
    }

    fn finish(&mut self, queued: QueuedCommand, mut command: Command) -> CommandId {
        let id = queued.id;
        let cancelled = command.is_cancelled();

        for message in &command.output.info_messages {
            log::info!("{}", message);
        }
        for message in &command.output.error_messages {
            log::error!("{}", message);
        }

        let mut changed = self.cache.merge_states(&command.output.states);

        for path in command.output.removals.drain(..) {
            if self.cache.remove_file(&path) {
                changed.push(path);
            }
        }
        for (path, history) in command.output.histories.drain() {
            self.cache.set_history(&path, history);
            changed.push(path);
        }
        if let Some(commit) = command.output.commit.take() {
            self.commit = Some(commit);
        }

        let result = if cancelled {
            CommandResult::Cancelled
        } else if command.output.success {
            CommandResult::Succeeded
        } else {
            CommandResult::Failed
        };

        if !cancelled {
            self.health.record(
                &command.operation,
                command.output.success,
                &command.output.error_messages,
            );
        }

        log::debug!("Finished {} {}: {:?}", id, queued.operation, result);
        let report = command.report(result);

        match queued.callback {
            Some(callback) if !cancelled => callback(&report),
            Some(_) => log::debug!("Skipping callback of cancelled {}", id),
            None => {}
        }

        if queued.concurrency == Concurrency::Synchronous {
            self.sync_reports.insert(id, report);
        }

        if !changed.is_empty() {
            changed.sort();
            changed.dedup();
            for listener in self.listeners.iter_mut() {
                listener(&changed);
            }
        }

        id
    }

    /// Cached status of every targeted file. Reverting with no files targets
    /// everything in the cache.
    fn snapshot_prior_states(&mut self, operation: &Operation) -> HashMap<PathBuf, FileStatus> {
        let files = if operation.files.is_empty() && operation.kind == OperationKind::Revert {
            self.cache.files()
        } else {
            operation.files.clone()
        };

        files
            .into_iter()
            .map(|file| {
                let status = self.cache.status_of(&file);
                (file, status)
            })
            .collect()
    }
}

/// Runs on a pool thread, or inline
fn run_command(ctx: &WorkerContext, mut command: Command) -> Command {
    if command.is_cancelled() {
        command.flags.set_state(CommandState::Cancelled);
        return command;
    }

    command.flags.set_state(CommandState::Running);
    let worker = Worker::for_operation(&command.operation.kind);
    let success = worker.execute(ctx, &mut command);
    command.output.success = success;

    command.flags.set_state(if command.is_cancelled() {
        CommandState::Cancelled
    } else {
        CommandState::Completed
    });
    command
}
