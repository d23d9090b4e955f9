//! Per-invocation build state: directories, cache store and work queues.

use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};

use quire_cache::CacheStore;
use quire_common::Timestamp;
use quire_config::ResolvedPaths;

use crate::error::BuildError;
use crate::task::Task;

/// Version written into the cache manifest. A cache from another version is discarded.
pub const QUIRE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Selects one of the two work queues.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskQueue {
    /// Parse, transform and cache-write tasks.
    Compile,
    /// Link tasks, run only once the compile queue is empty.
    Link,
}

struct PendingTask {
    task: Task,
    /// Label of the task that enqueued this one.
    parent: Option<String>,
}

/// Everything one build invocation works with.
///
/// Passed explicitly into every task so that independent builds can coexist
/// in one process. Only the cache store outlives the invocation.
pub struct BuildContext {
    src_dir: PathBuf,
    build_dir: PathBuf,
    cache_dir: PathBuf,
    source_extension: String,
    output_extension: String,
    cache: CacheStore,
    compile_tasks: VecDeque<PendingTask>,
    link_tasks: VecDeque<PendingTask>,
    executed_tasks: Vec<Task>,
    written_outputs: Vec<PathBuf>,
    running: Option<String>,
}

impl BuildContext {
    /// Creates a context for the given layout, loading the cache store from disk.
    pub fn new(paths: &ResolvedPaths) -> Self {
        Self {
            src_dir: paths.src_dir.clone(),
            build_dir: paths.build_dir.clone(),
            cache_dir: paths.cache_dir.clone(),
            source_extension: paths.source_extension.clone(),
            output_extension: paths.output_extension.clone(),
            cache: CacheStore::load(&paths.cache_dir, QUIRE_VERSION),
            compile_tasks: VecDeque::new(),
            link_tasks: VecDeque::new(),
            executed_tasks: Vec::new(),
            written_outputs: Vec::new(),
            running: None,
        }
    }

    /// Directory scanned for sources.
    pub fn src_dir(&self) -> &Path {
        &self.src_dir
    }

    /// Directory receiving outputs.
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Directory holding the cache store.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Extension of source documents, without the dot.
    pub fn source_extension(&self) -> &str {
        &self.source_extension
    }

    /// Extension of outputs, without the dot.
    pub fn output_extension(&self) -> &str {
        &self.output_extension
    }

    /// The cache store.
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Mutable access to the cache store.
    pub fn cache_mut(&mut self) -> &mut CacheStore {
        &mut self.cache
    }

    /// Appends a task to the compile queue.
    pub fn add_compile_task(&mut self, task: Task) {
        let pending = self.pending(task);
        self.compile_tasks.push_back(pending);
    }

    /// Appends a task to the link queue.
    pub fn add_link_task(&mut self, task: Task) {
        let pending = self.pending(task);
        self.link_tasks.push_back(pending);
    }

    fn pending(&self, task: Task) -> PendingTask {
        PendingTask {
            task,
            parent: self.running.clone(),
        }
    }

    /// Number of tasks waiting in `queue`.
    pub fn queued(&self, queue: TaskQueue) -> usize {
        match queue {
            TaskQueue::Compile => self.compile_tasks.len(),
            TaskQueue::Link => self.link_tasks.len(),
        }
    }

    fn queue_mut(&mut self, queue: TaskQueue) -> &mut VecDeque<PendingTask> {
        match queue {
            TaskQueue::Compile => &mut self.compile_tasks,
            TaskQueue::Link => &mut self.link_tasks,
        }
    }

    /// Last-modified time of `filename` in the source directory.
    ///
    /// Fails with [`BuildError::SourceNotFound`] if the file is gone.
    pub fn get_src_timestamp(&self, filename: &str) -> Result<Timestamp, BuildError> {
        let path = self.src_dir.join(filename);
        Timestamp::of_path(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => BuildError::SourceNotFound { path },
            _ => BuildError::Io { path, source: e },
        })
    }

    /// Last-modified time of a previously written output, or `None` if never built.
    pub fn get_build_timestamp(&self, relative_path: &str) -> Option<Timestamp> {
        Timestamp::of_path(&self.build_dir.join(relative_path)).ok()
    }

    /// Output location for the logical `name` with `extension` (no dot).
    pub fn get_build_path(&self, name: &str, extension: &str) -> PathBuf {
        self.build_dir.join(format!("{name}.{extension}"))
    }

    /// Runs `task` if it is stale and logs it; skips it otherwise.
    ///
    /// `parent` names the task that enqueued this one, for diagnostics only.
    /// A task that fails is not logged and its error aborts the build.
    pub fn exec_task(&mut self, parent: Option<&str>, task: Task) -> Result<(), BuildError> {
        let parent = parent.unwrap_or("-");
        if !task.is_outdated(self)? {
            tracing::debug!(task = %task, parent, "up to date");
            return Ok(());
        }

        tracing::debug!(task = %task, parent, "executing");
        let previous = self.running.replace(task.to_string());
        let result = task.run(self);
        self.running = previous;
        result?;

        self.executed_tasks.push(task);
        Ok(())
    }

    /// Pops and executes tasks from the front of `queue` until it is empty.
    ///
    /// Executed tasks may append to the same queue, so this runs to a fixpoint.
    /// No task enqueues a task of its own stage, so the queue always drains.
    pub fn exec_tasks(&mut self, queue: TaskQueue) -> Result<(), BuildError> {
        while let Some(PendingTask { task, parent }) = self.queue_mut(queue).pop_front() {
            self.exec_task(parent.as_deref(), task)?;
        }
        Ok(())
    }

    /// Every task executed during the current run, in execution order.
    pub fn executed_tasks(&self) -> &[Task] {
        &self.executed_tasks
    }

    /// Every output file written during the current run.
    pub fn written_outputs(&self) -> &[PathBuf] {
        &self.written_outputs
    }

    pub(crate) fn record_output(&mut self, path: PathBuf) {
        self.written_outputs.push(path);
    }

    /// Forgets queued work and the logs of the previous run.
    pub(crate) fn reset_run(&mut self) {
        self.compile_tasks.clear();
        self.link_tasks.clear();
        self.executed_tasks.clear();
        self.written_outputs.clear();
    }

    /// Replaces the in-memory cache store with an empty one.
    pub(crate) fn reset_cache(&mut self) {
        self.cache = CacheStore::empty(&self.cache_dir, QUIRE_VERSION);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn make_context() -> (tempfile::TempDir, BuildContext) {
        let dir = tempfile::tempdir().unwrap();
        let paths = ResolvedPaths {
            name: "test".to_string(),
            src_dir: dir.path().join("docs"),
            build_dir: dir.path().join("_build"),
            cache_dir: dir.path().join("_cache"),
            source_extension: "rst".to_string(),
            output_extension: "html".to_string(),
        };
        std::fs::create_dir_all(&paths.src_dir).unwrap();
        (dir, BuildContext::new(&paths))
    }

    #[test]
    fn build_path_joins_name_and_extension() {
        let (dir, ctx) = make_context();
        assert_eq!(
            ctx.get_build_path("intro", "html"),
            dir.path().join("_build").join("intro.html")
        );
    }

    #[test]
    fn src_timestamp_of_existing_file() {
        let (_dir, ctx) = make_context();
        let path = ctx.src_dir().join("a.rst");
        std::fs::write(&path, "A\n=\n").unwrap();
        let when = UNIX_EPOCH + Duration::from_secs(1_650_000_000);
        std::fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(when)
            .unwrap();
        assert_eq!(
            ctx.get_src_timestamp("a.rst").unwrap(),
            Timestamp::from_system_time(when)
        );
    }

    #[test]
    fn src_timestamp_of_missing_file_is_not_found() {
        let (_dir, ctx) = make_context();
        let err = ctx.get_src_timestamp("gone.rst").unwrap_err();
        assert!(matches!(err, BuildError::SourceNotFound { .. }));
    }

    #[test]
    fn build_timestamp_absent_until_written() {
        let (_dir, ctx) = make_context();
        assert!(ctx.get_build_timestamp("a.html").is_none());
        std::fs::create_dir_all(ctx.build_dir()).unwrap();
        std::fs::write(ctx.build_dir().join("a.html"), "").unwrap();
        assert!(ctx.get_build_timestamp("a.html").is_some());
    }

    #[test]
    fn queues_are_fifo_and_separate() {
        let (_dir, mut ctx) = make_context();
        ctx.add_compile_task(Task::Parse { filename: "a.rst".to_string() });
        ctx.add_compile_task(Task::Parse { filename: "b.rst".to_string() });
        ctx.add_link_task(Task::Link { name: "a".to_string() });
        assert_eq!(ctx.queued(TaskQueue::Compile), 2);
        assert_eq!(ctx.queued(TaskQueue::Link), 1);
        let first = ctx.queue_mut(TaskQueue::Compile).pop_front().unwrap();
        assert_eq!(first.task.to_string(), "parse(a.rst)");
        assert!(first.parent.is_none());
    }

    #[test]
    fn scan_always_runs_and_is_logged() {
        let (_dir, mut ctx) = make_context();
        ctx.exec_task(None, Task::Scan).unwrap();
        ctx.exec_task(None, Task::Scan).unwrap();
        assert_eq!(ctx.executed_tasks().len(), 2);
    }

    #[test]
    fn tasks_remember_their_parent() {
        let (_dir, mut ctx) = make_context();
        std::fs::write(ctx.src_dir().join("a.rst"), "A\n=\n").unwrap();
        ctx.exec_task(None, Task::Scan).unwrap();
        let pending = ctx.queue_mut(TaskQueue::Compile).pop_front().unwrap();
        assert_eq!(pending.parent.as_deref(), Some("scan"));
    }

    #[test]
    fn exec_tasks_drains_to_fixpoint() {
        let (_dir, mut ctx) = make_context();
        std::fs::write(ctx.src_dir().join("a.rst"), "A\n=\n").unwrap();
        ctx.add_compile_task(Task::Parse { filename: "a.rst".to_string() });
        ctx.exec_tasks(TaskQueue::Compile).unwrap();
        assert_eq!(ctx.queued(TaskQueue::Compile), 0);
        let labels: Vec<String> = ctx.executed_tasks().iter().map(|t| t.to_string()).collect();
        assert_eq!(labels, vec!["parse(a.rst)", "transform(a)", "write_cache(a)"]);
    }

    #[test]
    fn failed_task_is_not_logged() {
        let (_dir, mut ctx) = make_context();
        std::fs::write(ctx.src_dir().join("bad.rst"), ".. image:: x.png\n").unwrap();
        let err = ctx
            .exec_task(None, Task::Parse { filename: "bad.rst".to_string() })
            .unwrap_err();
        assert!(matches!(err, BuildError::Parse(_)));
        assert!(ctx.executed_tasks().is_empty());
    }
}
