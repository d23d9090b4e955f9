//! Build targets and the driver that runs them.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use quire_config::ResolvedPaths;

use crate::context::{BuildContext, TaskQueue};
use crate::error::BuildError;
use crate::task::Task;

/// A top-level operation on a project.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// Incrementally brings every output up to date.
    Build,
    /// Deletes the build and cache directories.
    Clean,
    /// `Clean` followed by `Build`.
    Rebuild,
}

impl Target {
    /// Every target, in the order usage lists them.
    pub const ALL: [Target; 3] = [Target::Build, Target::Clean, Target::Rebuild];

    /// Name accepted on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Target::Build => "build",
            Target::Clean => "clean",
            Target::Rebuild => "rebuild",
        }
    }

    /// One-line description shown in usage output.
    pub fn description(self) -> &'static str {
        match self {
            Target::Build => "build outdated outputs",
            Target::Clean => "remove build and cache directories",
            Target::Rebuild => "clean, then build everything",
        }
    }
}

impl FromStr for Target {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Target::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| BuildError::UnsupportedTarget(s.to_string()))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured project and its build context.
pub struct Project {
    name: String,
    ctx: BuildContext,
}

impl Project {
    /// Opens a project with the given layout, loading its cache if present.
    pub fn new(paths: &ResolvedPaths) -> Self {
        Self {
            name: paths.name.clone(),
            ctx: BuildContext::new(paths),
        }
    }

    /// Project name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The build context, for inspecting the results of the last run.
    pub fn context(&self) -> &BuildContext {
        &self.ctx
    }

    /// Mutable access to the build context.
    pub fn context_mut(&mut self) -> &mut BuildContext {
        &mut self.ctx
    }

    /// Runs `target`.
    pub fn run(&mut self, target: Target) -> Result<(), BuildError> {
        match target {
            Target::Build => self.build(),
            Target::Clean => self.clean(),
            Target::Rebuild => self.rebuild(),
        }
    }

    /// Brings every output up to date, executing only stale tasks.
    ///
    /// The first failing task aborts the build. Everything the cache recorded
    /// before the failure stays valid.
    pub fn build(&mut self) -> Result<(), BuildError> {
        tracing::info!(project = %self.name, "building");
        self.ctx.reset_run();
        self.ctx.exec_task(None, Task::Scan)?;
        self.ctx.exec_tasks(TaskQueue::Compile)?;
        self.ctx.exec_tasks(TaskQueue::Link)?;
        tracing::info!(
            project = %self.name,
            executed = self.ctx.executed_tasks().len(),
            written = self.ctx.written_outputs().len(),
            "build finished"
        );
        Ok(())
    }

    /// Deletes the build and cache directories. Missing directories are fine.
    ///
    /// Nothing is removed if either directory is or contains the source directory.
    pub fn clean(&mut self) -> Result<(), BuildError> {
        let build_dir = self.ctx.build_dir().to_path_buf();
        let cache_dir = self.ctx.cache_dir().to_path_buf();
        for dir in [&build_dir, &cache_dir] {
            if self.ctx.src_dir().starts_with(dir) {
                return Err(BuildError::UnsafeClean { dir: dir.clone() });
            }
        }
        remove_dir_if_exists(&build_dir)?;
        remove_dir_if_exists(&cache_dir)?;
        self.ctx.reset_cache();
        self.ctx.reset_run();
        tracing::info!(project = %self.name, "cleaned up");
        Ok(())
    }

    /// Cleans, then builds from scratch.
    pub fn rebuild(&mut self) -> Result<(), BuildError> {
        self.clean()?;
        self.build()
    }
}

fn remove_dir_if_exists(dir: &Path) -> Result<(), BuildError> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => {
            tracing::debug!(dir = %dir.display(), "removed");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(BuildError::Io {
            path: dir.to_path_buf(),
            source: e,
        }),
    }
}
