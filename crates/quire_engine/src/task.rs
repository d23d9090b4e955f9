//! The five task variants and their staleness rules.

use std::collections::BTreeSet;
use std::fmt;

use quire_common::{name_prefix, CodeKey, Timestamp};
use quire_doc::{AstDoc, Code, DOC_KIND};

use crate::context::BuildContext;
use crate::error::BuildError;

/// Returns `true` if an output must be regenerated from its input.
///
/// An absent output is always outdated, and so is an output whose input is
/// absent. Equal timestamps count as up to date.
pub fn is_outdated(input: Option<Timestamp>, output: Option<Timestamp>) -> bool {
    match (input, output) {
        (_, None) | (None, Some(_)) => true,
        (Some(input), Some(output)) => input > output,
    }
}

/// One unit of build work.
///
/// Staleness is only checked where it prunes work: `Parse` (source against
/// cached code) and `Link` (cached code against the output file). The other
/// variants are only ever enqueued by a task that already decided to run.
#[derive(Debug, Clone)]
pub enum Task {
    /// Lists the source directory and enqueues a `Parse` and a `Link` per document.
    Scan,
    /// Parses a source file, then enqueues `Transform`.
    Parse {
        /// File name relative to the source directory.
        filename: String,
    },
    /// Converts a document to code, then enqueues `WriteCache`.
    Transform {
        /// The parsed document.
        doc: AstDoc,
    },
    /// Persists code into the cache store and flushes it.
    WriteCache {
        /// The code to persist.
        code: Code,
    },
    /// Assembles and writes the output of one target.
    Link {
        /// Logical target name.
        name: String,
    },
}

impl Task {
    /// Decides whether this task needs to run.
    pub fn is_outdated(&self, ctx: &BuildContext) -> Result<bool, BuildError> {
        match self {
            Task::Scan | Task::Transform { .. } | Task::WriteCache { .. } => Ok(true),
            Task::Parse { filename } => {
                let input = ctx.get_src_timestamp(filename)?;
                let key = CodeKey::new(DOC_KIND, name_prefix(filename));
                let cache = ctx.cache();
                // A recorded timestamp only counts while its artifact is readable.
                let output = cache
                    .get_code_timestamp(&key.kind, &key.name)
                    .filter(|_| cache.has_code(&key));
                Ok(is_outdated(Some(input), output))
            }
            Task::Link { name } => {
                let dependencies = ctx.cache().dependency_closure(name);
                // Nothing recorded means nothing proves the output current.
                if dependencies.is_empty() {
                    return Ok(true);
                }
                let output_name = format!("{name}.{}", ctx.output_extension());
                let output = ctx.get_build_timestamp(&output_name);
                Ok(dependencies.iter().any(|key| {
                    let input = ctx.cache().get_code_timestamp(&key.kind, &key.name);
                    is_outdated(input, output)
                }))
            }
        }
    }

    /// Executes the task, possibly enqueueing follow-up work on `ctx`.
    pub fn run(&self, ctx: &mut BuildContext) -> Result<(), BuildError> {
        match self {
            Task::Scan => scan(ctx),
            Task::Parse { filename } => {
                let doc = quire_doc::parse_file(&ctx.src_dir().join(filename))?;
                ctx.add_compile_task(Task::Transform { doc });
                Ok(())
            }
            Task::Transform { doc } => {
                let code = quire_doc::transform(doc);
                ctx.add_compile_task(Task::WriteCache { code });
                Ok(())
            }
            Task::WriteCache { code } => {
                code.write_cache(ctx.cache_mut())?;
                ctx.cache().save()?;
                Ok(())
            }
            Task::Link { name } => link(ctx, name),
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Scan => write!(f, "scan"),
            Task::Parse { filename } => write!(f, "parse({filename})"),
            Task::Transform { doc } => write!(f, "transform({})", doc.name),
            Task::WriteCache { code } => write!(f, "write_cache({})", code.name),
            Task::Link { name } => write!(f, "link({name})"),
        }
    }
}

fn scan(ctx: &mut BuildContext) -> Result<(), BuildError> {
    let src_dir = ctx.src_dir().to_path_buf();
    let io_err = |source| BuildError::Io {
        path: src_dir.clone(),
        source,
    };

    let mut filenames = Vec::new();
    for entry in std::fs::read_dir(&src_dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(ctx.source_extension()) {
            continue;
        }
        match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => filenames.push(name.to_string()),
            None => return Err(BuildError::NonUtf8FileName { path }),
        }
    }
    filenames.sort();

    let live: BTreeSet<String> = filenames.iter().map(|f| name_prefix(f)).collect();
    let pruned = ctx.cache_mut().prune(DOC_KIND, &live)?;
    if pruned > 0 {
        ctx.cache().save()?;
    }

    for filename in filenames {
        let name = name_prefix(&filename);
        ctx.add_compile_task(Task::Parse { filename });
        ctx.add_link_task(Task::Link { name });
    }
    Ok(())
}

fn link(ctx: &mut BuildContext, name: &str) -> Result<(), BuildError> {
    let lines = quire_doc::link(ctx.cache(), name)?;
    let path = ctx.get_build_path(name, ctx.output_extension());

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| BuildError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
    }
    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(&path, content).map_err(|e| BuildError::Io {
        path: path.clone(),
        source: e,
    })?;

    tracing::info!(file = %path.display(), "written");
    ctx.record_output(path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_config::ResolvedPaths;

    fn ts(n: u64) -> Option<Timestamp> {
        Some(Timestamp::from_nanos(n))
    }

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
    fn absent_output_is_outdated() {
        assert!(is_outdated(ts(1), None));
        assert!(is_outdated(None, None));
    }

    #[test]
    fn absent_input_is_outdated() {
        assert!(is_outdated(None, ts(1)));
    }

    #[test]
    fn newer_input_is_outdated() {
        assert!(is_outdated(ts(2), ts(1)));
    }

    #[test]
    fn equal_timestamps_are_up_to_date() {
        assert!(!is_outdated(ts(5), ts(5)));
    }

    #[test]
    fn older_input_is_up_to_date() {
        assert!(!is_outdated(ts(1), ts(2)));
    }

    #[test]
    fn zero_is_a_real_timestamp() {
        assert!(!is_outdated(ts(0), ts(0)));
    }

    #[test]
    fn display_labels() {
        assert_eq!(Task::Scan.to_string(), "scan");
        assert_eq!(
            Task::Parse { filename: "a.rst".to_string() }.to_string(),
            "parse(a.rst)"
        );
        assert_eq!(Task::Link { name: "a".to_string() }.to_string(), "link(a)");
    }

    #[test]
    fn scan_enqueues_matching_files_sorted() {
        let (_dir, mut ctx) = make_context();
        for name in ["b.rst", "a.rst", "notes.txt"] {
            std::fs::write(ctx.src_dir().join(name), "x\n").unwrap();
        }
        std::fs::create_dir(ctx.src_dir().join("sub.rst")).unwrap();

        Task::Scan.run(&mut ctx).unwrap();
        assert_eq!(ctx.queued(crate::TaskQueue::Compile), 2);
        assert_eq!(ctx.queued(crate::TaskQueue::Link), 2);

        ctx.exec_tasks(crate::TaskQueue::Compile).unwrap();
        let labels: Vec<String> = ctx.executed_tasks().iter().map(|t| t.to_string()).collect();
        assert_eq!(labels[0], "parse(a.rst)");
        assert_eq!(labels[1], "parse(b.rst)");
    }

    #[test]
    fn scan_of_missing_source_dir_errors() {
        let (_dir, mut ctx) = make_context();
        std::fs::remove_dir(ctx.src_dir()).unwrap();
        let err = Task::Scan.run(&mut ctx).unwrap_err();
        assert!(matches!(err, BuildError::Io { .. }));
    }

    #[test]
    fn parse_is_outdated_without_cache_entry() {
        let (_dir, ctx) = make_context();
        std::fs::write(ctx.src_dir().join("a.rst"), "x\n").unwrap();
        let task = Task::Parse { filename: "a.rst".to_string() };
        assert!(task.is_outdated(&ctx).unwrap());
    }

    #[test]
    fn parse_up_to_date_when_cache_equals_source() {
        let (_dir, mut ctx) = make_context();
        let src_path = ctx.src_dir().join("a.rst");
        std::fs::write(&src_path, "x\n").unwrap();
        let doc = quire_doc::parse_file(&src_path).unwrap();
        Task::WriteCache { code: quire_doc::transform(&doc) }
            .run(&mut ctx)
            .unwrap();
        let recorded = ctx.cache().get_code_timestamp(DOC_KIND, "a").unwrap();
        std::fs::File::options()
            .write(true)
            .open(&src_path)
            .unwrap()
            .set_modified(recorded.to_system_time())
            .unwrap();

        let task = Task::Parse { filename: "a.rst".to_string() };
        assert!(!task.is_outdated(&ctx).unwrap());
    }

    #[test]
    fn parse_is_outdated_when_artifact_is_gone() {
        let (_dir, mut ctx) = make_context();
        std::fs::write(ctx.src_dir().join("a.rst"), "x\n").unwrap();
        let src = ctx.get_src_timestamp("a.rst").unwrap();
        let later = Timestamp::from_nanos(src.as_nanos() + 1);
        ctx.cache_mut().record_code_timestamp(DOC_KIND, "a", later);

        let task = Task::Parse { filename: "a.rst".to_string() };
        assert!(task.is_outdated(&ctx).unwrap());
    }

    #[test]
    fn parse_is_outdated_when_artifact_is_corrupt() {
        let (_dir, mut ctx) = make_context();
        std::fs::write(ctx.src_dir().join("a.rst"), "x\n").unwrap();
        let doc = quire_doc::parse_file(&ctx.src_dir().join("a.rst")).unwrap();
        Task::WriteCache { code: quire_doc::transform(&doc) }
            .run(&mut ctx)
            .unwrap();
        let task = Task::Parse { filename: "a.rst".to_string() };
        assert!(!task.is_outdated(&ctx).unwrap());

        let artifact = ctx.cache_dir().join("code").join("doc").join("a.bin");
        std::fs::write(&artifact, b"scrambled").unwrap();
        assert!(task.is_outdated(&ctx).unwrap());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn scan_rejects_non_utf8_file_name() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let (_dir, mut ctx) = make_context();
        let name = OsStr::from_bytes(b"caf\xe9.rst");
        std::fs::write(ctx.src_dir().join(name), "x\n").unwrap();

        let err = Task::Scan.run(&mut ctx).unwrap_err();
        assert!(matches!(err, BuildError::NonUtf8FileName { .. }));
        assert_eq!(ctx.queued(crate::TaskQueue::Compile), 0);
    }

    #[test]
    fn scan_prunes_code_of_deleted_sources() {
        let (_dir, mut ctx) = make_context();
        for name in ["a", "gone"] {
            let doc = quire_doc::parse_str(name, "x\n").unwrap();
            Task::WriteCache { code: quire_doc::transform(&doc) }
                .run(&mut ctx)
                .unwrap();
        }
        std::fs::write(ctx.src_dir().join("a.rst"), "x\n").unwrap();

        Task::Scan.run(&mut ctx).unwrap();
        let cache = ctx.cache();
        assert!(cache.get_code_timestamp(DOC_KIND, "gone").is_none());
        assert!(cache.get_dependencies("gone").is_empty());
        assert!(cache.get_code_timestamp(DOC_KIND, "a").is_some());
        assert_eq!(ctx.queued(crate::TaskQueue::Link), 1);
    }

    #[test]
    fn parse_of_vanished_source_is_not_found() {
        let (_dir, ctx) = make_context();
        let task = Task::Parse { filename: "gone.rst".to_string() };
        assert!(matches!(
            task.is_outdated(&ctx).unwrap_err(),
            BuildError::SourceNotFound { .. }
        ));
    }

    #[test]
    fn link_without_dependencies_is_outdated() {
        let (_dir, ctx) = make_context();
        let task = Task::Link { name: "a".to_string() };
        assert!(task.is_outdated(&ctx).unwrap());
    }

    #[test]
    fn link_staleness_follows_newest_dependency() {
        let (_dir, mut ctx) = make_context();
        std::fs::create_dir_all(ctx.build_dir()).unwrap();
        std::fs::write(ctx.build_dir().join("a.html"), "").unwrap();
        let out = ctx.get_build_timestamp("a.html").unwrap();

        let cache = ctx.cache_mut();
        cache.set_dependencies(
            "a",
            vec![CodeKey::new(DOC_KIND, "a"), CodeKey::new(DOC_KIND, "b")],
        );
        cache.record_code_timestamp(DOC_KIND, "a", out);
        cache.record_code_timestamp(DOC_KIND, "b", out);

        let task = Task::Link { name: "a".to_string() };
        assert!(!task.is_outdated(&ctx).unwrap());

        let bumped = Timestamp::from_nanos(out.as_nanos() + 1);
        ctx.cache_mut().record_code_timestamp(DOC_KIND, "b", bumped);
        assert!(task.is_outdated(&ctx).unwrap());
    }

    #[test]
    fn link_with_missing_output_is_outdated() {
        let (_dir, mut ctx) = make_context();
        ctx.cache_mut()
            .set_dependencies("a", vec![CodeKey::new(DOC_KIND, "a")]);
        ctx.cache_mut()
            .record_code_timestamp(DOC_KIND, "a", Timestamp::from_nanos(1));
        let task = Task::Link { name: "a".to_string() };
        assert!(task.is_outdated(&ctx).unwrap());
    }

    #[test]
    fn write_cache_flushes_store() {
        let (_dir, mut ctx) = make_context();
        let doc = quire_doc::parse_str("a", "A\n=\n").unwrap();
        let task = Task::WriteCache { code: quire_doc::transform(&doc) };
        task.run(&mut ctx).unwrap();
        assert!(ctx.cache_dir().join("manifest.json").exists());
    }
}
