//! Target execution: project discovery, logging setup and status output.

use std::path::PathBuf;

use quire_engine::{Project, Target};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::GlobalArgs;

/// Environment variable overriding the log filter.
pub const LOG_ENV: &str = "QUIRE_LOG";

/// Installs the stderr subscriber. `QUIRE_LOG` wins over the CLI flags.
pub fn init_logging(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_level(global)));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

fn default_level(global: &GlobalArgs) -> &'static str {
    if global.verbose {
        "debug"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    }
}

/// Determines the project directory from `--config` or the working directory.
///
/// `--config` may name a `quire.toml` file (its directory is used) or a
/// directory.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_file() {
            Ok(p.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")))
        } else {
            Ok(p)
        }
    } else {
        Ok(std::env::current_dir()?)
    }
}

/// Loads the project configuration and runs `target` on it.
pub fn run(target: Target, global: &GlobalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = quire_config::load_config_or_default(&project_dir)?;
    let paths = quire_config::resolve_paths(&config, &project_dir);
    tracing::debug!(
        src = %paths.src_dir.display(),
        build = %paths.build_dir.display(),
        cache = %paths.cache_dir.display(),
        "resolved project layout"
    );
    let mut project = Project::new(&paths);

    if !global.quiet && target != Target::Clean {
        eprintln!("   Building {}", project.name());
    }
    project.run(target)?;
    report(&project, target, global);
    Ok(())
}

fn report(project: &Project, target: Target, global: &GlobalArgs) {
    if global.quiet {
        return;
    }
    let ctx = project.context();
    if target == Target::Clean {
        eprintln!("   Cleaned up.");
        return;
    }
    if global.verbose {
        for task in ctx.executed_tasks() {
            eprintln!("executed task: {task}");
        }
    }
    for path in ctx.written_outputs() {
        eprintln!("    Written {}", path.display());
    }
    if ctx.written_outputs().is_empty() {
        eprintln!("   Up to date.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn global(config: Option<String>) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            config,
        }
    }

    #[test]
    fn project_root_from_config_file() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("quire.toml");
        fs::write(&config_path, "[project]\nname = \"t\"\n").unwrap();

        let root = resolve_project_root(&global(Some(
            config_path.to_str().unwrap().to_string(),
        )))
        .unwrap();
        assert_eq!(root, tmp.path());
    }

    #[test]
    fn project_root_from_config_dir() {
        let tmp = TempDir::new().unwrap();
        let root =
            resolve_project_root(&global(Some(tmp.path().to_str().unwrap().to_string()))).unwrap();
        assert_eq!(root, tmp.path());
    }

    #[test]
    fn default_levels() {
        let mut g = global(None);
        assert_eq!(default_level(&g), "error");
        g.quiet = false;
        assert_eq!(default_level(&g), "warn");
        g.verbose = true;
        assert_eq!(default_level(&g), "debug");
    }

    #[test]
    fn build_then_clean_through_config_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("quire.toml"),
            "[paths]\nsrc = \"docs\"\n",
        )
        .unwrap();
        fs::create_dir(tmp.path().join("docs")).unwrap();
        fs::write(tmp.path().join("docs").join("index.rst"), "Home\n====\n").unwrap();
        let g = global(Some(tmp.path().to_str().unwrap().to_string()));

        run(Target::Build, &g).unwrap();
        assert!(tmp.path().join("_build").join("index.html").is_file());

        run(Target::Clean, &g).unwrap();
        assert!(!tmp.path().join("_build").exists());
        assert!(!tmp.path().join("_cache").exists());
    }

    #[test]
    fn invalid_config_is_reported() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("quire.toml"), "[paths]\nbuild = \".\"\n").unwrap();
        let g = global(Some(tmp.path().to_str().unwrap().to_string()));
        assert!(run(Target::Build, &g).is_err());
    }
}
