use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};

/// Keeps the local data repository in step with its remote.
///
/// Fetchers call `fetch_and_merge` before reading state and
/// `add_and_commit` + `push` after writing it.
pub trait RepoSync {
    fn fetch_and_merge(&self) -> Result<()>;
    fn add_and_commit(&self, paths: &[&Path], message: &str) -> Result<()>;
    fn push(&self) -> Result<()>;
}

/// `RepoSync` backed by the `git` command line
#[derive(Debug, Clone)]
pub struct GitRepo {
    dir: PathBuf,
    remote: String,
    branch: String,
}

impl GitRepo {
    pub fn new<P: Into<PathBuf>>(dir: P, branch: &str) -> GitRepo {
        GitRepo {
            dir: dir.into(),
            remote: "origin".to_string(),
            branch: branch.to_string(),
        }
    }

    /// Express `path` relative to the repository so git resolves it from `dir`.
    ///
    /// Paths outside the repository are passed through for git to reject.
    pub fn repo_relative<'a>(&self, path: &'a Path) -> &'a Path {
        match path.strip_prefix(&self.dir) {
            Ok(relative) if relative.as_os_str().is_empty() => Path::new("."),
            Ok(relative) => relative,
            Err(_) => path,
        }
    }

    fn command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(&self.dir);
        cmd
    }

    fn run<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = self.command(args);
        let display = format!("{:?}", cmd);
        let output = cmd
            .output()
            .with_context(|| format!("Failed to execute {}. Is git installed?", display))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("{} failed: {}", display, stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn has_staged_changes(&self) -> Result<bool> {
        let status = self
            .command(["diff", "--cached", "--quiet"])
            .status()
            .context("Failed to execute 'git diff --cached'")?;

        // --quiet exits 1 when there are differences
        match status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => bail!("git diff --cached failed with {}", status),
        }
    }
}

impl RepoSync for GitRepo {
    fn fetch_and_merge(&self) -> Result<()> {
        log::info!("Fetching and merging {}/{}", self.remote, self.branch);
        self.run(["fetch", self.remote.as_str()])?;

        let remote_ref = format!("{}/{}", self.remote, self.branch);
        let summary = self.run(["merge", remote_ref.as_str(), "--allow-unrelated-histories"])?;
        log::info!("Merge result: {}", summary);
        Ok(())
    }

    fn add_and_commit(&self, paths: &[&Path], message: &str) -> Result<()> {
        let mut add_args: Vec<&OsStr> = vec![OsStr::new("add"), OsStr::new("--")];
        add_args.extend(paths.iter().map(|p| self.repo_relative(p).as_os_str()));
        self.run(add_args)?;

        if !self.has_staged_changes()? {
            log::info!("No changes to commit");
            return Ok(());
        }

        self.run(["commit", "-m", message])?;
        log::info!("Committed: {}", message);
        Ok(())
    }

    fn push(&self) -> Result<()> {
        self.run(["push", self.remote.as_str(), self.branch.as_str()])?;
        log::info!("Pushed to {}/{}", self.remote, self.branch);
        Ok(())
    }
}

/// `RepoSync` that only logs, for local runs without a remote
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipSync;

impl RepoSync for SkipSync {
    fn fetch_and_merge(&self) -> Result<()> {
        log::info!("Git sync disabled, skipping fetch and merge");
        Ok(())
    }

    fn add_and_commit(&self, paths: &[&Path], _message: &str) -> Result<()> {
        for path in paths {
            log::info!("Git sync disabled, not committing {}", path.display());
        }
        Ok(())
    }

    fn push(&self) -> Result<()> {
        log::info!("Git sync disabled, skipping push");
        Ok(())
    }
}
