//! Run-scoped archival of working directories and final delivery of intake
//! items.
//!
//! Working directories must start every run empty. Their previous contents
//! are moved under `<log_root>/<prefix>_<stamp>/<dir name>/`, one stamp per
//! run, and the directory is recreated. Nothing here aborts a run: failures
//! are logged and collected in the returned summaries.

use crate::{
    identity::unique_destination,
    util::{ensure_dir, is_empty_dir, list_dir, move_path},
};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Default, Serialize)]
pub struct ArchiveSummary {
    /// Set only when at least one directory was archived.
    pub run_dir: Option<PathBuf>,
    pub archived: Vec<ArchivedDir>,
    /// Absent or already-empty directories.
    pub untouched: Vec<PathBuf>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchivedDir {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub moved: usize,
    pub failed: usize,
    /// Leftovers had to be force-removed before recreating the directory.
    pub forced_cleanup: bool,
}

/// Moves one item to its archive destination.
pub type Mover = fn(&Path, &Path) -> Result<()>;

pub struct RunArchiver {
    log_root: PathBuf,
    run_dir_name: String,
    run_dir: Option<PathBuf>,
    mover: Mover,
}

impl RunArchiver {
    pub fn new(log_root: &Path, prefix: &str, stamp: &str) -> Self {
        Self {
            log_root: log_root.to_path_buf(),
            run_dir_name: format!("{prefix}_{stamp}"),
            run_dir: None,
            mover: move_path,
        }
    }

    pub fn with_mover(mut self, mover: Mover) -> Self {
        self.mover = mover;
        self
    }

    /// Created on first use so that a run with nothing to archive leaves no trace.
    fn run_dir(&mut self) -> Result<PathBuf> {
        if let Some(dir) = &self.run_dir {
            return Ok(dir.clone());
        }
        ensure_dir(&self.log_root)?;
        let dir = unique_destination(&self.log_root, &self.run_dir_name);
        ensure_dir(&dir)?;
        info!("run archive: {}", dir.display());
        self.run_dir = Some(dir.clone());
        Ok(dir)
    }

    pub fn archive_and_reset(&mut self, dirs: &[PathBuf]) -> ArchiveSummary {
        let mut summary = ArchiveSummary::default();
        for dir in dirs {
            match self.archive_one(dir) {
                Ok(Some(done)) => summary.archived.push(done),
                Ok(None) => summary.untouched.push(dir.clone()),
                Err(err) => {
                    error!("archiving {} failed: {err:#}", dir.display());
                    summary.errors.push(format!("{}: {err:#}", dir.display()));
                }
            }
        }
        summary.run_dir = self.run_dir.clone();
        summary
    }

    fn archive_one(&mut self, dir: &Path) -> Result<Option<ArchivedDir>> {
        if !dir.is_dir() {
            debug!("{} not found; nothing to archive", dir.display());
            return Ok(None);
        }
        if is_empty_dir(dir)? {
            debug!("{} is empty; nothing to archive", dir.display());
            return Ok(None);
        }

        let run_dir = self.run_dir()?;
        let label = dir
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dir".to_string());
        let destination = unique_destination(&run_dir, &label);
        ensure_dir(&destination)?;

        let mut moved = 0;
        let mut failed = 0;
        for name in list_dir(dir)? {
            let src = dir.join(&name);
            match (self.mover)(&src, &destination.join(&name)) {
                Ok(()) => moved += 1,
                Err(err) => {
                    failed += 1;
                    warn!("could not archive {}: {err:#}", src.display());
                }
            }
        }
        info!(
            "archived {moved} item(s) from {} to {}",
            dir.display(),
            destination.display()
        );

        let forced_cleanup = !is_empty_dir(dir)?;
        if forced_cleanup {
            warn!(
                "{} still has items after archiving; removing them",
                dir.display()
            );
            std::fs::remove_dir_all(dir)
                .with_context(|| format!("forced removal of {}", dir.display()))?;
        }
        ensure_dir(dir)?;

        Ok(Some(ArchivedDir {
            source: dir.to_path_buf(),
            destination,
            moved,
            failed,
            forced_cleanup,
        }))
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeliverySummary {
    pub delivered: Vec<PathBuf>,
    /// Files that had to take a suffixed name at the destination.
    pub renamed: usize,
    /// Intake subdirectories already present at the destination.
    pub skipped_dirs: Vec<String>,
    pub errors: Vec<String>,
}

/// Moves every item of `intake` into `delivery`. Files that collide get a
/// numeric suffix; directories that collide are skipped, never merged.
pub fn deliver_intake(intake: &Path, delivery: &Path) -> Result<DeliverySummary> {
    let mut summary = DeliverySummary::default();
    if !intake.is_dir() {
        info!("intake {} not found; nothing to deliver", intake.display());
        return Ok(summary);
    }
    let items = list_dir(intake)?;
    if items.is_empty() {
        info!("intake {} is empty; nothing to deliver", intake.display());
        return Ok(summary);
    }
    ensure_dir(delivery)?;

    for name in items {
        let src = intake.join(&name);
        let mut dst = delivery.join(&name);
        if dst.exists() {
            if src.is_dir() {
                warn!(
                    "{name} (directory) already exists in {}; not merged",
                    delivery.display()
                );
                summary.skipped_dirs.push(name);
                continue;
            }
            dst = unique_destination(delivery, &name);
            info!("{name} already delivered; renamed to {}", dst.display());
            summary.renamed += 1;
        }
        match move_path(&src, &dst) {
            Ok(()) => {
                debug!("delivered {} -> {}", src.display(), dst.display());
                summary.delivered.push(dst);
            }
            Err(err) => {
                warn!("could not deliver {}: {err:#}", src.display());
                summary.errors.push(format!("{name}: {err:#}"));
            }
        }
    }

    info!(
        "delivered {} item(s) from {} to {}",
        summary.delivered.len(),
        intake.display(),
        delivery.display()
    );
    Ok(summary)
}
