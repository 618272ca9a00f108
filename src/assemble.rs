//! Seam to the document-assembly collaborator.
//!
//! The pipeline resolves everything a document needs (data row, source text,
//! companion statement) into an [`AssemblyJob`]; rendering is up to the
//! [`DocumentAssembler`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyJob {
    pub document_name: String,
    pub segment_file: PathBuf,
    pub segment_text: String,
    pub debtor_name: String,
    pub amount: String,
    pub spelled_out_amount: String,
    pub sequence_index: u32,
    /// Companion statement, when one exists on disk.
    pub statement: Option<PathBuf>,
}

pub trait DocumentAssembler {
    /// Returns the path of the written document.
    fn assemble(&self, job: &AssemblyJob, out_dir: &Path) -> Result<PathBuf>;
}

/// Writes each job as `<document_name>.json` for an external renderer.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManifestAssembler;

impl DocumentAssembler for ManifestAssembler {
    fn assemble(&self, job: &AssemblyJob, out_dir: &Path) -> Result<PathBuf> {
        let path = out_dir.join(format!("{}.json", job.document_name));
        std::fs::write(&path, serde_json::to_string_pretty(job)?)
            .with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }
}
