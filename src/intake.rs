use crate::{
    identity::unique_destination,
    util::{has_extension, is_empty_dir, list_dir, move_path},
};
use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

pub fn strip_accents(s: &str) -> String {
    s.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FlattenSummary {
    pub moved: usize,
    pub removed_dirs: usize,
    pub errors: Vec<String>,
}

/// Pulls PDFs out of first-level subdirectories into the intake root,
/// dropping diacritics from their names. Subdirectories left empty are removed.
pub fn flatten_intake(intake: &Path) -> Result<FlattenSummary> {
    let mut summary = FlattenSummary::default();
    if !intake.is_dir() {
        warn!("intake {} not found; nothing to organize", intake.display());
        return Ok(summary);
    }

    for sub in list_dir(intake)? {
        let sub_path = intake.join(&sub);
        if !sub_path.is_dir() {
            continue;
        }
        for name in list_dir(&sub_path)? {
            let src = sub_path.join(&name);
            if !src.is_file() || !has_extension(&src, "pdf") {
                continue;
            }
            let dst = unique_destination(intake, &strip_accents(&name));
            match move_path(&src, &dst) {
                Ok(()) => {
                    info!("{sub}/{name} -> {}", dst.display());
                    summary.moved += 1;
                }
                Err(err) => {
                    warn!("could not move {}: {err:#}", src.display());
                    summary.errors.push(format!("{sub}/{name}: {err:#}"));
                }
            }
        }

        if is_empty_dir(&sub_path)? {
            match std::fs::remove_dir(&sub_path) {
                Ok(()) => summary.removed_dirs += 1,
                Err(err) => warn!("could not remove {}: {err}", sub_path.display()),
            }
        } else {
            warn!("{} not empty after organizing; left in place", sub_path.display());
        }
    }

    Ok(summary)
}

/// PDF files directly inside `dir`, sorted by name.
pub fn list_sources(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    Ok(list_dir(dir)?
        .into_iter()
        .map(|n| dir.join(n))
        .filter(|p| p.is_file() && has_extension(p, "pdf"))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_diacritics() {
        assert_eq!(strip_accents("Confissão João Açaí.pdf"), "Confissao Joao Acai.pdf");
    }
}
