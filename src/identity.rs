//! Artifact naming: per-run occurrence numbering, the companion-name rule
//! and collision-free destinations for file moves.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Splits a trailing `_<digits>` suffix off a stem.
///
/// `"X_2"` -> `("X", Some(2))`, `"X"` -> `("X", None)`. A stem that is only a
/// suffix (`"_3"`) or has a non-numeric tail (`"X_a"`) is returned whole.
pub fn split_suffix(stem: &str) -> (&str, Option<u32>) {
    if let Some((head, tail)) = stem.rsplit_once('_') {
        if !head.is_empty() && !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = tail.parse() {
                return (head, Some(n));
            }
        }
    }
    (stem, None)
}

/// Base name of a stem: the stem with any trailing `_<n>` disambiguation
/// suffix removed. Only one suffix is stripped (`"X_2_3"` -> `"X_2"`).
pub fn base_name(stem: &str) -> &str {
    split_suffix(stem).0
}

/// Name of the companion artifact for a derived artifact name.
///
/// The first occurrence of a base carries no suffix on the companion side,
/// so `"X_1"` maps to `"X"`; every other name maps to itself.
pub fn companion_name(name: &str) -> String {
    match split_suffix(name) {
        (head, Some(1)) => head.to_string(),
        _ => name.to_string(),
    }
}

/// Counts artifacts derived from each base name during one run.
#[derive(Debug, Default, Clone)]
pub struct OccurrenceCounter {
    counts: HashMap<String, u32>,
    issued: HashSet<String>,
}

impl OccurrenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one more artifact for `base` and returns its name together
    /// with whether this was the first occurrence. The first request returns
    /// `base` unchanged, later ones `base_2`, `base_3`, ...
    pub fn next_identity(&mut self, base: &str) -> (String, bool) {
        let (name, first) = self.numbered(base);
        self.issued.insert(name.clone());
        (name, first)
    }

    /// Like [`next_identity`](Self::next_identity), but never repeats a name
    /// already handed out for another base during this run: `"X_2"` issued
    /// as the second `"X"` turns a later base `"X_2"` into `"X_2_1"`.
    pub fn next_unique_identity(&mut self, base: &str) -> String {
        let (name, _) = self.numbered(base);
        if self.issued.insert(name.clone()) {
            return name;
        }
        let mut n = 1u32;
        loop {
            let candidate = format!("{name}_{n}");
            if self.issued.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    fn numbered(&mut self, base: &str) -> (String, bool) {
        let count = self.counts.entry(base.to_string()).or_insert(0);
        *count += 1;
        if *count == 1 {
            (base.to_string(), true)
        } else {
            (format!("{base}_{count}"), false)
        }
    }

    pub fn occurrences(&self, base: &str) -> u32 {
        self.counts.get(base).copied().unwrap_or(0)
    }
}

/// Path inside `dir` for an item called `name` that does not collide with an
/// existing entry. On collision `_1`, `_2`, ... is inserted before the
/// extension until a free name is found.
pub fn unique_destination(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let as_path = Path::new(name);
    let stem = as_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    let ext = as_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n = 1u32;
    loop {
        let candidate = dir.join(format!("{stem}_{n}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}
