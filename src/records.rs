//! Tabular record stores shared between pipeline stages.
//!
//! Each store is a CSV file whose header row is the column contract consumed
//! by the next stage (and by the document-assembly collaborator).

use crate::extenso::spell_out_str;
use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::Path;

/// One debt found in a source file by the extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    #[serde(rename = "Arquivo")]
    pub source_file: String,
    #[serde(rename = "Nome")]
    pub debtor_name: String,
    #[serde(rename = "Dívida")]
    pub raw_amount: String,
    /// 1-based, unique within `source_file`, in order of appearance.
    #[serde(rename = "Número da Dívida")]
    pub sequence_index: u32,
    /// Stem of the text segment written for this record.
    #[serde(rename = "Segmento", default)]
    pub segment: String,
}

/// An extracted record after the financial update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecalculatedRecord {
    /// File name of the statement artifact derived for this record.
    #[serde(rename = "Arquivo")]
    pub artifact_file: String,
    #[serde(rename = "Nome")]
    pub debtor_name: String,
    #[serde(rename = "Dívida Atualizada")]
    pub corrected_amount: String,
    #[serde(rename = "Número da Dívida")]
    pub sequence_index: u32,
    /// Text segment the record came from; empty in stores written without it.
    #[serde(rename = "Segmento", default)]
    pub segment: String,
    /// Not stored; recomputed from `corrected_amount` on read.
    #[serde(skip)]
    pub spelled_out_amount: String,
}

pub trait StoreRow: Serialize + DeserializeOwned {
    const HEADERS: &'static [&'static str];
}

impl StoreRow for ExtractedRecord {
    const HEADERS: &'static [&'static str] = &["Arquivo", "Nome", "Dívida", "Número da Dívida", "Segmento"];
}

impl StoreRow for RecalculatedRecord {
    const HEADERS: &'static [&'static str] =
        &["Arquivo", "Nome", "Dívida Atualizada", "Número da Dívida", "Segmento"];
}

pub fn write_store<T: StoreRow>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("create store: {}", path.display()))?;
    if rows.is_empty() {
        wtr.write_record(T::HEADERS)?;
    }
    for row in rows {
        wtr.serialize(row)
            .with_context(|| format!("write row to {}", path.display()))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_store<T: StoreRow>(path: &Path) -> Result<Vec<T>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("open store: {}", path.display()))?;
    let mut rows = Vec::new();
    for (i, row) in rdr.deserialize().enumerate() {
        let row: T = row.with_context(|| format!("row {} of {}", i + 1, path.display()))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Reads the recalculated store and restores the spelled-out amounts.
/// Rows whose amount is a sentinel keep the sentinel as their spelled-out form.
pub fn read_recalculated(path: &Path) -> Result<Vec<RecalculatedRecord>> {
    let mut rows: Vec<RecalculatedRecord> = read_store(path)?;
    for row in &mut rows {
        row.spelled_out_amount =
            spell_out_str(&row.corrected_amount).unwrap_or_else(|| row.corrected_amount.clone());
    }
    Ok(rows)
}
