use crate::archive::{ArchiveSummary, DeliverySummary};
use crate::intake::FlattenSummary;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub run_stamp: String,
    pub started: String,
    pub finished: String,
    pub index_rate: f64,
    pub archive: Option<ArchiveSummary>,
    pub intake: Option<FlattenSummary>,
    pub files: Vec<FileReport>,
    pub unparsed: Vec<UnparsedRecord>,
    pub assembly: AssemblyReport,
    pub delivery: Option<DeliverySummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file: String,
    pub sha256: Option<String>,
    pub records: usize,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A record whose principal could not be read; it carries a sentinel amount.
#[derive(Debug, Clone, Serialize)]
pub struct UnparsedRecord {
    pub file: String,
    pub sequence_index: u32,
    pub raw_amount: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AssemblyReport {
    pub documents: Vec<String>,
    pub missing_companions: Vec<String>,
    pub missing_rows: Vec<String>,
    pub duplicate_companions: Vec<String>,
    pub errors: Vec<String>,
}
