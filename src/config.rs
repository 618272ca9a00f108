use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global: Global,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub ocr: Ocr,
    #[serde(default)]
    pub extraction: Extraction,
    #[serde(default)]
    pub recalc: Recalc,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub archive: Archive,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Global {
    pub print_summary: bool,
}
impl Default for Global {
    fn default() -> Self {
        Self {
            print_summary: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    /// Scratch intake: source PDFs land here before a run.
    pub intake_dir: String,
    /// Per-record OCR text segments.
    pub text_dir: String,
    /// Per-record recalculation statements.
    pub statements_dir: String,
    /// Assembled document manifests.
    pub documents_dir: String,
    /// Final delivery location for the source files.
    pub delivery_dir: String,
    /// Record stores and the run report.
    pub work_dir: String,
    /// Permanent root for run archives and log files.
    pub log_root: String,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            intake_dir: "extract".into(),
            text_dir: "txts".into(),
            statements_dir: "statements".into(),
            documents_dir: "documents".into(),
            delivery_dir: "delivery".into(),
            work_dir: "work".into(),
            log_root: "logs".into(),
        }
    }
}

impl Paths {
    /// Working directories that are archived and recreated empty at the start of each run.
    pub fn managed_dirs(&self) -> Vec<PathBuf> {
        [
            &self.text_dir,
            &self.statements_dir,
            &self.documents_dir,
            &self.delivery_dir,
            &self.work_dir,
        ]
        .into_iter()
        .map(PathBuf::from)
        .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Ocr {
    pub pdftoppm_exe: String,
    pub tesseract_exe: String,
    pub dpi: u32,
    pub language: String,
}
impl Default for Ocr {
    fn default() -> Self {
        Self {
            pdftoppm_exe: "pdftoppm".into(),
            tesseract_exe: "tesseract".into(),
            dpi: 300,
            language: "por".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Extraction {
    /// Phrase that precedes the debtor name. Matched case-insensitively.
    pub name_anchor: String,
    /// Literal that precedes every monetary amount.
    pub currency_prefix: String,
    pub not_found: String,
}
impl Default for Extraction {
    fn default() -> Self {
        Self {
            name_anchor: "o lado,".into(),
            currency_prefix: "R$".into(),
            not_found: "NÃO ENCONTRADO".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Recalc {
    pub index_rate: f64,
    /// ISO date (`YYYY-MM-DD`) the debt starts accruing.
    pub start_date: String,
    /// ISO date (`YYYY-MM-DD`) the debt is updated to.
    pub end_date: String,
    pub days_per_month: f64,
    pub monthly_interest_rate: f64,
    pub penalty_rate: f64,
}
impl Default for Recalc {
    fn default() -> Self {
        Self {
            index_rate: 0.0617006,
            start_date: "2024-07-31".into(),
            end_date: "2025-04-22".into(),
            days_per_month: 30.44,
            monthly_interest_rate: 0.01,
            penalty_rate: 0.10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub extracted_store: String,
    pub recalculated_store: String,
    pub write_statements: bool,
    pub write_report_json: bool,
    pub report_filename: String,
    pub redact_names: bool,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            extracted_store: "resultado_dados.csv".into(),
            recalculated_store: "dados_atualizados.csv".into(),
            write_statements: true,
            write_report_json: true,
            report_filename: "report.json".into(),
            redact_names: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Archive {
    pub run_dir_prefix: String,
    pub flatten_intake: bool,
}
impl Default for Archive {
    fn default() -> Self {
        Self {
            run_dir_prefix: "run".into(),
            flatten_intake: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: true,
            file_path: "".into(),
        }
    }
}
