use crate::{
    archive::{deliver_intake, RunArchiver},
    assemble::{AssemblyJob, DocumentAssembler},
    config::Config,
    engine::{read_source, OcrEngine},
    extract::{AnchorExtractor, Extractor},
    identity::{companion_name, unique_destination, OccurrenceCounter},
    intake::{flatten_intake, list_sources},
    recalc::{Breakdown, Recalculator},
    records::{read_recalculated, read_store, write_store, ExtractedRecord, RecalculatedRecord},
    redact::{mask_cpf_in_text, mask_name},
    report::{FileReport, RunReport, UnparsedRecord},
    util::{ensure_dir, hash_file, has_extension, list_dir, now_rfc3339, run_stamp},
};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// State owned by one run. Nothing here outlives the run.
pub struct RunContext {
    pub index_rate: f64,
    pub stamp: String,
    pub extracted: Vec<ExtractedRecord>,
    /// Statement names, keyed by source file stem.
    pub statement_ids: OccurrenceCounter,
    /// Document names, keyed by text segment stem.
    pub document_ids: OccurrenceCounter,
    pub report: RunReport,
}

impl RunContext {
    pub fn new(index_rate: f64) -> Self {
        Self::with_stamp(index_rate, run_stamp())
    }

    pub fn with_stamp(index_rate: f64, stamp: String) -> Self {
        let report = RunReport {
            run_stamp: stamp.clone(),
            started: now_rfc3339(),
            index_rate,
            ..Default::default()
        };
        Self {
            index_rate,
            stamp,
            extracted: Vec::new(),
            statement_ids: OccurrenceCounter::new(),
            document_ids: OccurrenceCounter::new(),
            report,
        }
    }
}

#[derive(Debug, Serialize)]
struct Statement<'a> {
    artifact: &'a str,
    source_file: &'a str,
    debtor_name: &'a str,
    sequence_index: u32,
    principal: &'a str,
    final_amount: &'a str,
    spelled_out_amount: &'a str,
    breakdown: Option<&'a Breakdown>,
}

pub struct Pipeline<E: OcrEngine> {
    cfg: Config,
    engine: E,
    extractor: Box<dyn Extractor>,
}

impl<E: OcrEngine> Pipeline<E> {
    pub fn new(cfg: &Config, engine: E) -> Result<Self> {
        let extractor = AnchorExtractor::new(&cfg.extraction)?;
        Ok(Self {
            cfg: cfg.clone(),
            engine,
            extractor: Box::new(extractor),
        })
    }

    pub fn with_extractor(mut self, extractor: Box<dyn Extractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn extracted_store(&self) -> PathBuf {
        PathBuf::from(&self.cfg.paths.work_dir)
            .join(&self.cfg.output.extracted_store)
    }

    pub fn recalculated_store(&self) -> PathBuf {
        PathBuf::from(&self.cfg.paths.work_dir)
            .join(&self.cfg.output.recalculated_store)
    }

    /// Archives the previous run's working directories and organizes the intake.
    pub fn prepare(&self, ctx: &mut RunContext) -> Result<()> {
        let paths = &self.cfg.paths;
        let mut archiver = RunArchiver::new(
            Path::new(&paths.log_root),
            &self.cfg.archive.run_dir_prefix,
            &ctx.stamp,
        );
        let managed = paths.managed_dirs();
        let summary = archiver.archive_and_reset(&managed);
        for dir in &managed {
            if let Err(err) = ensure_dir(dir) {
                warn!("{err:#}");
            }
        }
        ctx.report.archive = Some(summary);

        ensure_dir(Path::new(&paths.intake_dir))?;
        if self.cfg.archive.flatten_intake {
            ctx.report.intake = Some(flatten_intake(Path::new(&paths.intake_dir))?);
        }
        Ok(())
    }

    /// OCR every intake PDF, split its text into records and write the
    /// extraction store. Returns the number of records written.
    pub fn extract_stage(&self, ctx: &mut RunContext) -> Result<usize> {
        self.engine.check_available()?;

        let text_dir = PathBuf::from(&self.cfg.paths.text_dir);
        ensure_dir(&text_dir)?;
        ensure_dir(&PathBuf::from(&self.cfg.paths.work_dir))?;

        let sources = list_sources(Path::new(&self.cfg.paths.intake_dir))?;
        info!("{} source file(s) in intake", sources.len());

        for input in &sources {
            let file = input
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            info!("processing {file}");
            let sha256 = hash_file(input)
                .map_err(|e| warn!("hashing {file}: {e:#}"))
                .ok();

            let source = match read_source(&self.engine, input) {
                Ok(s) => s,
                Err(err) => {
                    warn!("skipping {file}: {err:#}");
                    ctx.report.files.push(FileReport {
                        file,
                        sha256,
                        records: 0,
                        ok: false,
                        error: Some(format!("{err:#}")),
                    });
                    continue;
                }
            };
            if source.text.trim().is_empty() {
                warn!("{file}: OCR produced no text");
            }

            let mut extraction = self.extractor.extract(&source);
            for seg in &extraction.segments {
                let file_name = format!("{}.txt", seg.artifact_stem);
                let path = unique_destination(&text_dir, &file_name);
                if path != text_dir.join(&file_name) {
                    warn!(
                        "segment {file_name} already written this run; using {}",
                        path.display()
                    );
                    let stem = path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_else(|| seg.artifact_stem.clone());
                    if let Some(rec) = extraction
                        .records
                        .iter_mut()
                        .find(|r| r.sequence_index == seg.sequence_index)
                    {
                        rec.segment = stem;
                    }
                }
                std::fs::write(&path, seg.text(&source.text))
                    .with_context(|| format!("write {}", path.display()))?;
            }
            for rec in &extraction.records {
                debug!(
                    "{} #{}: name={:?} amount={:?}",
                    rec.source_file, rec.sequence_index, rec.debtor_name, rec.raw_amount
                );
            }

            ctx.report.files.push(FileReport {
                file,
                sha256,
                records: extraction.records.len(),
                ok: true,
                error: None,
            });
            ctx.extracted.extend(extraction.records);
        }

        let store = self.extracted_store();
        write_store(&store, &ctx.extracted)?;
        info!("{} record(s) -> {}", ctx.extracted.len(), store.display());
        Ok(ctx.extracted.len())
    }

    /// Recalculates every row of the extraction store with the run's index
    /// rate and writes statements plus the recalculated store.
    pub fn recalc_stage(&self, ctx: &mut RunContext) -> Result<Vec<RecalculatedRecord>> {
        let rows: Vec<ExtractedRecord> = read_store(&self.extracted_store())?;
        let recalculator = Recalculator::new(
            &self.cfg.recalc,
            ctx.index_rate,
            &self.cfg.extraction.not_found,
        )?;
        info!(
            "recalculating {} record(s): index_rate={} elapsed_days={}",
            rows.len(),
            recalculator.index_rate(),
            recalculator.elapsed_days()
        );

        let statements_dir = PathBuf::from(&self.cfg.paths.statements_dir);
        ensure_dir(&statements_dir)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let stem = Path::new(&row.source_file)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| row.source_file.clone());
            let artifact = ctx.statement_ids.next_unique_identity(&stem);
            let artifact_file = format!("{artifact}.json");

            let result = recalculator.recalculate(row, &artifact_file);
            if result.breakdown.is_none() {
                warn!(
                    "{} #{}: unreadable amount {:?}; not recalculated",
                    row.source_file, row.sequence_index, row.raw_amount
                );
                ctx.report.unparsed.push(UnparsedRecord {
                    file: row.source_file.clone(),
                    sequence_index: row.sequence_index,
                    raw_amount: row.raw_amount.clone(),
                });
            }

            if self.cfg.output.write_statements {
                let statement = Statement {
                    artifact: &artifact,
                    source_file: &row.source_file,
                    debtor_name: &row.debtor_name,
                    sequence_index: row.sequence_index,
                    principal: &row.raw_amount,
                    final_amount: &result.record.corrected_amount,
                    spelled_out_amount: &result.record.spelled_out_amount,
                    breakdown: result.breakdown.as_ref(),
                };
                let path = statements_dir.join(&artifact_file);
                std::fs::write(&path, serde_json::to_string_pretty(&statement)?)
                    .with_context(|| format!("write {}", path.display()))?;
            }
            out.push(result.record);
        }

        let store = self.recalculated_store();
        write_store(&store, &out)?;
        info!("{} record(s) -> {}", out.len(), store.display());
        Ok(out)
    }

    /// Hands one job per text segment to the assembler. Missing statements
    /// and data rows are reported, never fatal; a statement claimed by two
    /// segments is assembled once.
    pub fn assemble_stage<A: DocumentAssembler>(
        &self,
        ctx: &mut RunContext,
        assembler: &A,
    ) -> Result<usize> {
        let rows = read_recalculated(&self.recalculated_store())?;
        let text_dir = PathBuf::from(&self.cfg.paths.text_dir);
        let statements_dir = PathBuf::from(&self.cfg.paths.statements_dir);
        let documents_dir = PathBuf::from(&self.cfg.paths.documents_dir);
        ensure_dir(&documents_dir)?;

        let mut claimed = HashSet::new();
        let mut written = 0;
        for name in list_dir(&text_dir)? {
            let segment_file = text_dir.join(&name);
            if !has_extension(&segment_file, "txt") {
                continue;
            }
            let Some(stem) = segment_file.file_stem().map(|s| s.to_string_lossy().into_owned())
            else {
                continue;
            };
            let document_name = ctx.document_ids.next_unique_identity(&stem);

            // Rows name their segment; stores without that column fall back
            // to the companion rule.
            let companion = companion_name(&document_name);
            let Some(row) = rows.iter().find(|r| r.segment == stem).or_else(|| {
                rows.iter().find(|r| {
                    r.segment.is_empty() && r.artifact_file.trim_end_matches(".json") == companion
                })
            }) else {
                warn!("no recalculated row for {name}; skipped");
                ctx.report.assembly.missing_rows.push(name);
                continue;
            };
            if !claimed.insert(row.artifact_file.clone()) {
                warn!(
                    "statement {} already claimed; document {document_name} skipped",
                    row.artifact_file
                );
                ctx.report
                    .assembly
                    .duplicate_companions
                    .push(document_name);
                continue;
            }

            let statement = statements_dir.join(&row.artifact_file);
            let statement = if statement.exists() {
                Some(statement)
            } else {
                warn!(
                    "no statement {} for document {document_name}",
                    row.artifact_file
                );
                ctx.report.assembly.missing_companions.push(document_name.clone());
                None
            };

            let mut segment_text = std::fs::read_to_string(&segment_file)
                .with_context(|| format!("read {}", segment_file.display()))?;
            let mut debtor_name = row.debtor_name.clone();
            if self.cfg.output.redact_names {
                debtor_name = mask_name(&debtor_name);
                segment_text = mask_cpf_in_text(&segment_text);
            }

            let job = AssemblyJob {
                document_name: document_name.clone(),
                segment_file,
                segment_text,
                debtor_name,
                amount: row.corrected_amount.clone(),
                spelled_out_amount: row.spelled_out_amount.clone(),
                sequence_index: row.sequence_index,
                statement,
            };
            match assembler.assemble(&job, &documents_dir) {
                Ok(path) => {
                    debug!("assembled {}", path.display());
                    ctx.report.assembly.documents.push(document_name);
                    written += 1;
                }
                Err(err) => {
                    warn!("assembling {document_name} failed: {err:#}");
                    ctx.report
                        .assembly
                        .errors
                        .push(format!("{document_name}: {err:#}"));
                }
            }
        }
        info!("{written} document(s) assembled");
        Ok(written)
    }

    pub fn deliver_stage(&self, ctx: &mut RunContext) -> Result<()> {
        let summary = deliver_intake(
            Path::new(&self.cfg.paths.intake_dir),
            Path::new(&self.cfg.paths.delivery_dir),
        )?;
        ctx.report.delivery = Some(summary);
        Ok(())
    }

    pub fn write_report(&self, ctx: &mut RunContext) -> Result<Option<PathBuf>> {
        ctx.report.finished = now_rfc3339();
        if !self.cfg.output.write_report_json {
            return Ok(None);
        }
        let dir = PathBuf::from(&self.cfg.paths.work_dir);
        ensure_dir(&dir)?;
        let path = dir.join(&self.cfg.output.report_filename);
        std::fs::write(&path, serde_json::to_string_pretty(&ctx.report)?)
            .with_context(|| format!("write {}", path.display()))?;
        Ok(Some(path))
    }

    /// One full run: archive, extract, recalculate, assemble, deliver.
    pub fn run<A: DocumentAssembler>(
        &self,
        ctx: &mut RunContext,
        assembler: &A,
    ) -> Result<RunReport> {
        self.prepare(ctx)?;
        self.extract_stage(ctx)?;
        self.recalc_stage(ctx)?;
        self.assemble_stage(ctx, assembler)?;
        self.deliver_stage(ctx)?;
        self.write_report(ctx)?;
        Ok(ctx.report.clone())
    }
}
