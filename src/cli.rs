use crate::{
    archive::{deliver_intake, RunArchiver},
    assemble::ManifestAssembler,
    config::Config,
    engine::{tesseract::TesseractEngine, OcrEngine},
    extenso::spell_out,
    money::{format_amount, parse_amount},
    pipeline::{Pipeline, RunContext},
    util::{ensure_dir, run_stamp},
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "debt-recalc")]
#[command(about = "Debt-confession extraction and recalculation pipeline (OCR + records + archival)")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./debt-recalc.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check the OCR toolchain.
    Doctor {},
    /// OCR the intake PDFs and write the extraction store.
    Extract {},
    /// Recalculate the extraction store.
    Recalc {
        /// Indexation rate for this run, e.g. 0.0617006.
        #[arg(long)]
        index_rate: Option<f64>,
    },
    /// Build document jobs from text segments and statements.
    Assemble {},
    /// Archive the working directories into a run-stamped log directory.
    Archive {},
    /// Move intake items into the delivery directory.
    Deliver {},
    /// Full run: archive, extract, recalc, assemble, deliver.
    Run {
        #[arg(long)]
        index_rate: Option<f64>,
    },
    /// Print an amount in words.
    Spell { amount: String },
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref());
    let cfg = match &cfg_path {
        Some(p) => Config::load(p)?,
        None => Config::default(),
    };
    let log_path = resolve_log_path(&cfg);
    let _guard = init_logging(&args, &cfg, log_path.as_deref())?;
    if let Some(p) = &cfg_path {
        info!("config: {}", p.display());
    }

    match &args.cmd {
        Command::Doctor {} => doctor(&cfg),
        Command::Extract {} => {
            let pipeline = Pipeline::new(&cfg, TesseractEngine::new(&cfg.ocr))?;
            let mut ctx = RunContext::new(cfg.recalc.index_rate);
            pipeline.extract_stage(&mut ctx)?;
            pipeline.write_report(&mut ctx)?;
            Ok(())
        }
        Command::Recalc { index_rate } => {
            let rate = resolve_rate(&cfg, *index_rate)?;
            let pipeline = Pipeline::new(&cfg, TesseractEngine::new(&cfg.ocr))?;
            let mut ctx = RunContext::new(rate);
            pipeline.recalc_stage(&mut ctx)?;
            pipeline.write_report(&mut ctx)?;
            Ok(())
        }
        Command::Assemble {} => {
            let pipeline = Pipeline::new(&cfg, TesseractEngine::new(&cfg.ocr))?;
            let mut ctx = RunContext::new(cfg.recalc.index_rate);
            pipeline.assemble_stage(&mut ctx, &ManifestAssembler)?;
            pipeline.write_report(&mut ctx)?;
            Ok(())
        }
        Command::Archive {} => {
            let mut archiver = RunArchiver::new(
                Path::new(&cfg.paths.log_root),
                &cfg.archive.run_dir_prefix,
                &run_stamp(),
            );
            let summary = archiver.archive_and_reset(&cfg.paths.managed_dirs());
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Command::Deliver {} => {
            let summary = deliver_intake(
                Path::new(&cfg.paths.intake_dir),
                Path::new(&cfg.paths.delivery_dir),
            )?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Command::Run { index_rate } => run(&cfg, resolve_rate(&cfg, *index_rate)?),
        Command::Spell { amount } => {
            let v = parse_amount(amount).ok_or_else(|| anyhow!("not an amount: {amount}"))?;
            println!("R$ {} ({})", format_amount(v), spell_out(v));
            Ok(())
        }
    }
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    ["debt-recalc.toml", "debt-recalc.example.toml"]
        .into_iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

fn resolve_rate(cfg: &Config, cli: Option<f64>) -> Result<f64> {
    let rate = cli.unwrap_or(cfg.recalc.index_rate);
    if !rate.is_finite() || rate <= -1.0 {
        return Err(anyhow!("invalid index rate: {rate}"));
    }
    Ok(rate)
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn doctor(cfg: &Config) -> Result<()> {
    let engine = TesseractEngine::new(&cfg.ocr);
    let diag = engine.doctor()?;
    println!("{}", serde_json::to_string_pretty(&diag)?);
    Ok(())
}

fn run(cfg: &Config, index_rate: f64) -> Result<()> {
    let pipeline = Pipeline::new(cfg, TesseractEngine::new(&cfg.ocr))?;
    let mut ctx = RunContext::new(index_rate);
    info!("run {} index_rate={index_rate}", ctx.stamp);

    let report = pipeline.run(&mut ctx, &ManifestAssembler)?;

    if cfg.global.print_summary {
        let files_ok = report.files.iter().filter(|f| f.ok).count();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "run": report.run_stamp,
                "index_rate": report.index_rate,
                "files_ok": files_ok,
                "files_failed": report.files.len() - files_ok,
                "records": ctx.extracted.len(),
                "unparsed": report.unparsed.len(),
                "documents": report.assembly.documents.len(),
                "missing_companions": report.assembly.missing_companions.len(),
                "status": "ok"
            }))?
        );
    }

    Ok(())
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }

    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }

    Some(PathBuf::from(&cfg.paths.log_root).join("debt-recalc.log"))
}
