use super::{types::*, OcrEngine};
use crate::{config, util::has_extension};
use anyhow::{anyhow, bail, Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;
use tracing::debug;

/// `pdftoppm` rasterizes each page to PNG, `tesseract` reads each image.
pub struct TesseractEngine {
    cfg: config::Ocr,
}

impl TesseractEngine {
    pub fn new(cfg: &config::Ocr) -> Self {
        Self { cfg: cfg.clone() }
    }

    fn tools(&self) -> [(&'static str, &str, &'static str); 2] {
        [
            ("pdftoppm", self.cfg.pdftoppm_exe.as_str(), "-v"),
            ("tesseract", self.cfg.tesseract_exe.as_str(), "--version"),
        ]
    }

    fn rasterize(&self, input: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
        let prefix = out_dir.join("page");
        let output = run_tool(
            "pdftoppm",
            Command::new(&self.cfg.pdftoppm_exe)
                .args(["-png", "-r", &self.cfg.dpi.to_string()])
                .arg(input)
                .arg(&prefix),
        )?;
        if !output.status.success() {
            bail!(
                "pdftoppm failed for {}: {}",
                input.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        // page-1.png .. page-N.png, zero-padded to a common width per document
        let mut images: Vec<PathBuf> = std::fs::read_dir(out_dir)
            .with_context(|| format!("read_dir {}", out_dir.display()))?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| has_extension(p, "png"))
            .collect();
        images.sort();
        if images.is_empty() {
            bail!("pdftoppm produced no pages for {}", input.display());
        }
        Ok(images)
    }

    fn recognize(&self, image: &Path) -> Result<String> {
        let output = run_tool(
            "tesseract",
            Command::new(&self.cfg.tesseract_exe)
                .arg(image)
                .arg("stdout")
                .args(["-l", &self.cfg.language]),
        )?;
        if !output.status.success() {
            bail!(
                "tesseract failed on {}: {}",
                image.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn run_tool(name: &str, cmd: &mut Command) -> Result<Output> {
    debug!("spawn {name}: {:?}", cmd);
    match cmd.output() {
        Ok(out) => Ok(out),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(anyhow!("{name} not found (is it installed and on PATH?)"))
        }
        Err(e) => Err(e).with_context(|| format!("spawning {name}")),
    }
}

fn first_line(out: &Output) -> Option<String> {
    let stdout = String::from_utf8_lossy(&out.stdout);
    let stderr = String::from_utf8_lossy(&out.stderr);
    stdout
        .lines()
        .chain(stderr.lines())
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}

impl OcrEngine for TesseractEngine {
    fn doctor(&self) -> Result<EngineDiag> {
        let mut tools = Vec::new();
        for (name, exe, version_arg) in self.tools() {
            let diag = match run_tool(name, Command::new(exe).arg(version_arg)) {
                Ok(out) => ToolDiag {
                    name: name.into(),
                    exe: exe.into(),
                    version: first_line(&out),
                    error: None,
                },
                Err(e) => ToolDiag {
                    name: name.into(),
                    exe: exe.into(),
                    version: None,
                    error: Some(format!("{e:#}")),
                },
            };
            tools.push(diag);
        }
        let ok = tools.iter().all(|t| t.error.is_none());
        Ok(EngineDiag { ok, tools })
    }

    fn check_available(&self) -> Result<()> {
        for (name, exe, version_arg) in self.tools() {
            run_tool(name, Command::new(exe).arg(version_arg))
                .with_context(|| format!("OCR toolchain unavailable ({exe})"))?;
        }
        Ok(())
    }

    fn page_texts(&self, input: &Path) -> Result<Vec<String>> {
        let scratch = TempDir::new().with_context(|| "creating page scratch dir")?;
        let images = self.rasterize(input, scratch.path())?;
        debug!("{} page image(s) for {}", images.len(), input.display());
        images.iter().map(|img| self.recognize(img)).collect()
    }
}
