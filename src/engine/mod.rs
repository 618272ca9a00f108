pub mod tesseract;
pub mod types;

use anyhow::Result;
use std::path::Path;

pub use types::{EngineDiag, SourceFile, ToolDiag};

/// Rasterizer + OCR collaborator: turns a source document into page texts.
pub trait OcrEngine {
    fn doctor(&self) -> Result<EngineDiag>;
    /// Fails when a required external tool is missing entirely.
    fn check_available(&self) -> Result<()>;
    /// Plain text of every page, in page order.
    fn page_texts(&self, input: &Path) -> Result<Vec<String>>;
}

/// Runs the engine over one file and concatenates its pages into a [`SourceFile`].
pub fn read_source<E: OcrEngine + ?Sized>(engine: &E, input: &Path) -> Result<SourceFile> {
    let pages = engine.page_texts(input)?;
    Ok(SourceFile::from_pages(input, &pages))
}
