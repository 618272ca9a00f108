use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineDiag {
    pub ok: bool,
    pub tools: Vec<ToolDiag>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDiag {
    pub name: String,
    pub exe: String,
    pub version: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// OCR output for one source document. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    /// File name including extension, e.g. `contrato.pdf`.
    pub name: String,
    /// File name without extension.
    pub stem: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let name = name.into();
        let stem = Path::new(&name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.clone());
        Self {
            name,
            stem,
            text: text.into(),
        }
    }

    /// Each page is followed by a line break.
    pub fn from_pages(path: &Path, pages: &[String]) -> Self {
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mut text = String::new();
        for page in pages {
            text.push_str(page);
            text.push('\n');
        }
        Self::new(name, text)
    }
}
