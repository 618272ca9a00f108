//! Record extraction from OCR text.
//!
//! The debtor name follows a fixed anchor phrase and ends at the next comma
//! or line break; the first anchor occurrence wins. Every currency-prefixed
//! numeric literal is one debt. The text is cut after each amount so that
//! debt `i` owns the span between the end of amount `i-1` and the end of
//! amount `i`.

use crate::{config, engine::SourceFile, records::ExtractedRecord};
use anyhow::{Context, Result};
use regex::Regex;

/// Byte range of the text that belongs to one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub sequence_index: u32,
    pub start: usize,
    pub end: usize,
    /// Stem of the side artifact that stores this span's text.
    pub artifact_stem: String,
}

impl Segment {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source[self.start..self.end].trim()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub records: Vec<ExtractedRecord>,
    pub segments: Vec<Segment>,
}

pub trait Extractor {
    /// Always yields at least one record.
    fn extract(&self, source: &SourceFile) -> Extraction;
}

pub struct AnchorExtractor {
    name_re: Regex,
    amount_re: Regex,
    not_found: String,
}

impl AnchorExtractor {
    pub fn new(cfg: &config::Extraction) -> Result<Self> {
        let name_re = Regex::new(&format!(
            r"(?i){}\s*(.*?)(?:,|\n)",
            regex::escape(&cfg.name_anchor)
        ))
        .with_context(|| format!("name anchor regex: {:?}", cfg.name_anchor))?;
        let amount_re = Regex::new(&format!(
            r"(?i){}\s*([0-9.,]+)",
            regex::escape(&cfg.currency_prefix)
        ))
        .with_context(|| format!("currency regex: {:?}", cfg.currency_prefix))?;
        Ok(Self {
            name_re,
            amount_re,
            not_found: cfg.not_found.clone(),
        })
    }

    fn debtor_name(&self, text: &str) -> String {
        self.name_re
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.not_found.clone())
    }
}

impl Extractor for AnchorExtractor {
    fn extract(&self, source: &SourceFile) -> Extraction {
        let text = source.text.as_str();
        let debtor_name = self.debtor_name(text);

        let amounts: Vec<_> = self
            .amount_re
            .captures_iter(text)
            .filter_map(|c| {
                let whole = c.get(0)?;
                let value = c.get(1)?;
                Some((whole.end(), value.as_str().trim().trim_end_matches(',').to_string()))
            })
            .collect();

        let mut out = Extraction::default();

        if amounts.is_empty() {
            let artifact_stem = format!("{}_1", source.stem);
            out.records.push(ExtractedRecord {
                source_file: source.name.clone(),
                debtor_name,
                raw_amount: self.not_found.clone(),
                sequence_index: 1,
                segment: artifact_stem.clone(),
            });
            out.segments.push(Segment {
                sequence_index: 1,
                start: 0,
                end: text.len(),
                artifact_stem,
            });
            return out;
        }

        let single = amounts.len() == 1;
        let mut start = 0;
        for (i, (end, raw_amount)) in amounts.into_iter().enumerate() {
            let sequence_index = i as u32 + 1;
            let artifact_stem = if single {
                source.stem.clone()
            } else {
                format!("{}_{}", source.stem, sequence_index)
            };
            out.records.push(ExtractedRecord {
                source_file: source.name.clone(),
                debtor_name: debtor_name.clone(),
                raw_amount,
                sequence_index,
                segment: artifact_stem.clone(),
            });
            out.segments.push(Segment {
                sequence_index,
                start,
                end,
                artifact_stem,
            });
            start = end;
        }
        out
    }
}
