//! Debt update: indexation, simple monthly interest, then a penalty on the
//! updated total. Every step is rounded to cents before the next one uses it.

use crate::{
    config,
    extenso::spell_out,
    money::{format_amount, parse_amount, round_cents},
    records::{ExtractedRecord, RecalculatedRecord},
};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use time::{macros::format_description, Date};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub principal: f64,
    pub index_rate: f64,
    pub corrected: f64,
    pub interest: f64,
    pub updated_total: f64,
    pub penalty: f64,
    pub final_total: f64,
    pub elapsed_days: i64,
    pub elapsed_months: f64,
}

#[derive(Debug, Clone)]
pub struct Recalculation {
    pub record: RecalculatedRecord,
    /// `None` when the principal could not be parsed.
    pub breakdown: Option<Breakdown>,
}

#[derive(Debug, Clone)]
pub struct Recalculator {
    index_rate: f64,
    monthly_interest_rate: f64,
    penalty_rate: f64,
    elapsed_days: i64,
    elapsed_months: f64,
    not_found: String,
}

fn parse_date(raw: &str) -> Result<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("invalid date (want YYYY-MM-DD): {raw:?}"))
}

impl Recalculator {
    /// `index_rate` is the run-wide indexation rate; it is fixed for the
    /// lifetime of the recalculator.
    pub fn new(cfg: &config::Recalc, index_rate: f64, not_found: &str) -> Result<Self> {
        let start = parse_date(&cfg.start_date)?;
        let end = parse_date(&cfg.end_date)?;
        if end < start {
            bail!("recalc.end_date {end} is before recalc.start_date {start}");
        }
        if cfg.days_per_month <= 0.0 {
            bail!("recalc.days_per_month must be positive");
        }
        let elapsed_days = (end - start).whole_days();
        Ok(Self {
            index_rate,
            monthly_interest_rate: cfg.monthly_interest_rate,
            penalty_rate: cfg.penalty_rate,
            elapsed_days,
            elapsed_months: elapsed_days as f64 / cfg.days_per_month,
            not_found: not_found.to_string(),
        })
    }

    pub fn index_rate(&self) -> f64 {
        self.index_rate
    }

    pub fn elapsed_days(&self) -> i64 {
        self.elapsed_days
    }

    pub fn breakdown(&self, principal: f64) -> Breakdown {
        let corrected = round_cents(principal * (1.0 + self.index_rate));
        let interest = round_cents(corrected * self.monthly_interest_rate * self.elapsed_months);
        let updated_total = round_cents(corrected + interest);
        let penalty = round_cents(updated_total * self.penalty_rate);
        let final_total = round_cents(updated_total + penalty);
        Breakdown {
            principal,
            index_rate: self.index_rate,
            corrected,
            interest,
            updated_total,
            penalty,
            final_total,
            elapsed_days: self.elapsed_days,
            elapsed_months: self.elapsed_months,
        }
    }

    /// Updates one record. An unparseable principal does not fail: the
    /// result carries the not-found sentinel as its amount.
    pub fn recalculate(&self, record: &ExtractedRecord, artifact_file: &str) -> Recalculation {
        let breakdown = parse_amount(&record.raw_amount).map(|p| self.breakdown(p));
        let (corrected_amount, spelled_out_amount) = match &breakdown {
            Some(b) => (format_amount(b.final_total), spell_out(b.final_total)),
            None => (self.not_found.clone(), self.not_found.clone()),
        };
        Recalculation {
            record: RecalculatedRecord {
                artifact_file: artifact_file.to_string(),
                debtor_name: record.debtor_name.clone(),
                corrected_amount,
                sequence_index: record.sequence_index,
                segment: record.segment.clone(),
                spelled_out_amount,
            },
            breakdown,
        }
    }
}
