//! Customer export: churn-score range filter and CSV serialization.
//!
//! Everything here is pure given (records, range, now). The only side
//! effect is `ExportArtifact::write_to`, which the caller invokes at the
//! boundary to save the file.

use crate::{
    config::ExportConfig,
    customer::{ChurnScore, CustomerRecord, CHURN_SCORE_MAX, CHURN_SCORE_MIN},
    error::DeskResult,
};
use chrono::{
    format::{Item, StrftimeItems},
    DateTime, NaiveDate, Utc,
};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};

pub const CONTENT_TYPE: &str = "text/csv";

pub const EXPORT_HEADERS: [&str; 13] = [
    "Company Name",
    "Contact Name",
    "Email",
    "Phone",
    "Subscription Status",
    "Subscription Plan",
    "Subscription Amount",
    "Currency",
    "Net Payment",
    "Total Unpaid",
    "Churn Score",
    "Billing Address",
    "Created At",
];

// ── Score range ──────────────────────────────────────────────────────────────

/// Inclusive churn-score bounds. `None` leaves that side open.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ScoreRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min: Some(min), max: Some(max) }
    }

    pub fn full() -> Self {
        Self::new(CHURN_SCORE_MIN, CHURN_SCORE_MAX)
    }

    /// Bounds as typed into the export form. A blank or unparseable
    /// bound (including NaN and infinities) leaves that side open.
    pub fn from_inputs(min: &str, max: &str) -> Self {
        Self { min: parse_bound(min), max: parse_bound(max) }
    }

    /// `min > max` is an empty range, not an error.
    pub fn contains(&self, score: ChurnScore) -> bool {
        let s = score.value();
        self.min.map_or(true, |min| s >= min) && self.max.map_or(true, |max| s <= max)
    }
}

impl Default for ScoreRange {
    fn default() -> Self {
        Self::full()
    }
}

fn parse_bound(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

// ── Filter ───────────────────────────────────────────────────────────────────

pub fn filter<'a, I>(records: I, range: &ScoreRange) -> Vec<&'a CustomerRecord>
where
    I: IntoIterator<Item = &'a CustomerRecord>,
{
    records.into_iter().filter(|c| range.contains(c.churn_score)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPreview {
    pub selected: usize,
    pub total:    usize,
}

impl fmt::Display for ExportPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} customers will be exported", self.selected, self.total)
    }
}

pub fn preview(records: &[&CustomerRecord], range: &ScoreRange) -> ExportPreview {
    ExportPreview {
        selected: records.iter().filter(|c| range.contains(c.churn_score)).count(),
        total:    records.len(),
    }
}

// ── Serialization ────────────────────────────────────────────────────────────

/// Reject a chrono format string that cannot render, before any row needs it.
pub fn check_date_format(created_at_format: &str) -> DeskResult<()> {
    if StrftimeItems::new(created_at_format).any(|item| matches!(item, Item::Error)) {
        return Err(anyhow::anyhow!("invalid created_at format '{created_at_format}'").into());
    }
    Ok(())
}

/// Header row (unquoted) followed by one fully quoted row per record.
/// Embedded quotes are doubled. Each line ends with '\n'.
pub fn to_delimited_text(records: &[&CustomerRecord], created_at_format: &str) -> DeskResult<String> {
    check_date_format(created_at_format)?;

    let mut header = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    header.write_record(EXPORT_HEADERS)?;
    let buf = header.into_inner().map_err(|e| e.into_error())?;

    let mut rows = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(buf);
    for record in records {
        rows.write_record(export_row(record, created_at_format)?)?;
    }
    let buf = rows.into_inner().map_err(|e| e.into_error())?;

    String::from_utf8(buf).map_err(|e| anyhow::anyhow!("export is not valid UTF-8: {e}").into())
}

fn export_row(c: &CustomerRecord, created_at_format: &str) -> DeskResult<[String; 13]> {
    let mut created_at = String::new();
    write!(created_at, "{}", c.created_at.format(created_at_format))
        .map_err(|_| anyhow::anyhow!("invalid created_at format '{created_at_format}'"))?;

    Ok([
        c.company_name.clone(),
        c.contact_name.clone(),
        c.email.clone(),
        c.phone.clone().unwrap_or_default(),
        c.subscription_status.clone(),
        c.subscription_plan.clone().unwrap_or_default(),
        c.subscription_amount.to_string(),
        c.currency.clone(),
        c.net_payment.to_string(),
        c.total_unpaid.to_string(),
        c.churn_score.to_string(),
        c.billing_address.clone().unwrap_or_default(),
        created_at,
    ])
}

/// `<prefix>_YYYY-MM-DD.csv`
pub fn export_filename(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}_{}.csv", date.format("%Y-%m-%d"))
}

// ── Artifact ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportArtifact {
    pub filename:     String,
    pub content_type: String,
    pub body:         String,
    pub row_count:    usize,
}

impl ExportArtifact {
    /// Save into `dir` (created if missing). Returns the written path.
    pub fn write_to(&self, dir: &Path) -> DeskResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.body)?;
        log::info!("export: wrote {} rows to {}", self.row_count, path.display());
        Ok(path)
    }
}

pub fn build_export<'a, I>(
    records: I,
    range: &ScoreRange,
    now: DateTime<Utc>,
    config: &ExportConfig,
) -> DeskResult<ExportArtifact>
where
    I: IntoIterator<Item = &'a CustomerRecord>,
{
    let selected = filter(records, range);
    let body = to_delimited_text(&selected, &config.created_at_format)?;
    let filename = export_filename(&config.filename_prefix, now.date_naive());

    log::debug!("export: {} rows selected for {filename} (range={range:?})", selected.len());

    Ok(ExportArtifact {
        filename,
        content_type: CONTENT_TYPE.into(),
        body,
        row_count: selected.len(),
    })
}
