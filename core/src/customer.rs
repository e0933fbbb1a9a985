//! Customer records as delivered by the external data service.
//!
//! The desk never creates or mutates these; it only reads snapshots.
//! The one normalisation applied at ingestion is churn-score clamping,
//! see [`ChurnScore::new`].

use crate::types::{CurrencyCode, CustomerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

pub const CHURN_SCORE_MIN: f64 = 0.0;
pub const CHURN_SCORE_MAX: f64 = 100.0;

// ── Churn score ──────────────────────────────────────────────────────────────

/// Likelihood-to-cancel percentage, always within [0, 100].
///
/// Deserializes leniently: a number, numeric text, or null/absent
/// (which becomes 0). See [`ChurnScore::from_raw`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
#[serde(into = "f64")]
pub struct ChurnScore(f64);

impl ChurnScore {
    /// Clamp `raw` into [0, 100]. Non-finite input becomes 0.
    pub fn new(raw: f64) -> Self {
        if raw.is_nan() {
            log::warn!("churn score NaN replaced with {CHURN_SCORE_MIN}");
            return Self(CHURN_SCORE_MIN);
        }
        let clamped = raw.clamp(CHURN_SCORE_MIN, CHURN_SCORE_MAX);
        if clamped != raw {
            log::warn!("churn score {raw} clamped to {clamped}");
        }
        Self(clamped)
    }

    /// Ingest a score that may be missing or not numeric. Such values
    /// become 0 with a warning; numeric ones go through [`ChurnScore::new`].
    pub fn from_raw(raw: Option<f64>) -> Self {
        match raw {
            Some(v) => Self::new(v),
            None => Self::missing(),
        }
    }

    /// Score for a record whose churn score is absent or unreadable.
    pub fn missing() -> Self {
        log::warn!("churn score missing or not numeric, using {CHURN_SCORE_MIN}");
        Self(CHURN_SCORE_MIN)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl<'de> Deserialize<'de> for ChurnScore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_raw(number_or_text(deserializer)?))
    }
}

impl From<f64> for ChurnScore {
    fn from(raw: f64) -> Self {
        Self::new(raw)
    }
}

impl From<ChurnScore> for f64 {
    fn from(score: ChurnScore) -> Self {
        score.0
    }
}

impl fmt::Display for ChurnScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// ── Lenient numbers ──────────────────────────────────────────────────────────

/// Parse a numeric field the way the data service may send it: a JSON
/// number, a numeric string (Postgres `numeric`), or null. Anything else
/// is `None`.
pub fn parse_numeric_text(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}

fn number_or_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_numeric_text(&s),
        Some(other) => {
            log::warn!("ignoring non-numeric value {other} in numeric field");
            None
        }
        None => None,
    })
}

/// Money fields: null, absent or unreadable counts as zero contribution.
fn amount_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(number_or_text(deserializer)?.filter(|v| v.is_finite()).unwrap_or(0.0))
}

// ── Subscription status ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
    Inactive,
    Unknown,
}

impl SubscriptionStatus {
    /// Case-insensitive; anything unrecognised is `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ACTIVE"    => Self::Active,
            "CANCELLED" => Self::Cancelled,
            "INACTIVE"  => Self::Inactive,
            _           => Self::Unknown,
        }
    }
}

// ── Record ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id:                  CustomerId,
    pub company_name:        String,
    pub contact_name:        String,
    pub email:               String,
    #[serde(default)]
    pub phone:               Option<String>,
    pub subscription_status: String, // ACTIVE | CANCELLED | INACTIVE
    #[serde(default)]
    pub subscription_plan:   Option<String>,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub subscription_amount: f64,
    pub currency:            CurrencyCode,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub net_payment:         f64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub total_unpaid:        f64,
    #[serde(default = "ChurnScore::missing")]
    pub churn_score:         ChurnScore,
    #[serde(default)]
    pub billing_address:     Option<String>,
    pub created_at:          DateTime<Utc>,
    pub updated_at:          DateTime<Utc>,
}

impl CustomerRecord {
    pub fn status(&self) -> SubscriptionStatus {
        SubscriptionStatus::parse(&self.subscription_status)
    }

    /// Views show "no subscription" instead of amount and status when false.
    pub fn has_subscription(&self) -> bool {
        self.subscription_plan.is_some()
    }

    pub fn has_unpaid_balance(&self) -> bool {
        self.total_unpaid > 0.0
    }

    /// Given name and family name. The family name is everything after the
    /// first whitespace run, or `None` for single-word contacts.
    pub fn contact_name_parts(&self) -> (&str, Option<&str>) {
        let trimmed = self.contact_name.trim();
        match trimmed.split_once(char::is_whitespace) {
            Some((given, rest)) => {
                let family = rest.trim();
                (given, (!family.is_empty()).then_some(family))
            }
            None => (trimmed, None),
        }
    }

    /// List-view search: case-insensitive substring match on company,
    /// contact or email. An empty query matches every record.
    pub fn matches_search(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&self.company_name, &self.contact_name, &self.email]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}
