//! Churn-risk classification: bucketing and revenue aggregation.
//!
//! This module:
//!   1. Assigns every customer to exactly one risk bucket by churn score
//!   2. Groups a snapshot into the four buckets, preserving input order
//!   3. Aggregates averages and revenue overall, at risk, and per bucket
//!
//! Thresholds are fixed. Scores are already clamped to [0, 100] by
//! `ChurnScore`, so every record lands in a bucket.

use crate::customer::{ChurnScore, CustomerRecord};
use serde::{Deserialize, Serialize};

pub const HIGH_RISK_THRESHOLD:   f64 = 75.0;
pub const MEDIUM_RISK_THRESHOLD: f64 = 50.0;
pub const LOW_RISK_THRESHOLD:    f64 = 25.0;
/// Customers at or above this score count toward at-risk revenue.
pub const AT_RISK_THRESHOLD:     f64 = MEDIUM_RISK_THRESHOLD;

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBucket {
    High,
    Medium,
    Low,
    VeryLow,
}

impl RiskBucket {
    /// Display order, riskiest first.
    pub const ALL: [RiskBucket; 4] = [Self::High, Self::Medium, Self::Low, Self::VeryLow];

    pub fn for_score(score: ChurnScore) -> Self {
        let s = score.value();
        if s >= HIGH_RISK_THRESHOLD {
            Self::High
        } else if s >= MEDIUM_RISK_THRESHOLD {
            Self::Medium
        } else if s >= LOW_RISK_THRESHOLD {
            Self::Low
        } else {
            Self::VeryLow
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::High    => "High Risk",
            Self::Medium  => "Medium Risk",
            Self::Low     => "Low Risk",
            Self::VeryLow => "Very Low Risk",
        }
    }

    pub fn score_range_label(self) -> &'static str {
        match self {
            Self::High    => "75-100%",
            Self::Medium  => "50-74%",
            Self::Low     => "25-49%",
            Self::VeryLow => "0-24%",
        }
    }

    pub fn is_at_risk(self) -> bool {
        matches!(self, Self::High | Self::Medium)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Records grouped by bucket. All four buckets are always present.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification<'a> {
    buckets: [Vec<&'a CustomerRecord>; 4],
}

impl<'a> Classification<'a> {
    pub fn bucket(&self, bucket: RiskBucket) -> &[&'a CustomerRecord] {
        &self.buckets[bucket.index()]
    }

    pub fn count(&self, bucket: RiskBucket) -> usize {
        self.buckets[bucket.index()].len()
    }

    pub fn iter<'s>(&'s self) -> impl Iterator<Item = (RiskBucket, &'s [&'a CustomerRecord])> + 's {
        RiskBucket::ALL.iter().map(move |&b| (b, self.bucket(b)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketStats {
    pub bucket:  RiskBucket,
    pub count:   usize,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub customer_count:        usize,
    pub average_churn_score:   f64,
    pub total_revenue:         f64,
    pub at_risk_revenue:       f64,
    /// Fraction of total revenue at risk. 0 when total revenue is 0.
    pub at_risk_revenue_share: f64,
    pub total_unpaid:          f64,
    /// One entry per bucket, in `RiskBucket::ALL` order.
    pub buckets:               Vec<BucketStats>,
}

impl RiskSummary {
    pub fn bucket(&self, bucket: RiskBucket) -> &BucketStats {
        &self.buckets[bucket.index()]
    }

    pub fn at_risk_revenue_pct(&self) -> f64 {
        self.at_risk_revenue_share * 100.0
    }
}

// ── Operations ───────────────────────────────────────────────────────────────

pub fn classify(records: &[CustomerRecord]) -> Classification<'_> {
    let mut buckets: [Vec<&CustomerRecord>; 4] = Default::default();
    for record in records {
        buckets[RiskBucket::for_score(record.churn_score).index()].push(record);
    }
    log::debug!(
        "risk: classified {} customers (high={}, medium={}, low={}, very_low={})",
        records.len(),
        buckets[0].len(),
        buckets[1].len(),
        buckets[2].len(),
        buckets[3].len(),
    );
    Classification { buckets }
}

pub fn aggregate(records: &[CustomerRecord]) -> RiskSummary {
    let classification = classify(records);

    let total_revenue: f64 = records.iter().map(|c| c.net_payment).sum();
    let at_risk_revenue: f64 = records
        .iter()
        .filter(|c| c.churn_score.value() >= AT_RISK_THRESHOLD)
        .map(|c| c.net_payment)
        .sum();
    let total_unpaid: f64 = records.iter().map(|c| c.total_unpaid).sum();

    let average_churn_score = if records.is_empty() {
        0.0
    } else {
        records.iter().map(|c| c.churn_score.value()).sum::<f64>() / records.len() as f64
    };

    let buckets = classification
        .iter()
        .map(|(bucket, members)| BucketStats {
            bucket,
            count:   members.len(),
            revenue: members.iter().map(|c| c.net_payment).sum(),
        })
        .collect();

    RiskSummary {
        customer_count: records.len(),
        average_churn_score,
        total_revenue,
        at_risk_revenue,
        at_risk_revenue_share: revenue_share(at_risk_revenue, total_revenue),
        total_unpaid,
        buckets,
    }
}

fn revenue_share(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    let share = part / total;
    if share.is_finite() { share } else { 0.0 }
}

/// "$12.3K": thousands with one decimal, as shown on the analytics card.
pub fn format_revenue_k(amount: f64) -> String {
    format!("${:.1}K", amount / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::tests::record;

    fn bucket_of(score: f64) -> RiskBucket {
        RiskBucket::for_score(ChurnScore::new(score))
    }

    #[test]
    fn boundaries_match_thresholds() {
        assert_eq!(bucket_of(100.0),  RiskBucket::High);
        assert_eq!(bucket_of(75.0),   RiskBucket::High);
        assert_eq!(bucket_of(74.999), RiskBucket::Medium);
        assert_eq!(bucket_of(50.0),   RiskBucket::Medium);
        assert_eq!(bucket_of(49.0),   RiskBucket::Low);
        assert_eq!(bucket_of(25.0),   RiskBucket::Low);
        assert_eq!(bucket_of(24.0),   RiskBucket::VeryLow);
        assert_eq!(bucket_of(0.0),    RiskBucket::VeryLow);
    }

    #[test]
    fn buckets_are_exhaustive_and_exclusive() {
        let mut s = 0.0;
        while s <= 100.0 {
            let hits = [
                s >= 75.0,
                (50.0..75.0).contains(&s),
                (25.0..50.0).contains(&s),
                s < 25.0,
            ];
            assert_eq!(hits.iter().filter(|h| **h).count(), 1, "score {s}");
            let expected = RiskBucket::ALL[hits.iter().position(|h| *h).unwrap()];
            assert_eq!(bucket_of(s), expected, "score {s}");
            s += 0.25;
        }
    }

    #[test]
    fn out_of_range_scores_still_bucket() {
        assert_eq!(bucket_of(-10.0), RiskBucket::VeryLow);
        assert_eq!(bucket_of(400.0), RiskBucket::High);
    }

    #[test]
    fn classify_keeps_input_order_within_bucket() {
        let records = vec![
            record("h1", 80.0, 1.0),
            record("v1", 5.0, 1.0),
            record("h2", 99.0, 1.0),
            record("h3", 75.0, 1.0),
        ];
        let c = classify(&records);
        let high: Vec<_> = c.bucket(RiskBucket::High).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(high, vec!["h1", "h2", "h3"]);
        assert_eq!(c.count(RiskBucket::VeryLow), 1);
        assert_eq!(c.count(RiskBucket::Medium), 0);
        assert_eq!(c.iter().map(|(_, m)| m.len()).sum::<usize>(), records.len());
    }

    #[test]
    fn aggregate_of_empty_is_zero() {
        let s = aggregate(&[]);
        assert_eq!(s.customer_count, 0);
        assert_eq!(s.average_churn_score, 0.0);
        assert_eq!(s.total_revenue, 0.0);
        assert_eq!(s.at_risk_revenue, 0.0);
        assert_eq!(s.at_risk_revenue_share, 0.0);
        assert_eq!(s.buckets.len(), 4);
        assert!(s.buckets.iter().all(|b| b.count == 0 && b.revenue == 0.0));
    }

    #[test]
    fn zero_total_revenue_gives_zero_share() {
        let records = vec![record("a", 90.0, 100.0), record("b", 10.0, -100.0)];
        let s = aggregate(&records);
        assert_eq!(s.total_revenue, 0.0);
        assert_eq!(s.at_risk_revenue, 100.0);
        assert_eq!(s.at_risk_revenue_share, 0.0);
    }

    #[test]
    fn bucket_revenue_sums_net_payment() {
        let records = vec![
            record("a", 80.0, 100.0),
            record("b", 90.0, 250.0),
            record("c", 30.0, -40.0),
        ];
        let s = aggregate(&records);
        assert_eq!(s.bucket(RiskBucket::High).count, 2);
        assert_eq!(s.bucket(RiskBucket::High).revenue, 350.0);
        assert_eq!(s.bucket(RiskBucket::Low).revenue, -40.0);
        assert_eq!(s.bucket(RiskBucket::Medium).revenue, 0.0);
    }

    #[test]
    fn format_revenue_k_uses_one_decimal() {
        assert_eq!(format_revenue_k(500.0), "$0.5K");
        assert_eq!(format_revenue_k(12_345.0), "$12.3K");
    }

    #[test]
    fn labels_and_at_risk_flags() {
        assert_eq!(RiskBucket::High.label(), "High Risk");
        assert_eq!(RiskBucket::VeryLow.score_range_label(), "0-24%");
        assert!(RiskBucket::Medium.is_at_risk());
        assert!(!RiskBucket::Low.is_at_risk());
    }
}
