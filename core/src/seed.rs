//! Demo population: a deterministic stand-in for the hosted customer table.
//!
//! Used by the runner to fill an empty store. Status, plan, and payment
//! shapes follow what the dashboard expects to render: some customers
//! without a plan, a few credits (negative net payment), some unpaid
//! balances, and cancelled customers skewed toward high churn scores.

use crate::{
    config::{DemoConfig, MAX_HISTORY_DAYS},
    customer::{ChurnScore, CustomerRecord},
    error::DeskResult,
    name_generator::NameGenerator,
    rng::{DeskRng, RngStream},
};
use chrono::{DateTime, Duration, Utc};

const CREDIT_PROBABILITY: f64 = 0.05;
const UNPAID_PROBABILITY: f64 = 0.20;
const PHONE_PROBABILITY: f64 = 0.80;
const ADDRESS_PROBABILITY: f64 = 0.85;

pub struct DemoPopulation;

impl DemoPopulation {
    pub fn generate(
        seed: u64,
        config: &DemoConfig,
        now: DateTime<Utc>,
    ) -> DeskResult<Vec<CustomerRecord>> {
        if config.currencies.is_empty() || config.plans.is_empty() {
            return Err(anyhow::anyhow!("demo config needs at least one currency and one plan").into());
        }

        let mut profile = DeskRng::new(seed, RngStream::Profile);
        let mut billing = DeskRng::new(seed, RngStream::Billing);
        let mut risk = DeskRng::new(seed, RngStream::Risk);

        let customers: Vec<CustomerRecord> = (0..config.population)
            .map(|_| Self::customer(config, now, &mut profile, &mut billing, &mut risk))
            .collect();

        log::info!("seed: generated {} demo customers (seed={seed})", customers.len());
        Ok(customers)
    }

    fn customer(
        config: &DemoConfig,
        now: DateTime<Utc>,
        profile: &mut DeskRng,
        billing: &mut DeskRng,
        risk: &mut DeskRng,
    ) -> CustomerRecord {
        let id = profile.uuid().to_string();
        let contact_name = NameGenerator::contact_name(profile);
        let company_name = NameGenerator::company_name(profile);
        let email = NameGenerator::email(&contact_name, &company_name);
        let phone = profile.chance(PHONE_PROBABILITY).then(|| NameGenerator::phone(profile));
        let billing_address =
            profile.chance(ADDRESS_PROBABILITY).then(|| NameGenerator::billing_address(profile));

        let plan = (!billing.chance(config.unsubscribed_share)).then(|| billing.pick(&config.plans).clone());
        let status = match &plan {
            None => "INACTIVE",
            Some(_) => match billing.next_u64_below(10) {
                0 => "CANCELLED",
                1 => "INACTIVE",
                _ => "ACTIVE",
            },
        };
        let subscription_amount = plan.as_ref().map_or(0.0, |p| p.annual_amount);
        let currency = billing.pick(&config.currencies).clone();

        let net_payment = if billing.chance(CREDIT_PROBABILITY) {
            -round_cents(billing.range_f64(10.0, 500.0))
        } else {
            round_cents(subscription_amount * billing.range_f64(0.8, 1.2))
        };
        let total_unpaid = if billing.chance(UNPAID_PROBABILITY) {
            round_cents(billing.range_f64(0.0, (subscription_amount * 0.3).max(50.0)))
        } else {
            0.0
        };

        // Whole-number scores, as the data service stores them.
        let churn_score = match status {
            "CANCELLED" => 60 + risk.next_u64_below(41),
            "INACTIVE"  => 30 + risk.next_u64_below(61),
            _           => risk.next_u64_below(81),
        };

        let history_days = config.history_days.clamp(1, MAX_HISTORY_DAYS);
        let age_secs = billing.next_u64_below((history_days * 86_400) as u64) as i64;
        let created_at = now - Duration::seconds(age_secs);
        let updated_at = created_at + Duration::seconds(billing.next_u64_below(age_secs.max(1) as u64) as i64);

        CustomerRecord {
            id,
            company_name,
            contact_name,
            email,
            phone,
            subscription_status: status.into(),
            subscription_plan: plan.map(|p| p.name),
            subscription_amount,
            currency,
            net_payment,
            total_unpaid,
            churn_score: ChurnScore::new(churn_score as f64),
            billing_address,
            created_at,
            updated_at,
        }
    }
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
