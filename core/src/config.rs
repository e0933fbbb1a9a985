use crate::export;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound for `demo.history_days` (about a century).
pub const MAX_HISTORY_DAYS: i64 = 36_500;

// ── Export ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Artifact name stem; the ISO date and ".csv" are appended.
    pub filename_prefix: String,
    /// chrono format string for the "Created At" column (rendered in UTC).
    pub created_at_format: String,
}

// ── Demo population ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoPlan {
    pub name: String,
    /// Yearly list price in the customer's currency.
    pub annual_amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    pub population: usize,
    pub currencies: Vec<String>,
    pub plans: Vec<DemoPlan>,
    /// Share of generated customers that carry no subscription plan.
    pub unsubscribed_share: f64,
    /// How far back `created_at` may reach, in days.
    pub history_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeskConfig {
    pub export: ExportConfig,
    pub demo: DemoConfig,
}

impl DeskConfig {
    pub const FILE_NAME: &'static str = "desk_config.json";

    /// Load from the data/ directory.
    /// In tests, use DeskConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/{}", Self::FILE_NAME);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: DeskConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate().map_err(|e| anyhow::anyhow!("{path}: {e}"))?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.demo.currencies.is_empty() || self.demo.plans.is_empty() {
            anyhow::bail!("demo.currencies and demo.plans must not be empty");
        }
        if !(1..=MAX_HISTORY_DAYS).contains(&self.demo.history_days) {
            anyhow::bail!(
                "demo.history_days must be within 1..={MAX_HISTORY_DAYS}, got {}",
                self.demo.history_days
            );
        }
        export::check_date_format(&self.export.created_at_format)?;
        Ok(())
    }

    /// Load when the config file exists, otherwise fall back to defaults.
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(data_dir: &str) -> anyhow::Result<Self> {
        let path = Path::new(data_dir).join(Self::FILE_NAME);
        if path.exists() {
            Self::load(data_dir)
        } else {
            log::warn!("config: {} missing, using defaults", path.display());
            Ok(Self::default_test())
        }
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        Self {
            export: ExportConfig {
                filename_prefix: "customers_export".into(),
                created_at_format: "%d/%m/%Y, %H:%M:%S".into(),
            },
            demo: DemoConfig {
                population: 50,
                currencies: vec!["USD".into(), "EUR".into(), "GBP".into()],
                plans: vec![
                    DemoPlan { name: "Starter".into(),    annual_amount: 1_200.0 },
                    DemoPlan { name: "Growth".into(),     annual_amount: 4_800.0 },
                    DemoPlan { name: "Enterprise".into(), annual_amount: 24_000.0 },
                ],
                unsubscribed_share: 0.10,
                history_days: 730,
            },
        }
    }
}
