use super::CustomerStore;
use crate::{
    customer::{parse_numeric_text, ChurnScore, CustomerRecord},
    error::DeskResult,
};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, types::Value, OptionalExtension, Row};

const CUSTOMER_COLUMNS: &str =
    "id, company_name, contact_name, email, phone, subscription_status, subscription_plan,
     subscription_amount, currency, net_payment, total_unpaid, churn_score, billing_address,
     created_at, updated_at";

/// Row as stored; timestamps are still text.
struct CustomerRow {
    id:                  String,
    company_name:        String,
    contact_name:        String,
    email:               String,
    phone:               Option<String>,
    subscription_status: String,
    subscription_plan:   Option<String>,
    subscription_amount: Option<f64>,
    currency:            String,
    net_payment:         Option<f64>,
    total_unpaid:        Option<f64>,
    churn_score:         Option<f64>,
    billing_address:     Option<String>,
    created_at:          String,
    updated_at:          String,
}

impl CustomerRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id:                  row.get(0)?,
            company_name:        row.get(1)?,
            contact_name:        row.get(2)?,
            email:               row.get(3)?,
            phone:               row.get(4)?,
            subscription_status: row.get(5)?,
            subscription_plan:   row.get(6)?,
            subscription_amount: numeric_column(row.get(7)?),
            currency:            row.get(8)?,
            net_payment:         numeric_column(row.get(9)?),
            total_unpaid:        numeric_column(row.get(10)?),
            churn_score:         numeric_column(row.get(11)?),
            billing_address:     row.get(12)?,
            created_at:          row.get(13)?,
            updated_at:          row.get(14)?,
        })
    }

    fn into_record(self) -> DeskResult<CustomerRecord> {
        Ok(CustomerRecord {
            id:                  self.id,
            company_name:        self.company_name,
            contact_name:        self.contact_name,
            email:               self.email,
            phone:               self.phone,
            subscription_status: self.subscription_status,
            subscription_plan:   self.subscription_plan,
            subscription_amount: self.subscription_amount.unwrap_or(0.0),
            currency:            self.currency,
            net_payment:         self.net_payment.unwrap_or(0.0),
            total_unpaid:        self.total_unpaid.unwrap_or(0.0),
            churn_score:         ChurnScore::from_raw(self.churn_score),
            billing_address:     self.billing_address,
            created_at:          parse_timestamp(&self.created_at)?,
            updated_at:          parse_timestamp(&self.updated_at)?,
        })
    }
}

/// Other tools may write text or NULL into numeric columns; read them
/// without failing the whole row.
fn numeric_column(value: Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(i as f64),
        Value::Real(f) => Some(f),
        Value::Text(s) => parse_numeric_text(&s),
        Value::Null | Value::Blob(_) => None,
    }
}

fn parse_timestamp(raw: &str) -> DeskResult<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl CustomerStore {
    // ── Customer ──────────────────────────────────────────────────

    pub fn insert_customer(&self, c: &CustomerRecord) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO customers (
                id, company_name, contact_name, email, phone, subscription_status,
                subscription_plan, subscription_amount, currency, net_payment, total_unpaid,
                churn_score, billing_address, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                &c.id,
                &c.company_name,
                &c.contact_name,
                &c.email,
                &c.phone,
                &c.subscription_status,
                &c.subscription_plan,
                c.subscription_amount,
                &c.currency,
                c.net_payment,
                c.total_unpaid,
                c.churn_score.value(),
                &c.billing_address,
                format_timestamp(&c.created_at),
                format_timestamp(&c.updated_at),
            ],
        )?;
        Ok(())
    }

    /// Insert a batch in one transaction; nothing is written if any row fails.
    pub fn insert_customers(&self, customers: &[CustomerRecord]) -> DeskResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for c in customers {
            self.insert_customer(c)?;
        }
        tx.commit()?;
        log::debug!("store: inserted {} customers", customers.len());
        Ok(())
    }

    pub fn customer_count(&self) -> DeskResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM customers", [], |row| row.get(0))
            .map_err(Into::into)
    }

    pub fn get_customer(&self, id: &str) -> DeskResult<Option<CustomerRecord>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"),
                params![id],
                CustomerRow::from_row,
            )
            .optional()?;
        row.map(CustomerRow::into_record).transpose()
    }

    /// Newest first, matching the data service's `created_at DESC` query.
    pub fn all_customers(&self) -> DeskResult<Vec<CustomerRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY created_at DESC, id ASC"
        ))?;
        let rows = stmt
            .query_map([], CustomerRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(CustomerRow::into_record).collect()
    }
}
