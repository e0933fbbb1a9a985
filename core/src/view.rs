//! Desk view state: list, detail, and dialog state as an explicit value.
//!
//! The view holds the loaded snapshot plus ephemeral UI state (search
//! query, selected customer, open dialog, export bounds). Callers change
//! it only by applying `DeskCommand` messages; the analytics and export
//! functions receive what they need as arguments.

use crate::{
    config::ExportConfig,
    customer::{ChurnScore, CustomerRecord, SubscriptionStatus},
    error::{DeskError, DeskResult},
    export::{self, ExportArtifact, ExportPreview, ScoreRange},
    risk::{self, RiskBucket, RiskSummary},
    snapshot::CustomerSnapshot,
    types::CustomerId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialog {
    Export,
    ChurnMetrics,
}

/// Every state change the desk accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum DeskCommand {
    Search { query: String },
    SelectCustomer { customer_id: CustomerId },
    Back,
    OpenDialog { dialog: Dialog },
    CloseDialog,
    /// Raw form input; see `ScoreRange::from_inputs`.
    SetExportBounds { min: String, max: String },
    Export,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    List,
    Detail,
}

/// One line of the customer table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRow {
    pub id:               CustomerId,
    pub company_name:     String,
    pub contact_name:     String,
    pub email:            String,
    /// Raw status and its badge kind; `None` when there is no plan.
    pub status:           Option<String>,
    pub status_kind:      Option<SubscriptionStatus>,
    pub churn_score:      ChurnScore,
    pub risk:             RiskBucket,
    pub net_payment:      f64,
    pub currency:         String,
    pub has_unpaid:       bool,
    pub created_at:       DateTime<Utc>,
}

impl From<&CustomerRecord> for ListRow {
    fn from(c: &CustomerRecord) -> Self {
        Self {
            id:           c.id.clone(),
            company_name: c.company_name.clone(),
            contact_name: c.contact_name.clone(),
            email:        c.email.clone(),
            status:       c.has_subscription().then(|| c.subscription_status.clone()),
            status_kind:  c.has_subscription().then(|| c.status()),
            churn_score:  c.churn_score,
            risk:         RiskBucket::for_score(c.churn_score),
            net_payment:  c.net_payment,
            currency:     c.currency.clone(),
            has_unpaid:   c.has_unpaid_balance(),
            created_at:   c.created_at,
        }
    }
}

/// Serializable picture of the desk for a rendering layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewState {
    pub screen:         Screen,
    pub search_query:   String,
    pub dialog:         Option<Dialog>,
    pub total:          usize,
    pub customers:      Vec<ListRow>,
    pub selected:       Option<CustomerRecord>,
    pub export_range:   ScoreRange,
    pub export_preview: Option<ExportPreview>,
    pub analytics:      Option<RiskSummary>,
}

#[derive(Debug, Clone)]
pub struct DeskView {
    snapshot:     CustomerSnapshot,
    search_query: String,
    selected:     Option<CustomerId>,
    dialog:       Option<Dialog>,
    export_range: ScoreRange,
}

impl DeskView {
    pub fn new(snapshot: CustomerSnapshot) -> Self {
        Self {
            snapshot,
            search_query: String::new(),
            selected:     None,
            dialog:       None,
            export_range: ScoreRange::full(),
        }
    }

    pub fn snapshot(&self) -> &CustomerSnapshot {
        &self.snapshot
    }

    /// Swap in a freshly loaded snapshot. A selection that no longer
    /// exists is dropped.
    pub fn replace_snapshot(&mut self, snapshot: CustomerSnapshot) {
        if let Some(id) = &self.selected {
            if snapshot.get(id).is_none() {
                self.selected = None;
            }
        }
        self.snapshot = snapshot;
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn dialog(&self) -> Option<Dialog> {
        self.dialog
    }

    pub fn export_range(&self) -> ScoreRange {
        self.export_range
    }

    pub fn screen(&self) -> Screen {
        if self.selected.is_some() { Screen::Detail } else { Screen::List }
    }

    /// Returns the artifact when the command was `Export`.
    pub fn apply(
        &mut self,
        cmd: DeskCommand,
        now: DateTime<Utc>,
        config: &ExportConfig,
    ) -> DeskResult<Option<ExportArtifact>> {
        log::debug!("view: apply {cmd:?}");
        match cmd {
            DeskCommand::Search { query } => self.search_query = query,
            DeskCommand::SelectCustomer { customer_id } => {
                if self.snapshot.get(&customer_id).is_none() {
                    return Err(DeskError::CustomerNotFound { id: customer_id });
                }
                self.dialog = None;
                self.selected = Some(customer_id);
            }
            DeskCommand::Back => self.selected = None,
            DeskCommand::OpenDialog { dialog } => self.dialog = Some(dialog),
            DeskCommand::CloseDialog => self.dialog = None,
            DeskCommand::SetExportBounds { min, max } => {
                self.export_range = ScoreRange::from_inputs(&min, &max);
            }
            DeskCommand::Export => {
                let artifact =
                    export::build_export(self.visible_customers(), &self.export_range, now, config)?;
                self.dialog = None;
                return Ok(Some(artifact));
            }
        }
        Ok(None)
    }

    /// The list after search; this is also what gets exported.
    pub fn visible_customers(&self) -> Vec<&CustomerRecord> {
        self.snapshot.search(&self.search_query)
    }

    pub fn selected_customer(&self) -> Option<&CustomerRecord> {
        self.selected.as_deref().and_then(|id| self.snapshot.get(id))
    }

    /// Analytics always cover the full snapshot, ignoring search.
    pub fn analytics(&self) -> RiskSummary {
        risk::aggregate(self.snapshot.records())
    }

    pub fn export_preview(&self) -> ExportPreview {
        export::preview(&self.visible_customers(), &self.export_range)
    }

    pub fn state(&self) -> ViewState {
        ViewState {
            screen:         self.screen(),
            search_query:   self.search_query.clone(),
            dialog:         self.dialog,
            total:          self.snapshot.len(),
            customers:      self.visible_customers().into_iter().map(ListRow::from).collect(),
            selected:       self.selected_customer().cloned(),
            export_range:   self.export_range,
            export_preview: (self.dialog == Some(Dialog::Export)).then(|| self.export_preview()),
            analytics:      (self.dialog == Some(Dialog::ChurnMetrics)).then(|| self.analytics()),
        }
    }
}
