//! desk-runner: headless runner for the churn desk.
//!
//! Usage:
//!   desk-runner --db customers.db --seed 12345 --population 200
//!   desk-runner --json customers.json --search acme --export --min 50 --max 100
//!   desk-runner --db customers.db --ipc-mode

use anyhow::Result;
use churndesk_core::{
    config::DeskConfig,
    customer::CustomerRecord,
    risk::{self, RiskBucket, RiskSummary},
    seed::DemoPopulation,
    snapshot::CustomerSnapshot,
    store::{CustomerStore, JsonFileSource, SnapshotSource},
    view::{DeskCommand, DeskView, ViewState},
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Reload,
    Command { command: DeskCommand },
    Quit,
}

#[derive(serde::Serialize)]
struct ExportWritten {
    path:      PathBuf,
    row_count: usize,
}

#[derive(serde::Serialize)]
struct UiResponse {
    state:  ViewState,
    #[serde(skip_serializing_if = "Option::is_none")]
    export: Option<ExportWritten>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error:  Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ipc_mode = has_flag(&args, "--ipc-mode");
    let db = string_arg(&args, "--db").unwrap_or(":memory:");
    let data_dir = string_arg(&args, "--data-dir").unwrap_or("./data");
    let out_dir = PathBuf::from(string_arg(&args, "--out").unwrap_or("./exports"));

    let config = DeskConfig::load_or_default(data_dir)?;
    let population = parse_arg(&args, "--population", config.demo.population);

    if !ipc_mode {
        println!("Churn Desk — desk-runner");
        println!("  seed:      {seed}");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!();
    }

    let source: Box<dyn SnapshotSource> = match string_arg(&args, "--json") {
        Some(path) => Box::new(JsonFileSource::new(path)),
        None => {
            let store = if db == ":memory:" {
                CustomerStore::in_memory()?
            } else {
                CustomerStore::open(db)?
            };
            store.migrate()?;
            if store.customer_count()? == 0 {
                let mut demo = config.demo.clone();
                demo.population = population;
                let customers = DemoPopulation::generate(seed, &demo, chrono::Utc::now())?;
                store.insert_customers(&customers)?;
            }
            Box::new(store)
        }
    };

    let mut view = DeskView::new(load_or_empty(source.as_ref()));

    if let Some(query) = string_arg(&args, "--search") {
        view.apply(DeskCommand::Search { query: query.into() }, chrono::Utc::now(), &config.export)?;
    }

    if ipc_mode {
        run_ipc_loop(&mut view, source.as_ref(), &config, &out_dir)?;
        return Ok(());
    }

    print_list(&view);

    if let Some(id) = string_arg(&args, "--show") {
        view.apply(DeskCommand::SelectCustomer { customer_id: id.into() }, chrono::Utc::now(), &config.export)?;
        if let Some(customer) = view.selected_customer() {
            print_detail(customer);
        }
    }

    print_analytics(&view.analytics());

    if has_flag(&args, "--export") {
        let min = string_arg(&args, "--min").unwrap_or("0");
        let max = string_arg(&args, "--max").unwrap_or("100");
        view.apply(
            DeskCommand::SetExportBounds { min: min.into(), max: max.into() },
            chrono::Utc::now(),
            &config.export,
        )?;
        println!();
        println!("  {}", view.export_preview());
        if let Some(artifact) = view.apply(DeskCommand::Export, chrono::Utc::now(), &config.export)? {
            let path = artifact.write_to(&out_dir)?;
            println!("  export written: {}", path.display());
        }
    }

    Ok(())
}

/// A failed load leaves the desk usable with an empty list.
fn load_or_empty(source: &dyn SnapshotSource) -> CustomerSnapshot {
    source.load_snapshot().unwrap_or_else(|e| {
        log::error!("Error fetching customers: {e}");
        CustomerSnapshot::empty(chrono::Utc::now())
    })
}

fn run_ipc_loop(
    view: &mut DeskView,
    source: &dyn SnapshotSource,
    config: &DeskConfig,
    out_dir: &Path,
) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        let (export, error) = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => (None, None),
            IpcCommand::Reload => {
                view.replace_snapshot(load_or_empty(source));
                (None, None)
            }
            IpcCommand::Command { command } => apply_command(view, command, config, out_dir),
        };
        let response = UiResponse { state: view.state(), export, error };
        writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
        stdout.flush()?;
    }
    Ok(())
}

/// Apply one command; rejected commands and failed export writes are
/// reported back instead of ending the session.
fn apply_command(
    view: &mut DeskView,
    command: DeskCommand,
    config: &DeskConfig,
    out_dir: &Path,
) -> (Option<ExportWritten>, Option<String>) {
    let artifact = match view.apply(command, chrono::Utc::now(), &config.export) {
        Ok(Some(artifact)) => artifact,
        Ok(None) => return (None, None),
        Err(e) => {
            log::warn!("ipc: command rejected: {e}");
            return (None, Some(e.to_string()));
        }
    };
    match artifact.write_to(out_dir) {
        Ok(path) => (Some(ExportWritten { path, row_count: artifact.row_count }), None),
        Err(e) => {
            log::error!("ipc: export write to {} failed: {e}", out_dir.display());
            (None, Some(e.to_string()))
        }
    }
}

fn print_list(view: &DeskView) {
    let visible = view.visible_customers();
    println!("=== CUSTOMERS ({} of {}) ===", visible.len(), view.snapshot().len());
    for c in visible {
        let subscription = match &c.subscription_plan {
            Some(plan) => format!("{plan} [{}] {:.2} {}/yr", c.subscription_status, c.subscription_amount, c.currency),
            None => "no subscription".to_string(),
        };
        let unpaid = if c.has_unpaid_balance() {
            format!(" (unpaid {:.2})", c.total_unpaid)
        } else {
            String::new()
        };
        println!(
            "  {:<36} {:<32} {:>5}% {:<13} {:>10.2} {}{}  | {}",
            c.id,
            c.company_name,
            c.churn_score,
            RiskBucket::for_score(c.churn_score).label(),
            c.net_payment,
            c.currency,
            unpaid,
            subscription,
        );
    }
}

fn print_detail(c: &CustomerRecord) {
    let (given, family) = c.contact_name_parts();
    println!();
    println!("=== CUSTOMER {} ===", c.id);
    println!("  company:         {}", c.company_name);
    println!("  first name:      {given}");
    println!("  last name:       {}", family.unwrap_or("—"));
    println!("  email:           {}", c.email);
    println!("  phone:           {}", c.phone.as_deref().unwrap_or("—"));
    println!("  status:          {}", c.subscription_status);
    println!("  plan:            {}", c.subscription_plan.as_deref().unwrap_or("—"));
    println!("  amount:          {:.2} {}", c.subscription_amount, c.currency);
    println!("  net payment:     {:.2} {}", c.net_payment, c.currency);
    println!("  total unpaid:    {:.2} {}", c.total_unpaid, c.currency);
    println!("  churn score:     {}% ({})", c.churn_score, RiskBucket::for_score(c.churn_score).label());
    println!("  billing address: {}", c.billing_address.as_deref().unwrap_or("—"));
    println!("  created at:      {}", c.created_at.format("%d %b %Y %H:%M"));
    println!("  updated at:      {}", c.updated_at.format("%d %b %Y %H:%M"));
}

fn print_analytics(summary: &RiskSummary) {
    println!();
    println!("=== CHURN SCORE ANALYTICS ===");
    println!("  average churn score: {:.1}%", summary.average_churn_score);
    println!(
        "  at-risk revenue:     {} ({:.1}% of total)",
        risk::format_revenue_k(summary.at_risk_revenue),
        summary.at_risk_revenue_pct(),
    );
    for stats in &summary.buckets {
        let revenue_label = if stats.bucket.is_at_risk() { "revenue at risk" } else { "total revenue" };
        println!(
            "  {:<13} {:>8} | {:>5} customers | {revenue_label}: {:.2}",
            stats.bucket.label(),
            stats.bucket.score_range_label(),
            stats.count,
            stats.revenue,
        );
    }
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    string_arg(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
