//! nps-desk: operator runner for the NPS Desk.
//!
//! Usage:
//!   nps-desk --code SECRET --db nps.db --month 2024-01
//!   nps-desk --code SECRET --db nps.db --month 2024-01 --export ./out
//!   nps-desk --db nps.db --ipc-mode

use anyhow::{bail, Result};
use nps_core::{
    app::{AppAction, AppEvent, AppState, NpsApp},
    config::NpsConfig,
    metrics::MonthSummary,
    store::NpsStore,
    types::{validate_month, MonthId},
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Dispatch { action: AppAction },
    Export,
    Quit,
}

#[derive(serde::Serialize)]
struct UiState<'a> {
    state: &'a AppState,
    months: Vec<MonthId>,
    summary: Option<MonthSummary>,
    events: Vec<AppEvent>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = arg_value(&args, "--db").unwrap_or("nps.db");
    let data_dir = arg_value(&args, "--data-dir").unwrap_or("./data");

    log::info!("nps-desk starting: db={db} data_dir={data_dir} ipc={ipc_mode}");

    let store = NpsStore::open(db)?;
    store.migrate()?;

    let mut config = NpsConfig::load(data_dir)?;
    if let Some(month) = arg_value(&args, "--month") {
        config.default_month = Some(validate_month(month)?);
    }
    let mut app = NpsApp::new(config, store);

    if ipc_mode {
        return run_ipc_loop(&mut app);
    }

    let Some(code) = arg_value(&args, "--code") else {
        bail!("--code is required outside --ipc-mode");
    };
    let events = app.dispatch(AppAction::Login {
        code: code.to_string(),
    })?;
    if events.contains(&AppEvent::LoginRejected) {
        bail!("access code rejected");
    }
    for event in &events {
        if let AppEvent::LoadFailed { reason } = event {
            eprintln!("warning: load failed, working from local data: {reason}");
        }
    }

    print_summary(&app)?;

    if let Some(dir) = arg_value(&args, "--export") {
        let file = app.export_current_month()?;
        let path = Path::new(dir).join(&file.filename);
        std::fs::write(&path, &file.content)?;
        println!();
        println!("exported {} ({})", path.display(), file.mime_type);
    }
    Ok(())
}

fn run_ipc_loop(app: &mut NpsApp<NpsStore>) -> Result<()> {
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

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {
                let state = build_ui_state(app, Vec::new());
                writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
            }
            IpcCommand::Dispatch { action } => match app.dispatch(action) {
                Ok(events) => {
                    let state = build_ui_state(app, events);
                    writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
                }
                Err(e) => write_error(&mut stdout, &e.to_string())?,
            },
            IpcCommand::Export => match app.export_current_month() {
                Ok(file) => writeln!(stdout, "{}", serde_json::to_string(&file)?)?,
                Err(e) => write_error(&mut stdout, &e.to_string())?,
            },
        }
        stdout.flush()?;
    }
    Ok(())
}

fn write_error(out: &mut impl Write, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(out, "{}", err_json)?;
    out.flush()?;
    Ok(())
}

fn build_ui_state(app: &NpsApp<NpsStore>, events: Vec<AppEvent>) -> UiState<'_> {
    UiState {
        state: app.state(),
        months: app.available_months().unwrap_or_default(),
        summary: app.current_summary().ok(),
        events,
    }
}

fn print_summary(app: &NpsApp<NpsStore>) -> Result<()> {
    let summary = app.current_summary()?;
    let overall = app.overall()?;
    let g = &summary.general;

    println!("=== NPS SUMMARY ===");
    println!("  month:        {}", summary.month);
    println!("  nps:          {}%", g.nps);
    println!("  promoters:    {}", g.promoters);
    println!("  passives:     {}", g.passives);
    println!("  detractors:   {}", g.detractors);
    println!("  responses:    {}", g.total);
    println!("  comments:     {}", summary.comment_total);
    println!("  all months:   {}% over {} responses", overall.nps, overall.total);

    println!();
    println!("=== BY ADVISOR ===");
    if summary.advisors.is_empty() {
        println!("  (No records for this month)");
    }
    for a in &summary.advisors {
        println!(
            "  {:<12} | NPS: {:>7}% | Responses: {:>4} | Comments: {:>4}",
            a.advisor, a.metrics.nps, a.metrics.total, a.comment_total
        );
    }

    let months = app.available_months()?;
    if !months.is_empty() {
        println!();
        println!("=== MONTHS ===");
        for point in app.trend()? {
            println!("  {} | NPS: {}%", point.month, point.general.nps);
        }
    }
    Ok(())
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
