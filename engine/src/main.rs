// Command-line presentation surface for the debtor dashboard.
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use painel_engine::panel::{build_panel, Panel, PanelOptions, PanelTable, RateioMode};
use painel_engine::query::{RowFilter, SortOrder};
use painel_engine::{DashboardSchema, DatasetStore};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "painel", about = "Painel de rateio dos entes devedores")]
struct Cli {
    /// Semicolon-delimited CSV with one row per debtor entity
    file: PathBuf,
    /// Alternative column schema (JSON); defaults to the embedded one
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    ente: Option<String>,
    #[arg(long)]
    status: Option<String>,
    #[arg(long, value_enum, default_value_t = RateioArg::Percent)]
    rateio: RateioArg,
    /// Order tab rows by this numeric column, largest first
    #[arg(long)]
    sort_by: Option<String>,
    #[arg(long, default_value_t = false)]
    json: bool,
    #[arg(long, default_value_t = false)]
    list_entes: bool,
    #[arg(long, default_value_t = false)]
    list_status: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RateioArg {
    Percent,
    Amount,
}

impl From<RateioArg> for RateioMode {
    fn from(arg: RateioArg) -> Self {
        match arg {
            RateioArg::Percent => RateioMode::Percent,
            RateioArg::Amount => RateioMode::Amount,
        }
    }
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout carries only the panel.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Erro: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let schema = match &cli.config {
        Some(path) => DashboardSchema::from_path(path)
            .with_context(|| format!("failed to load schema {}", path.display()))?,
        None => DashboardSchema::load_default().context("embedded schema is invalid")?,
    };
    info!(version = %schema.version, "Using column schema");

    let all_label = schema.all_label.clone();
    let mut store = DatasetStore::new(Arc::new(schema));
    let dataset = store.get_or_load(&cli.file)?;

    if cli.list_entes || cli.list_status {
        if cli.list_entes {
            println!("{}", all_label);
            dataset.entities().iter().for_each(|e| println!("{}", e));
        }
        if cli.list_status {
            println!("{}", all_label);
            dataset.statuses().iter().for_each(|s| println!("{}", s));
        }
        return Ok(());
    }

    let filter = RowFilter::from_choices(
        cli.ente.as_deref().unwrap_or(&all_label),
        cli.status.as_deref().unwrap_or(&all_label),
        &all_label,
    );
    let options = PanelOptions {
        rateio: cli.rateio.into(),
        sort_by: cli.sort_by.clone(),
        order: SortOrder::Descending,
    };
    let panel = build_panel(&dataset, &filter, &options)?;

    if cli.json {
        let out = serde_json::json!({
            "panel": panel,
            "normalization": dataset.report(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    match &panel {
        Panel::Empty { message } => println!("{}", message),
        Panel::Ready(report) => {
            println!("Dados Consolidados ({} entes)", report.rows);
            for card in &report.kpis {
                println!("  {:<22} {}", card.label, card.value);
            }
            println!();
            println!("Total a ser aportado por Tribunal");
            for card in &report.court_totals {
                println!("  {:<22} {}", card.label, card.value);
            }
            for tab in &report.tabs {
                println!();
                print_table(tab);
            }
        }
    }

    let diagnostics = dataset.report();
    if !diagnostics.unparseable.is_empty() {
        println!();
        println!(
            "Atenção: {} célula(s) com conteúdo não numérico exibidas como '-':",
            diagnostics.unparseable_count()
        );
        for issue in &diagnostics.unparseable {
            println!("  {} / {}: {:?}", issue.entity, issue.column, issue.content);
        }
    }
    Ok(())
}

fn print_table(table: &PanelTable) {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, &width))| {
                let pad = width.saturating_sub(cell.chars().count());
                // entity left-aligned, numbers right-aligned
                if i == 0 {
                    format!("{}{}", cell, " ".repeat(pad))
                } else {
                    format!("{}{}", " ".repeat(pad), cell)
                }
            })
            .collect::<Vec<_>>()
            .join(" | ")
    };

    println!("[{}]", table.title);
    println!("{}", render(&table.headers));
    println!(
        "{}",
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-")
    );
    for row in &table.rows {
        println!("{}", render(row));
    }
}
