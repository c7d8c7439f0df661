use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tally_ledger::{load_ledger, summarize};

mod config;
#[cfg(feature = "sheets")]
mod sheets;
mod state;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TALLY_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    version = VERSION,
    about = "Categorize an expense ledger and publish it to Google Sheets"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a ledger, categorize it, and print the table with totals
    Preview {
        /// Ledger CSV (defaults to the configured csv_path)
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Emit the table as JSON rows instead of text
        #[arg(long)]
        json: bool,
    },

    /// Publish the categorized ledger to the configured spreadsheet
    Publish {
        /// Ledger CSV (defaults to the configured csv_path)
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Spreadsheet id (overrides config)
        #[arg(long)]
        spreadsheet_id: Option<String>,

        /// Skip header/number formatting
        #[arg(long)]
        no_format: bool,

        /// Skip pivot-table creation
        #[arg(long)]
        no_pivot: bool,
    },

    /// One-time Google OAuth setup; caches tokens under ~/.tally/
    Connect,

    /// Config file management
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config.toml if absent
    Init,
    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Preview { csv, json } => preview(csv, json)?,

        Command::Publish {
            csv,
            spreadsheet_id,
            no_format,
            no_pivot,
        } => publish(csv, spreadsheet_id, no_format, no_pivot).await?,

        Command::Connect => connect().await?,

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                print!("{}", toml::to_string_pretty(&cfg)?);
            }
        },
    }

    Ok(())
}

fn resolve_csv(csv: Option<PathBuf>, cfg: &config::Config) -> Result<PathBuf> {
    let path = csv.unwrap_or_else(|| PathBuf::from(&cfg.ledger.csv_path));
    if !path.exists() {
        bail!("ledger not found: {} (pass --csv <path>)", path.display());
    }
    Ok(path)
}

fn preview(csv: Option<PathBuf>, json: bool) -> Result<()> {
    let cfg = config::load_config()?;
    let path = resolve_csv(csv, &cfg)?;
    let table = load_ledger(&path).with_context(|| format!("loading {}", path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&table.rows())?);
        return Ok(());
    }

    println!(
        "Loaded {} transactions from {}\n",
        table.transactions().len(),
        path.display()
    );

    for row in table.rows() {
        let cell = |i: usize| row.get(i).map(String::as_str).unwrap_or("");
        println!(
            "{:<12} {:<28} {:<15} {:>12} {:>12}",
            cell(0),
            cell(1),
            cell(2),
            cell(3),
            cell(4)
        );
    }

    println!("\nTotals by category:");
    for total in summarize(&table) {
        println!(
            "[{}] debit={:.2} credit={:.2} count={}",
            total.category, total.debit, total.credit, total.count
        );
    }

    Ok(())
}

#[cfg(feature = "sheets")]
async fn publish(
    csv: Option<PathBuf>,
    spreadsheet_id: Option<String>,
    no_format: bool,
    no_pivot: bool,
) -> Result<()> {
    let cfg = config::load_config()?;
    let path = resolve_csv(csv, &cfg)?;
    let table = load_ledger(&path).with_context(|| format!("loading {}", path.display()))?;

    let spreadsheet_id = spreadsheet_id
        .or_else(|| cfg.sheets.spreadsheet_id.clone())
        .context("no spreadsheet id; pass --spreadsheet-id or set [sheets].spreadsheet_id in config")?;

    let opts = sheets::PublishOptions {
        spreadsheet_id,
        sheet_name: cfg.sheets.sheet_name.clone(),
        pivot_sheet: cfg.sheets.pivot_sheet.clone(),
        format: !no_format,
        pivot: !no_pivot,
    };

    println!(
        "Publishing {} rows from {} to spreadsheet {}",
        table.rows().len(),
        path.display(),
        opts.spreadsheet_id
    );
    sheets::publish_table(&table, &opts).await?;
    println!("Done.");
    Ok(())
}

#[cfg(not(feature = "sheets"))]
async fn publish(
    _csv: Option<PathBuf>,
    _spreadsheet_id: Option<String>,
    _no_format: bool,
    _no_pivot: bool,
) -> Result<()> {
    bail!("this build has no Google Sheets support; rebuild with: cargo build --features sheets")
}

#[cfg(feature = "sheets")]
async fn connect() -> Result<()> {
    sheets::connect_interactive().await
}

#[cfg(not(feature = "sheets"))]
async fn connect() -> Result<()> {
    bail!("this build has no Google Sheets support; rebuild with: cargo build --features sheets")
}
