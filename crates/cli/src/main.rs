mod logging;
mod render;

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::warn;

use etf_dividend_core::models::etf::Category;
use etf_dividend_core::models::settings::Settings;
use etf_dividend_core::providers::csv_feed::{parse_date, CsvFeedProvider};
use etf_dividend_core::services::calculator::{brokerage_fee, estimate_yield};
use etf_dividend_core::services::removal_guard::RemovalDecision;
use etf_dividend_core::storage::store::FileStore;
use etf_dividend_core::DividendPlanner;

#[derive(Parser)]
#[command(name = "etf-planner", version, about = "Taiwan ETF dividend portfolio planner")]
struct Cli {
    /// Settings file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for persisted portfolio and API key
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Reference CSV, as a URL or file path
    #[arg(long, global = true)]
    source: Option<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List reference ETFs, optionally one category (季一/季二/季三/月配/債券 or Q1/Q2/Q3/monthly/bond)
    Etfs {
        #[arg(long)]
        category: Option<String>,
    },
    /// Add an ETF to the portfolio, sized to the target budget
    Add { code: String },
    /// Record another buy for a held ETF
    Buy {
        code: String,
        #[arg(long)]
        shares: u64,
        #[arg(long)]
        price: f64,
        /// Trade date, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Replace a holding's history with one corrective transaction
    Reset {
        code: String,
        #[arg(long)]
        shares: u64,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        date: Option<String>,
    },
    /// Collapse a holding's history into one transaction with the same totals
    Consolidate { code: String },
    /// Remove a holding (asks for confirmation)
    Remove {
        code: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show holdings, totals and the monthly dividend projection
    Summary,
    /// Show a holding's transactions
    History { code: String },
    /// Upcoming ex-dividend dates
    Announcements,
    /// Brokerage fee for an order
    Fee {
        #[arg(long)]
        price: f64,
        #[arg(long)]
        shares: u64,
    },
    /// Annual cash yield from price and yearly dividend
    Yield {
        #[arg(long)]
        price: f64,
        #[arg(long)]
        dividend: f64,
    },
    /// Manage the Gemini API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
    /// AI allocation proposal
    Plan {
        /// Budget in units of 10 000 TWD
        #[arg(long)]
        budget: f64,
        /// Free-text requirements
        #[arg(long, default_value = "")]
        prompt: String,
    },
    /// AI health check of the current portfolio
    Diagnose,
}

#[derive(Subcommand)]
enum KeyAction {
    Set { key: String },
    Clear,
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level)?;

    if print_calculation(&cli.command) {
        return Ok(());
    }

    let settings = load_settings(&cli)?;
    let store = FileStore::open(storage_dir(&cli, &settings)?)?;
    let mut planner = DividendPlanner::open(settings, Box::new(store))?;

    if needs_reference_data(&cli.command) {
        load_reference(&mut planner, &cli).await;
    }

    run(&mut planner, cli.command).await
}

async fn run(planner: &mut DividendPlanner, command: Command) -> Result<()> {
    match &command {
        Command::Etfs { category } => {
            let etfs = match category {
                Some(c) => {
                    let category: Category = c.parse()?;
                    planner.etfs_in_category(category)
                }
                None => planner.etfs().iter().collect(),
            };
            render::etf_table(&etfs);
        }
        Command::Add { code } => {
            planner.add_holding(code)?;
            println!("已加入 {}", code.to_uppercase());
            render::summary(&planner.snapshot(), planner.settings().lot_size);
        }
        Command::Buy { code, shares, price, date } => {
            let date = trade_date(planner, date.as_deref())?;
            planner.append_transaction(code, date, *shares, *price)?;
            println!("已新增交易 {} {shares} 股 @ {price}", code.to_uppercase());
        }
        Command::Reset { code, shares, price, date } => {
            let date = trade_date(planner, date.as_deref())?;
            planner.overwrite_position(code, date, *shares, *price)?;
            println!("已重設部位 {} {shares} 股 @ {price}", code.to_uppercase());
        }
        Command::Consolidate { code } => {
            planner.consolidate_position(code)?;
            println!("已合併 {} 的交易紀錄", code.to_uppercase());
        }
        Command::Remove { code, yes } => remove(planner, code, *yes)?,
        Command::Summary => render::summary(&planner.snapshot(), planner.settings().lot_size),
        Command::History { code } => {
            let ledger = planner
                .holding(code)
                .with_context(|| format!("{code} is not in the portfolio"))?;
            render::history(ledger);
        }
        Command::Announcements => render::announcements(&planner.upcoming_dividends()),
        Command::Key { action } => match action {
            KeyAction::Set { key } => {
                planner.set_api_key(key)?;
                println!("API Key 已儲存");
            }
            KeyAction::Clear => {
                planner.clear_api_key()?;
                println!("API Key 已清除");
            }
            KeyAction::Status => {
                println!("{}", if planner.has_api_key() { "已設定" } else { "未設定" });
            }
        },
        Command::Plan { budget, prompt } => {
            println!("{}", planner.smart_plan(*budget, prompt).await.message());
        }
        Command::Diagnose => {
            if planner.holdings().is_empty() {
                println!("尚無投資組合，請先加入標的。");
            } else {
                println!("{}", planner.diagnose().await.message());
            }
        }
        Command::Fee { .. } | Command::Yield { .. } => {
            print_calculation(&command);
        }
    }
    Ok(())
}

/// Pure calculator commands need no storage. Returns whether `command` was one.
fn print_calculation(command: &Command) -> bool {
    match command {
        Command::Fee { price, shares } => println!("{}", brokerage_fee(*price, *shares)),
        Command::Yield { price, dividend } => {
            println!("{:.2}%", estimate_yield(*price, *dividend))
        }
        _ => return false,
    }
    true
}

fn remove(planner: &mut DividendPlanner, code: &str, yes: bool) -> Result<()> {
    let armed = match planner.request_removal(code)? {
        RemovalDecision::Armed { code, .. } => code,
        RemovalDecision::Confirmed { code } => {
            println!("已刪除 {code}");
            return Ok(());
        }
    };

    if !yes {
        let window = planner.settings().removal_confirm_window_secs;
        print!("再次輸入 {armed} 以確認刪除 ({window} 秒內): ");
        std::io::stdout().flush()?;
        let mut answer = String::new();
        std::io::stdin().lock().read_line(&mut answer)?;
        if !answer.trim().eq_ignore_ascii_case(&armed) {
            planner.cancel_removal();
            println!("已取消");
            return Ok(());
        }
    }

    match planner.request_removal(&armed)? {
        RemovalDecision::Confirmed { code } => println!("已刪除 {code}"),
        RemovalDecision::Armed { .. } => {
            planner.cancel_removal();
            println!("確認逾時，未刪除任何標的");
        }
    }
    Ok(())
}

fn needs_reference_data(command: &Command) -> bool {
    !matches!(
        command,
        Command::Key { .. } | Command::Fee { .. } | Command::Yield { .. } | Command::History { .. }
    )
}

async fn load_reference(planner: &mut DividendPlanner, cli: &Cli) {
    let Some(location) = cli
        .source
        .clone()
        .or_else(|| planner.settings().reference_source.clone())
    else {
        warn!("no reference source configured; ETF list is empty");
        return;
    };
    let provider = CsvFeedProvider::from_location(&location);
    if let Err(e) = planner.load_reference_data(&provider).await {
        eprintln!("無法載入 ETF 資料: {e}");
    }
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let path = match &cli.config {
        Some(p) => p.clone(),
        None => match dirs::config_dir() {
            Some(dir) => dir.join("etf-planner").join("config.toml"),
            None => return Ok(Settings::default()),
        },
    };
    Settings::load(&path).with_context(|| format!("reading {}", path.display()))
}

fn storage_dir(cli: &Cli, settings: &Settings) -> Result<PathBuf> {
    if let Some(dir) = cli.data_dir.clone().or_else(|| settings.storage_dir.clone()) {
        return Ok(dir);
    }
    dirs::data_dir()
        .map(|d| d.join("etf-planner"))
        .context("no data directory available; pass --data-dir")
}

fn trade_date(planner: &DividendPlanner, arg: Option<&str>) -> Result<NaiveDate> {
    match arg {
        Some(s) => Ok(parse_date(s)?),
        None => Ok(planner.today()),
    }
}
