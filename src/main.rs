use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use das_metrics::pipeline::{run_pipeline_files, PipelineResult};

#[derive(Parser, Debug)]
#[command(name = "das-metrics")]
#[command(about = "Trade reconciliation & performance metrics for DAS Trader CSV exports")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Print verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reconcile an orders/executions/tickets export and print the performance report
    Analyze {
        /// Path to the orders CSV
        #[arg(long, default_value = "data/Orders.csv")]
        orders: PathBuf,

        /// Path to the executions (trades) CSV
        #[arg(long, default_value = "data/Trades.csv")]
        executions: PathBuf,

        /// Path to the fee tickets CSV
        #[arg(long, default_value = "data/Tickets.csv")]
        tickets: PathBuf,

        /// Write the full result as JSON to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    match args.command {
        Commands::Analyze {
            orders,
            executions,
            tickets,
            output,
        } => run_analyze(&orders, &executions, &tickets, output.as_deref()),
    }
}

fn run_analyze(
    orders: &Path,
    executions: &Path,
    tickets: &Path,
    output: Option<&Path>,
) -> Result<()> {
    info!(
        "analyzing orders={:?} executions={:?} tickets={:?}",
        orders, executions, tickets
    );
    let result = run_pipeline_files(orders, executions, tickets);
    print_report(&result);

    if let Some(path) = output {
        let json =
            serde_json::to_string_pretty(&result).context("failed to serialize result")?;
        fs::write(path, json).with_context(|| format!("failed to write {:?}", path))?;
        info!("wrote full result to {:?}", path);
    }

    Ok(())
}

fn print_report(result: &PipelineResult) {
    println!("\n{}", "=".repeat(60));
    println!("{}", result.summary);
    if result.unmatched_order_count > 0 {
        println!(
            "({} orders had no executions and were excluded)",
            result.unmatched_order_count
        );
    }

    if !result.by_symbol.is_empty() {
        println!("\nBy symbol:");
        for stats in &result.by_symbol {
            println!(
                "  {:<8} {:>10.2}  {:>4} trades  {:>5.1}% win",
                stats.symbol, stats.total_pl, stats.total_trades, stats.win_rate
            );
        }
    }

    if !result.by_side.is_empty() {
        println!("\nBy side:");
        for stats in &result.by_side {
            println!(
                "  {:<8} {:>10.2}  {:>4} trades  {:>5.1}% win",
                stats.side.to_string(),
                stats.total_pl,
                stats.total_trades,
                stats.win_rate
            );
        }
    }

    if !result.by_weekday.is_empty() {
        println!("\nBy weekday:");
        for stats in &result.by_weekday {
            println!(
                "  {:<10} {:>10.2}  {:>4} trades  {:>5.1}% win  avg {:>8.2}",
                stats.weekday, stats.total_pl, stats.total_trades, stats.win_rate, stats.avg_pl
            );
        }
    }

    if !result.by_trader.is_empty() {
        println!("\nBy trader:");
        for stats in &result.by_trader {
            println!(
                "  {:<10} {:>10.2}  {:>4} trades  {:>5.1}% win  fees {:>8.2}",
                stats.trader,
                stats.total_pl,
                stats.total_trades,
                stats.win_rate,
                stats.total_commission + stats.total_route_fee
            );
        }
    }

    println!("{}", "=".repeat(60));
}
