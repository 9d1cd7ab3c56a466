//! Generate the daily stock report for a watchlist

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use stock_report::{ReportBuilder, ReportConfig, ScreenerClient, Watchlist, YahooFinanceClient};

#[derive(Parser, Debug)]
#[command(name = "stock-report")]
#[command(about = "Build an HTML report of fundamentals and EMA trends for a watchlist", long_about = None)]
struct Args {
    /// CSV watchlist with `slug` and `ticker` columns
    #[arg(short, long)]
    watchlist: Option<PathBuf>,

    /// Directory receiving the charts and report.html
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Use the built-in TCS / RELIANCE / INFY list instead of a file
    #[arg(long, conflicts_with = "watchlist")]
    builtin: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    report_utils::init_tracing_with_default("warn,stock_report=info");

    let args = Args::parse();

    let mut builder = ReportConfig::builder().with_env();
    if let Some(path) = args.watchlist {
        builder = builder.watchlist_path(path);
    }
    if let Some(dir) = args.output_dir {
        builder = builder.output_dir(dir);
    }
    let config = Arc::new(builder.build()?);

    let watchlist = if args.builtin {
        Watchlist::builtin()
    } else {
        Watchlist::from_path(&config.watchlist_path)?
    };
    info!(tickers = watchlist.len(), output = %config.output_dir.display(), "Starting report");

    let report = ReportBuilder::new(
        config.clone(),
        ScreenerClient::new(config.clone())?,
        YahooFinanceClient::new(config.clone())?,
    );
    let summary = report.run(&watchlist).await?;

    println!("{}", summary.to_table());
    println!("Report saved to {}", summary.report_path.display());

    Ok(())
}
