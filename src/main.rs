use anyhow::{Context, Result};
use clap::Parser;
use tokio::runtime::Runtime;
use tokio::time::{Duration, MissedTickBehavior};

use crypto_ranges::config::{BINANCE, REPORT};
use crypto_ranges::report::{export_csv, render_table};
use crypto_ranges::utils::time_utils;
use crypto_ranges::{
    BinanceBarSource, Cli, NoData, PassReport, PassSettings, load_symbols, run_pass,
};

fn present(args: &Cli, settings: &PassSettings, report: &PassReport) -> Result<()> {
    if args.json {
        let json = serde_json::to_string_pretty(&report.rows).context("failed to encode rows")?;
        println!("{}", json);
    } else {
        println!("\n{}", time_utils::local_now_as_string());
        print!("{}", render_table(&report.rows, &settings.windows, &REPORT));
        if !report.skipped.is_empty() {
            let names: Vec<&str> = report.skipped.iter().map(|s| s.symbol.as_str()).collect();
            println!("skipped: {}", names.join(", "));
        }
    }

    if let Some(path) = &args.csv {
        // A failed export should not stop the next pass
        if let Err(e) = export_csv(path, &report.rows, &settings.windows, &REPORT) {
            log::error!("⚠️  CSV export failed: {:#}", e);
        }
    }
    Ok(())
}

async fn run(args: Cli) -> Result<()> {
    let settings = args.pass_settings()?;
    let symbols = load_symbols(&args.pairs_file, BINANCE.max_pairs).await?;
    let source = BinanceBarSource::new(settings.interval_ms)?;

    let mut ticker = tokio::time::interval(Duration::from_secs(args.refresh_secs.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // First tick completes immediately
        ticker.tick().await;
        match run_pass(&source, &symbols, &settings).await {
            Ok(report) => present(&args, &settings, &report)?,
            Err(NoData::EmptySymbolList) => {
                log::warn!(
                    "⚠️  No symbols in {}, nothing to do",
                    args.pairs_file.display()
                );
            }
            Err(e) => log::warn!("⚠️  {}", e),
        }
        if args.once {
            return Ok(());
        }
    }
}

fn main() -> Result<()> {
    // A. Init Logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    // B. Parse Args
    let args = Cli::parse();
    #[cfg(debug_assertions)]
    log::info!("Parsed arguments: {:?}", args);

    // C. Passes run on the runtime until interrupted (or once with --once)
    let rt = Runtime::new().context("failed to create Tokio runtime")?;
    rt.block_on(run(args))
}
