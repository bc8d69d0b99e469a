//! Staking Metrics - funding & emission analyzer for a staking contract
//!
//! Reads configuration from the environment (or a local `.env`), scans the
//! contract's transfer history and prints a funding report to stdout.
//! Logs go to stderr.

use staking_metrics::utils::constants::{APP_NAME, APP_VERSION};
use staking_metrics::{AppConfig, AppError, ChainClient, Reporter, StakingAnalyzer};

use eyre::Result;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine; the variables may come from the environment
    let _ = dotenvy::dotenv();

    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    info!("🔮 {} v{} initializing...", APP_NAME, APP_VERSION);

    match run().await {
        Ok(report) => {
            println!("{}", report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            let app_error = e.downcast_ref::<AppError>();
            error!(
                code = app_error.map(AppError::code_str).unwrap_or("UNKNOWN_ERROR"),
                "❌ Staking analysis failed"
            );
            eprintln!("❌ Error analyzing staking contract: {:#}", e);
            if app_error.is_some_and(|err| err.code.is_config()) {
                eprintln!("   Check RPC_URL, CONTRACT_ADDRESS, EXPLORER_URL and DEPLOY_BLOCK in the environment or .env");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<String> {
    let config = AppConfig::from_env()?;

    let chain = ChainClient::new(&config)?;
    info!("🔗 RPC endpoint: {}", chain.masked_url());
    info!(
        "📋 Contract {} | deploy block {} | batch {}..{} blocks",
        config.contract_address,
        config.deploy_block,
        config.scan.min_batch_blocks,
        config.scan.max_batch_blocks
    );

    let now = u64::try_from(chrono::Utc::now().timestamp())?;
    let report = StakingAnalyzer::new(&chain, &config).build_report(now).await?;

    Ok(Reporter::new(&config).render(&report))
}
