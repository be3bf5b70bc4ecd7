mod bootstrap;
mod render;

use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Local;
use ledger_core::settings::Settings;
use ledger_runtime::report::{self, ReportRequest};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("Spot Ledger v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Consumption: {}, View: {}, Format: {}",
        settings.consumption.display(),
        settings.view,
        settings.format
    );

    let request = ReportRequest::from_settings(&settings, Local::now().date_naive())?;
    tracing::debug!("Price range {} to {}", request.from, request.until);

    let report = match report::run(&request).await {
        Ok(report) => report,
        Err(e) if e.is_recoverable() => {
            tracing::error!("{}", e);
            eprintln!("{e}");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    if settings.is_json() {
        let json = serde_json::to_string_pretty(&report).context("failed to encode report")?;
        println!("{json}");
    } else {
        print!("{}", render::render_report(&report));
    }

    Ok(ExitCode::SUCCESS)
}
