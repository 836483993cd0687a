//! cgnat-check
//!
//! Reports whether this host is behind Carrier-Grade NAT.

use anyhow::Context;
use cgnat_check::config::{OutputFormat, Settings};
use cgnat_check::connectivity::{
    public_source_from_settings, run_detection, CgnatRange, DetectionReport, SystemInterfaces,
};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    cgnat_check::init();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(e.exit_code());
        }
    };

    let source = public_source_from_settings(&settings);
    let report = match run_detection(
        &SystemInterfaces,
        source.as_ref(),
        CgnatRange::SHARED_ADDRESS_SPACE,
    )
    .await
    {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(e.kind().exit_code());
        }
    };

    if let Err(e) = print_report(&report, settings.output) {
        eprintln!("error: {:#}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn print_report(report: &DetectionReport, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Plain => println!("{}", report.summary()),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).context("serializing report")?;
            println!("{}", json);
        }
    }
    Ok(())
}
