//! remo-demo — channel up/down and light on/off loop against a real account
//!
//! Usage:
//!   remo-demo [--config <path>] <appliance> [<light>]
//!
//! Environment:
//!   NATURE_REMO_TOKEN     access token (or store one in the OS keyring)
//!   DEVICE_NAME           appliance nickname when not given as an argument
//!   LIGHT_NAME            light nickname when not given as an argument
//!   RUST_LOG              log filter (default: info)

use anyhow::Context;
use nature_remo_controller::{Controller, ControllerBuilder, ControllerConfig};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const PAUSE: Duration = Duration::from_secs(3);

struct Args {
    config: Option<String>,
    appliance: String,
    light: Option<String>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut config = None;
    let mut positional = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config = Some(args.next().context("--config needs a path")?),
            "help" | "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            _ => positional.push(arg),
        }
    }
    let mut positional = positional.into_iter();
    let appliance = positional
        .next()
        .or_else(|| std::env::var("DEVICE_NAME").ok())
        .context("no appliance nickname given (argument or DEVICE_NAME)")?;
    let light = positional
        .next()
        .or_else(|| std::env::var("LIGHT_NAME").ok());
    Ok(Args {
        config,
        appliance,
        light,
    })
}

fn print_usage() {
    println!(
        r#"remo-demo — Nature Remo controller demo loop

USAGE:
    remo-demo [--config <path>] <appliance> [<light>]

ENVIRONMENT:
    NATURE_REMO_TOKEN     Access token
    DEVICE_NAME           Appliance nickname (fallback for <appliance>)
    LIGHT_NAME            Light nickname (fallback for <light>)"#
    );
}

async fn round(remo: &Controller, args: &Args, signal: &str, light_on: bool) {
    info!(in_flight = %remo.current_in_flight_label(), "send start");
    let sent = remo.send_signal(&args.appliance, signal).await;
    info!(admitted = sent.is_admitted(), %signal, "send_signal");
    if let Some(light) = &args.light {
        let lit = if light_on {
            remo.send_on_signal_light(light).await
        } else {
            remo.send_off_signal_light(light).await
        };
        info!(admitted = lit.is_admitted(), light_on, "send_signal_light");
    }
    info!(in_flight = %remo.current_in_flight_label(), "send issued");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => ControllerConfig::from_yaml_file(path)
            .with_context(|| format!("loading config from {}", path))?,
        None => ControllerConfig::from_env(),
    };

    let remo = ControllerBuilder::from_config(config)
        .build()
        .await
        .context("connecting to Nature Remo")?;

    let mut reports = remo.subscribe();
    tokio::spawn(async move {
        loop {
            match reports.recv().await {
                Ok(report) => info!(
                    label = %report.label,
                    outcome = ?report.outcome,
                    elapsed_ms = report.elapsed.as_millis() as u64,
                    "send finished"
                ),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "completion reports lagged")
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    loop {
        round(&remo, &args, "ch_up", true).await;
        tokio::time::sleep(PAUSE).await;
        round(&remo, &args, "ch_down", false).await;
        tokio::time::sleep(PAUSE).await;
    }
}
