use anyhow::Result;
use serde::Serialize;
use tracing::info;

use tracelytics_core::campaign::{CampaignSortKey, SortOrder};
use tracelytics_core::filter::{ConversionFilter, TraceFilter};
use tracelytics_dashboard::error::DashboardError;
use tracelytics_dashboard::state::DashboardState;
use tracelytics_mock::MockTraceSource;

const USAGE: &str = "usage: tracelytics [snapshot | campaigns [clicks|conversions|roi|revenue] [asc|desc] | flow [all|converted|not_converted] | trace <id>]";

fn print_json<T: Serialize>(value: &T) -> Result<(), DashboardError> {
    let json = serde_json::to_string_pretty(value).map_err(anyhow::Error::from)?;
    println!("{json}");
    Ok(())
}

async fn run(state: &DashboardState<MockTraceSource>, args: &[String]) -> Result<(), DashboardError> {
    let arg = |i: usize| args.get(i).map(String::as_str);
    let bad_request = |e: anyhow::Error| DashboardError::BadRequest(e.to_string());

    match arg(0).unwrap_or("snapshot") {
        "snapshot" => print_json(&state.snapshot().await?),
        "campaigns" => {
            let key = CampaignSortKey::parse(arg(1)).map_err(bad_request)?;
            let order = SortOrder::parse(arg(2)).map_err(bad_request)?;
            print_json(&state.campaigns(key, order).await?)
        }
        "flow" => {
            let filter = TraceFilter {
                converted: ConversionFilter::parse(arg(1))?,
                ..TraceFilter::default()
            };
            print_json(&state.flow_graph(&filter).await?)
        }
        "trace" => match arg(1) {
            Some(id) => print_json(&state.trace(id).await?),
            None => Err(DashboardError::BadRequest("trace requires an id".to_string())),
        },
        "help" | "--help" | "-h" => {
            println!("{USAGE}");
            Ok(())
        }
        other => Err(DashboardError::BadRequest(format!(
            "unknown command {other:?}\n{USAGE}"
        ))),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Structured JSON logs on stderr so stdout stays pure JSON output.
    // Level controlled via RUST_LOG env var.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tracelytics=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cfg = tracelytics_core::config::Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    let now = chrono::Utc::now().timestamp_millis();
    let source = MockTraceSource::from_seed(cfg.mock_seed, cfg.mock_traces, now);
    info!(
        seed = cfg.mock_seed,
        traces = cfg.mock_traces,
        cost_per_click = cfg.cost_per_click,
        "Tracelytics dashboard ready"
    );
    let state = DashboardState::new(source, cfg);

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(&state, &args).await {
        tracing::error!(error = %e, "command failed");
        eprintln!("{e}");
        std::process::exit(e.exit_code());
    }
    Ok(())
}
