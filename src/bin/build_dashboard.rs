use std::path::Path;

use anyhow::{bail, Context, Result};
use nass_insights::metrics::PeerConfig;
use nass_insights::{build_dashboard, data, DashboardRequest};

/// Build one state's dashboard JSON from a QuickStats extract.
///
/// Usage: build_dashboard <extract.parquet|extract.csv> <STATE> <YEAR> [COMMODITY]
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        bail!("usage: build_dashboard <extract.parquet|extract.csv> <STATE> <YEAR> [COMMODITY]");
    }
    let path = Path::new(&args[1]);
    let state = args[2].to_ascii_uppercase();
    let year: i32 = args[3]
        .parse()
        .with_context(|| format!("invalid year: {}", args[3]))?;

    let records = match path.extension().and_then(|e| e.to_str()) {
        Some("parquet") => data::load_parquet(path)?,
        Some("csv") => data::load_csv(path)?,
        _ => bail!("unsupported extract format: {}", path.display()),
    };

    let mut request = DashboardRequest::new(state, year);
    request.story_commodity = args.get(4).map(|c| c.to_ascii_uppercase());

    let dashboard = build_dashboard(&records, &request, &PeerConfig::default());
    println!("{}", serde_json::to_string_pretty(&dashboard)?);
    Ok(())
}
